//! Entity kinds and the row mapping shared by all of them.
//!
//! Five kinds are modelled: chat, conference, confbridge, recording and
//! trunk. Between them they use every collection shape, secondary lookup and
//! status machine the repository supports. The remaining kinds of the
//! platform (conversation, flow, message, record, transcribe) are not
//! modelled here; each would be one more module with a schema and row
//! mapping.

pub mod chat;
pub mod confbridge;
pub mod conference;
pub mod recording;
pub mod trunk;

use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::convention::Timestamps;
use crate::storage::schema::{TM_CREATE, TM_DELETE, TM_UPDATE};
use crate::storage::{EntitySchema, FieldValue, Page, PageToken, RepositoryError, Result, Row};

pub use chat::{Chat, ChatType};
pub use confbridge::{Confbridge, ConfbridgeStatus};
pub use conference::{Conference, ConferenceStatus, ConferenceType};
pub use recording::{Recording, RecordingStatus, ReferenceType};
pub use trunk::{AuthType, Trunk};

/// A persisted entity kind.
///
/// The schema drives table layout, cache keys and column validation; the row
/// mapping is the only per-kind code the repository needs.
pub trait Entity:
    Clone + Debug + PartialEq + Send + Sync + Serialize + DeserializeOwned + 'static
{
    const SCHEMA: &'static EntitySchema;

    fn id(&self) -> Uuid;

    fn timestamps(&self) -> &Timestamps;

    fn timestamps_mut(&mut self) -> &mut Timestamps;

    fn to_row(&self) -> Result<Row>;

    fn from_row(row: &Row) -> Result<Self>;

    /// Current values of the kind's secondary lookup columns. Blank values are
    /// skipped since they identify nothing.
    fn secondary_keys(&self) -> Result<Vec<(&'static str, FieldValue)>> {
        if Self::SCHEMA.secondary_keys.is_empty() {
            return Ok(Vec::new());
        }
        let row = self.to_row()?;
        Ok(Self::SCHEMA
            .secondary_keys
            .iter()
            .filter_map(|column| {
                row.get(column)
                    .filter(|value| !value.is_blank())
                    .map(|value| (*column, value.clone()))
            })
            .collect())
    }
}

/// Writes the lifecycle columns.
pub fn write_timestamps(row: &mut Row, timestamps: &Timestamps) {
    row.set(TM_CREATE, timestamps.tm_create);
    row.set(TM_UPDATE, timestamps.tm_update);
    row.set(TM_DELETE, timestamps.tm_delete);
}

/// Reads the lifecycle columns.
pub fn read_timestamps(row: &Row) -> Result<Timestamps> {
    Ok(Timestamps {
        tm_create: row.timestamp(TM_CREATE)?,
        tm_update: row.timestamp(TM_UPDATE)?,
        tm_delete: row.timestamp(TM_DELETE)?,
    })
}

/// Stores a serde unit enum (status, type) as its serialized name.
pub fn enum_to_text<T: Serialize>(value: &T) -> Result<FieldValue> {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(text)) => Ok(FieldValue::Text(text)),
        Ok(other) => Err(RepositoryError::Serialization(format!(
            "expected a string variant, found {other}"
        ))),
        Err(e) => Err(RepositoryError::Serialization(e.to_string())),
    }
}

/// Reads a serde unit enum stored by [`enum_to_text`].
pub fn enum_from_text<T: DeserializeOwned>(row: &Row, column: &str) -> Result<T> {
    let text = row.text(column)?;
    serde_json::from_value(serde_json::Value::String(text))
        .map_err(|e| RepositoryError::Serialization(format!("column '{column}': {e}")))
}

impl<E: Entity> Page<E> {
    /// Wraps a page of rows already ordered by `(tm_create DESC, id DESC)`.
    /// A full page carries a token pointing after its last item.
    pub fn from_items(items: Vec<E>, limit: usize) -> Self {
        let next_page_token = match items.last() {
            Some(last) if limit > 0 && items.len() >= limit => {
                Some(PageToken::new(last.timestamps().tm_create, last.id()))
            }
            _ => None,
        };
        Self {
            items,
            next_page_token,
        }
    }
}
