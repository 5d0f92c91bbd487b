use std::collections::HashMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::collection::{self, CollectionKind};
use crate::convention::Timestamp;

use super::{RepositoryError, Result};

/// A single column value as the store sees it.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Id(Uuid),
    Text(String),
    Integer(i64),
    Timestamp(Timestamp),
    /// Encoded collection document.
    Json(String),
    Null,
}

impl FieldValue {
    /// Encodes a collection value for a column of the given kind.
    pub fn collection<T: Serialize + ?Sized>(kind: CollectionKind, value: &T) -> Result<Self> {
        let value =
            serde_json::to_value(value).map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        Ok(Self::Json(collection::encode(kind, &value)?))
    }

    /// Returns true for NULL, empty text and the nil identifier.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Id(id) => id.is_nil(),
            Self::Text(text) => text.is_empty(),
            _ => false,
        }
    }
}

/// Renders the value the way it appears in secondary cache keys.
impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Text(text) => f.write_str(text),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Timestamp(ts) => write!(f, "{ts}"),
            Self::Json(json) => f.write_str(json),
            Self::Null => Ok(()),
        }
    }
}

impl From<Uuid> for FieldValue {
    fn from(id: Uuid) -> Self {
        Self::Id(id)
    }
}

impl From<String> for FieldValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for FieldValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<Timestamp> for FieldValue {
    fn from(ts: Timestamp) -> Self {
        Self::Timestamp(ts)
    }
}

/// One table row keyed by column name.
///
/// Getters apply the read-side defaults: a NULL identifier is the nil UUID, a
/// NULL timestamp is the sentinel, NULL text is empty and a NULL collection is
/// the empty collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: HashMap<&'static str, FieldValue>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: &'static str, value: impl Into<FieldValue>) -> Self {
        self.set(column, value);
        self
    }

    pub fn set(&mut self, column: &'static str, value: impl Into<FieldValue>) {
        self.values.insert(column, value.into());
    }

    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.values.get(column)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn id(&self, column: &str) -> Result<Uuid> {
        match self.require(column)? {
            FieldValue::Id(id) => Ok(*id),
            FieldValue::Null => Ok(Uuid::nil()),
            other => Err(mismatch(column, "identifier", other)),
        }
    }

    pub fn text(&self, column: &str) -> Result<String> {
        match self.require(column)? {
            FieldValue::Text(text) => Ok(text.clone()),
            FieldValue::Null => Ok(String::new()),
            other => Err(mismatch(column, "text", other)),
        }
    }

    pub fn integer(&self, column: &str) -> Result<i64> {
        match self.require(column)? {
            FieldValue::Integer(n) => Ok(*n),
            FieldValue::Null => Ok(0),
            other => Err(mismatch(column, "integer", other)),
        }
    }

    pub fn timestamp(&self, column: &str) -> Result<Timestamp> {
        match self.require(column)? {
            FieldValue::Timestamp(ts) => Ok(*ts),
            FieldValue::Null => Ok(Timestamp::sentinel()),
            other => Err(mismatch(column, "timestamp", other)),
        }
    }

    /// Decodes a collection column; NULL or empty text yields `T::default()`.
    pub fn collection<T: DeserializeOwned + Default>(&self, column: &str) -> Result<T> {
        let text = match self.require(column)? {
            FieldValue::Json(text) => text.trim(),
            FieldValue::Null => return Ok(T::default()),
            other => return Err(mismatch(column, "collection", other)),
        };
        if text.is_empty() || text == "null" {
            return Ok(T::default());
        }
        serde_json::from_str(text).map_err(|e| {
            RepositoryError::Serialization(format!("column '{column}': {e}"))
        })
    }

    fn require(&self, column: &str) -> Result<&FieldValue> {
        self.values
            .get(column)
            .ok_or_else(|| RepositoryError::InvalidData(format!("missing column '{column}'")))
    }
}

fn mismatch(column: &str, expected: &str, found: &FieldValue) -> RepositoryError {
    RepositoryError::InvalidData(format!(
        "column '{column}' expected {expected}, found {found:?}"
    ))
}
