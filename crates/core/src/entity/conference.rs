use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::collection::CollectionKind;
use crate::convention::{Timestamp, Timestamps};
use crate::storage::schema::{CUSTOMER_ID, ID, TM_CREATE, TM_DELETE, TM_UPDATE};
use crate::storage::{Column, EntitySchema, FieldValue, Result, Row};

use super::{enum_from_text, enum_to_text, read_timestamps, write_timestamps, Entity};

pub const CONFBRIDGE_ID: &str = "confbridge_id";
pub const TYPE: &str = "type";
pub const STATUS: &str = "status";
pub const NAME: &str = "name";
pub const DETAIL: &str = "detail";
pub const DATA: &str = "data";
pub const TIMEOUT: &str = "timeout";
pub const CONFERENCECALL_IDS: &str = "conferencecall_ids";
pub const RECORDING_ID: &str = "recording_id";
pub const RECORDING_IDS: &str = "recording_ids";
pub const TRANSCRIBE_ID: &str = "transcribe_id";
pub const TRANSCRIBE_IDS: &str = "transcribe_ids";
pub const TM_END: &str = "tm_end";

static COLUMNS: [Column; 18] = [
    Column::id(ID),
    Column::id(CUSTOMER_ID),
    Column::id(CONFBRIDGE_ID),
    Column::text(TYPE),
    Column::text(STATUS),
    Column::text(NAME),
    Column::text(DETAIL),
    Column::map(DATA),
    Column::integer(TIMEOUT),
    Column::list(CONFERENCECALL_IDS),
    Column::id(RECORDING_ID),
    Column::list(RECORDING_IDS),
    Column::id(TRANSCRIBE_ID),
    Column::list(TRANSCRIBE_IDS),
    Column::timestamp(TM_END),
    Column::timestamp(TM_CREATE),
    Column::timestamp(TM_UPDATE),
    Column::timestamp(TM_DELETE),
];

pub static SCHEMA: EntitySchema = EntitySchema {
    entity_type: "Conference",
    table: "conference_conferences",
    cache_prefix: "conference",
    columns: &COLUMNS,
    secondary_keys: &[CONFBRIDGE_ID],
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConferenceType {
    #[default]
    Conference,
    /// Two-party bridge created to connect calls.
    Connect,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConferenceStatus {
    #[default]
    Starting,
    Progressing,
    Terminating,
    Terminated,
}

/// A conference and the calls, recordings and transcriptions attached to it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conference {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub confbridge_id: Uuid,
    #[serde(rename = "type")]
    pub conference_type: ConferenceType,
    pub status: ConferenceStatus,
    pub name: String,
    pub detail: String,
    pub data: BTreeMap<String, Value>,
    /// Seconds before the conference is torn down; 0 disables the timeout.
    pub timeout: i64,
    /// Calls currently joined. A call may rejoin, so duplicates are kept.
    pub conferencecall_ids: Vec<Uuid>,
    pub recording_id: Uuid,
    pub recording_ids: Vec<Uuid>,
    pub transcribe_id: Uuid,
    pub transcribe_ids: Vec<Uuid>,
    pub tm_end: Timestamp,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl Conference {
    pub fn new(customer_id: Uuid, conference_type: ConferenceType) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer_id,
            conference_type,
            ..Self::default()
        }
    }

    /// Sets a specific ID for this conference (useful for testing).
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn with_confbridge(mut self, confbridge_id: Uuid) -> Self {
        self.confbridge_id = confbridge_id;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>, detail: impl Into<String>) -> Self {
        self.name = name.into();
        self.detail = detail.into();
        self
    }
}

/// Fields written when a conference ends.
pub fn end_fields(now: Timestamp) -> Result<Vec<(&'static str, FieldValue)>> {
    Ok(vec![
        (STATUS, enum_to_text(&ConferenceStatus::Terminated)?),
        (TM_END, FieldValue::Timestamp(now)),
    ])
}

impl Entity for Conference {
    const SCHEMA: &'static EntitySchema = &SCHEMA;

    fn id(&self) -> Uuid {
        self.id
    }

    fn timestamps(&self) -> &Timestamps {
        &self.timestamps
    }

    fn timestamps_mut(&mut self) -> &mut Timestamps {
        &mut self.timestamps
    }

    fn to_row(&self) -> Result<Row> {
        let mut row = Row::new()
            .with(ID, self.id)
            .with(CUSTOMER_ID, self.customer_id)
            .with(CONFBRIDGE_ID, self.confbridge_id)
            .with(TYPE, enum_to_text(&self.conference_type)?)
            .with(STATUS, enum_to_text(&self.status)?)
            .with(NAME, self.name.as_str())
            .with(DETAIL, self.detail.as_str())
            .with(DATA, FieldValue::collection(CollectionKind::Map, &self.data)?)
            .with(TIMEOUT, self.timeout)
            .with(
                CONFERENCECALL_IDS,
                FieldValue::collection(CollectionKind::List, &self.conferencecall_ids)?,
            )
            .with(RECORDING_ID, self.recording_id)
            .with(
                RECORDING_IDS,
                FieldValue::collection(CollectionKind::List, &self.recording_ids)?,
            )
            .with(TRANSCRIBE_ID, self.transcribe_id)
            .with(
                TRANSCRIBE_IDS,
                FieldValue::collection(CollectionKind::List, &self.transcribe_ids)?,
            )
            .with(TM_END, self.tm_end);
        write_timestamps(&mut row, &self.timestamps);
        Ok(row)
    }

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.id(ID)?,
            customer_id: row.id(CUSTOMER_ID)?,
            confbridge_id: row.id(CONFBRIDGE_ID)?,
            conference_type: enum_from_text(row, TYPE)?,
            status: enum_from_text(row, STATUS)?,
            name: row.text(NAME)?,
            detail: row.text(DETAIL)?,
            data: row.collection(DATA)?,
            timeout: row.integer(TIMEOUT)?,
            conferencecall_ids: row.collection(CONFERENCECALL_IDS)?,
            recording_id: row.id(RECORDING_ID)?,
            recording_ids: row.collection(RECORDING_IDS)?,
            transcribe_id: row.id(TRANSCRIBE_ID)?,
            transcribe_ids: row.collection(TRANSCRIBE_IDS)?,
            tm_end: row.timestamp(TM_END)?,
            timestamps: read_timestamps(row)?,
        })
    }
}
