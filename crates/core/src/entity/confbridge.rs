use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::collection::CollectionKind;
use crate::convention::Timestamps;
use crate::storage::schema::{CUSTOMER_ID, ID, TM_CREATE, TM_DELETE, TM_UPDATE};
use crate::storage::{Column, EntitySchema, FieldValue, Result, Row};

use super::{enum_from_text, enum_to_text, read_timestamps, write_timestamps, Entity};

pub const BRIDGE_ID: &str = "bridge_id";
pub const STATUS: &str = "status";
pub const FLAGS: &str = "flags";
pub const CHANNEL_CALL_IDS: &str = "channel_call_ids";
pub const RECORDING_ID: &str = "recording_id";
pub const RECORDING_IDS: &str = "recording_ids";
pub const EXTERNAL_MEDIA_ID: &str = "external_media_id";

static COLUMNS: [Column; 12] = [
    Column::id(ID),
    Column::id(CUSTOMER_ID),
    Column::text(BRIDGE_ID),
    Column::text(STATUS),
    Column::set(FLAGS),
    Column::map(CHANNEL_CALL_IDS),
    Column::id(RECORDING_ID),
    Column::list(RECORDING_IDS),
    Column::id(EXTERNAL_MEDIA_ID),
    Column::timestamp(TM_CREATE),
    Column::timestamp(TM_UPDATE),
    Column::timestamp(TM_DELETE),
];

pub static SCHEMA: EntitySchema = EntitySchema {
    entity_type: "Confbridge",
    table: "call_confbridges",
    cache_prefix: "confbridge",
    columns: &COLUMNS,
    secondary_keys: &[BRIDGE_ID],
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfbridgeStatus {
    #[default]
    Progressing,
    Terminating,
    Terminated,
}

/// The media bridge behind a conference, tracking which call sits on which channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Confbridge {
    pub id: Uuid,
    pub customer_id: Uuid,
    /// Identifier of the bridge on the media server.
    pub bridge_id: String,
    pub status: ConfbridgeStatus,
    pub flags: Vec<String>,
    /// Channel id to call id.
    pub channel_call_ids: BTreeMap<String, Uuid>,
    pub recording_id: Uuid,
    pub recording_ids: Vec<Uuid>,
    pub external_media_id: Uuid,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl Confbridge {
    pub fn new(customer_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer_id,
            ..Self::default()
        }
    }

    /// Sets a specific ID for this confbridge (useful for testing).
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn with_bridge_id(mut self, bridge_id: impl Into<String>) -> Self {
        self.bridge_id = bridge_id.into();
        self
    }

    pub fn with_flags(mut self, flags: Vec<String>) -> Self {
        self.flags = flags;
        self
    }
}

impl Entity for Confbridge {
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
            .with(BRIDGE_ID, self.bridge_id.as_str())
            .with(STATUS, enum_to_text(&self.status)?)
            .with(FLAGS, FieldValue::collection(CollectionKind::Set, &self.flags)?)
            .with(
                CHANNEL_CALL_IDS,
                FieldValue::collection(CollectionKind::Map, &self.channel_call_ids)?,
            )
            .with(RECORDING_ID, self.recording_id)
            .with(
                RECORDING_IDS,
                FieldValue::collection(CollectionKind::List, &self.recording_ids)?,
            )
            .with(EXTERNAL_MEDIA_ID, self.external_media_id);
        write_timestamps(&mut row, &self.timestamps);
        Ok(row)
    }

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.id(ID)?,
            customer_id: row.id(CUSTOMER_ID)?,
            bridge_id: row.text(BRIDGE_ID)?,
            status: enum_from_text(row, STATUS)?,
            flags: row.collection(FLAGS)?,
            channel_call_ids: row.collection(CHANNEL_CALL_IDS)?,
            recording_id: row.id(RECORDING_ID)?,
            recording_ids: row.collection(RECORDING_IDS)?,
            external_media_id: row.id(EXTERNAL_MEDIA_ID)?,
            timestamps: read_timestamps(row)?,
        })
    }
}
