use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::collection::CollectionKind;
use crate::convention::Timestamps;
use crate::storage::schema::{CUSTOMER_ID, ID, TM_CREATE, TM_DELETE, TM_UPDATE};
use crate::storage::{Column, EntitySchema, FieldValue, Result, Row};

use super::{enum_from_text, enum_to_text, read_timestamps, write_timestamps, Entity};

pub const TYPE: &str = "type";
pub const ROOM_OWNER_ID: &str = "room_owner_id";
pub const PARTICIPANT_IDS: &str = "participant_ids";
pub const NAME: &str = "name";
pub const DETAIL: &str = "detail";

static COLUMNS: [Column; 10] = [
    Column::id(ID),
    Column::id(CUSTOMER_ID),
    Column::text(TYPE),
    Column::id(ROOM_OWNER_ID),
    Column::set(PARTICIPANT_IDS),
    Column::text(NAME),
    Column::text(DETAIL),
    Column::timestamp(TM_CREATE),
    Column::timestamp(TM_UPDATE),
    Column::timestamp(TM_DELETE),
];

pub static SCHEMA: EntitySchema = EntitySchema {
    entity_type: "Chat",
    table: "chat_chats",
    cache_prefix: "chat",
    columns: &COLUMNS,
    secondary_keys: &[],
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatType {
    /// One-to-one conversation.
    #[default]
    Normal,
    Group,
}

/// A chat room and the identifiers of its participants.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: Uuid,
    pub customer_id: Uuid,
    #[serde(rename = "type")]
    pub chat_type: ChatType,
    pub room_owner_id: Uuid,
    pub participant_ids: Vec<Uuid>,
    pub name: String,
    pub detail: String,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl Chat {
    pub fn new(customer_id: Uuid, chat_type: ChatType) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer_id,
            chat_type,
            ..Self::default()
        }
    }

    /// Sets a specific ID for this chat (useful for testing).
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn with_participants(mut self, participant_ids: Vec<Uuid>) -> Self {
        self.participant_ids = participant_ids;
        self
    }

    pub fn with_room_owner(mut self, room_owner_id: Uuid) -> Self {
        self.room_owner_id = room_owner_id;
        self
    }
}

impl Entity for Chat {
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
            .with(TYPE, enum_to_text(&self.chat_type)?)
            .with(ROOM_OWNER_ID, self.room_owner_id)
            .with(
                PARTICIPANT_IDS,
                FieldValue::collection(CollectionKind::Set, &self.participant_ids)?,
            )
            .with(NAME, self.name.as_str())
            .with(DETAIL, self.detail.as_str());
        write_timestamps(&mut row, &self.timestamps);
        Ok(row)
    }

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.id(ID)?,
            customer_id: row.id(CUSTOMER_ID)?,
            chat_type: enum_from_text(row, TYPE)?,
            room_owner_id: row.id(ROOM_OWNER_ID)?,
            participant_ids: row.collection(PARTICIPANT_IDS)?,
            name: row.text(NAME)?,
            detail: row.text(DETAIL)?,
            timestamps: read_timestamps(row)?,
        })
    }
}
