use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::collection::CollectionKind;
use crate::convention::Timestamps;
use crate::storage::schema::{CUSTOMER_ID, ID, TM_CREATE, TM_DELETE, TM_UPDATE};
use crate::storage::{Column, EntitySchema, FieldValue, Result, Row};

use super::{read_timestamps, write_timestamps, Entity};

pub const NAME: &str = "name";
pub const DETAIL: &str = "detail";
pub const DOMAIN_NAME: &str = "domain_name";
pub const AUTH_TYPES: &str = "auth_types";
pub const USERNAME: &str = "username";
pub const PASSWORD: &str = "password";
pub const ALLOWED_IPS: &str = "allowed_ips";

static COLUMNS: [Column; 12] = [
    Column::id(ID),
    Column::id(CUSTOMER_ID),
    Column::text(NAME),
    Column::text(DETAIL),
    Column::text(DOMAIN_NAME),
    Column::set(AUTH_TYPES),
    Column::text(USERNAME),
    Column::text(PASSWORD),
    Column::set(ALLOWED_IPS),
    Column::timestamp(TM_CREATE),
    Column::timestamp(TM_UPDATE),
    Column::timestamp(TM_DELETE),
];

pub static SCHEMA: EntitySchema = EntitySchema {
    entity_type: "Trunk",
    table: "registrar_trunks",
    cache_prefix: "trunk",
    columns: &COLUMNS,
    secondary_keys: &[DOMAIN_NAME],
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    Basic,
    Ip,
}

/// A SIP trunk reachable under its own domain name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trunk {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub name: String,
    pub detail: String,
    pub domain_name: String,
    pub auth_types: Vec<AuthType>,
    pub username: String,
    pub password: String,
    pub allowed_ips: Vec<String>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl Trunk {
    pub fn new(customer_id: Uuid, domain_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer_id,
            domain_name: domain_name.into(),
            ..Self::default()
        }
    }

    /// Sets a specific ID for this trunk (useful for testing).
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn with_auth(mut self, auth_types: Vec<AuthType>, username: &str, password: &str) -> Self {
        self.auth_types = auth_types;
        self.username = username.to_string();
        self.password = password.to_string();
        self
    }

    pub fn with_allowed_ips(mut self, allowed_ips: Vec<String>) -> Self {
        self.allowed_ips = allowed_ips;
        self
    }
}

impl Entity for Trunk {
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
            .with(NAME, self.name.as_str())
            .with(DETAIL, self.detail.as_str())
            .with(DOMAIN_NAME, self.domain_name.as_str())
            .with(
                AUTH_TYPES,
                FieldValue::collection(CollectionKind::Set, &self.auth_types)?,
            )
            .with(USERNAME, self.username.as_str())
            .with(PASSWORD, self.password.as_str())
            .with(
                ALLOWED_IPS,
                FieldValue::collection(CollectionKind::Set, &self.allowed_ips)?,
            );
        write_timestamps(&mut row, &self.timestamps);
        Ok(row)
    }

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.id(ID)?,
            customer_id: row.id(CUSTOMER_ID)?,
            name: row.text(NAME)?,
            detail: row.text(DETAIL)?,
            domain_name: row.text(DOMAIN_NAME)?,
            auth_types: row.collection(AUTH_TYPES)?,
            username: row.text(USERNAME)?,
            password: row.text(PASSWORD)?,
            allowed_ips: row.collection(ALLOWED_IPS)?,
            timestamps: read_timestamps(row)?,
        })
    }
}
