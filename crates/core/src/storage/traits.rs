use async_trait::async_trait;
use uuid::Uuid;

use crate::collection::CollectionOp;
use crate::convention::Timestamp;

use super::{EntitySchema, FieldValue, ListQuery, Lookup, Result, Row};

/// Source-of-truth storage for every entity kind.
///
/// Implementations work on schema-described rows so one store serves all
/// kinds. Caller-supplied column names are resolved against the schema before
/// they reach a query.
#[async_trait]
pub trait Store: Send + Sync {
    /// Creates the table and indexes for a kind if they do not exist.
    async fn ensure_table(&self, schema: &'static EntitySchema) -> Result<()>;

    /// Inserts a full row. A duplicate id yields `AlreadyExists`.
    async fn insert(&self, schema: &'static EntitySchema, row: Row) -> Result<()>;

    /// Fetches one row, or `NotFound`.
    async fn get(&self, schema: &'static EntitySchema, lookup: Lookup) -> Result<Row>;

    /// Fetches one page of rows ordered by `(tm_create DESC, id DESC)`.
    async fn list(&self, schema: &'static EntitySchema, query: &ListQuery) -> Result<Vec<Row>>;

    /// Writes only the named columns. `NotFound` if no row has the id.
    async fn update_fields(
        &self,
        schema: &'static EntitySchema,
        id: Uuid,
        fields: Vec<(&'static str, FieldValue)>,
    ) -> Result<()>;

    /// Applies one collection operation in place and stamps `tm_update`.
    /// `NotFound` if no row has the id.
    async fn mutate_collection(
        &self,
        schema: &'static EntitySchema,
        id: Uuid,
        column: &'static str,
        op: CollectionOp,
        tm_update: Timestamp,
    ) -> Result<()>;
}
