//! SQLite store implementation.
//!
//! One connection serves every entity kind; statements are built from the
//! kind's schema by [`super::schema`].

use async_trait::async_trait;
use rusqlite::params_from_iter;
use tokio_rusqlite::Connection;
use uuid::Uuid;

use coherent_core::collection::CollectionOp;
use coherent_core::convention::Timestamp;
use coherent_core::storage::schema::ID;
use coherent_core::storage::{
    EntitySchema, FieldValue, ListQuery, Lookup, RepositoryError, Result, Row, Store,
};

use super::conversions::read_row;
use super::error::map_tokio_rusqlite_error;
use super::schema::{self, Query};

/// Helper to wrap rusqlite errors for tokio_rusqlite closures.
fn wrap_err(e: rusqlite::Error) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Rusqlite(e)
}

/// SQLite-backed store for all entity kinds.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) a database file.
    pub async fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Opens a private in-memory database. Data is lost when the store is dropped.
    pub async fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Runs a statement and returns the number of affected rows.
    async fn execute(&self, schema: &'static EntitySchema, query: Query, id: String) -> Result<usize> {
        self.conn
            .call(move |conn| {
                conn.execute(&query.sql, params_from_iter(query.params.iter()))
                    .map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, schema.entity_type, id))
    }

    /// Runs a targeted update, turning zero affected rows into `NotFound`.
    async fn execute_targeted(
        &self,
        schema: &'static EntitySchema,
        query: Query,
        id: Uuid,
    ) -> Result<()> {
        let affected = self.execute(schema, query, id.to_string()).await?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity_type: schema.entity_type,
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn ensure_table(&self, schema: &'static EntitySchema) -> Result<()> {
        schema.check_conventions()?;
        let sql = schema::create_table(schema);

        self.conn
            .call(move |conn| conn.execute_batch(&sql).map_err(wrap_err))
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, schema.entity_type, ""))
    }

    async fn insert(&self, schema: &'static EntitySchema, row: Row) -> Result<()> {
        let id = row.id(ID)?;
        let query = schema::insert(schema, &row)?;

        self.execute(schema, query, id.to_string()).await?;
        tracing::trace!(entity_type = schema.entity_type, %id, "Inserted row");
        Ok(())
    }

    async fn get(&self, schema: &'static EntitySchema, lookup: Lookup) -> Result<Row> {
        let query = schema::select(schema, &lookup)?;
        let key = lookup.value.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&query.sql).map_err(wrap_err)?;
                stmt.query_row(params_from_iter(query.params.iter()), |r| {
                    read_row(schema, r)
                })
                .map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, schema.entity_type, key))
    }

    async fn list(&self, schema: &'static EntitySchema, list_query: &ListQuery) -> Result<Vec<Row>> {
        let query = schema::list(schema, list_query)?;

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&query.sql).map_err(wrap_err)?;
                let rows = stmt
                    .query_map(params_from_iter(query.params.iter()), |r| {
                        read_row(schema, r)
                    })
                    .map_err(wrap_err)?;

                let mut result = Vec::new();
                for row in rows {
                    result.push(row.map_err(wrap_err)?);
                }
                Ok(result)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, schema.entity_type, ""))
    }

    async fn update_fields(
        &self,
        schema: &'static EntitySchema,
        id: Uuid,
        fields: Vec<(&'static str, FieldValue)>,
    ) -> Result<()> {
        let query = schema::update(schema, id, &fields)?;
        self.execute_targeted(schema, query, id).await
    }

    async fn mutate_collection(
        &self,
        schema: &'static EntitySchema,
        id: Uuid,
        column: &'static str,
        op: CollectionOp,
        tm_update: Timestamp,
    ) -> Result<()> {
        let query = schema::mutation(schema, id, column, &op, tm_update)?;
        self.execute_targeted(schema, query, id).await
    }
}
