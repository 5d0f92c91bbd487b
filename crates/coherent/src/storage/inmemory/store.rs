//! In-memory store implementation.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use coherent_core::collection::{self, CollectionOp};
use coherent_core::convention::Timestamp;
use coherent_core::storage::schema::{ID, TM_CREATE, TM_DELETE, TM_UPDATE};
use coherent_core::storage::{
    EntitySchema, FieldValue, ListQuery, Lookup, PageToken, RepositoryError, Result, Row, Store,
};

type Table = HashMap<Uuid, Row>;

/// In-memory storage backend for testing.
///
/// One `HashMap` per table, wrapped in `Arc<RwLock<_>>`. Matching, ordering
/// and collection mutations behave like the SQLite backend.
/// Data is not persisted and will be lost when the store is dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<HashMap<&'static str, Table>>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn no_table(schema: &EntitySchema) -> RepositoryError {
    RepositoryError::QueryFailed(format!("no such table: {}", schema.table))
}

fn not_found(schema: &EntitySchema, id: impl ToString) -> RepositoryError {
    RepositoryError::NotFound {
        entity_type: schema.entity_type,
        id: id.to_string(),
    }
}

/// Alive means `tm_delete` holds the sentinel. NULL is not alive, like SQL.
fn is_alive(row: &Row) -> bool {
    matches!(row.get(TM_DELETE), Some(FieldValue::Timestamp(ts)) if ts.is_sentinel())
}

/// SQL equality: NULL matches nothing.
fn column_equals(row: &Row, column: &str, value: &FieldValue) -> bool {
    match (row.get(column), value) {
        (_, FieldValue::Null) | (None, _) | (Some(FieldValue::Null), _) => false,
        (Some(stored), value) => stored == value,
    }
}

fn tm_create(row: &Row) -> Option<Timestamp> {
    match row.get(TM_CREATE) {
        Some(FieldValue::Timestamp(ts)) => Some(*ts),
        _ => None,
    }
}

fn id_of(row: &Row) -> Option<Uuid> {
    match row.get(ID) {
        Some(FieldValue::Id(id)) => Some(*id),
        _ => None,
    }
}

/// `(tm_create DESC, id DESC)`, NULLs last.
fn newest_first(a: &Row, b: &Row) -> Ordering {
    tm_create(b)
        .cmp(&tm_create(a))
        .then_with(|| id_of(b).cmp(&id_of(a)))
}

fn after_token(row: &Row, token: &PageToken) -> bool {
    let Some(ts) = tm_create(row) else {
        return false;
    };
    match (ts.cmp(&token.tm_create), token.id) {
        (Ordering::Less, _) => true,
        (Ordering::Equal, Some(id)) => id_of(row).is_some_and(|row_id| row_id < id),
        _ => false,
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn ensure_table(&self, schema: &'static EntitySchema) -> Result<()> {
        schema.check_conventions()?;
        let mut tables = self.tables.write().await;
        tables.entry(schema.table).or_default();
        Ok(())
    }

    async fn insert(&self, schema: &'static EntitySchema, row: Row) -> Result<()> {
        for (name, value) in row.iter() {
            schema.check_value(name, value)?;
        }
        let id = row.id(ID)?;

        let mut stored = Row::new();
        for column in schema.columns {
            let value = row.get(column.name).cloned().unwrap_or(FieldValue::Null);
            stored.set(column.name, value);
        }

        let mut tables = self.tables.write().await;
        let table = tables.get_mut(schema.table).ok_or_else(|| no_table(schema))?;
        if table.contains_key(&id) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: schema.entity_type,
                id: id.to_string(),
            });
        }
        table.insert(id, stored);
        Ok(())
    }

    async fn get(&self, schema: &'static EntitySchema, lookup: Lookup) -> Result<Row> {
        schema.check_value(lookup.column, &lookup.value)?;

        let tables = self.tables.read().await;
        let table = tables.get(schema.table).ok_or_else(|| no_table(schema))?;
        table
            .values()
            .filter(|row| column_equals(row, lookup.column, &lookup.value))
            .filter(|row| lookup.include_deleted || is_alive(row))
            .min_by(|a, b| newest_first(a, b))
            .cloned()
            .ok_or_else(|| not_found(schema, &lookup.value))
    }

    async fn list(&self, schema: &'static EntitySchema, query: &ListQuery) -> Result<Vec<Row>> {
        for filter in &query.filters {
            schema.check_value(&filter.column, &filter.value)?;
        }

        let tables = self.tables.read().await;
        let table = tables.get(schema.table).ok_or_else(|| no_table(schema))?;
        let mut rows: Vec<Row> = table
            .values()
            .filter(|row| {
                query
                    .filters
                    .iter()
                    .all(|f| column_equals(row, &f.column, &f.value))
            })
            .filter(|row| query.include_deleted || is_alive(row))
            .filter(|row| query.page_token.as_ref().is_none_or(|t| after_token(row, t)))
            .cloned()
            .collect();

        rows.sort_by(newest_first);
        rows.truncate(query.limit);
        Ok(rows)
    }

    async fn update_fields(
        &self,
        schema: &'static EntitySchema,
        id: Uuid,
        fields: Vec<(&'static str, FieldValue)>,
    ) -> Result<()> {
        if fields.is_empty() {
            return Err(RepositoryError::InvalidData(
                "update without any field".to_string(),
            ));
        }
        for (name, value) in &fields {
            schema.check_value(name, value)?;
        }

        let mut tables = self.tables.write().await;
        let table = tables.get_mut(schema.table).ok_or_else(|| no_table(schema))?;
        let row = table.get_mut(&id).ok_or_else(|| not_found(schema, id))?;
        for (name, value) in fields {
            row.set(name, value);
        }
        Ok(())
    }

    async fn mutate_collection(
        &self,
        schema: &'static EntitySchema,
        id: Uuid,
        column: &'static str,
        op: CollectionOp,
        tm_update: Timestamp,
    ) -> Result<()> {
        let (column, kind) = schema.collection(column)?;
        collection::validate(kind, &op)?;

        let mut tables = self.tables.write().await;
        let table = tables.get_mut(schema.table).ok_or_else(|| no_table(schema))?;
        let row = table.get_mut(&id).ok_or_else(|| not_found(schema, id))?;

        let current = match row.get(column.name) {
            Some(FieldValue::Json(text)) => Some(text.as_str()),
            _ => None,
        };
        let updated = collection::apply(kind, current, &op)?;
        row.set(column.name, FieldValue::Json(updated));
        row.set(TM_UPDATE, tm_update);
        Ok(())
    }
}
