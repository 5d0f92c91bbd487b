//! SQL statement builders.
//!
//! Every statement is derived from an `EntitySchema`, following the
//! Functional Core pattern: pure data in, SQL text and positional parameters
//! out, no I/O. Only schema column names are interpolated; all values are
//! bound.

use rusqlite::types::Value;
use uuid::Uuid;

use coherent_core::collection::{self, CollectionKind, CollectionOp};
use coherent_core::convention::{Timestamp, SENTINEL};
use coherent_core::storage::schema::{ID, TM_CREATE, TM_DELETE, TM_UPDATE};
use coherent_core::storage::{
    ColumnType, EntitySchema, FieldValue, ListQuery, Lookup, RepositoryError, Result, Row,
};

use super::conversions::to_sql;

/// A statement ready to execute.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Query {
    fn new() -> Self {
        Self {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    /// Binds a value and returns its placeholder.
    fn bind(&mut self, value: Value) -> String {
        self.params.push(value);
        format!("?{}", self.params.len())
    }
}

fn sql_type(ty: ColumnType) -> &'static str {
    match ty {
        ColumnType::Id => "BLOB",
        ColumnType::Integer => "INTEGER",
        ColumnType::Text | ColumnType::Timestamp | ColumnType::Collection(_) => "TEXT",
    }
}

fn column_list(schema: &EntitySchema) -> String {
    schema
        .columns
        .iter()
        .map(|c| c.name)
        .collect::<Vec<_>>()
        .join(", ")
}

fn alive(query: &mut Query) -> String {
    let sentinel = query.bind(Value::Text(SENTINEL.to_string()));
    format!("{TM_DELETE} >= {sentinel}")
}

/// Creates the table and its indexes.
pub fn create_table(schema: &EntitySchema) -> String {
    let columns = schema
        .columns
        .iter()
        .map(|c| {
            if c.name == ID {
                format!("    {} {} PRIMARY KEY", c.name, sql_type(c.ty))
            } else {
                format!("    {} {}", c.name, sql_type(c.ty))
            }
        })
        .collect::<Vec<_>>()
        .join(",\n");

    let table = schema.table;
    let mut sql = format!("CREATE TABLE IF NOT EXISTS {table} (\n{columns}\n);\n");
    sql.push_str(&format!(
        "CREATE INDEX IF NOT EXISTS idx_{table}_create ON {table}({TM_CREATE}, {ID});\n"
    ));
    sql.push_str(&format!(
        "CREATE INDEX IF NOT EXISTS idx_{table}_customer_id ON {table}(customer_id, {TM_CREATE});\n"
    ));
    for key in schema.secondary_keys {
        sql.push_str(&format!(
            "CREATE INDEX IF NOT EXISTS idx_{table}_{key} ON {table}({key});\n"
        ));
    }
    sql
}

/// Inserts every column present in the row. Column order follows the schema.
pub fn insert(schema: &EntitySchema, row: &Row) -> Result<Query> {
    for (name, value) in row.iter() {
        schema.check_value(name, value)?;
    }

    let mut query = Query::new();
    let mut names = Vec::new();
    let mut placeholders = Vec::new();
    for column in schema.columns {
        if let Some(value) = row.get(column.name) {
            names.push(column.name);
            placeholders.push(query.bind(to_sql(value)));
        }
    }

    query.sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        schema.table,
        names.join(", "),
        placeholders.join(", ")
    );
    Ok(query)
}

/// Selects one row. Non-primary lookups pick the most recently created match.
pub fn select(schema: &EntitySchema, lookup: &Lookup) -> Result<Query> {
    let column = schema.check_value(lookup.column, &lookup.value)?;

    let mut query = Query::new();
    let mut conditions = vec![format!(
        "{} = {}",
        column.name,
        query.bind(to_sql(&lookup.value))
    )];
    if !lookup.include_deleted {
        conditions.push(alive(&mut query));
    }

    query.sql = format!(
        "SELECT {} FROM {} WHERE {} ORDER BY {TM_CREATE} DESC, {ID} DESC LIMIT 1",
        column_list(schema),
        schema.table,
        conditions.join(" AND ")
    );
    Ok(query)
}

/// Selects one page in `(tm_create DESC, id DESC)` order.
pub fn list(schema: &EntitySchema, list_query: &ListQuery) -> Result<Query> {
    let mut query = Query::new();
    let mut conditions = Vec::new();

    for filter in &list_query.filters {
        let column = schema.check_value(&filter.column, &filter.value)?;
        let placeholder = query.bind(to_sql(&filter.value));
        conditions.push(format!("{} = {placeholder}", column.name));
    }

    if !list_query.include_deleted {
        conditions.push(alive(&mut query));
    }

    if let Some(token) = &list_query.page_token {
        let ts = query.bind(to_sql(&FieldValue::Timestamp(token.tm_create)));
        match token.id {
            Some(id) => {
                let id = query.bind(to_sql(&FieldValue::Id(id)));
                conditions.push(format!(
                    "({TM_CREATE} < {ts} OR ({TM_CREATE} = {ts} AND {ID} < {id}))"
                ));
            }
            None => conditions.push(format!("{TM_CREATE} < {ts}")),
        }
    }

    let limit = i64::try_from(list_query.limit).unwrap_or(i64::MAX);
    let limit = query.bind(Value::Integer(limit));
    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };

    query.sql = format!(
        "SELECT {} FROM {}{where_clause} ORDER BY {TM_CREATE} DESC, {ID} DESC LIMIT {limit}",
        column_list(schema),
        schema.table,
    );
    Ok(query)
}

/// Updates the named columns of one row.
pub fn update(schema: &EntitySchema, id: Uuid, fields: &[(&str, FieldValue)]) -> Result<Query> {
    if fields.is_empty() {
        return Err(RepositoryError::InvalidData(
            "update without any field".to_string(),
        ));
    }

    let mut query = Query::new();
    let mut assignments = Vec::with_capacity(fields.len());
    for (name, value) in fields {
        let column = schema.check_value(name, value)?;
        let placeholder = query.bind(to_sql(value));
        assignments.push(format!("{} = {placeholder}", column.name));
    }
    let id = query.bind(to_sql(&FieldValue::Id(id)));

    query.sql = format!(
        "UPDATE {} SET {} WHERE {ID} = {id}",
        schema.table,
        assignments.join(", ")
    );
    Ok(query)
}

/// Applies one collection operation as a JSON1 document-mutation expression,
/// evaluated by SQLite against the current column value.
pub fn mutation(
    schema: &EntitySchema,
    id: Uuid,
    column: &str,
    op: &CollectionOp,
    tm_update: Timestamp,
) -> Result<Query> {
    let (column, kind) = schema.collection(column)?;
    collection::validate(kind, op)?;

    let c = column.name;
    let table = schema.table;
    let mut query = Query::new();

    // Stored "null" and blank text decode as the empty collection; JSON1 must
    // see them the same way.
    let doc = format!(
        "coalesce(nullif(nullif(trim({table}.{c}), ''), 'null'), '{}')",
        kind.empty_text()
    );
    let expression = match op {
        CollectionOp::Replace(value) => query.bind(Value::Text(collection::encode(kind, value)?)),
        CollectionOp::Append(value) => {
            let element = query.bind(json_text(value)?);
            let append = format!("json_insert({doc}, '$[#]', json({element}))");
            if kind == CollectionKind::Set {
                format!(
                    "CASE WHEN EXISTS (SELECT 1 FROM json_each({doc}) \
                     WHERE value = json_extract({element}, '$')) THEN {doc} ELSE {append} END"
                )
            } else {
                append
            }
        }
        CollectionOp::Remove(value) => {
            let element = query.bind(json_text(value)?);
            let first_match = format!(
                "(SELECT '$[' || key || ']' FROM json_each({doc}) \
                 WHERE value = json_extract({element}, '$') ORDER BY key LIMIT 1)"
            );
            format!(
                "CASE WHEN {first_match} IS NULL THEN {doc} \
                 ELSE json_remove({doc}, {first_match}) END"
            )
        }
        CollectionOp::SetKey(key, value) => {
            let path = query.bind(Value::Text(collection::map_key_path(key)?));
            let element = query.bind(json_text(value)?);
            format!("json_set({doc}, {path}, json({element}))")
        }
        CollectionOp::RemoveKey(key) => {
            let path = query.bind(Value::Text(collection::map_key_path(key)?));
            format!("json_remove({doc}, {path})")
        }
    };

    let tm_update = query.bind(to_sql(&FieldValue::Timestamp(tm_update)));
    let id = query.bind(to_sql(&FieldValue::Id(id)));
    query.sql = format!(
        "UPDATE {table} SET {c} = {expression}, {TM_UPDATE} = {tm_update} WHERE {ID} = {id}"
    );
    Ok(query)
}

fn json_text(value: &serde_json::Value) -> Result<Value> {
    serde_json::to_string(value)
        .map(Value::Text)
        .map_err(|e| RepositoryError::Serialization(e.to_string()))
}
