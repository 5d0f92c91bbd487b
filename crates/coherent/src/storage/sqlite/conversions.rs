//! SQLite value conversion functions.
//!
//! Pure functions between `FieldValue`/`Row` and SQLite values, testable
//! without a database.

use rusqlite::types::{Type, Value};

use coherent_core::convention::{uuid_from_bytes, uuid_to_bytes, Timestamp};
use coherent_core::storage::{ColumnType, EntitySchema, FieldValue, Row};

/// Converts a field value to the SQLite value it is stored as.
pub fn to_sql(value: &FieldValue) -> Value {
    match value {
        FieldValue::Id(id) => Value::Blob(uuid_to_bytes(*id)),
        FieldValue::Text(text) => Value::Text(text.clone()),
        FieldValue::Integer(n) => Value::Integer(*n),
        FieldValue::Timestamp(ts) => Value::Text(ts.to_string()),
        FieldValue::Json(json) => Value::Text(json.clone()),
        FieldValue::Null => Value::Null,
    }
}

/// Reads a row selected with the schema's full column list, in schema order.
pub fn read_row(schema: &EntitySchema, sql_row: &rusqlite::Row) -> rusqlite::Result<Row> {
    let mut row = Row::new();
    for (idx, column) in schema.columns.iter().enumerate() {
        let value = match column.ty {
            ColumnType::Id => match sql_row.get::<_, Option<Vec<u8>>>(idx)? {
                Some(bytes) => FieldValue::Id(uuid_from_bytes(&bytes).map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(idx, Type::Blob, Box::new(e))
                })?),
                None => FieldValue::Null,
            },
            ColumnType::Text => sql_row
                .get::<_, Option<String>>(idx)?
                .map_or(FieldValue::Null, FieldValue::Text),
            ColumnType::Integer => sql_row
                .get::<_, Option<i64>>(idx)?
                .map_or(FieldValue::Null, FieldValue::Integer),
            ColumnType::Timestamp => match sql_row.get::<_, Option<String>>(idx)? {
                Some(text) => FieldValue::Timestamp(parse_timestamp(idx, &text)?),
                None => FieldValue::Null,
            },
            ColumnType::Collection(_) => sql_row
                .get::<_, Option<String>>(idx)?
                .map_or(FieldValue::Null, FieldValue::Json),
        };
        row.set(column.name, value);
    }
    Ok(row)
}

fn parse_timestamp(idx: usize, text: &str) -> rusqlite::Result<Timestamp> {
    text.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
