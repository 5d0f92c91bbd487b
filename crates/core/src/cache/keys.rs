use uuid::Uuid;

use crate::storage::{EntitySchema, FieldValue};

/// Returns the cache key holding an entity by id, e.g. `"conference:{id}"`.
pub fn entity_key(schema: &EntitySchema, id: Uuid) -> String {
    format!("{}:{}", schema.cache_prefix, id)
}

/// Returns the cache key holding an entity by a secondary column, e.g.
/// `"confbridge:bridge_id:{value}"`.
pub fn secondary_key(schema: &EntitySchema, column: &str, value: &FieldValue) -> String {
    format!("{}:{}:{}", schema.cache_prefix, column, value)
}
