mod error;
mod keys;
mod serialization;
mod traits;

pub use error::{CacheError, Result};
pub use keys::{entity_key, secondary_key};
pub use serialization::{deserialize_entity, serialize_entity, SerializationError};
pub use traits::Cache;
