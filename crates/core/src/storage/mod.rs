mod error;
mod query;
pub mod schema;
mod traits;
mod types;

pub use error::{ErrorClass, RepositoryError, Result};
pub use query::{Filter, ListQuery, Lookup, Page, PageToken};
pub use schema::{Column, ColumnType, EntitySchema};
pub use traits::Store;
pub use types::{FieldValue, Row};
