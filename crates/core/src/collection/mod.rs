//! Collection columns: lists, sets and maps of identifiers persisted as a
//! single JSON text column, plus the single-element delta operations the
//! store applies in place.

mod codec;
mod error;
mod types;

pub use codec::{apply, decode, encode, map_key_path, validate};
pub use error::{CodecError, Result};
pub use types::{CollectionKind, CollectionOp};
