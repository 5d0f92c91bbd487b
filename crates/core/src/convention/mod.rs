//! Identifier and timestamp conventions shared by every entity kind.

mod clock;
mod identifier;
mod timestamp;

pub use clock::{Clock, ManualClock, SystemClock};
pub use identifier::{uuid_from_bytes, uuid_to_bytes, IdentifierError};
pub use timestamp::{Timestamp, TimestampError, Timestamps, SENTINEL, TIMESTAMP_FORMAT};
