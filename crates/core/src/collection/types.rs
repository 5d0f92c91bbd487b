use std::fmt;

use serde::Serialize;
use serde_json::Value;

use super::{CodecError, Result};

/// Shape of a collection column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    /// Ordered, duplicates allowed.
    List,
    /// Ordered by first insertion, no duplicates.
    Set,
    /// String-keyed object.
    Map,
}

impl CollectionKind {
    /// The JSON document an absent column decodes to.
    pub fn empty(&self) -> Value {
        match self {
            Self::List | Self::Set => Value::Array(Vec::new()),
            Self::Map => Value::Object(serde_json::Map::new()),
        }
    }

    /// The empty document as stored text.
    pub fn empty_text(&self) -> &'static str {
        match self {
            Self::List | Self::Set => "[]",
            Self::Map => "{}",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::List => "list",
            Self::Set => "set",
            Self::Map => "map",
        };
        f.write_str(name)
    }
}

/// A single mutation of a collection column.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionOp {
    /// Overwrite the whole collection.
    Replace(Value),
    /// Append one element (lists and sets).
    Append(Value),
    /// Remove the first element equal to the value (lists and sets).
    Remove(Value),
    /// Insert or overwrite one key (maps).
    SetKey(String, Value),
    /// Remove one key (maps).
    RemoveKey(String),
}

impl CollectionOp {
    pub fn replace<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        to_value(value).map(Self::Replace)
    }

    pub fn append<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        to_value(value).map(Self::Append)
    }

    pub fn remove<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        to_value(value).map(Self::Remove)
    }

    pub fn set_key<T: Serialize + ?Sized>(key: impl Into<String>, value: &T) -> Result<Self> {
        to_value(value).map(|v| Self::SetKey(key.into(), v))
    }

    pub fn remove_key(key: impl Into<String>) -> Self {
        Self::RemoveKey(key.into())
    }

    /// Short name used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Replace(_) => "replace",
            Self::Append(_) => "append",
            Self::Remove(_) => "remove",
            Self::SetKey(..) => "set_key",
            Self::RemoveKey(_) => "remove_key",
        }
    }
}

fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| CodecError::Encode(e.to_string()))
}
