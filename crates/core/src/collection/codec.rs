//! Pure functions for moving collection values between their JSON column text
//! and `serde_json::Value`.
//!
//! `apply` mirrors, in memory, the document-mutation expressions the SQLite
//! store evaluates. Stores that cannot mutate JSON server-side use it to keep
//! identical semantics.

use serde_json::Value;

use super::{CodecError, CollectionKind, CollectionOp, Result};

/// Encodes a whole collection for storage.
///
/// `null` encodes to the empty collection. Sets are de-duplicated keeping the
/// first occurrence of each element.
pub fn encode(kind: CollectionKind, value: &Value) -> Result<String> {
    let normalized = normalize(kind, value.clone())?;
    serde_json::to_string(&normalized).map_err(|e| CodecError::Encode(e.to_string()))
}

/// Decodes stored column text. Absent, empty and `null` text decode to the
/// empty collection.
pub fn decode(kind: CollectionKind, text: Option<&str>) -> Result<Value> {
    let text = match text.map(str::trim) {
        None | Some("") | Some("null") => return Ok(kind.empty()),
        Some(text) => text,
    };

    let value: Value = serde_json::from_str(text).map_err(|e| CodecError::Decode(e.to_string()))?;
    match (kind, &value) {
        (CollectionKind::List | CollectionKind::Set, Value::Array(_))
        | (CollectionKind::Map, Value::Object(_)) => Ok(value),
        _ => Err(CodecError::Decode(format!("expected a {kind}, found {value}"))),
    }
}

/// Checks that an operation is meaningful for the collection kind.
pub fn validate(kind: CollectionKind, op: &CollectionOp) -> Result<()> {
    let supported = match op {
        CollectionOp::Replace(value) => return normalize(kind, value.clone()).map(|_| ()),
        CollectionOp::Append(_) | CollectionOp::Remove(_) => {
            matches!(kind, CollectionKind::List | CollectionKind::Set)
        }
        CollectionOp::SetKey(key, _) | CollectionOp::RemoveKey(key) => {
            map_key_path(key)?;
            kind == CollectionKind::Map
        }
    };

    if supported {
        Ok(())
    } else {
        Err(CodecError::UnsupportedOperation { kind, op: op.name() })
    }
}

/// Applies one operation to the stored text and returns the new text.
pub fn apply(kind: CollectionKind, current: Option<&str>, op: &CollectionOp) -> Result<String> {
    validate(kind, op)?;
    if let CollectionOp::Replace(replacement) = op {
        return encode(kind, replacement);
    }

    let mut value = decode(kind, current)?;
    match op {
        CollectionOp::Replace(_) => {}
        CollectionOp::Append(element) => {
            if let Value::Array(items) = &mut value {
                if kind == CollectionKind::List || !items.contains(element) {
                    items.push(element.clone());
                }
            }
        }
        CollectionOp::Remove(element) => {
            if let Value::Array(items) = &mut value {
                if let Some(pos) = items.iter().position(|item| item == element) {
                    items.remove(pos);
                }
            }
        }
        CollectionOp::SetKey(key, element) => {
            if let Value::Object(map) = &mut value {
                map.insert(key.clone(), element.clone());
            }
        }
        CollectionOp::RemoveKey(key) => {
            if let Value::Object(map) = &mut value {
                map.remove(key);
            }
        }
    }

    serde_json::to_string(&value).map_err(|e| CodecError::Encode(e.to_string()))
}

/// Builds the JSON path addressing one map key, e.g. `$."channel-1"`.
///
/// Keys containing a double quote or a backslash cannot be expressed in a
/// quoted path label and are rejected.
pub fn map_key_path(key: &str) -> Result<String> {
    if key.is_empty() || key.contains(['"', '\\']) {
        return Err(CodecError::InvalidKey(key.to_string()));
    }
    Ok(format!("$.\"{key}\""))
}

fn normalize(kind: CollectionKind, value: Value) -> Result<Value> {
    match (kind, value) {
        (_, Value::Null) => Ok(kind.empty()),
        (CollectionKind::List, value @ Value::Array(_)) => Ok(value),
        (CollectionKind::Set, Value::Array(items)) => {
            let mut unique: Vec<Value> = Vec::with_capacity(items.len());
            for item in items {
                if !unique.contains(&item) {
                    unique.push(item);
                }
            }
            Ok(Value::Array(unique))
        }
        (CollectionKind::Map, value @ Value::Object(_)) => Ok(value),
        (kind, value) => Err(CodecError::Encode(format!(
            "expected a {kind}, found {value}"
        ))),
    }
}
