//! Snapshot data model.
//!
//! A [`StateFile`] bundles an opaque [`State`] payload with the versioning
//! envelope that identifies it: a lineage naming one continuous history and
//! a serial ordering snapshots within that history.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Opaque snapshot payload.
///
/// The content is held decoded so that comparisons are structural rather
/// than byte-for-byte.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State(Value);

impl State {
    /// Wrap a decoded payload.
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// The empty payload.
    pub fn empty() -> Self {
        Self(Value::Null)
    }

    /// Returns true for a `null` payload or an empty object.
    pub fn is_empty(&self) -> bool {
        match &self.0 {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            _ => false,
        }
    }

    /// Borrow the decoded payload.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Take the decoded payload.
    pub fn into_value(self) -> Value {
        self.0
    }

    /// Canonical content equality.
    ///
    /// Object key order and source formatting do not matter, and integral
    /// numbers compare equal whatever their spelling (`1` and `1.0`).
    ///
    /// A `null` payload and an empty object are both "no state" and compare
    /// equal to each other. Re-importing an empty bundle over an empty
    /// manager at the same serial is therefore a no-op, not a conflict.
    pub fn content_eq(&self, other: &State) -> bool {
        if self.is_empty() && other.is_empty() {
            return true;
        }
        canonical(&self.0) == canonical(&other.0)
    }

    /// Hex SHA-256 of the canonical serialization.
    ///
    /// Diagnostics only. Use [`State::content_eq`] for comparisons.
    pub fn digest(&self) -> String {
        // serde_json maps are key-sorted, so compact output is canonical.
        let bytes = if self.is_empty() {
            Vec::new()
        } else {
            serde_json::to_vec(&canonical(&self.0)).unwrap_or_default()
        };
        format!("{:x}", Sha256::digest(&bytes))
    }
}

/// Rewrite integral floats as integers, recursively.
fn canonical(value: &Value) -> Value {
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.is_finite() && f.fract() == 0.0 => {
                if f >= 0.0 && f < u64::MAX as f64 {
                    Value::from(f as u64)
                } else if f < 0.0 && f >= i64::MIN as f64 {
                    Value::from(f as i64)
                } else {
                    value.clone()
                }
            }
            _ => value.clone(),
        },
        Value::Array(items) => Value::Array(items.iter().map(canonical).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), canonical(v)))
                .collect(),
        ),
        _ => value.clone(),
    }
}

impl From<Value> for State {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// The versioning envelope of the currently stored snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMeta {
    /// History identifier. Empty means none was recorded.
    pub lineage: String,

    /// Version counter within the lineage.
    pub serial: u64,
}

impl SnapshotMeta {
    pub fn new(lineage: impl Into<String>, serial: u64) -> Self {
        Self {
            lineage: lineage.into(),
            serial,
        }
    }

    /// Returns true if a lineage was recorded.
    pub fn has_lineage(&self) -> bool {
        !self.lineage.is_empty()
    }
}

/// A snapshot payload together with its metadata.
#[derive(Debug, Clone, Default)]
pub struct StateFile {
    /// Snapshot payload.
    pub state: State,

    /// History identifier. Empty means none was recorded.
    pub lineage: String,

    /// Version counter within the lineage.
    pub serial: u64,
}

impl StateFile {
    pub fn new(state: State, lineage: impl Into<String>, serial: u64) -> Self {
        Self {
            state,
            lineage: lineage.into(),
            serial,
        }
    }

    /// The metadata half of this bundle.
    pub fn meta(&self) -> SnapshotMeta {
        SnapshotMeta::new(self.lineage.clone(), self.serial)
    }
}

/// Generate a fresh lineage identifier.
pub fn new_lineage() -> String {
    Uuid::new_v4().to_string()
}
