//! Submission snapshots

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use super::forms::FieldValue;
use super::{FieldPath, PathSegment};

/// A value inside a submission snapshot
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotValue {
    /// A conditional subtree whose governing predicate is false
    Null,
    Text(String),
    Bool(bool),
    Number(f64),
    /// Names of the selected entries of a repeated-control list
    Selected(Vec<String>),
    /// A group, keys in declaration order
    Map(Vec<(String, SnapshotValue)>),
}

impl SnapshotValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SnapshotValue::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            SnapshotValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SnapshotValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_selected(&self) -> Option<&[String]> {
        match self {
            SnapshotValue::Selected(names) => Some(names),
            _ => None,
        }
    }

    /// Child of a map value
    pub fn get(&self, key: &str) -> Option<&SnapshotValue> {
        match self {
            SnapshotValue::Map(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Keys of a map value, in order
    pub fn keys(&self) -> Vec<&str> {
        match self {
            SnapshotValue::Map(entries) => entries.iter().map(|(k, _)| k.as_str()).collect(),
            _ => Vec::new(),
        }
    }
}

impl From<&FieldValue> for SnapshotValue {
    fn from(value: &FieldValue) -> Self {
        match value {
            FieldValue::Text(s) => SnapshotValue::Text(s.clone()),
            FieldValue::Bool(b) => SnapshotValue::Bool(*b),
            FieldValue::Number(n) => SnapshotValue::Number(*n),
        }
    }
}

impl Serialize for SnapshotValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SnapshotValue::Null => serializer.serialize_none(),
            SnapshotValue::Text(s) => serializer.serialize_str(s),
            SnapshotValue::Bool(b) => serializer.serialize_bool(*b),
            SnapshotValue::Number(n) => serializer.serialize_f64(*n),
            SnapshotValue::Selected(names) => {
                let mut seq = serializer.serialize_seq(Some(names.len()))?;
                for name in names {
                    seq.serialize_element(name)?;
                }
                seq.end()
            }
            SnapshotValue::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

/// Immutable record of an accepted submission
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Snapshot {
    root: SnapshotValue,
}

impl Snapshot {
    pub(crate) fn new(root: SnapshotValue) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &SnapshotValue {
        &self.root
    }

    /// Value at a path; list paths address the selected-names projection
    pub fn get(&self, path: impl Into<FieldPath>) -> Option<&SnapshotValue> {
        let path = path.into();
        path.segments()
            .iter()
            .try_fold(&self.root, |value, segment| match segment {
                PathSegment::Key(key) => value.get(key),
                PathSegment::Index(i) => value.get(&i.to_string()),
            })
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
