//! Field-path patch semantics for room documents.
//!
//! A patch is an ordered map of dotted field paths to operations. Applying a
//! patch to a JSON document is atomic with respect to other patches on the
//! same document; unspecified fields are untouched; `Delete` is the
//! delete-marker that removes a field entirely.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub enum PatchOp {
    Set(Value),
    Delete,
}

/// A partial update against one room document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    ops: BTreeMap<String, PatchOp>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<T: Serialize>(mut self, path: impl Into<String>, value: T) -> Self {
        // Serialization of our own model types cannot fail
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.ops.insert(path.into(), PatchOp::Set(value));
        self
    }

    pub fn delete(mut self, path: impl Into<String>) -> Self {
        self.ops.insert(path.into(), PatchOp::Delete);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> impl Iterator<Item = (&str, &PatchOp)> {
        self.ops.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Apply every operation to `doc` in path order. Intermediate objects are
    /// created as needed; deleting a missing field is a no-op.
    pub fn apply(&self, doc: &mut Value) {
        for (path, op) in &self.ops {
            apply_op(doc, path, op);
        }
    }
}

fn apply_op(doc: &mut Value, path: &str, op: &PatchOp) {
    let mut segments = path.split('.').peekable();
    let mut current = doc;

    while let Some(segment) = segments.next() {
        if !current.is_object() {
            if matches!(op, PatchOp::Delete) {
                return;
            }
            *current = Value::Object(serde_json::Map::new());
        }
        let Value::Object(map) = current else {
            return;
        };

        if segments.peek().is_none() {
            match op {
                PatchOp::Set(value) => {
                    map.insert(segment.to_string(), value.clone());
                }
                PatchOp::Delete => {
                    map.remove(segment);
                }
            }
            return;
        }

        current = match op {
            PatchOp::Delete => match map.get_mut(segment) {
                Some(next) => next,
                None => return,
            },
            PatchOp::Set(_) => map
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(serde_json::Map::new())),
        };
    }
}
