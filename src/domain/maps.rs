//! Output maps written by the overlay builder
//!
//! Settings and config share one representation, [`ValueMap`]: an ordered
//! JSON object whose keys are literal. A key such as `redis.connection` is
//! a single key; nesting is always spelled out as a slice of segments.
//!
//! Merging follows layered-config semantics:
//! - Objects: deep-merge by key
//! - Arrays: replaced by the overlay
//! - Scalars: overlay wins

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Framework runtime flags (file paths, feature toggles, cache backend)
pub type SettingsMap = ValueMap;

/// Overridable configuration objects, keyed by config object name
pub type ConfigMap = ValueMap;

/// Ordered mapping from literal key to JSON value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueMap(Map<String, Value>);

impl ValueMap {
    /// Creates an empty map
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Sets a top-level key, replacing any previous value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Sets a nested value, creating intermediate objects as needed
    ///
    /// Intermediate values that are not objects are replaced by objects.
    /// An empty path is a no-op.
    pub fn set_path(&mut self, path: &[&str], value: impl Into<Value>) {
        set_in(&mut self.0, path, value.into());
    }

    /// Returns a top-level value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns a nested value
    pub fn get_path(&self, path: &[&str]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        rest.iter()
            .try_fold(self.0.get(*first)?, |value, segment| value.get(segment))
    }

    /// Returns true when a nested value is present
    pub fn contains_path(&self, path: &[&str]) -> bool {
        self.get_path(path).is_some()
    }

    /// Appends to a list-valued key, creating the list when absent
    ///
    /// A non-list value under the key is replaced by a one-element list.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let entry = self
            .0
            .entry(key.into())
            .or_insert_with(|| Value::Array(Vec::new()));
        match entry {
            Value::Array(items) => items.push(value.into()),
            other => *other = Value::Array(vec![value.into()]),
        }
    }

    /// Deep-merges another object into this map
    pub fn merge(&mut self, overlay: Map<String, Value>) {
        for (key, value) in overlay {
            let merged = match self.0.remove(&key) {
                Some(base) => deep_merge(base, value),
                None => value,
            };
            self.0.insert(key, merged);
        }
    }

    /// Number of top-level keys
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when no keys are set
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over top-level keys in order
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Borrows the underlying object
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for ValueMap {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn set_in(map: &mut Map<String, Value>, path: &[&str], value: Value) {
    match path {
        [] => {}
        [last] => {
            map.insert(last.to_string(), value);
        }
        [first, rest @ ..] => {
            let entry = map
                .entry(first.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            if let Value::Object(child) = entry {
                set_in(child, rest, value);
            }
        }
    }
}

/// Deep merge two JSON values.
///
/// - Objects: deep-merge by key (recursive)
/// - Arrays: replaced by the overlay
/// - Scalars and mixed kinds: overlay wins
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (_, overlay) => overlay,
    }
}
