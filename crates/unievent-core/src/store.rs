//! Nested attribute store.
//!
//! Provider payloads arrive as loosely-typed trees. [`Store`] keeps them as
//! an ordered map of [`Value`]s with:
//! - dot-path access (`get_path("a.b.c")` / `set_path`)
//! - recursive nesting (a map value *is* a `Store`, no coercion step)
//! - deep-merge with well-defined precedence
//! - lossless conversion to and from `serde_json::Value`

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single attribute value.
///
/// Serialized untagged, so the JSON form is ordinary JSON: `Map` values
/// nest as objects and round-trip as sub-stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Explicit null. Treated as absent by schema validation.
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// UTF-8 string.
    String(String),
    /// Ordered list of values.
    List(Vec<Value>),
    /// Nested store.
    Map(Store),
}

impl Value {
    /// Returns the string slice if this is a `String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Returns the boolean if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer if this is an `Int`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the list if this is a `List`.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Returns the nested store if this is a `Map`.
    pub fn as_map(&self) -> Option<&Store> {
        match self {
            Value::Map(store) => Some(store),
            _ => None,
        }
    }

    /// Returns the nested store mutably if this is a `Map`.
    pub fn as_map_mut(&mut self) -> Option<&mut Store> {
        match self {
            Value::Map(store) => Some(store),
            _ => None,
        }
    }

    /// Whether this value counts as empty: null, `""`, `[]` or `{}`.
    ///
    /// Schema validation treats empty values as absent.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            Value::List(items) => items.is_empty(),
            Value::Map(store) => store.is_empty(),
            Value::Bool(_) | Value::Int(_) | Value::Float(_) => false,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl From<Store> for Value {
    fn from(value: Store) -> Self {
        Value::Map(value)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    // u64 beyond i64::MAX and true floats both land here.
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                let mut store = Store::new();
                for (key, val) in map {
                    store.set(key, Value::from(val));
                }
                Value::Map(store)
            }
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Int(n) => serde_json::Value::from(n),
            Value::Float(f) => {
                serde_json::Number::from_f64(f).map_or(serde_json::Value::Null, Into::into)
            }
            Value::String(s) => serde_json::Value::String(s),
            Value::List(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            }
            Value::Map(store) => {
                let mut map = serde_json::Map::new();
                for (key, val) in store.entries {
                    map.insert(key, val.into());
                }
                serde_json::Value::Object(map)
            }
        }
    }
}

/// Ordered map of string keys to [`Value`]s.
///
/// Insertion order is preserved through merges and serde round-trips.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Store {
    entries: IndexMap<String, Value>,
}

impl Store {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Returns the value for `key` mutably, if present.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries.get_mut(key)
    }

    /// Inserts `value` under `key`, returning the previous value if any.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    /// Removes and returns the value for `key`.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        // shift_remove keeps the order of the remaining entries stable.
        self.entries.shift_remove(key)
    }

    /// Whether `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterates over keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Chainable insert, for building stores in expression position.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Looks up a dot-separated path through nested maps.
    ///
    /// Returns `None` if any segment is missing or any intermediate value
    /// is not a map. A path without dots behaves like [`Store::get`].
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.get(first)?;
        for segment in segments {
            current = current.as_map()?.get(segment)?;
        }
        Some(current)
    }

    /// Sets a value at a dot-separated path, creating intermediate maps.
    ///
    /// Intermediate values that are not maps are overwritten with fresh
    /// maps. Returns the previous value at the final segment, if any.
    pub fn set_path(&mut self, path: &str, value: impl Into<Value>) -> Option<Value> {
        let segments: Vec<&str> = path.split('.').collect();
        let (last, intermediate) = match segments.split_last() {
            Some(parts) => parts,
            None => return None,
        };

        let mut current = self;
        for segment in intermediate {
            let needs_map = !matches!(current.get(*segment), Some(Value::Map(_)));
            if needs_map {
                current.set(*segment, Store::new());
            }
            let Some(Value::Map(next)) = current.get_mut(*segment) else {
                return None;
            };
            current = next;
        }
        current.set(*last, value)
    }

    /// Deep-merges `other` into `self`.
    ///
    /// Map values merge recursively; every other collision is replaced by
    /// `other`'s value (including an explicit `Null`). Lists replace
    /// wholesale. Keys only in `other` append in `other`'s order.
    pub fn deep_merge(&mut self, other: &Store) {
        for (key, incoming) in other.iter() {
            match (self.get_mut(key), incoming) {
                (Some(Value::Map(existing)), Value::Map(overlay)) => {
                    existing.deep_merge(overlay);
                }
                _ => {
                    self.set(key, incoming.clone());
                }
            }
        }
    }

    /// Non-destructive [`Store::deep_merge`].
    #[must_use]
    pub fn deep_merged(&self, other: &Store) -> Store {
        let mut merged = self.clone();
        merged.deep_merge(other);
        merged
    }

    /// Parses a store from a JSON object string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not valid JSON or not an object.
    pub fn from_json_str(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }

    /// Serializes the store to a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl FromIterator<(String, Value)> for Store {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Store {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Store {
        Store::new()
            .with("name", "Launch party")
            .with(
                "location",
                Store::new().with("city", "Perth").with("country", "AU"),
            )
            .with("virtual", false)
    }

    mod access {
        use super::*;

        #[test]
        fn get_and_set() {
            let mut store = Store::new();
            assert!(store.set("name", "Meetup").is_none());
            assert_eq!(store.get("name").and_then(Value::as_str), Some("Meetup"));

            let previous = store.set("name", "Renamed");
            assert_eq!(previous, Some(Value::String("Meetup".into())));
        }

        #[test]
        fn remove_keeps_order() {
            let mut store = sample();
            store.remove("location");
            let keys: Vec<&str> = store.keys().collect();
            assert_eq!(keys, vec!["name", "virtual"]);
        }

        #[test]
        fn nested_value_is_a_store() {
            let store = sample();
            let location = store.get("location").and_then(Value::as_map).unwrap();
            assert_eq!(location.get("city").and_then(Value::as_str), Some("Perth"));
        }

        #[test]
        fn insertion_order_preserved() {
            let store = sample();
            let keys: Vec<&str> = store.keys().collect();
            assert_eq!(keys, vec!["name", "location", "virtual"]);
        }
    }

    mod paths {
        use super::*;

        #[test]
        fn get_path_walks_nested_maps() {
            let store = sample();
            assert_eq!(
                store.get_path("location.city").and_then(Value::as_str),
                Some("Perth")
            );
        }

        #[test]
        fn get_path_single_segment() {
            let store = sample();
            assert_eq!(store.get_path("name").and_then(Value::as_str), Some("Launch party"));
        }

        #[test]
        fn get_path_missing_segment() {
            let store = sample();
            assert!(store.get_path("location.latitude").is_none());
            assert!(store.get_path("nowhere.at.all").is_none());
        }

        #[test]
        fn get_path_through_non_map() {
            let store = sample();
            // "name" is a string, not a map.
            assert!(store.get_path("name.first").is_none());
        }

        #[test]
        fn set_path_creates_intermediates() {
            let mut store = Store::new();
            store.set_path("a.b.c", 7i64);
            assert_eq!(store.get_path("a.b.c").and_then(Value::as_int), Some(7));
        }

        #[test]
        fn set_path_overwrites_non_map_intermediate() {
            let mut store = Store::new().with("a", "scalar");
            store.set_path("a.b", true);
            assert_eq!(store.get_path("a.b").and_then(Value::as_bool), Some(true));
        }

        #[test]
        fn set_path_roundtrip() {
            let mut store = Store::new();
            store.set_path("data.start_time", "2024-06-01T10:00:00Z");
            assert_eq!(
                store.get_path("data.start_time").and_then(Value::as_str),
                Some("2024-06-01T10:00:00Z")
            );
        }
    }

    mod merge {
        use super::*;

        #[test]
        fn nested_maps_merge_recursively() {
            let mut base = sample();
            let overlay = Store::new().with(
                "location",
                Store::new().with("city", "Melbourne").with("postal_code", "3000"),
            );
            base.deep_merge(&overlay);

            assert_eq!(
                base.get_path("location.city").and_then(Value::as_str),
                Some("Melbourne")
            );
            // Untouched sibling survives.
            assert_eq!(
                base.get_path("location.country").and_then(Value::as_str),
                Some("AU")
            );
            assert_eq!(
                base.get_path("location.postal_code").and_then(Value::as_str),
                Some("3000")
            );
        }

        #[test]
        fn scalar_collision_takes_overlay() {
            let mut base = sample();
            base.deep_merge(&Store::new().with("name", "Rescheduled"));
            assert_eq!(base.get("name").and_then(Value::as_str), Some("Rescheduled"));
        }

        #[test]
        fn null_overlay_replaces() {
            let mut base = sample();
            base.deep_merge(&Store::new().with("virtual", Value::Null));
            assert_eq!(base.get("virtual"), Some(&Value::Null));
        }

        #[test]
        fn lists_replace_wholesale() {
            let mut base = Store::new().with(
                "tags",
                vec![Value::from("music"), Value::from("outdoor")],
            );
            base.deep_merge(&Store::new().with("tags", vec![Value::from("indoor")]));
            assert_eq!(
                base.get("tags").and_then(Value::as_list).map(<[Value]>::len),
                Some(1)
            );
        }

        #[test]
        fn map_over_scalar_replaces() {
            let mut base = Store::new().with("location", "somewhere");
            base.deep_merge(&Store::new().with("location", Store::new().with("city", "Perth")));
            assert!(base.get("location").and_then(Value::as_map).is_some());
        }

        #[test]
        fn overlay_only_keys_append_in_order() {
            let mut base = Store::new().with("a", 1i64);
            base.deep_merge(&Store::new().with("c", 3i64).with("b", 2i64));
            let keys: Vec<&str> = base.keys().collect();
            assert_eq!(keys, vec!["a", "c", "b"]);
        }

        #[test]
        fn deep_merged_leaves_original_untouched() {
            let base = sample();
            let merged = base.deep_merged(&Store::new().with("name", "Changed"));
            assert_eq!(base.get("name").and_then(Value::as_str), Some("Launch party"));
            assert_eq!(merged.get("name").and_then(Value::as_str), Some("Changed"));
        }
    }

    mod json {
        use super::*;

        #[test]
        fn serde_roundtrip_preserves_order() {
            let store = sample();
            let json = store.to_json_string().unwrap();
            let back = Store::from_json_str(&json).unwrap();
            assert_eq!(store, back);
            let keys: Vec<&str> = back.keys().collect();
            assert_eq!(keys, vec!["name", "location", "virtual"]);
        }

        #[test]
        fn from_json_value_number_widths() {
            let value = Value::from(serde_json::json!({"count": 3, "ratio": 0.5}));
            let store = value.as_map().unwrap();
            assert_eq!(store.get("count"), Some(&Value::Int(3)));
            assert_eq!(store.get("ratio"), Some(&Value::Float(0.5)));
        }

        #[test]
        fn into_json_value() {
            let store = sample();
            let json: serde_json::Value = Value::from(store).into();
            assert_eq!(json["location"]["city"], "Perth");
            assert_eq!(json["virtual"], false);
        }

        #[test]
        fn untagged_value_deserialization() {
            let value: Value = serde_json::from_str("\"hello\"").unwrap();
            assert_eq!(value, Value::String("hello".into()));
            let value: Value = serde_json::from_str("{\"a\": [1, true, null]}").unwrap();
            let list = value
                .as_map()
                .and_then(|m| m.get("a"))
                .and_then(Value::as_list)
                .unwrap();
            assert_eq!(list, &[Value::Int(1), Value::Bool(true), Value::Null]);
        }
    }

    mod emptiness {
        use super::*;

        #[test]
        fn empty_values() {
            assert!(Value::Null.is_empty());
            assert!(Value::String(String::new()).is_empty());
            assert!(Value::List(Vec::new()).is_empty());
            assert!(Value::Map(Store::new()).is_empty());
        }

        #[test]
        fn non_empty_values() {
            assert!(!Value::Bool(false).is_empty());
            assert!(!Value::Int(0).is_empty());
            assert!(!Value::from("x").is_empty());
        }
    }
}
