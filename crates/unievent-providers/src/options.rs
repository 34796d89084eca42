//! Strategy options.
//!
//! [`Options`] is the loosely-typed bag flowing through activation and
//! dispatch: strategy defaults, activation options, builder defaults and
//! per-call options all deep-merge into one store. Typed accessors cover
//! the keys dispatch itself cares about; strategies read their own keys
//! through the store passthroughs.

use serde::{Deserialize, Serialize};
use unievent_core::{EventRecord, Store, Value};

/// Well-known option key holding the event payload for mutation calls.
pub const EVENT_KEY: &str = "event";

/// An ordered option bag with deep-merge semantics.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Options(Store);

impl Options {
    /// Creates an empty option bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing store.
    pub fn from_store(store: Store) -> Self {
        Self(store)
    }

    /// The underlying store.
    pub fn store(&self) -> &Store {
        &self.0
    }

    /// The underlying store, mutably.
    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.0
    }

    /// Returns the value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Inserts `value` under `key`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.set(key, value)
    }

    /// Looks up a dot-separated path.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        self.0.get_path(path)
    }

    /// Sets a value at a dot-separated path.
    pub fn set_path(&mut self, path: &str, value: impl Into<Value>) -> Option<Value> {
        self.0.set_path(path, value)
    }

    /// Whether the bag has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Chainable insert.
    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.set(key, value);
        self
    }

    /// Deep-merges `overlay` into this bag; `overlay` wins on collision.
    pub fn deep_merge(&mut self, overlay: &Options) {
        self.0.deep_merge(&overlay.0);
    }

    /// Non-destructive [`Options::deep_merge`].
    #[must_use]
    pub fn deep_merged(&self, overlay: &Options) -> Options {
        Self(self.0.deep_merged(&overlay.0))
    }

    fn str_option(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
    }

    /// The strategy's display name, when set to a non-empty string.
    pub fn name(&self) -> Option<&str> {
        self.str_option("name")
    }

    /// The credential token, when set to a non-empty string.
    pub fn token(&self) -> Option<&str> {
        self.str_option("token")
    }

    /// Lower bound for event listing, RFC 3339.
    pub fn from_time(&self) -> Option<&str> {
        self.str_option("from_time")
    }

    /// Upper bound for event listing, RFC 3339.
    pub fn to_time(&self) -> Option<&str> {
        self.str_option("to_time")
    }

    /// Case-insensitive name filter for event listing.
    pub fn match_name(&self) -> Option<&str> {
        self.str_option("match_name")
    }

    /// Fixture or endpoint location, strategy-specific.
    pub fn uri(&self) -> Option<&str> {
        self.str_option("uri")
    }

    /// Embeds an event payload for a mutation call.
    #[must_use]
    pub fn with_event(mut self, event: &EventRecord) -> Self {
        self.0.set(EVENT_KEY, event.to_store());
        self
    }

    /// Reads the embedded event payload, if present and well-formed.
    pub fn event(&self) -> Option<EventRecord> {
        self.0
            .get(EVENT_KEY)
            .and_then(Value::as_map)
            .map(|map| EventRecord::from_store(map.clone()))
    }

    /// Removes and returns the embedded event payload.
    ///
    /// Strategies see the options after extraction, so the payload never
    /// masquerades as configuration.
    pub fn take_event(&mut self) -> Option<EventRecord> {
        match self.0.remove(EVENT_KEY) {
            Some(Value::Map(map)) => Some(EventRecord::from_store(map)),
            Some(other) => {
                // Put the malformed value back so the caller can report it.
                self.0.set(EVENT_KEY, other);
                None
            }
            None => None,
        }
    }

    /// Whether an `event` key is present at all, well-formed or not.
    pub fn has_event_key(&self) -> bool {
        self.0.contains(EVENT_KEY)
    }
}

impl From<Store> for Options {
    fn from(store: Store) -> Self {
        Self(store)
    }
}
