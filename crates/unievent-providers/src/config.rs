//! Hub configuration.
//!
//! Provider keys arrive in snake case (`"google_calendar"`) and resolve to
//! registry names in camel case (`"GoogleCalendar"`). Acronym-heavy names
//! camelize badly, so [`Config`] carries an override table consulted before
//! the mechanical conversion.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Configuration for a [`Hub`](crate::hub::Hub).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Overrides for key resolution, keyed by the snake-case provider key.
    #[serde(default)]
    pub camelizations: HashMap<String, String>,
}

impl Config {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a camelization override.
    #[must_use]
    pub fn with_camelization(
        mut self,
        key: impl Into<String>,
        camelized: impl Into<String>,
    ) -> Self {
        self.camelizations.insert(key.into(), camelized.into());
        self
    }

    /// Adds a camelization override.
    pub fn add_camelization(&mut self, key: impl Into<String>, camelized: impl Into<String>) {
        self.camelizations.insert(key.into(), camelized.into());
    }

    /// Resolves a provider key to its registry name.
    ///
    /// The override table wins; otherwise the key is camelized.
    pub fn resolve(&self, key: &str) -> String {
        self.camelizations
            .get(key)
            .cloned()
            .unwrap_or_else(|| camelize(key))
    }
}

/// Camelizes a snake-case key: `"google_calendar"` becomes
/// `"GoogleCalendar"`.
///
/// Each underscore-separated segment is capitalized; the rest of the
/// segment is lowercased, so `"EVENTBRITE"` becomes `"Eventbrite"`.
pub fn camelize(key: &str) -> String {
    key.split('_')
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => {
                    first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase()
                }
                None => String::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camelize_segments() {
        assert_eq!(camelize("developer"), "Developer");
        assert_eq!(camelize("google_calendar"), "GoogleCalendar");
        assert_eq!(camelize("EVENTBRITE"), "Eventbrite");
        assert_eq!(camelize(""), "");
    }

    #[test]
    fn resolve_falls_back_to_camelize() {
        let config = Config::new();
        assert_eq!(config.resolve("developer"), "Developer");
    }

    #[test]
    fn resolve_prefers_override() {
        let config = Config::new().with_camelization("icalendar", "ICalendar");
        assert_eq!(config.resolve("icalendar"), "ICalendar");
        // Unrelated keys still camelize.
        assert_eq!(config.resolve("developer"), "Developer");
    }

    #[test]
    fn serde_roundtrip() {
        let config = Config::new().with_camelization("icalendar", "ICalendar");
        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
