//! Section schemas.
//!
//! A [`SectionSchema`] is fixed at definition time: the required attribute
//! names, the permitted attributes, and one check per attribute. Validating
//! a store against a schema yields a [`SectionReport`] rather than an error,
//! so callers can collect every problem in one pass.
//!
//! Empty values (null, `""`, `[]`, `{}`) count as absent: a required
//! attribute holding an empty value is reported missing, and a permitted
//! attribute holding an empty value is skipped, never invalid.

use serde::{Deserialize, Serialize};

use crate::store::{Store, Value};

/// One permitted attribute: its name and its validity check.
#[derive(Debug, Clone, Copy)]
pub struct AttributeSpec {
    /// Attribute name as it appears in the store.
    pub name: &'static str,
    /// Returns whether a non-empty value is acceptable.
    pub check: fn(&Value) -> bool,
}

/// Definition-time schema for one record section.
#[derive(Debug, Clone, Copy)]
pub struct SectionSchema {
    /// Section name, used in reports and log messages.
    pub label: &'static str,
    /// Names that must be present and non-empty.
    pub required: &'static [&'static str],
    /// The full set of permitted attributes.
    pub attributes: &'static [AttributeSpec],
}

/// Outcome of validating a store against a [`SectionSchema`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionReport {
    /// Required attributes that were absent or empty.
    pub missing: Vec<String>,
    /// Attributes present in the store but not in the schema.
    pub unpermitted: Vec<String>,
    /// Permitted, non-empty attributes that failed their check.
    pub invalid: Vec<String>,
}

impl SectionReport {
    /// Whether the section passed: nothing missing, unpermitted or invalid.
    pub fn is_valid(&self) -> bool {
        self.missing.is_empty() && self.unpermitted.is_empty() && self.invalid.is_empty()
    }
}

impl SectionSchema {
    /// Looks up the [`AttributeSpec`] for a permitted attribute.
    pub fn attribute(&self, name: &str) -> Option<&AttributeSpec> {
        self.attributes.iter().find(|spec| spec.name == name)
    }

    /// Whether `name` is permitted in this section.
    pub fn permits(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Validates `store` against this schema.
    ///
    /// An attribute can appear in `missing` or in `invalid`, never both:
    /// absent or empty means missing, present-but-failing means invalid.
    pub fn validate(&self, store: &Store) -> SectionReport {
        let mut report = SectionReport::default();

        for name in self.required {
            let absent = store.get(name).is_none_or(Value::is_empty);
            if absent {
                report.missing.push((*name).to_string());
            }
        }

        for (key, value) in store.iter() {
            match self.attribute(key) {
                None => report.unpermitted.push(key.to_string()),
                Some(_) if value.is_empty() => {}
                Some(spec) => {
                    if !(spec.check)(value) {
                        report.invalid.push(key.to_string());
                    }
                }
            }
        }

        report
    }

    /// Checks a single attribute value against this schema.
    ///
    /// Unpermitted names fail; empty values pass, matching the skip rule
    /// in [`SectionSchema::validate`].
    pub fn attribute_valid(&self, name: &str, value: &Value) -> bool {
        match self.attribute(name) {
            None => false,
            Some(_) if value.is_empty() => true,
            Some(spec) => (spec.check)(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate;

    const TEST_SCHEMA: SectionSchema = SectionSchema {
        label: "test",
        required: &["name", "start_time"],
        attributes: &[
            AttributeSpec {
                name: "name",
                check: validate::string,
            },
            AttributeSpec {
                name: "start_time",
                check: validate::time,
            },
            AttributeSpec {
                name: "url",
                check: validate::url,
            },
        ],
    };

    fn valid_store() -> Store {
        Store::new()
            .with("name", "Launch party")
            .with("start_time", "2024-06-01T10:00:00Z")
    }

    #[test]
    fn valid_store_passes() {
        let report = TEST_SCHEMA.validate(&valid_store());
        assert!(report.is_valid());
        assert_eq!(report, SectionReport::default());
    }

    #[test]
    fn missing_required_attribute() {
        let store = Store::new().with("name", "Launch party");
        let report = TEST_SCHEMA.validate(&store);
        assert_eq!(report.missing, vec!["start_time"]);
        assert!(report.unpermitted.is_empty());
        assert!(report.invalid.is_empty());
    }

    #[test]
    fn empty_required_counts_as_missing() {
        let store = valid_store().with("name", "");
        let report = TEST_SCHEMA.validate(&store);
        assert_eq!(report.missing, vec!["name"]);
        // Empty never reaches the check, so it is not also invalid.
        assert!(report.invalid.is_empty());
    }

    #[test]
    fn null_required_counts_as_missing() {
        let store = valid_store().with("start_time", Value::Null);
        let report = TEST_SCHEMA.validate(&store);
        assert_eq!(report.missing, vec!["start_time"]);
    }

    #[test]
    fn unpermitted_attribute() {
        let store = valid_store().with("color", "red");
        let report = TEST_SCHEMA.validate(&store);
        assert_eq!(report.unpermitted, vec!["color"]);
        assert!(!report.is_valid());
    }

    #[test]
    fn invalid_attribute() {
        let store = valid_store().with("url", "not a url");
        let report = TEST_SCHEMA.validate(&store);
        assert_eq!(report.invalid, vec!["url"]);
    }

    #[test]
    fn empty_permitted_is_skipped() {
        let store = valid_store().with("url", "");
        let report = TEST_SCHEMA.validate(&store);
        assert!(report.is_valid());
    }

    #[test]
    fn failing_required_is_invalid_not_missing() {
        let store = valid_store().with("start_time", "not a time");
        let report = TEST_SCHEMA.validate(&store);
        assert!(report.missing.is_empty());
        assert_eq!(report.invalid, vec!["start_time"]);
    }

    #[test]
    fn attribute_valid() {
        assert!(TEST_SCHEMA.attribute_valid("url", &Value::from("https://example.com")));
        assert!(!TEST_SCHEMA.attribute_valid("url", &Value::from("nope")));
        assert!(TEST_SCHEMA.attribute_valid("url", &Value::Null));
        assert!(!TEST_SCHEMA.attribute_valid("color", &Value::from("red")));
    }

    #[test]
    fn permits() {
        assert!(TEST_SCHEMA.permits("name"));
        assert!(!TEST_SCHEMA.permits("color"));
    }
}
