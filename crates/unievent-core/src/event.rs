//! Event records.
//!
//! This module provides the normalized event shape every provider strategy
//! produces and consumes:
//! - [`EventRecord`]: provider name plus three schema-validated sections
//! - [`DataSection`]: what/when of the event (name, times, status, ...)
//! - [`MetadataSection`]: provider bookkeeping (uid, stamps, locale, ...)
//! - [`AssociatedDataSection`]: structured extras (location, virtual
//!   location, organizer, registrations)
//!
//! Section schemas are fixed at definition time. Validation aggregates
//! per-section [`SectionReport`]s into an [`EventReport`]; `valid()` is the
//! one-bit summary dispatch uses to gate event creation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::{AttributeSpec, SectionReport, SectionSchema};
use crate::store::{Store, Value};
use crate::validate;

/// Allowed event statuses.
pub const STATUSES: &[&str] = &["draft", "cancelled", "confirmed"];

/// Allowed virtual-location entry point types.
pub const ENTRY_POINT_TYPES: &[&str] = &["video", "phone", "sip"];

/// Allowed registration statuses.
pub const REGISTRATION_STATUSES: &[&str] = &["confirmed", "declined", "tentative"];

fn check_status(value: &Value) -> bool {
    validate::one_of(value, STATUSES)
}

fn check_registration_status(value: &Value) -> bool {
    validate::one_of(value, REGISTRATION_STATUSES)
}

fn check_entry_point_type(value: &Value) -> bool {
    validate::one_of(value, ENTRY_POINT_TYPES)
}

/// Schema for the `location` map in associated data.
pub const LOCATION_SCHEMA: SectionSchema = SectionSchema {
    label: "location",
    required: &[],
    attributes: &[
        AttributeSpec { name: "uid", check: validate::string },
        AttributeSpec { name: "name", check: validate::string },
        AttributeSpec { name: "address", check: validate::string },
        AttributeSpec { name: "city", check: validate::string },
        AttributeSpec { name: "postal_code", check: validate::string },
        AttributeSpec { name: "country", check: validate::country },
        AttributeSpec { name: "latitude", check: validate::latitude },
        AttributeSpec { name: "longitude", check: validate::longitude },
        AttributeSpec { name: "url", check: validate::url },
    ],
};

/// Schema for one entry point in a virtual location.
///
/// The `uri` check here is the shape check only; the type-dependent rule
/// (`video` entry points need an absolute URL) lives in
/// [`check_entry_points`].
pub const ENTRY_POINT_SCHEMA: SectionSchema = SectionSchema {
    label: "entry_point",
    required: &["uri", "type"],
    attributes: &[
        AttributeSpec { name: "uri", check: validate::string },
        AttributeSpec { name: "type", check: check_entry_point_type },
        AttributeSpec { name: "code", check: validate::string },
        AttributeSpec { name: "label", check: validate::string },
    ],
};

/// Schema for the `virtual_location` map in associated data.
pub const VIRTUAL_LOCATION_SCHEMA: SectionSchema = SectionSchema {
    label: "virtual_location",
    required: &[],
    attributes: &[
        AttributeSpec { name: "uid", check: validate::string },
        AttributeSpec { name: "entry_points", check: check_entry_points },
    ],
};

/// Schema for the `organizer` map in associated data.
pub const ORGANIZER_SCHEMA: SectionSchema = SectionSchema {
    label: "organizer",
    required: &[],
    attributes: &[
        AttributeSpec { name: "uid", check: validate::string },
        AttributeSpec { name: "name", check: validate::string },
        AttributeSpec { name: "email", check: validate::email },
        AttributeSpec { name: "uris", check: validate::all_strings },
    ],
};

/// Schema for one entry in the `registrations` list.
pub const REGISTRATION_SCHEMA: SectionSchema = SectionSchema {
    label: "registration",
    required: &["email", "status"],
    attributes: &[
        AttributeSpec { name: "uid", check: validate::string },
        AttributeSpec { name: "name", check: validate::string },
        AttributeSpec { name: "email", check: validate::email },
        AttributeSpec { name: "status", check: check_registration_status },
    ],
};

fn entry_point_ok(store: &Store) -> bool {
    if !ENTRY_POINT_SCHEMA.validate(store).is_valid() {
        return false;
    }
    match store.get("type").and_then(Value::as_str) {
        Some("video") => store.get("uri").is_some_and(validate::url),
        _ => true,
    }
}

fn check_entry_points(value: &Value) -> bool {
    value
        .as_list()
        .is_some_and(|items| items.iter().all(|item| item.as_map().is_some_and(entry_point_ok)))
}

fn check_location(value: &Value) -> bool {
    value
        .as_map()
        .is_some_and(|map| LOCATION_SCHEMA.validate(map).is_valid())
}

fn check_virtual_location(value: &Value) -> bool {
    value
        .as_map()
        .is_some_and(|map| VIRTUAL_LOCATION_SCHEMA.validate(map).is_valid())
}

fn check_organizer(value: &Value) -> bool {
    value
        .as_map()
        .is_some_and(|map| ORGANIZER_SCHEMA.validate(map).is_valid())
}

fn check_registrations(value: &Value) -> bool {
    value.as_list().is_some_and(|items| {
        items
            .iter()
            .all(|item| item.as_map().is_some_and(|map| REGISTRATION_SCHEMA.validate(map).is_valid()))
    })
}

/// Selects one of the three record sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    /// The `data` section.
    Data,
    /// The `metadata` section.
    Metadata,
    /// The `associated_data` section.
    AssociatedData,
}

impl Section {
    /// The schema governing this section.
    pub fn schema(self) -> &'static SectionSchema {
        match self {
            Section::Data => &DataSection::SCHEMA,
            Section::Metadata => &MetadataSection::SCHEMA,
            Section::AssociatedData => &AssociatedDataSection::SCHEMA,
        }
    }
}

/// The what/when of an event.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataSection(Store);

impl DataSection {
    /// Schema: `start_time` and `name` are required.
    pub const SCHEMA: SectionSchema = SectionSchema {
        label: "data",
        required: &["start_time", "name"],
        attributes: &[
            AttributeSpec { name: "start_time", check: validate::time },
            AttributeSpec { name: "end_time", check: validate::time },
            AttributeSpec { name: "name", check: validate::string },
            AttributeSpec { name: "timezone", check: validate::timezone },
            AttributeSpec { name: "description", check: validate::string },
            AttributeSpec { name: "status", check: check_status },
            AttributeSpec { name: "url", check: validate::url },
            AttributeSpec { name: "virtual", check: validate::boolean },
        ],
    };

    /// Creates an empty section.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Inserts `value` under `key`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.set(key, value)
    }

    /// Chainable insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.set(key, value);
        self
    }

    /// The underlying store.
    pub fn store(&self) -> &Store {
        &self.0
    }

    /// The underlying store, mutably.
    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.0
    }

    /// Validates against [`DataSection::SCHEMA`].
    pub fn validate(&self) -> SectionReport {
        Self::SCHEMA.validate(&self.0)
    }
}

impl From<Store> for DataSection {
    fn from(store: Store) -> Self {
        Self(store)
    }
}

/// Provider bookkeeping for an event.
///
/// `uid`/`id` and `locale`/`language` are alias pairs; both spellings are
/// permitted so payloads from older adapters stay valid.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataSection(Store);

impl MetadataSection {
    /// Schema: nothing required.
    pub const SCHEMA: SectionSchema = SectionSchema {
        label: "metadata",
        required: &[],
        attributes: &[
            AttributeSpec { name: "uid", check: validate::string },
            AttributeSpec { name: "id", check: validate::string },
            AttributeSpec { name: "created_at", check: validate::time },
            AttributeSpec { name: "updated_at", check: validate::time },
            AttributeSpec { name: "locale", check: validate::language },
            AttributeSpec { name: "language", check: validate::language },
            AttributeSpec { name: "taxonomies", check: validate::all_strings },
        ],
    };

    /// Creates an empty section.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Inserts `value` under `key`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.set(key, value)
    }

    /// Chainable insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.set(key, value);
        self
    }

    /// The underlying store.
    pub fn store(&self) -> &Store {
        &self.0
    }

    /// The underlying store, mutably.
    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.0
    }

    /// Validates against [`MetadataSection::SCHEMA`].
    pub fn validate(&self) -> SectionReport {
        Self::SCHEMA.validate(&self.0)
    }
}

impl From<Store> for MetadataSection {
    fn from(store: Store) -> Self {
        Self(store)
    }
}

/// Structured extras attached to an event.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssociatedDataSection(Store);

impl AssociatedDataSection {
    /// Schema: every attribute optional, each with a nested shape check.
    pub const SCHEMA: SectionSchema = SectionSchema {
        label: "associated_data",
        required: &[],
        attributes: &[
            AttributeSpec { name: "location", check: check_location },
            AttributeSpec { name: "virtual_location", check: check_virtual_location },
            AttributeSpec { name: "organizer", check: check_organizer },
            AttributeSpec { name: "registrations", check: check_registrations },
        ],
    };

    /// Creates an empty section.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Inserts `value` under `key`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.set(key, value)
    }

    /// Chainable insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.set(key, value);
        self
    }

    /// The underlying store.
    pub fn store(&self) -> &Store {
        &self.0
    }

    /// The underlying store, mutably.
    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.0
    }

    /// Validates against [`AssociatedDataSection::SCHEMA`].
    pub fn validate(&self) -> SectionReport {
        Self::SCHEMA.validate(&self.0)
    }
}

impl From<Store> for AssociatedDataSection {
    fn from(store: Store) -> Self {
        Self(store)
    }
}

/// Aggregated validation outcome for an [`EventRecord`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventReport {
    /// No provider name, or an empty one.
    pub provider_missing: bool,
    /// The `data` section is absent entirely.
    pub data_missing: bool,
    /// Report for `data` (empty when the section is absent).
    pub data: SectionReport,
    /// Report for `metadata` (empty when the section is absent).
    pub metadata: SectionReport,
    /// Report for `associated_data` (empty when the section is absent).
    pub associated_data: SectionReport,
}

impl EventReport {
    /// Whether the record passed every check.
    pub fn is_valid(&self) -> bool {
        !self.provider_missing
            && !self.data_missing
            && self.data.is_valid()
            && self.metadata.is_valid()
            && self.associated_data.is_valid()
    }
}

impl fmt::Display for EventReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut problems = Vec::new();
        if self.provider_missing {
            problems.push("provider missing".to_string());
        }
        if self.data_missing {
            problems.push("data section missing".to_string());
        }
        for (label, report) in [
            ("data", &self.data),
            ("metadata", &self.metadata),
            ("associated_data", &self.associated_data),
        ] {
            if !report.missing.is_empty() {
                problems.push(format!("{label} missing: {}", report.missing.join(", ")));
            }
            if !report.unpermitted.is_empty() {
                problems.push(format!(
                    "{label} unpermitted: {}",
                    report.unpermitted.join(", ")
                ));
            }
            if !report.invalid.is_empty() {
                problems.push(format!("{label} invalid: {}", report.invalid.join(", ")));
            }
        }
        if problems.is_empty() {
            write!(f, "valid")
        } else {
            write!(f, "{}", problems.join("; "))
        }
    }
}

/// A provider-agnostic event.
///
/// Sections are optional so partially-built records can move through
/// normalization; [`EventRecord::valid`] requires a provider and a valid
/// `data` section, and validates the other sections only when present.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EventRecord {
    /// Name of the strategy that produced the event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// The what/when of the event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<DataSection>,
    /// Provider bookkeeping.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MetadataSection>,
    /// Structured extras.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub associated_data: Option<AssociatedDataSection>,
}

impl EventRecord {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the provider name.
    #[must_use]
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets the data section.
    #[must_use]
    pub fn with_data(mut self, data: DataSection) -> Self {
        self.data = Some(data);
        self
    }

    /// Sets the metadata section.
    #[must_use]
    pub fn with_metadata(mut self, metadata: MetadataSection) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Sets the associated data section.
    #[must_use]
    pub fn with_associated_data(mut self, associated_data: AssociatedDataSection) -> Self {
        self.associated_data = Some(associated_data);
        self
    }

    /// Validates the whole record.
    pub fn validate(&self) -> EventReport {
        EventReport {
            provider_missing: self.provider.as_deref().is_none_or(str::is_empty),
            data_missing: self.data.is_none(),
            data: self.data.as_ref().map(DataSection::validate).unwrap_or_default(),
            metadata: self
                .metadata
                .as_ref()
                .map(MetadataSection::validate)
                .unwrap_or_default(),
            associated_data: self
                .associated_data
                .as_ref()
                .map(AssociatedDataSection::validate)
                .unwrap_or_default(),
        }
    }

    /// Whether the record passes validation.
    pub fn valid(&self) -> bool {
        self.validate().is_valid()
    }

    /// Checks one attribute value against a section's schema.
    pub fn attribute_valid(section: Section, name: &str, value: &Value) -> bool {
        section.schema().attribute_valid(name, value)
    }

    /// Builds a record from a store.
    ///
    /// Reads `provider`, `data`, `metadata` and `associated_data`; any
    /// other keys are dropped. Sections that are not maps are treated as
    /// absent.
    pub fn from_store(mut store: Store) -> Self {
        let provider = match store.remove("provider") {
            Some(Value::String(s)) => Some(s),
            _ => None,
        };
        let data = match store.remove("data") {
            Some(Value::Map(map)) => Some(DataSection::from(map)),
            _ => None,
        };
        let metadata = match store.remove("metadata") {
            Some(Value::Map(map)) => Some(MetadataSection::from(map)),
            _ => None,
        };
        let associated_data = match store.remove("associated_data") {
            Some(Value::Map(map)) => Some(AssociatedDataSection::from(map)),
            _ => None,
        };
        Self {
            provider,
            data,
            metadata,
            associated_data,
        }
    }

    /// Converts the record into a store with canonical key order.
    pub fn to_store(&self) -> Store {
        let mut store = Store::new();
        if let Some(provider) = &self.provider {
            store.set("provider", provider.as_str());
        }
        if let Some(data) = &self.data {
            store.set("data", data.store().clone());
        }
        if let Some(metadata) = &self.metadata {
            store.set("metadata", metadata.store().clone());
        }
        if let Some(associated_data) = &self.associated_data {
            store.set("associated_data", associated_data.store().clone());
        }
        store
    }

    /// Builds a record from a JSON value. Non-object input yields an
    /// empty record.
    pub fn from_value(value: serde_json::Value) -> Self {
        match Value::from(value) {
            Value::Map(store) => Self::from_store(store),
            _ => Self::new(),
        }
    }

    /// Converts the record into a JSON value.
    pub fn to_value(&self) -> serde_json::Value {
        Value::Map(self.to_store()).into()
    }
}
