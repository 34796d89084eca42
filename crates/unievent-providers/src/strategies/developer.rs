//! Developer strategy.
//!
//! A fixture-backed strategy for testing pipelines end to end without a
//! real provider. Events come from an embedded JSON fixture, or from a
//! file named by the `uri` option:
//!
//! ```ignore
//! Builder::new(&mut hub)
//!     .provider("developer")?;
//! // or point it at your own fixture:
//! Builder::new(&mut hub)
//!     .provider_with_args("developer", vec![Value::from("/path/to/events.json")])?;
//! ```
//!
//! Authorization always succeeds; there is no credential flow to test.
//! The raw fixture shape mimics a typical provider payload (camelCase
//! location keys, split address lines, loose time formats) so the
//! normalization path gets exercised.

use chrono::{NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use tracing::debug;
use unievent_core::{
    AssociatedDataSection, DataSection, EventRecord, MetadataSection, SectionSchema, Store, Value,
};

use crate::error::{Error, Result};
use crate::options::Options;
use crate::strategy::{Strategy, StrategyCore, StrategyInfo};

/// Bundled fixture with one physical and one virtual event.
const DEFAULT_FIXTURE: &str = include_str!("fixtures/list_events.json");

/// Registration record for the developer strategy.
pub static INFO: StrategyInfo = StrategyInfo {
    key: "developer",
    args: &["uri"],
    build: DeveloperStrategy::build,
};

/// Maps raw provider location keys onto the normalized ones. Repeated
/// `address` targets concatenate with a single space, in raw order.
const LOCATION_KEY_MAP: &[(&str, &str)] = &[
    ("countryCode", "country"),
    ("latitude", "latitude"),
    ("longitude", "longitude"),
    ("address1", "address"),
    ("address2", "address"),
    ("address3", "address"),
    ("city", "city"),
    ("postalCode", "postal_code"),
];

/// The fixture-backed strategy.
pub struct DeveloperStrategy {
    core: StrategyCore,
}

impl DeveloperStrategy {
    fn build(options: Options) -> Result<Box<dyn Strategy>> {
        Ok(Box::new(Self {
            core: StrategyCore::new(INFO.key, Options::new(), options),
        }))
    }

    /// Loads and parses the fixture events.
    fn raw_events(&self) -> Result<Vec<Store>> {
        let text = match self.core.options().uri() {
            Some(path) => {
                debug!(path = %path, "loading developer fixture");
                std::fs::read_to_string(path).map_err(|e| {
                    Error::strategy(self.name(), format!("could not read fixture {path}"))
                        .with_source(e)
                })?
            }
            None => DEFAULT_FIXTURE.to_string(),
        };

        let json: serde_json::Value = serde_json::from_str(&text)
            .map_err(|e| Error::strategy(self.name(), "fixture is not valid JSON").with_source(e))?;
        let Value::Map(root) = Value::from(json) else {
            return Err(Error::strategy(self.name(), "fixture must be a JSON object"));
        };
        let Some(Value::List(items)) = root.get("events") else {
            return Err(Error::strategy(self.name(), "fixture has no events list"));
        };

        let mut events = Vec::with_capacity(items.len());
        for item in items {
            match item.as_map() {
                Some(map) => events.push(map.clone()),
                None => {
                    return Err(Error::strategy(self.name(), "fixture events must be objects"));
                }
            }
        }
        Ok(events)
    }

    /// Normalizes one raw fixture event into an [`EventRecord`].
    fn event_record(&self, raw: &Store) -> EventRecord {
        let mut data = DataSection::from(slice_permitted(raw, &DataSection::SCHEMA));
        for key in ["start_time", "end_time"] {
            if let Some(value) = data.get(key) {
                let normalized = format_time(value);
                data.set(key, normalized);
            }
        }

        let mut metadata = MetadataSection::from(slice_permitted(raw, &MetadataSection::SCHEMA));
        for key in ["created_at", "updated_at"] {
            if let Some(value) = metadata.get(key) {
                let normalized = format_time(value);
                metadata.set(key, normalized);
            }
        }
        if metadata.get("uid").is_none_or(Value::is_empty) {
            if let Some(id) = raw.get("id").and_then(Value::as_str) {
                metadata.set("uid", id);
            }
        }

        let mut associated_data = AssociatedDataSection::new();
        if let Some(location) = raw.get("location").and_then(Value::as_map) {
            associated_data.set("location", map_location(location));
        }
        if let Some(virtual_location) = raw.get("virtual_location") {
            associated_data.set("virtual_location", virtual_location.clone());
        }

        let mut record = EventRecord::new()
            .with_provider(self.name())
            .with_data(data)
            .with_metadata(metadata);
        if !associated_data.store().is_empty() {
            record = record.with_associated_data(associated_data);
        }
        record
    }

    /// Whether `record` passes the caller's listing filters.
    fn retain(&self, record: &EventRecord) -> bool {
        let options = self.core.options();
        let start = record
            .data
            .as_ref()
            .and_then(|data| data.get("start_time"))
            .and_then(Value::as_str)
            .and_then(parse_instant);

        if let Some(from) = options.from_time().and_then(parse_instant) {
            match start {
                Some(instant) if instant >= from => {}
                _ => return false,
            }
        }
        if let Some(to) = options.to_time().and_then(parse_instant) {
            match start {
                Some(instant) if instant <= to => {}
                _ => return false,
            }
        }
        if let Some(pattern) = options.match_name() {
            let pattern = pattern.to_lowercase();
            let matched = record
                .data
                .as_ref()
                .and_then(|data| data.get("name"))
                .and_then(Value::as_str)
                .is_some_and(|name| name.to_lowercase().contains(&pattern));
            if !matched {
                return false;
            }
        }
        true
    }
}

impl Strategy for DeveloperStrategy {
    fn info(&self) -> &'static StrategyInfo {
        &INFO
    }

    fn core(&self) -> &StrategyCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut StrategyCore {
        &mut self.core
    }

    fn authorize(&mut self) -> Result<()> {
        // No credential flow to exercise.
        self.core.set_token("developer-token");
        Ok(())
    }

    fn list_events(&mut self, _options: &Options) -> Result<Vec<EventRecord>> {
        let mut records = Vec::new();
        for raw in self.raw_events()? {
            let record = self.event_record(&raw);
            if self.retain(&record) {
                records.push(record);
            }
        }
        Ok(records)
    }

    fn create_event(&mut self, _options: &Options, mut event: EventRecord) -> Result<EventRecord> {
        let provider = self.name().to_string();
        let now = Utc::now();
        if event.provider.is_none() {
            event.provider = Some(provider);
        }
        let metadata = event.metadata.get_or_insert_with(MetadataSection::new);
        if metadata.get("uid").is_none_or(Value::is_empty) {
            metadata.set("uid", format!("developer-{}", now.timestamp_micros()));
        }
        metadata.set("created_at", now.to_rfc3339_opts(SecondsFormat::Secs, true));
        Ok(event)
    }

    fn update_event(&mut self, _options: &Options, mut event: EventRecord) -> Result<EventRecord> {
        let metadata = event.metadata.get_or_insert_with(MetadataSection::new);
        metadata.set(
            "updated_at",
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        );
        Ok(event)
    }

    fn destroy_event(&mut self, _options: &Options, _event: EventRecord) -> Result<bool> {
        Ok(true)
    }
}

/// Copies the attributes a schema permits, skipping empty values.
fn slice_permitted(raw: &Store, schema: &SectionSchema) -> Store {
    let mut sliced = Store::new();
    for spec in schema.attributes {
        if let Some(value) = raw.get(spec.name) {
            if !value.is_empty() {
                sliced.set(spec.name, value.clone());
            }
        }
    }
    sliced
}

/// Applies [`LOCATION_KEY_MAP`] to a raw location, in raw key order.
fn map_location(raw: &Store) -> Store {
    let mut location = Store::new();
    for (raw_key, value) in raw.iter() {
        let Some((_, target)) = LOCATION_KEY_MAP.iter().find(|(from, _)| *from == raw_key) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        let existing = location
            .get(*target)
            .and_then(Value::as_str)
            .map(ToString::to_string);
        match (existing, value.as_str()) {
            (Some(existing), Some(incoming)) if *target == "address" => {
                location.set(*target, format!("{existing} {incoming}"));
            }
            (_, Some(incoming)) => {
                location.set(*target, incoming);
            }
            (_, None) => {
                location.set(*target, value.clone());
            }
        }
    }
    location
}

/// Normalizes loose provider time formats to RFC 3339.
///
/// Already-valid timestamps pass through untouched; date-only values
/// become midnight UTC; `YYYY-MM-DD HH:MM:SS` values are taken as UTC.
/// Anything else is left alone for validation to flag.
fn format_time(value: &Value) -> Value {
    let Some(text) = value.as_str() else {
        return value.clone();
    };
    if chrono::DateTime::parse_from_rfc3339(text).is_ok() {
        return value.clone();
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Value::from(
                Utc.from_utc_datetime(&midnight)
                    .to_rfc3339_opts(SecondsFormat::Secs, true),
            );
        }
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Value::from(
            Utc.from_utc_datetime(&naive)
                .to_rfc3339_opts(SecondsFormat::Secs, true),
        );
    }
    value.clone()
}

fn parse_instant(text: &str) -> Option<chrono::DateTime<chrono::FixedOffset>> {
    chrono::DateTime::parse_from_rfc3339(text).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn developer(options: Options) -> DeveloperStrategy {
        DeveloperStrategy {
            core: StrategyCore::new(INFO.key, Options::new(), options),
        }
    }

    fn listed(options: Options) -> Vec<EventRecord> {
        let mut strategy = developer(options);
        strategy.list_events(&Options::new()).unwrap()
    }

    mod normalization {
        use super::*;

        #[test]
        fn embedded_fixture_lists_two_valid_events() {
            let events = listed(Options::new());
            assert_eq!(events.len(), 2);
            for event in &events {
                assert!(event.valid(), "{}", event.validate());
                assert_eq!(event.provider.as_deref(), Some("developer"));
            }
        }

        #[test]
        fn order_follows_fixture() {
            let events = listed(Options::new());
            let names: Vec<&str> = events
                .iter()
                .map(|e| {
                    e.data
                        .as_ref()
                        .and_then(|d| d.get("name"))
                        .and_then(Value::as_str)
                        .unwrap()
                })
                .collect();
            assert_eq!(names, vec!["Perth Launch Party", "Remote Planning Session"]);
        }

        #[test]
        fn location_key_map() {
            let events = listed(Options::new());
            let location = events[0]
                .associated_data
                .as_ref()
                .and_then(|a| a.get("location"))
                .and_then(Value::as_map)
                .unwrap();
            assert_eq!(location.get("country").and_then(Value::as_str), Some("AU"));
            assert_eq!(
                location.get("postal_code").and_then(Value::as_str),
                Some("6000")
            );
            assert_eq!(
                location.get("address").and_then(Value::as_str),
                Some("21 Mounts Bay Rd")
            );
            assert!(!location.contains("countryCode"));
        }

        #[test]
        fn uid_comes_from_raw_id() {
            let events = listed(Options::new());
            let metadata = events[0].metadata.as_ref().unwrap();
            assert_eq!(metadata.get("uid").and_then(Value::as_str), Some("1001"));
            assert_eq!(metadata.get("id").and_then(Value::as_str), Some("1001"));
        }

        #[test]
        fn date_only_times_become_midnight_utc() {
            let events = listed(Options::new());
            let data = events[1].data.as_ref().unwrap();
            assert_eq!(
                data.get("start_time").and_then(Value::as_str),
                Some("2024-06-15T00:00:00Z")
            );
            let metadata = events[1].metadata.as_ref().unwrap();
            assert_eq!(
                metadata.get("created_at").and_then(Value::as_str),
                Some("2024-05-20T00:00:00Z")
            );
        }

        #[test]
        fn offset_times_pass_through() {
            let events = listed(Options::new());
            let data = events[0].data.as_ref().unwrap();
            assert_eq!(
                data.get("start_time").and_then(Value::as_str),
                Some("2024-06-01T18:00:00+08:00")
            );
        }

        #[test]
        fn virtual_location_passthrough() {
            let events = listed(Options::new());
            let entry_points = events[1]
                .associated_data
                .as_ref()
                .and_then(|a| a.store().get_path("virtual_location.entry_points"))
                .and_then(Value::as_list)
                .unwrap();
            assert_eq!(entry_points.len(), 1);
            assert_eq!(
                entry_points[0].as_map().and_then(|m| m.get("type")).and_then(Value::as_str),
                Some("video")
            );
        }

        #[test]
        fn unpermitted_raw_keys_dropped() {
            let events = listed(Options::new());
            let data = events[0].data.as_ref().unwrap();
            assert!(!data.store().contains("id"));
            assert!(!data.store().contains("location"));
        }
    }

    mod filters {
        use super::*;

        #[test]
        fn from_time_drops_earlier_events() {
            let events = listed(
                Options::new().with_option("from_time", "2024-06-10T00:00:00Z"),
            );
            assert_eq!(events.len(), 1);
            assert_eq!(
                events[0].data.as_ref().and_then(|d| d.get("name")).and_then(Value::as_str),
                Some("Remote Planning Session")
            );
        }

        #[test]
        fn to_time_drops_later_events() {
            let events = listed(Options::new().with_option("to_time", "2024-06-10T00:00:00Z"));
            assert_eq!(events.len(), 1);
            assert_eq!(
                events[0].data.as_ref().and_then(|d| d.get("name")).and_then(Value::as_str),
                Some("Perth Launch Party")
            );
        }

        #[test]
        fn match_name_is_case_insensitive() {
            let events = listed(Options::new().with_option("match_name", "LAUNCH"));
            assert_eq!(events.len(), 1);
            assert_eq!(
                events[0].data.as_ref().and_then(|d| d.get("name")).and_then(Value::as_str),
                Some("Perth Launch Party")
            );
        }

        #[test]
        fn no_filters_returns_everything() {
            assert_eq!(listed(Options::new()).len(), 2);
        }

        #[test]
        fn combined_filters() {
            let events = listed(
                Options::new()
                    .with_option("from_time", "2024-01-01T00:00:00Z")
                    .with_option("match_name", "planning"),
            );
            assert_eq!(events.len(), 1);
        }
    }

    mod fixtures {
        use super::*;
        use std::io::Write as _;

        #[test]
        fn custom_fixture_via_uri_option() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            write!(
                file,
                r#"{{"events": [{{"id": "7", "name": "Custom", "start_time": "2024-08-01T10:00:00Z"}}]}}"#
            )
            .unwrap();

            let events = listed(
                Options::new().with_option("uri", file.path().to_string_lossy().to_string()),
            );
            assert_eq!(events.len(), 1);
            assert_eq!(
                events[0].metadata.as_ref().unwrap().get("uid").and_then(Value::as_str),
                Some("7")
            );
        }

        #[test]
        fn raw_uid_wins_over_id() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            write!(
                file,
                r#"{{"events": [{{"id": "9", "uid": "stable-9", "name": "Keyed", "start_time": "2024-08-01T10:00:00Z"}}]}}"#
            )
            .unwrap();

            let events = listed(
                Options::new().with_option("uri", file.path().to_string_lossy().to_string()),
            );
            assert_eq!(
                events[0].metadata.as_ref().unwrap().get("uid").and_then(Value::as_str),
                Some("stable-9")
            );
        }

        #[test]
        fn missing_fixture_file() {
            let mut strategy =
                developer(Options::new().with_option("uri", "/nonexistent/events.json"));
            let err = strategy.list_events(&Options::new()).unwrap_err();
            assert!(matches!(err, Error::Strategy { .. }));
        }

        #[test]
        fn fixture_without_events_list() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            write!(file, r#"{{"items": []}}"#).unwrap();
            let mut strategy = developer(
                Options::new().with_option("uri", file.path().to_string_lossy().to_string()),
            );
            let err = strategy.list_events(&Options::new()).unwrap_err();
            assert!(err.to_string().contains("no events list"));
        }
    }

    mod mutations {
        use super::*;

        fn new_event() -> EventRecord {
            EventRecord::new().with_provider("developer").with_data(
                DataSection::new()
                    .with("start_time", "2024-09-01T10:00:00Z")
                    .with("name", "Fresh event"),
            )
        }

        #[test]
        fn create_stamps_uid_and_created_at() {
            let mut strategy = developer(Options::new());
            let created = strategy.create_event(&Options::new(), new_event()).unwrap();
            let metadata = created.metadata.as_ref().unwrap();
            assert!(metadata.get("uid").and_then(Value::as_str).is_some());
            assert!(metadata.get("created_at").is_some_and(|v| !v.is_empty()));
            assert!(created.valid());
        }

        #[test]
        fn create_keeps_existing_uid() {
            let mut strategy = developer(Options::new());
            let event = new_event().with_metadata(MetadataSection::new().with("uid", "keep-me"));
            let created = strategy.create_event(&Options::new(), event).unwrap();
            assert_eq!(
                created.metadata.as_ref().unwrap().get("uid").and_then(Value::as_str),
                Some("keep-me")
            );
        }

        #[test]
        fn update_stamps_updated_at() {
            let mut strategy = developer(Options::new());
            let updated = strategy.update_event(&Options::new(), new_event()).unwrap();
            assert!(
                updated
                    .metadata
                    .as_ref()
                    .unwrap()
                    .get("updated_at")
                    .is_some_and(|v| !v.is_empty())
            );
        }

        #[test]
        fn destroy_acknowledges() {
            let mut strategy = developer(Options::new());
            assert!(strategy.destroy_event(&Options::new(), new_event()).unwrap());
        }
    }

    mod authorization {
        use super::*;

        #[test]
        fn authorize_always_succeeds() {
            let mut strategy = developer(Options::new());
            assert!(!strategy.authorized());
            strategy.authorize().unwrap();
            assert!(strategy.authorized());
        }
    }
}
