//! Attribute validators.
//!
//! Small predicates over [`Value`] used by section schemas. Each returns
//! `bool` rather than an error: validation is a query, and the schema layer
//! aggregates the failures into a report.
//!
//! String-shaped checks fail on non-string input instead of panicking.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::codes;
use crate::store::Value;

/// Latitude in decimal degrees, -90 to 90, as a string.
static LATITUDE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?([1-8]?\d(?:\.\d{1,})?|90(?:\.0{1,6})?)$").expect("Invalid latitude regex")
});

/// Longitude in decimal degrees, -180 to 180, as a string.
static LONGITUDE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?((?:1[0-7]|[1-9])?\d(?:\.\d{1,})?|180(?:\.0{1,})?)$")
        .expect("Invalid longitude regex")
});

/// RFC 5322 addr-spec, the common mailbox subset.
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("Invalid email regex")
});

/// Whether the value is an RFC 3339 timestamp string.
pub fn time(value: &Value) -> bool {
    value
        .as_str()
        .is_some_and(|s| chrono::DateTime::parse_from_rfc3339(s).is_ok())
}

/// Whether the value is an IANA timezone name such as `Australia/Perth`.
pub fn timezone(value: &Value) -> bool {
    value.as_str().is_some_and(|s| s.parse::<chrono_tz::Tz>().is_ok())
}

/// Whether the value is an ISO 639-1 language code.
pub fn language(value: &Value) -> bool {
    value.as_str().is_some_and(codes::is_language)
}

/// Whether the value is an ISO 3166-1 alpha-2 country code.
pub fn country(value: &Value) -> bool {
    value.as_str().is_some_and(codes::is_country)
}

/// Whether the value is a latitude string in range.
pub fn latitude(value: &Value) -> bool {
    value.as_str().is_some_and(|s| LATITUDE_RE.is_match(s))
}

/// Whether the value is a longitude string in range.
pub fn longitude(value: &Value) -> bool {
    value.as_str().is_some_and(|s| LONGITUDE_RE.is_match(s))
}

/// Whether the value is an email address.
pub fn email(value: &Value) -> bool {
    value.as_str().is_some_and(|s| EMAIL_RE.is_match(s))
}

/// Whether the value is an absolute `http`/`https` URL.
pub fn url(value: &Value) -> bool {
    value.as_str().is_some_and(|s| {
        Url::parse(s).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
    })
}

/// Whether the value is a string.
pub fn string(value: &Value) -> bool {
    matches!(value, Value::String(_))
}

/// Whether the value is a boolean.
pub fn boolean(value: &Value) -> bool {
    matches!(value, Value::Bool(_))
}

/// Whether the value is a list whose members are all strings.
pub fn all_strings(value: &Value) -> bool {
    value
        .as_list()
        .is_some_and(|items| items.iter().all(|item| matches!(item, Value::String(_))))
}

/// Whether the value is one of the allowed strings.
pub fn one_of(value: &Value, allowed: &[&str]) -> bool {
    value.as_str().is_some_and(|s| allowed.contains(&s))
}
