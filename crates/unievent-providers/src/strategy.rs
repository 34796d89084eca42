//! Strategy trait definition.
//!
//! This module defines the [`Strategy`] trait, the core abstraction for
//! event provider adapters (ticketing platforms, calendar backends, ...).
//!
//! Strategies are responsible for:
//! - Turning provider payloads into [`EventRecord`]s
//! - Handling authorization (the default flow copies a `token` option)
//! - Declaring which operations they support via [`Strategy::capabilities`]
//!
//! Shared state lives in an embedded [`StrategyCore`]; the trait's default
//! methods implement the common behavior so a minimal strategy only writes
//! the operations it supports.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use unievent_core::EventRecord;

use crate::error::{Error, Result};
use crate::options::Options;

/// An event operation a strategy can be asked to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// List events, subject to the caller's filters.
    ListEvents,
    /// Create an event from a validated record.
    CreateEvent,
    /// Update an existing event.
    UpdateEvent,
    /// Destroy an existing event.
    DestroyEvent,
}

impl Operation {
    /// Every operation, in dispatch order.
    pub const ALL: &'static [Operation] = &[
        Operation::ListEvents,
        Operation::CreateEvent,
        Operation::UpdateEvent,
        Operation::DestroyEvent,
    ];

    /// The snake-case wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::ListEvents => "list_events",
            Operation::CreateEvent => "create_event",
            Operation::UpdateEvent => "update_event",
            Operation::DestroyEvent => "destroy_event",
        }
    }

    /// Whether the operation takes an event payload.
    pub fn is_mutation(self) -> bool {
        matches!(
            self,
            Operation::CreateEvent | Operation::UpdateEvent | Operation::DestroyEvent
        )
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "list_events" => Ok(Operation::ListEvents),
            "create_event" => Ok(Operation::CreateEvent),
            "update_event" => Ok(Operation::UpdateEvent),
            "destroy_event" => Ok(Operation::DestroyEvent),
            other => Err(Error::argument(format!("unknown operation {other}"))),
        }
    }
}

/// Result of a dispatched operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Response {
    /// Events returned by a listing.
    Events(Vec<EventRecord>),
    /// The event produced by a create or update.
    Event(EventRecord),
    /// Whether a destroy took effect.
    Destroyed(bool),
}

/// Registration record for a strategy.
///
/// The explicit table entry replaces name-based reflection: the hub knows
/// a strategy through its key, its declared positional argument names, and
/// a factory function.
#[derive(Debug, Clone, Copy)]
pub struct StrategyInfo {
    /// Snake-case key the strategy registers under (`"developer"`).
    pub key: &'static str,
    /// Option names that positional activation arguments map onto, in
    /// order.
    pub args: &'static [&'static str],
    /// Builds the strategy from already-resolved options.
    pub build: fn(Options) -> Result<Box<dyn Strategy>>,
}

/// Shared state every strategy embeds.
#[derive(Debug, Clone)]
pub struct StrategyCore {
    default_name: String,
    options: Options,
    token: Option<String>,
}

impl StrategyCore {
    /// Creates the core for a strategy.
    ///
    /// Instance `options` deep-merge over the strategy's `default_options`,
    /// and `name` is seeded with `key` when the merge left it unset.
    pub fn new(key: &str, default_options: Options, options: Options) -> Self {
        let mut merged = default_options.deep_merged(&options);
        if merged.name().is_none() {
            merged.set("name", key);
        }
        Self {
            default_name: key.to_string(),
            options: merged,
            token: None,
        }
    }

    /// The display name: the `name` option when set, else the key.
    ///
    /// Looked up live, so later option merges show through.
    pub fn name(&self) -> &str {
        self.options.name().unwrap_or(&self.default_name)
    }

    /// The resolved options.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The resolved options, mutably.
    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    /// Deep-merges `overlay` over the current options.
    pub fn merge(&mut self, overlay: &Options) {
        self.options.deep_merge(overlay);
    }

    /// The credential obtained by authorization, if any.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Stores a credential.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }
}

/// An event provider adapter.
pub trait Strategy: Send {
    /// The registration record for this strategy.
    fn info(&self) -> &'static StrategyInfo;

    /// Shared state.
    fn core(&self) -> &StrategyCore;

    /// Shared state, mutably.
    fn core_mut(&mut self) -> &mut StrategyCore;

    /// The display name (live lookup through the options).
    fn name(&self) -> &str {
        self.core().name()
    }

    /// Operations this strategy supports. Dispatch refuses anything else.
    fn capabilities(&self) -> &'static [Operation] {
        Operation::ALL
    }

    /// Deep-merges call options over the strategy's options.
    fn merge_options(&mut self, overlay: &Options) {
        self.core_mut().merge(overlay);
    }

    /// Validates the merged options before an operation runs.
    ///
    /// The default checks that `from_time` and `to_time`, when present,
    /// are RFC 3339 timestamps.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Argument`] when an option is malformed.
    fn validate_options(&self) -> Result<()> {
        let options = self.core().options();
        for key in ["from_time", "to_time"] {
            let Some(value) = options.get(key) else {
                continue;
            };
            if value.is_empty() {
                continue;
            }
            let ok = value
                .as_str()
                .is_some_and(|s| chrono::DateTime::parse_from_rfc3339(s).is_ok());
            if !ok {
                return Err(Error::argument(format!(
                    "option {key} must be an RFC 3339 timestamp"
                )));
            }
        }
        Ok(())
    }

    /// Obtains a credential.
    ///
    /// The default copies a non-empty `token` option into the core. Real
    /// strategies override this with their provider's flow. Failing to
    /// produce a credential is not an error: dispatch checks
    /// [`Strategy::authorized`] afterwards and silently skips the
    /// operation.
    ///
    /// # Errors
    ///
    /// Implementations return an error only when the attempt itself
    /// breaks, not when it merely yields no credential.
    fn authorize(&mut self) -> Result<()> {
        let token = self.core().options().token().map(ToString::to_string);
        if let Some(token) = token {
            self.core_mut().set_token(token);
        }
        Ok(())
    }

    /// Whether authorization produced a credential.
    fn authorized(&self) -> bool {
        self.core().token().is_some()
    }

    /// Lists events.
    ///
    /// # Errors
    ///
    /// The default returns [`Error::NotImplemented`].
    fn list_events(&mut self, _options: &Options) -> Result<Vec<EventRecord>> {
        Err(Error::not_implemented(
            self.name(),
            Operation::ListEvents.as_str(),
        ))
    }

    /// Creates an event.
    ///
    /// # Errors
    ///
    /// The default returns [`Error::NotImplemented`].
    fn create_event(&mut self, _options: &Options, _event: EventRecord) -> Result<EventRecord> {
        Err(Error::not_implemented(
            self.name(),
            Operation::CreateEvent.as_str(),
        ))
    }

    /// Updates an event.
    ///
    /// # Errors
    ///
    /// The default returns [`Error::NotImplemented`].
    fn update_event(&mut self, _options: &Options, _event: EventRecord) -> Result<EventRecord> {
        Err(Error::not_implemented(
            self.name(),
            Operation::UpdateEvent.as_str(),
        ))
    }

    /// Destroys an event.
    ///
    /// # Errors
    ///
    /// The default returns [`Error::NotImplemented`].
    fn destroy_event(&mut self, _options: &Options, _event: EventRecord) -> Result<bool> {
        Err(Error::not_implemented(
            self.name(),
            Operation::DestroyEvent.as_str(),
        ))
    }
}
