//! Strategy registry and dispatch.
//!
//! The [`Hub`] owns everything the strategy layer needs: the resolution
//! [`Config`], the table of known strategies, and the activations produced
//! by the [`Builder`](crate::builder::Builder). There is no process-global
//! state; hosts create as many hubs as they need.
//!
//! A strategy moves through three states:
//! - **declared**: the name is known, but no factory was registered
//! - **registered**: a [`StrategyInfo`] with a factory is in the table
//! - **activated**: the builder installed an [`Activation`] recipe
//!
//! Dispatch instantiates a fresh strategy per request: activation options
//! plus positional args feed the factory, the configure hook runs, call
//! options deep-merge on top, then authorize gates the operation. A
//! strategy that ends up unauthorized is skipped silently: the request
//! returns `Ok(None)` and only a debug event records why.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;
use unievent_core::{EventRecord, Value};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::options::Options;
use crate::strategy::{Operation, Response, Strategy, StrategyInfo};

/// How a strategy name is known to the hub.
#[derive(Debug, Clone, Copy)]
pub enum Registration {
    /// The name exists in the ecosystem but no factory is compiled in.
    Declared,
    /// A registered strategy with a factory.
    Included(StrategyInfo),
}

/// Closure run against the options after a strategy is constructed.
pub type ConfigureHook = Arc<dyn Fn(&mut Options) + Send + Sync>;

/// A configured instance recipe for a registered strategy.
#[derive(Clone)]
pub struct Activation {
    pub(crate) info: StrategyInfo,
    pub(crate) args: Vec<Value>,
    pub(crate) options: Options,
    pub(crate) configure: Option<ConfigureHook>,
}

impl Activation {
    /// Creates an activation with no arguments or options.
    pub fn new(info: StrategyInfo) -> Self {
        Self {
            info,
            args: Vec::new(),
            options: Options::new(),
            configure: None,
        }
    }

    /// Builder: set positional arguments.
    #[must_use]
    pub fn with_args(mut self, args: Vec<Value>) -> Self {
        self.args = args;
        self
    }

    /// Builder: set activation options.
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Builder: set the configure hook.
    #[must_use]
    pub fn with_configure(mut self, configure: ConfigureHook) -> Self {
        self.configure = Some(configure);
        self
    }

    /// Builds a fresh strategy instance from this recipe.
    fn instantiate(&self) -> Result<Box<dyn Strategy>> {
        if self.args.len() > self.info.args.len() {
            return Err(Error::argument(format!(
                "strategy {} takes at most {} positional arguments, got {}",
                self.info.key,
                self.info.args.len(),
                self.args.len()
            )));
        }

        let mut options = self.options.clone();
        for (name, value) in self.info.args.iter().zip(self.args.iter()) {
            options.set(*name, value.clone());
        }

        let mut strategy = (self.info.build)(options)?;
        if let Some(configure) = &self.configure {
            configure(strategy.core_mut().options_mut());
        }
        strategy.validate_options()?;
        Ok(strategy)
    }
}

impl fmt::Debug for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Activation")
            .field("key", &self.info.key)
            .field("args", &self.args)
            .field("options", &self.options)
            .field("configure", &self.configure.as_ref().map(|_| "<hook>"))
            .finish()
    }
}

/// The strategy registry and dispatcher.
#[derive(Debug, Default)]
pub struct Hub {
    config: Config,
    known: HashMap<String, Registration>,
    active: HashMap<String, Activation>,
}

impl Hub {
    /// Creates a hub with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: replace the configuration.
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// The resolution configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The resolution configuration, mutably.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Registers a strategy with its factory.
    pub fn register(&mut self, info: StrategyInfo) {
        let resolved = self.config.resolve(info.key);
        debug!(strategy = %resolved, key = info.key, "registered strategy");
        self.known.insert(resolved, Registration::Included(info));
    }

    /// Declares a strategy name without a factory.
    ///
    /// Declaring never downgrades an existing registration.
    pub fn declare(&mut self, key: &str) {
        let resolved = self.config.resolve(key);
        self.known.entry(resolved).or_insert(Registration::Declared);
    }

    /// Known strategy names (declared and registered), sorted.
    pub fn known_strategies(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.known.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Activated strategy names, sorted.
    pub fn active_strategies(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.active.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Whether `provider` resolves to an activated strategy.
    pub fn is_active(&self, provider: &str) -> bool {
        self.active.contains_key(&self.config.resolve(provider))
    }

    pub(crate) fn registration(&self, resolved: &str) -> Option<&Registration> {
        self.known.get(resolved)
    }

    pub(crate) fn install(&mut self, resolved: String, activation: Activation) {
        debug!(strategy = %resolved, "activated strategy");
        self.active.insert(resolved, activation);
    }

    /// Builds a fresh strategy instance for `provider`.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingStrategy`] when the key resolves to nothing known
    /// - [`Error::StrategyNotConfigured`] when the strategy was never
    ///   activated
    /// - [`Error::Argument`] when activation arguments or options are
    ///   malformed
    pub fn instantiate(&self, provider: &str) -> Result<Box<dyn Strategy>> {
        let resolved = self.config.resolve(provider);
        if !self.known.contains_key(&resolved) {
            debug!(provider, resolved = %resolved, "no matching strategy");
            return Err(Error::missing_strategy(provider));
        }
        let Some(activation) = self.active.get(&resolved) else {
            debug!(provider, resolved = %resolved, "strategy not configured");
            return Err(Error::not_configured(provider));
        };
        activation.instantiate()
    }

    /// Dispatches `operation` to the strategy behind `provider`.
    ///
    /// Mutation operations read their event payload from the `event` key
    /// of `call_options`; [`Operation::CreateEvent`] additionally requires
    /// the payload to be valid. The remaining call options deep-merge over
    /// the strategy's options before validation and authorization.
    ///
    /// Returns `Ok(None)` when authorization yields no credential; the
    /// operation method is not invoked in that case.
    ///
    /// # Errors
    ///
    /// Resolution errors from [`Hub::instantiate`], [`Error::Argument`]
    /// for malformed calls, [`Error::NotImplemented`] when the operation
    /// is outside the strategy's capabilities, and whatever the strategy
    /// itself returns.
    pub fn request(
        &self,
        provider: &str,
        operation: Operation,
        call_options: Options,
    ) -> Result<Option<Response>> {
        if provider.is_empty() {
            return Err(Error::argument("provider key must not be empty"));
        }

        let mut call_options = call_options;
        let event = if operation.is_mutation() {
            let Some(event) = call_options.take_event() else {
                return Err(Error::argument(format!(
                    "{operation} requires an event payload under the event key"
                )));
            };
            if operation == Operation::CreateEvent {
                let report = event.validate();
                if !report.is_valid() {
                    return Err(Error::argument(format!("event is not valid: {report}")));
                }
            }
            Some(event)
        } else {
            None
        };

        let mut strategy = self.instantiate(provider)?;
        strategy.merge_options(&call_options);
        strategy.validate_options()?;

        strategy.authorize()?;
        if !strategy.authorized() {
            debug!(
                strategy = %strategy.name(),
                operation = %operation,
                "authorization yielded no credential, skipping"
            );
            return Ok(None);
        }

        if !strategy.capabilities().contains(&operation) {
            return Err(Error::not_implemented(strategy.name(), operation.as_str()));
        }

        let response = match (operation, event) {
            (Operation::ListEvents, _) => {
                Response::Events(strategy.list_events(&call_options)?)
            }
            (Operation::CreateEvent, Some(event)) => {
                Response::Event(strategy.create_event(&call_options, event)?)
            }
            (Operation::UpdateEvent, Some(event)) => {
                Response::Event(strategy.update_event(&call_options, event)?)
            }
            (Operation::DestroyEvent, Some(event)) => {
                Response::Destroyed(strategy.destroy_event(&call_options, event)?)
            }
            // Mutations extracted their payload above.
            (operation, None) => {
                return Err(Error::argument(format!(
                    "{operation} requires an event payload under the event key"
                )));
            }
        };
        Ok(Some(response))
    }

    /// Lists events through `provider`.
    ///
    /// # Errors
    ///
    /// See [`Hub::request`].
    pub fn list_events(
        &self,
        provider: &str,
        options: Options,
    ) -> Result<Option<Vec<EventRecord>>> {
        match self.request(provider, Operation::ListEvents, options)? {
            Some(Response::Events(events)) => Ok(Some(events)),
            Some(_) => Err(Error::strategy(
                provider,
                "returned the wrong response shape for list_events",
            )),
            None => Ok(None),
        }
    }

    /// Creates `event` through `provider`.
    ///
    /// # Errors
    ///
    /// See [`Hub::request`]; the event must be valid.
    pub fn create_event(
        &self,
        provider: &str,
        options: Options,
        event: &EventRecord,
    ) -> Result<Option<EventRecord>> {
        let options = options.with_event(event);
        match self.request(provider, Operation::CreateEvent, options)? {
            Some(Response::Event(event)) => Ok(Some(event)),
            Some(_) => Err(Error::strategy(
                provider,
                "returned the wrong response shape for create_event",
            )),
            None => Ok(None),
        }
    }

    /// Updates `event` through `provider`.
    ///
    /// # Errors
    ///
    /// See [`Hub::request`].
    pub fn update_event(
        &self,
        provider: &str,
        options: Options,
        event: &EventRecord,
    ) -> Result<Option<EventRecord>> {
        let options = options.with_event(event);
        match self.request(provider, Operation::UpdateEvent, options)? {
            Some(Response::Event(event)) => Ok(Some(event)),
            Some(_) => Err(Error::strategy(
                provider,
                "returned the wrong response shape for update_event",
            )),
            None => Ok(None),
        }
    }

    /// Destroys `event` through `provider`.
    ///
    /// # Errors
    ///
    /// See [`Hub::request`].
    pub fn destroy_event(
        &self,
        provider: &str,
        options: Options,
        event: &EventRecord,
    ) -> Result<Option<bool>> {
        let options = options.with_event(event);
        match self.request(provider, Operation::DestroyEvent, options)? {
            Some(Response::Destroyed(done)) => Ok(Some(done)),
            Some(_) => Err(Error::strategy(
                provider,
                "returned the wrong response shape for destroy_event",
            )),
            None => Ok(None),
        }
    }
}
