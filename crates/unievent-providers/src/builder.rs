//! Activation DSL.
//!
//! A [`Builder`] borrows a [`Hub`] and installs activations for registered
//! strategies. Chains propagate errors with `?`:
//!
//! ```ignore
//! Builder::new(&mut hub)
//!     .options(Options::new().with_option("token", "s3cret"))
//!     .provider("developer")?
//!     .provider_with("eventbrite", Options::new().with_option("token", "other"))?;
//! ```
//!
//! Builder-level options become defaults for every subsequent activation;
//! per-provider options win over them. Activating a key again replaces the
//! previous activation.

use std::sync::Arc;

use unievent_core::Value;

use crate::error::{Error, Result};
use crate::hub::{Activation, Hub, Registration};
use crate::options::Options;

/// Installs strategy activations into a [`Hub`].
#[derive(Debug)]
pub struct Builder<'a> {
    hub: &'a mut Hub,
    defaults: Options,
}

impl<'a> Builder<'a> {
    /// Starts a builder against `hub`.
    pub fn new(hub: &'a mut Hub) -> Self {
        Self {
            hub,
            defaults: Options::new(),
        }
    }

    /// Sets the default options applied to every subsequent activation.
    ///
    /// Replaces any defaults set earlier in the chain.
    #[must_use]
    pub fn options(mut self, defaults: Options) -> Self {
        self.defaults = defaults;
        self
    }

    /// Activates `key` with no extra configuration.
    ///
    /// # Errors
    ///
    /// [`Error::MissingStrategy`] when the key resolves to nothing known,
    /// [`Error::StrategyNotIncluded`] when the strategy is declared but has
    /// no registered factory.
    pub fn provider(self, key: &str) -> Result<Self> {
        self.activate(key, Vec::new(), Options::new(), None)
    }

    /// Activates `key` with per-provider options.
    ///
    /// # Errors
    ///
    /// See [`Builder::provider`].
    pub fn provider_with(self, key: &str, options: Options) -> Result<Self> {
        self.activate(key, Vec::new(), options, None)
    }

    /// Activates `key` with positional arguments.
    ///
    /// Arguments map onto the option names the strategy declares, in
    /// order; surplus arguments fail at instantiation.
    ///
    /// # Errors
    ///
    /// See [`Builder::provider`].
    pub fn provider_with_args(self, key: &str, args: Vec<Value>) -> Result<Self> {
        self.activate(key, args, Options::new(), None)
    }

    /// Activates `key` with options and a configure hook.
    ///
    /// The hook runs against the merged options every time the strategy is
    /// instantiated, after construction.
    ///
    /// # Errors
    ///
    /// See [`Builder::provider`].
    pub fn provider_configured(
        self,
        key: &str,
        options: Options,
        configure: impl Fn(&mut Options) + Send + Sync + 'static,
    ) -> Result<Self> {
        self.activate(key, Vec::new(), options, Some(Arc::new(configure)))
    }

    fn activate(
        self,
        key: &str,
        args: Vec<Value>,
        options: Options,
        configure: Option<Arc<dyn Fn(&mut Options) + Send + Sync>>,
    ) -> Result<Self> {
        let resolved = self.hub.config().resolve(key);
        let info = match self.hub.registration(&resolved) {
            None => return Err(Error::missing_strategy(key)),
            Some(Registration::Declared) => return Err(Error::not_included(key)),
            Some(Registration::Included(info)) => *info,
        };

        let mut activation = Activation::new(info)
            .with_args(args)
            .with_options(self.defaults.deep_merged(&options));
        if let Some(configure) = configure {
            activation = activation.with_configure(configure);
        }
        self.hub.install(resolved, activation);
        Ok(self)
    }
}
