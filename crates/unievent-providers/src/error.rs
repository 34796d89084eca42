//! Strategy dispatch error types.
//!
//! The lifecycle errors are deliberately distinct: [`Error::MissingStrategy`]
//! means the key resolved to nothing at all, [`Error::StrategyNotIncluded`]
//! means the strategy is known by name but was never registered with a
//! factory, and [`Error::StrategyNotConfigured`] means it is registered but
//! was never activated. They never collapse into one another.

use thiserror::Error;

/// Result type for strategy operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during strategy resolution and dispatch.
#[derive(Debug, Error)]
pub enum Error {
    /// The provider key resolved to no known strategy.
    #[error("Could not find matching strategy for {key}")]
    MissingStrategy { key: String },

    /// The strategy is declared but no factory was registered for it.
    #[error("Strategy {key} is not included in this build")]
    StrategyNotIncluded { key: String },

    /// The strategy is registered but was never activated.
    #[error("Strategy {key} is registered but not configured")]
    StrategyNotConfigured { key: String },

    /// A malformed call: bad provider key, bad event payload, bad options.
    #[error("Invalid argument: {message}")]
    Argument { message: String },

    /// The strategy does not support the requested operation.
    #[error("Strategy {strategy} does not implement {operation}")]
    NotImplemented { strategy: String, operation: String },

    /// A strategy's own runtime failure.
    #[error("Strategy {strategy} failed: {message}")]
    Strategy {
        strategy: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Creates a missing strategy error.
    pub fn missing_strategy(key: impl Into<String>) -> Self {
        Self::MissingStrategy { key: key.into() }
    }

    /// Creates a not included error.
    pub fn not_included(key: impl Into<String>) -> Self {
        Self::StrategyNotIncluded { key: key.into() }
    }

    /// Creates a not configured error.
    pub fn not_configured(key: impl Into<String>) -> Self {
        Self::StrategyNotConfigured { key: key.into() }
    }

    /// Creates an argument error.
    pub fn argument(message: impl Into<String>) -> Self {
        Self::Argument {
            message: message.into(),
        }
    }

    /// Creates a not implemented error.
    pub fn not_implemented(strategy: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::NotImplemented {
            strategy: strategy.into(),
            operation: operation.into(),
        }
    }

    /// Creates a strategy runtime error.
    pub fn strategy(strategy: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Strategy {
            strategy: strategy.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Attaches the underlying cause to a strategy runtime error.
    pub fn with_source<E>(mut self, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        if let Self::Strategy { source, .. } = &mut self {
            *source = Some(Box::new(cause));
        }
        self
    }
}
