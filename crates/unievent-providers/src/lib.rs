//! Strategy trait and dispatch for event providers.
//!
//! This crate provides the pluggable-provider layer on top of
//! `unievent-core`:
//!
//! - [`Strategy`] - The trait every provider adapter implements
//! - [`Hub`] - Registry plus dispatcher, no global state
//! - [`Builder`] - DSL that installs activations into a hub
//! - [`Options`] - The deep-merging option bag flowing through dispatch
//! - [`Error`] - The dispatch error taxonomy
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────┐   ┌───────────────────┐
//! │ DeveloperStrategy │   │  host strategies  │
//! └─────────┬─────────┘   └─────────┬─────────┘
//!           │      Strategy         │
//!           └──────────┬────────────┘
//!                      │ register / activate
//!                      ▼
//!               ┌─────────────┐
//!               │     Hub     │◄── Builder
//!               └──────┬──────┘
//!                      │ request(provider, operation, options)
//!                      ▼
//!     resolve ► instantiate ► merge ► authorize ► invoke
//!                      │
//!                      ▼
//!               ┌─────────────┐
//!               │ EventRecord │
//!               └─────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use unievent_providers::{Builder, Hub, Options, strategies};
//!
//! let mut hub = Hub::new();
//! hub.register(strategies::developer::INFO);
//! Builder::new(&mut hub).provider("developer")?;
//!
//! let events = hub.list_events("developer", Options::new())?;
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod hub;
pub mod options;
pub mod strategies;
pub mod strategy;

// Re-export main types at crate root
pub use builder::Builder;
pub use config::{Config, camelize};
pub use error::{Error, Result};
pub use hub::{Activation, ConfigureHook, Hub, Registration};
pub use options::{EVENT_KEY, Options};
pub use strategy::{Operation, Response, Strategy, StrategyCore, StrategyInfo};
