//! Bundled strategies.

pub mod developer;

pub use developer::DeveloperStrategy;
