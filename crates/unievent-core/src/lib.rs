//! Core types: attribute store, validators, section schemas, event records

pub mod codes;
pub mod event;
pub mod schema;
pub mod store;
pub mod tracing;
pub mod validate;

pub use event::{
    AssociatedDataSection, DataSection, EventRecord, EventReport, MetadataSection, Section,
};
pub use schema::{AttributeSpec, SectionReport, SectionSchema};
pub use store::{Store, Value};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
