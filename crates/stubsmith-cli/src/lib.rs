//! JSON host driver for the stubsmith implement-abstract-class fix.
pub mod args;
pub mod document;
pub mod driver;
pub mod tracing_config;

pub use document::{LoadedSnapshot, SnapshotDocument};
pub use driver::{FixOutput, ResolveOutput};
