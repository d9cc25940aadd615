//! Core types for strata configuration resolution
//!
//! This crate holds the pieces every other strata crate shares: the property
//! tree value type, the store contract the pipeline writes through, the
//! structural merge used by overlays, and the error types.

pub mod error;
pub mod keys;
pub mod merge;
pub mod store;
pub mod value;

// Re-export main types
pub use error::{ConfigError, ConfigResult, SourceFailures};
pub use merge::merge_value;
pub use store::{ConfigTree, PropertyStore};
pub use value::Value;
