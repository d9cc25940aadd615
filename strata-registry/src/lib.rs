//! Pluggable function registries for strata
//!
//! Readers turn a source descriptor into raw bytes; check functions and
//! check factories validate string arguments for routing layers.

pub mod checks;
pub mod error;
pub mod readers;
pub mod registry;

// Re-export main types
pub use error::{RegistryError, Result};
pub use readers::split_scheme;
pub use registry::{
    global, CheckFactory, CheckFn, FunctionRegistry, ReadFn, RegistryEntry, RegistryKind,
    DEFAULT_READER,
};

#[cfg(feature = "http")]
pub use readers::http::HttpReader;
