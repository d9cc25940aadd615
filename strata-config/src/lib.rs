//! Configuration resolution pipeline for strata
//!
//! The pipeline runs once at bootstrap. It resolves the first readable
//! source from `keys.config`, decodes it into the property store, and then
//! layers command-line arguments, environment variables and mode overlays
//! on top, in that order. An optional final pass dumps the resolved store.

pub mod bootstrap;
pub mod loader;
pub mod runtime;
pub mod settings;
pub mod stages;
pub mod utils;
pub mod validation;

// Re-export main types
pub use bootstrap::apply_workdir;
pub use loader::{BuiltinStage, ConfigLoader, FnStage, ParseStage};
pub use runtime::detect_mode;
pub use settings::{DumpOutput, LoaderSettings};
pub use stages::{
    ArgsStage, DecodeStage, DocumentFormat, EnvStage, HelpOutput, HelpStage, ModeStage, ReadStage,
};

// Re-export the shared core types so callers need a single import
pub use strata_core::{keys, ConfigError, ConfigResult, ConfigTree, PropertyStore, Value};
