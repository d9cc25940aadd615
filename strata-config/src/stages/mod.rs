//! Built-in parse stages
//!
//! Each stage is one pass over the property store. The loader runs them in
//! a fixed order; every stage can also be applied on its own.

pub mod args;
pub mod decode;
pub mod envs;
pub mod help;
pub mod mods;
pub mod read;

pub use args::ArgsStage;
pub use decode::{DecodeStage, DocumentFormat};
pub use envs::EnvStage;
pub use help::{HelpOutput, HelpStage};
pub use mods::ModeStage;
pub use read::ReadStage;
