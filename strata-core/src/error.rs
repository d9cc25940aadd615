//! Configuration error types

use std::fmt;

use thiserror::Error;

/// Configuration result type
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A single source could not be read
    #[error("Source '{descriptor}' unreachable: {reason}")]
    SourceUnreachable { descriptor: String, reason: String },

    /// Every source in the list failed
    #[error("All configuration sources failed: {0}")]
    AllSourcesFailed(SourceFailures),

    /// File path has no extension to select a decoder from
    #[error("Unknown content type for '{path}': path has no extension")]
    UnknownContentType { path: String },

    /// Structured document could not be parsed
    #[error("Failed to decode {format} config: {message}")]
    DecodeFailure { format: String, message: String },

    /// Typed accessor found a value of the wrong shape
    #[error("Type mismatch at '{key}': expected {expected}: {message}")]
    TypeMismatch {
        key: String,
        expected: String,
        message: String,
    },

    /// Domain-specific configuration error
    #[error("Domain configuration error in {domain}: {message}")]
    DomainError { domain: String, message: String },

    /// IO error outside of source reading
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure raised by a custom parse stage
    #[error("Stage '{stage}' failed: {message}")]
    Stage { stage: String, message: String },
}

impl ConfigError {
    /// Build a `SourceUnreachable` error from any displayable reason
    pub fn unreachable(descriptor: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::SourceUnreachable {
            descriptor: descriptor.into(),
            reason: reason.to_string(),
        }
    }
}

/// Every individual failure collected while walking a source list
#[derive(Debug, Default)]
pub struct SourceFailures(Vec<ConfigError>);

impl SourceFailures {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, err: ConfigError) {
        self.0.push(err);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ConfigError> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Vec<ConfigError> {
        self.0
    }
}

impl fmt::Display for SourceFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "[{}] {}", i + 1, err)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a SourceFailures {
    type Item = &'a ConfigError;
    type IntoIter = std::slice::Iter<'a, ConfigError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
