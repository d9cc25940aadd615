//! Settings of the resolution pipeline itself

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strata_core::{keys, ConfigError, ConfigResult};
use strata_registry::{FunctionRegistry, HttpReader};

use crate::validation::{validate_enum_choice, validate_required_string, Validatable};

/// Prefix of the environment variables that tune the loader
pub const SETTINGS_ENV_PREFIX: &str = "STRATA";

/// Loader settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderSettings {
    /// Prefix selecting environment variables for the env overlay
    #[serde(default = "default_env_prefix")]
    pub env_prefix: String,

    /// Pin the runtime mode instead of detecting it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime_mode: Option<String>,

    /// Key whose presence triggers the configuration dump
    #[serde(default = "default_help_key")]
    pub help_key: String,

    /// Where the dump is written
    #[serde(default)]
    pub dump_output: DumpOutput,

    /// Timeout applied to remote sources
    #[serde(
        with = "crate::utils::serde_duration_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub http_timeout: Option<Duration>,
}

/// Dump destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DumpOutput {
    #[default]
    Stdout,
    Stderr,
}

impl FromStr for DumpOutput {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stdout" => Ok(DumpOutput::Stdout),
            "stderr" => Ok(DumpOutput::Stderr),
            _ => Err(format!("Invalid dump output: {}", s)),
        }
    }
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            env_prefix: default_env_prefix(),
            runtime_mode: None,
            help_key: default_help_key(),
            dump_output: DumpOutput::default(),
            http_timeout: None,
        }
    }
}

impl LoaderSettings {
    /// Parse settings from a YAML (or JSON) document
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let settings: Self =
            serde_yaml::from_str(content).map_err(|e| ConfigError::DecodeFailure {
                format: "yaml".to_string(),
                message: e.to_string(),
            })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Settings from defaults plus `STRATA_*` environment variables
    pub fn from_env() -> ConfigResult<Self> {
        let mut settings = Self::default();
        settings.apply_env_overrides()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> ConfigResult<()> {
        if let Ok(prefix) = get_env_var("ENV_PREFIX") {
            self.env_prefix = prefix;
        }

        if let Ok(mode) = get_env_var("RUNTIME_MODE") {
            self.runtime_mode = Some(mode);
        }

        if let Ok(key) = get_env_var("HELP_KEY") {
            self.help_key = key;
        }

        if let Ok(output) = get_env_var("DUMP_OUTPUT") {
            validate_enum_choice(&output, &["stdout", "stderr"], "dump_output", self.domain_name())?;
            let output = output
                .parse()
                .map_err(|e: String| self.validation_error(e))?;
            self.dump_output = output;
        }

        if let Ok(timeout) = get_env_var("HTTP_TIMEOUT") {
            let seconds: u64 = timeout.parse().map_err(|e| {
                self.validation_error(format!("Invalid {}_HTTP_TIMEOUT: {}", SETTINGS_ENV_PREFIX, e))
            })?;
            self.http_timeout = Some(Duration::from_secs(seconds));
        }

        Ok(())
    }

    /// Registry to resolve sources with.
    ///
    /// Without an HTTP timeout this is the process-wide registry. With one,
    /// it is a snapshot of the process-wide registry whose `http`/`https`
    /// readers honor the timeout; everything else registered so far is kept.
    pub fn build_registry(&self) -> Arc<FunctionRegistry> {
        match self.http_timeout {
            None => strata_registry::global(),
            Some(timeout) => {
                let registry = strata_registry::global().snapshot();
                let reader = HttpReader::new().with_timeout(timeout).into_read_fn();
                registry.register_reader("http", reader.clone());
                registry.register_reader("https", reader);
                Arc::new(registry)
            }
        }
    }
}

impl Validatable for LoaderSettings {
    fn validate(&self) -> ConfigResult<()> {
        validate_required_string(&self.env_prefix, "env_prefix", self.domain_name())?;
        validate_required_string(&self.help_key, "help_key", self.domain_name())?;

        if let Some(mode) = &self.runtime_mode {
            validate_required_string(mode, "runtime_mode", self.domain_name())?;
            if mode.contains('.') {
                return Err(self.validation_error("runtime_mode cannot contain '.'"));
            }
        }

        if self.http_timeout == Some(Duration::ZERO) {
            return Err(self.validation_error("http_timeout must be greater than 0"));
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "loader"
    }
}

fn default_env_prefix() -> String {
    "ENV_".to_string()
}

fn default_help_key() -> String {
    keys::HELP.to_string()
}

fn get_env_var(name: &str) -> Result<String, std::env::VarError> {
    std::env::var(format!("{}_{}", SETTINGS_ENV_PREFIX, name))
}
