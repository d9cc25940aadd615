use std::fmt;

use strata_core::{keys, ConfigError, ConfigResult, PropertyStore, Value};
use tracing::debug;

use crate::loader::ParseStage;
use crate::utils::descriptor_extension;

/// Structured document formats understood by the decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Pick a format from a descriptor's extension; JSON unless it says YAML
    pub fn from_descriptor(descriptor: Option<&str>) -> Self {
        match descriptor.and_then(descriptor_extension) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                DocumentFormat::Yaml
            }
            _ => DocumentFormat::Json,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::Json => "json",
            DocumentFormat::Yaml => "yaml",
        }
    }

    /// Parse `data` into an object node
    pub fn decode(&self, data: &[u8]) -> ConfigResult<Value> {
        let document: serde_json::Value = match self {
            DocumentFormat::Json => serde_json::from_slice(data).map_err(|e| self.failure(e))?,
            DocumentFormat::Yaml => serde_yaml::from_slice(data).map_err(|e| self.failure(e))?,
        };

        match Value::from(document) {
            value @ Value::Object(_) => Ok(value),
            other => Err(self.failure(format!(
                "document root must be an object, found {}",
                other.type_name()
            ))),
        }
    }

    fn failure(&self, message: impl fmt::Display) -> ConfigError {
        ConfigError::DecodeFailure {
            format: self.as_str().to_string(),
            message: message.to_string(),
        }
    }
}

/// Merges the document stored at `keys.configdata` onto the store root
pub struct DecodeStage;

impl ParseStage for DecodeStage {
    fn name(&self) -> &str {
        "decode"
    }

    fn apply(&self, store: &mut dyn PropertyStore) -> ConfigResult<()> {
        let data = match store.get(keys::CONFIG_DATA) {
            None | Some(Value::Null) => {
                debug!("No configuration data to decode");
                return Ok(());
            }
            Some(data) => data,
        };
        let format =
            DocumentFormat::from_descriptor(store.get(keys::CONFIG_PATH).and_then(Value::as_str));

        let bytes = data.as_bytes().ok_or_else(|| {
            format.failure(format!(
                "expected raw bytes at '{}', found {}",
                keys::CONFIG_DATA,
                data.type_name()
            ))
        })?;
        let document = format.decode(bytes)?;

        debug!("Merging {} configuration document onto root", format.as_str());
        store.merge("", document);
        Ok(())
    }
}
