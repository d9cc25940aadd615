use strata_core::{ConfigResult, PropertyStore, Value};
use tracing::debug;

use crate::loader::ParseStage;

/// Maps prefixed environment variables onto dotted keys.
///
/// `ENV_SERVER_PORT=8080` becomes `server.port = "8080"`: the prefix is
/// stripped, the rest lower-cased and every `_` turned into `.`. The mapping
/// is lossy, so keys that need an underscore or upper case cannot be set
/// this way.
pub struct EnvStage {
    prefix: String,
    vars: Option<Vec<(String, String)>>,
}

impl EnvStage {
    /// Read the process environment at apply time
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            vars: None,
        }
    }

    /// Use a fixed variable list instead of the process environment
    pub fn with_vars(prefix: impl Into<String>, vars: Vec<(String, String)>) -> Self {
        Self {
            prefix: prefix.into(),
            vars: Some(vars),
        }
    }

    fn vars(&self) -> Vec<(String, String)> {
        match &self.vars {
            Some(vars) => vars.clone(),
            None => std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
                .collect(),
        }
    }
}

/// Dotted key for variable `name`, if it carries `prefix`
pub fn env_key(prefix: &str, name: &str) -> Option<String> {
    let rest = name.strip_prefix(prefix)?;
    if rest.is_empty() {
        return None;
    }
    Some(rest.to_lowercase().replace('_', "."))
}

impl ParseStage for EnvStage {
    fn name(&self) -> &str {
        "envs"
    }

    fn apply(&self, store: &mut dyn PropertyStore) -> ConfigResult<()> {
        for (name, value) in self.vars() {
            if let Some(key) = env_key(&self.prefix, &name) {
                debug!("Environment override {} -> '{}'", name, key);
                store.set(&key, Value::String(value));
            }
        }
        Ok(())
    }
}
