use strata_core::{ConfigResult, PropertyStore, Value};
use tracing::debug;

use crate::loader::ParseStage;

/// Sets `--key=value` arguments into the store.
///
/// Values stay literal strings. A bare `--key` sets an empty string;
/// anything not starting with `--` is ignored.
pub struct ArgsStage {
    args: Vec<String>,
}

impl ArgsStage {
    pub fn new(args: Vec<String>) -> Self {
        Self { args }
    }

    /// Arguments of the current process, without the program name
    pub fn from_process() -> Self {
        Self::new(
            std::env::args_os()
                .skip(1)
                .filter_map(|arg| arg.into_string().ok())
                .collect(),
        )
    }
}

/// Split a `--key=value` token; `None` for tokens that are not overrides
pub fn parse_override(arg: &str) -> Option<(&str, &str)> {
    let body = arg.strip_prefix("--")?;
    let (key, value) = body.split_once('=').unwrap_or((body, ""));
    if key.is_empty() {
        return None;
    }
    Some((key, value))
}

impl ParseStage for ArgsStage {
    fn name(&self) -> &str {
        "args"
    }

    fn apply(&self, store: &mut dyn PropertyStore) -> ConfigResult<()> {
        for arg in &self.args {
            if let Some((key, value)) = parse_override(arg) {
                debug!("Argument override for '{}'", key);
                store.set(key, Value::from(value));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::ConfigTree;

    fn args(list: &[&str]) -> ArgsStage {
        ArgsStage::new(list.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_parse_override() {
        assert_eq!(parse_override("--server.port=80"), Some(("server.port", "80")));
        assert_eq!(parse_override("--url=http://a/?x=1"), Some(("url", "http://a/?x=1")));
        assert_eq!(parse_override("--keys.help"), Some(("keys.help", "")));
        assert_eq!(parse_override("-v"), None);
        assert_eq!(parse_override("serve"), None);
        assert_eq!(parse_override("--"), None);
        assert_eq!(parse_override("--=x"), None);
    }

    #[test]
    fn test_overrides_set_literal_strings() {
        let mut tree = ConfigTree::new().with("server.port", 8080);
        args(&["serve", "--server.port=9090", "-x", "--debug"])
            .apply(&mut tree)
            .unwrap();

        assert_eq!(tree.get_str("server.port"), Some("9090"));
        assert_eq!(tree.get_str("debug"), Some(""));
        assert!(tree.get("serve").is_none());
    }

    #[test]
    fn test_later_argument_wins() {
        let mut tree = ConfigTree::new();
        args(&["--a=1", "--a=2"]).apply(&mut tree).unwrap();
        assert_eq!(tree.get_str("a"), Some("2"));
    }
}
