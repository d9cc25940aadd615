use strata_core::{keys, ConfigResult, PropertyStore, Value};
use tracing::{debug, warn};

use crate::loader::ParseStage;

/// Merges `mods.<mode>` subtrees onto the root.
///
/// Modes come from the `enable` list, followed by the runtime mode, and are
/// applied in that order so the runtime mode has the last word. Without a
/// list at `enable` nothing is applied, not even the runtime mode.
pub struct ModeStage {
    runtime_mode: String,
}

impl ModeStage {
    pub fn new(runtime_mode: impl Into<String>) -> Self {
        Self {
            runtime_mode: runtime_mode.into(),
        }
    }

    pub fn runtime_mode(&self) -> &str {
        &self.runtime_mode
    }
}

impl ParseStage for ModeStage {
    fn name(&self) -> &str {
        "mods"
    }

    fn apply(&self, store: &mut dyn PropertyStore) -> ConfigResult<()> {
        let mut modes: Vec<String> = match store.get(keys::ENABLE) {
            Some(Value::List(items)) => items.iter().map(Value::to_display_string).collect(),
            _ => {
                debug!("No mode list at '{}'", keys::ENABLE);
                return Ok(());
            }
        };
        modes.push(self.runtime_mode.clone());

        for mode in &modes {
            let key = keys::mode_key(mode);
            match store.get(&key).cloned() {
                Some(overlay @ Value::Object(_)) => {
                    debug!("Applying mode overlay '{}'", mode);
                    store.merge("", overlay);
                }
                Some(other) => {
                    warn!(
                        "Skipping mode overlay '{}': expected object, found {}",
                        key,
                        other.type_name()
                    );
                }
                None => debug!("No overlay defined for mode '{}'", mode),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use strata_core::ConfigTree;

    #[test]
    fn test_runtime_mode_applies_last() {
        let mut tree = ConfigTree::from_json(json!({
            "enable": ["dev"],
            "x": 1,
            "mods": {"dev": {"x": 2, "y": "dev"}, "docker": {"x": 3}}
        }));
        ModeStage::new("docker").apply(&mut tree).unwrap();
        assert_eq!(tree.get("x"), Some(&Value::Integer(3)));
        assert_eq!(tree.get_str("y"), Some("dev"));
    }

    #[test]
    fn test_later_modes_win() {
        let mut tree = ConfigTree::from_json(json!({
            "enable": ["a", "b"],
            "mods": {"a": {"level": "a", "only_a": true}, "b": {"level": "b"}}
        }));
        ModeStage::new("linux").apply(&mut tree).unwrap();
        assert_eq!(tree.get_str("level"), Some("b"));
        assert_eq!(tree.get("only_a"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_overlays_merge_recursively() {
        let mut tree = ConfigTree::from_json(json!({
            "enable": ["prod"],
            "db": {"host": "localhost", "port": 5432},
            "mods": {"prod": {"db": {"host": "db.prod"}}}
        }));
        ModeStage::new("linux").apply(&mut tree).unwrap();
        assert_eq!(tree.get_str("db.host"), Some("db.prod"));
        assert_eq!(tree.get("db.port"), Some(&Value::Integer(5432)));
    }

    #[test]
    fn test_dynamic_list_elements_are_stringified() {
        let mut tree = ConfigTree::from_json(json!({
            "enable": [2],
            "mods": {"2": {"picked": true}}
        }));
        ModeStage::new("linux").apply(&mut tree).unwrap();
        assert_eq!(tree.get("picked"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_without_enable_list_nothing_applies() {
        let doc = json!({"x": 1, "mods": {"docker": {"x": 3}}});
        let mut tree = ConfigTree::from_json(doc.clone());
        ModeStage::new("docker").apply(&mut tree).unwrap();
        assert_eq!(tree.to_json(), doc);

        let mut tree = ConfigTree::from_json(json!({"enable": "dev", "x": 1, "mods": {"docker": {"x": 3}}}));
        ModeStage::new("docker").apply(&mut tree).unwrap();
        assert_eq!(tree.get("x"), Some(&Value::Integer(1)));
    }

    #[test]
    fn test_empty_enable_list_still_applies_runtime_mode() {
        let mut tree = ConfigTree::from_json(json!({"enable": [], "x": 1, "mods": {"docker": {"x": 3}}}));
        ModeStage::new("docker").apply(&mut tree).unwrap();
        assert_eq!(tree.get("x"), Some(&Value::Integer(3)));
    }

    #[test]
    fn test_non_object_overlay_is_skipped() {
        let mut tree = ConfigTree::from_json(json!({"enable": ["dev"], "x": 1, "mods": {"dev": "oops"}}));
        ModeStage::new("linux").apply(&mut tree).unwrap();
        assert_eq!(tree.get("x"), Some(&Value::Integer(1)));
    }
}
