use std::sync::Arc;

use strata_core::store::string_list;
use strata_core::{keys, ConfigError, ConfigResult, PropertyStore, SourceFailures, Value};
use strata_registry::{split_scheme, FunctionRegistry};
use tracing::{debug, info, warn};

use crate::loader::ParseStage;

/// Resolves the first readable source listed at `keys.config`.
///
/// The committed bytes land at `keys.configdata` and the descriptor at
/// `keys.configpath`. Any reader failure, an unknown content type
/// included, is recorded and resolution moves on to the next source.
pub struct ReadStage {
    registry: Arc<FunctionRegistry>,
}

impl ReadStage {
    pub fn new(registry: Arc<FunctionRegistry>) -> Self {
        Self { registry }
    }
}

impl ParseStage for ReadStage {
    fn name(&self) -> &str {
        "read"
    }

    fn apply(&self, store: &mut dyn PropertyStore) -> ConfigResult<()> {
        let descriptors = string_list(store.get(keys::CONFIG));
        if descriptors.is_empty() {
            debug!("No configuration sources listed at '{}'", keys::CONFIG);
            return Ok(());
        }

        let mut failures = SourceFailures::new();
        for descriptor in descriptors {
            let (scheme, _) = split_scheme(&descriptor);
            let Some(reader) = self.registry.reader_for_scheme(scheme) else {
                warn!("No reader available for config source {}", descriptor);
                failures.push(ConfigError::unreachable(
                    descriptor.as_str(),
                    "no reader registered for scheme and no default reader",
                ));
                continue;
            };

            match reader(&descriptor) {
                Ok(data) => {
                    info!("Loaded configuration from {}", descriptor);
                    store.set(keys::CONFIG_DATA, Value::Bytes(data));
                    store.set(keys::CONFIG_PATH, Value::String(descriptor));
                    return Ok(());
                }
                Err(e) => {
                    warn!("Config source {} failed: {}", descriptor, e);
                    failures.push(e);
                }
            }
        }

        Err(ConfigError::AllSourcesFailed(failures))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::ConfigTree;

    fn registry() -> Arc<FunctionRegistry> {
        let registry = FunctionRegistry::new();
        registry.register_reader(
            "mem",
            Arc::new(|descriptor: &str| match descriptor {
                "mem://good" => Ok(b"{\"ok\":true}".to_vec()),
                _ => Err(ConfigError::unreachable(descriptor, "no such entry")),
            }),
        );
        registry.register_reader(
            "default",
            Arc::new(|descriptor: &str| Err(ConfigError::unreachable(descriptor, "default"))),
        );
        Arc::new(registry)
    }

    #[test]
    fn test_first_success_wins() {
        let mut tree = ConfigTree::new().with(
            keys::CONFIG,
            vec!["mem://missing", "nowhere.json", "mem://good", "mem://never"],
        );
        ReadStage::new(registry()).apply(&mut tree).unwrap();

        assert_eq!(tree.get_str(keys::CONFIG_PATH), Some("mem://good"));
        assert_eq!(
            tree.get(keys::CONFIG_DATA),
            Some(&Value::Bytes(b"{\"ok\":true}".to_vec()))
        );
    }

    #[test]
    fn test_all_failures_are_kept() {
        let mut tree = ConfigTree::new().with(keys::CONFIG, vec!["mem://a", "mem://b"]);
        let err = ReadStage::new(registry()).apply(&mut tree).unwrap_err();

        let failures = match err {
            ConfigError::AllSourcesFailed(failures) => failures,
            other => panic!("expected AllSourcesFailed, got {:?}", other),
        };
        let descriptors: Vec<&str> = failures
            .iter()
            .filter_map(|e| match e {
                ConfigError::SourceUnreachable { descriptor, .. } => Some(descriptor.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(descriptors, vec!["mem://a", "mem://b"]);
        assert!(tree.get(keys::CONFIG_DATA).is_none());
        assert!(tree.get(keys::CONFIG_PATH).is_none());
    }

    #[test]
    fn test_unknown_content_type_falls_through() {
        let registry = registry();
        registry.register_reader(
            "typeless",
            Arc::new(|descriptor: &str| {
                Err(ConfigError::UnknownContentType {
                    path: descriptor.to_string(),
                })
            }),
        );
        let mut tree = ConfigTree::new().with(keys::CONFIG, vec!["typeless://x", "mem://good"]);
        ReadStage::new(registry.clone()).apply(&mut tree).unwrap();
        assert_eq!(tree.get_str(keys::CONFIG_PATH), Some("mem://good"));

        let mut tree = ConfigTree::new().with(keys::CONFIG, vec!["typeless://x", "mem://a"]);
        let err = ReadStage::new(registry).apply(&mut tree).unwrap_err();
        match err {
            ConfigError::AllSourcesFailed(failures) => {
                let kinds: Vec<bool> = failures
                    .iter()
                    .map(|e| matches!(e, ConfigError::UnknownContentType { .. }))
                    .collect();
                assert_eq!(kinds, vec![true, false]);
            }
            other => panic!("expected AllSourcesFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_list_is_noop() {
        let mut tree = ConfigTree::new();
        ReadStage::new(registry()).apply(&mut tree).unwrap();
        assert_eq!(tree, ConfigTree::new());
    }

    #[test]
    fn test_single_string_descriptor() {
        let mut tree = ConfigTree::new().with(keys::CONFIG, "mem://good");
        ReadStage::new(registry()).apply(&mut tree).unwrap();
        assert_eq!(tree.get_str(keys::CONFIG_PATH), Some("mem://good"));
    }

    #[test]
    fn test_no_reader_at_all() {
        let mut tree = ConfigTree::new().with(keys::CONFIG, vec!["app.json"]);
        let err = ReadStage::new(Arc::new(FunctionRegistry::new()))
            .apply(&mut tree)
            .unwrap_err();
        assert!(matches!(err, ConfigError::AllSourcesFailed(ref f) if f.len() == 1));
    }
}
