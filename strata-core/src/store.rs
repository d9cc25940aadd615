//! Property store contract and the in-memory tree implementation

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};

use crate::error::{ConfigError, ConfigResult};
use crate::merge::merge_value;
use crate::value::Value;

/// Hierarchical key-value store addressed by dot-separated paths.
///
/// The empty key addresses the root. Every pipeline stage reads and writes
/// configuration exclusively through this trait.
pub trait PropertyStore {
    /// Value at `key`, if present
    fn get(&self, key: &str) -> Option<&Value>;

    /// Set `key` to `value`, replacing whatever was there
    fn set(&mut self, key: &str, value: Value);

    /// Structurally merge `value` onto the value at `key`
    fn merge(&mut self, key: &str, value: Value) {
        let mut current = self.get(key).cloned().unwrap_or_default();
        merge_value(&mut current, value);
        self.set(key, current);
    }
}

/// In-memory property tree rooted at an object
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigTree {
    root: Value,
}

impl Default for ConfigTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigTree {
    pub fn new() -> Self {
        Self {
            root: Value::object(),
        }
    }

    /// Build a tree from a JSON document; non-object documents yield an empty tree
    pub fn from_json(json: serde_json::Value) -> Self {
        let mut tree = Self::new();
        tree.set("", Value::from(json));
        tree
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    pub fn into_value(self) -> Value {
        self.root
    }

    /// Builder-style `set`
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value.into());
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Scalar at `key` rendered as text
    pub fn get_string(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::Null | Value::List(_) | Value::Object(_) => None,
            value => Some(value.to_display_string()),
        }
    }

    /// List at `key` with every element stringified.
    ///
    /// A bare string counts as a one-element list.
    pub fn get_string_list(&self, key: &str) -> Vec<String> {
        string_list(self.get(key))
    }

    /// Deserialize the value at `key` into `T`
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> ConfigResult<Option<T>> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        serde_json::from_value(value.to_json())
            .map(Some)
            .map_err(|e| ConfigError::TypeMismatch {
                key: key.to_string(),
                expected: std::any::type_name::<T>().to_string(),
                message: e.to_string(),
            })
    }

    pub fn to_json(&self) -> serde_json::Value {
        self.root.to_json()
    }

    pub fn to_json_pretty(&self) -> String {
        format!("{:#}", self.root.to_json())
    }
}

impl PropertyStore for ConfigTree {
    fn get(&self, key: &str) -> Option<&Value> {
        if key.is_empty() {
            return Some(&self.root);
        }
        let mut node = &self.root;
        for segment in key.split('.') {
            node = match node {
                Value::Object(map) => map.get(segment)?,
                Value::List(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(node)
    }

    fn set(&mut self, key: &str, value: Value) {
        if key.is_empty() {
            // The root stays an object
            if matches!(value, Value::Object(_)) {
                self.root = value;
            }
            return;
        }
        let segments: Vec<&str> = key.split('.').collect();
        set_path(&mut self.root, &segments, value);
    }
}

impl Serialize for ConfigTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.root.serialize(serializer)
    }
}

impl From<ConfigTree> for Value {
    fn from(tree: ConfigTree) -> Self {
        tree.root
    }
}

/// Stringify a list-shaped value
pub fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::List(items)) => items.iter().map(Value::to_display_string).collect(),
        Some(Value::String(s)) => vec![s.clone()],
        _ => Vec::new(),
    }
}

fn set_path(node: &mut Value, segments: &[&str], value: Value) {
    let Some((head, rest)) = segments.split_first() else {
        *node = value;
        return;
    };
    if let Value::Object(map) = node {
        let child = map.entry(head.to_string()).or_default();
        set_path(child, rest, value);
    } else {
        let mut child = Value::Null;
        set_path(&mut child, rest, value);
        let mut map = BTreeMap::new();
        map.insert(head.to_string(), child);
        *node = Value::Object(map);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn test_set_creates_intermediate_objects() {
        let mut tree = ConfigTree::new();
        tree.set("server.http.port", Value::from("8080"));
        assert_eq!(tree.get_str("server.http.port"), Some("8080"));
        assert!(tree.get("server.http").unwrap().as_object().is_some());
    }

    #[test]
    fn test_set_replaces_scalar_on_path() {
        let mut tree = ConfigTree::new().with("server", "disabled");
        tree.set("server.port", Value::Integer(80));
        assert_eq!(tree.to_json(), json!({"server": {"port": 80}}));
    }

    #[test]
    fn test_last_writer_wins() {
        let mut tree = ConfigTree::new();
        tree.set("a", Value::from("1"));
        tree.set("a", Value::from("2"));
        assert_eq!(tree.get_str("a"), Some("2"));
    }

    #[test]
    fn test_get_walks_list_indices() {
        let tree = ConfigTree::from_json(json!({"listeners": [{"addr": ":80"}, {"addr": ":443"}]}));
        assert_eq!(tree.get_str("listeners.1.addr"), Some(":443"));
        assert!(tree.get("listeners.2.addr").is_none());
        assert!(tree.get("listeners.x").is_none());
    }

    #[test]
    fn test_empty_key_is_root() {
        let mut tree = ConfigTree::new().with("a", 1);
        assert_eq!(tree.get("").unwrap(), tree.root());

        tree.set("", Value::from("not an object"));
        assert_eq!(tree.to_json(), json!({"a": 1}));

        tree.set("", Value::from(json!({"b": 2})));
        assert_eq!(tree.to_json(), json!({"b": 2}));
    }

    #[test]
    fn test_merge_onto_root() {
        let mut tree = ConfigTree::from_json(json!({"db": {"host": "h", "port": 1}}));
        tree.merge("", Value::from(json!({"db": {"port": 2}})));
        assert_eq!(tree.to_json(), json!({"db": {"host": "h", "port": 2}}));
    }

    #[test]
    fn test_string_list_accepts_dynamic_elements() {
        let tree = ConfigTree::from_json(json!({"enable": ["dev", 2, true], "one": "x"}));
        assert_eq!(tree.get_string_list("enable"), vec!["dev", "2", "true"]);
        assert_eq!(tree.get_string_list("one"), vec!["x"]);
        assert!(tree.get_string_list("missing").is_empty());
    }

    #[test]
    fn test_get_as_reports_type_mismatch() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Server {
            port: u16,
        }

        let tree = ConfigTree::from_json(json!({"server": {"port": 8080}, "bad": {"port": "x"}}));
        assert_eq!(
            tree.get_as::<Server>("server").unwrap(),
            Some(Server { port: 8080 })
        );
        assert_eq!(tree.get_as::<Server>("missing").unwrap(), None);

        let err = tree.get_as::<Server>("bad").unwrap_err();
        assert!(matches!(err, ConfigError::TypeMismatch { ref key, .. } if key == "bad"));
    }

    #[test]
    fn test_get_string_renders_scalars_only() {
        let tree = ConfigTree::from_json(json!({"n": 5, "o": {"a": 1}}));
        assert_eq!(tree.get_string("n").as_deref(), Some("5"));
        assert_eq!(tree.get_string("o"), None);
    }
}
