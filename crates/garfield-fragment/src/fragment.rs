//! The configuration fragment type.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::path::KeyPath;

/// Errors constructing a fragment
#[derive(Debug, thiserror::Error)]
pub enum FragmentError {
    #[error("a configuration fragment must be a map, found {found}")]
    NotAnObject { found: &'static str },
}

/// One immutable layer of configuration.
///
/// There are no mutating accessors. [`ConfigFragment::with`] consumes the
/// fragment and returns a new one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigFragment {
    entries: Map<String, Value>,
}

impl ConfigFragment {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_map(entries: Map<String, Value>) -> Self {
        Self { entries }
    }

    /// Build a fragment from a JSON value, which must be an object
    pub fn from_value(value: Value) -> Result<Self, FragmentError> {
        match value {
            Value::Object(entries) => Ok(Self { entries }),
            other => Err(FragmentError::NotAnObject {
                found: kind_name(&other),
            }),
        }
    }

    /// Return a copy of this fragment with `key` set to `value`
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Get a value by dot-separated path
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.get_path(&KeyPath::parse(path))
    }

    pub fn get_path(&self, path: &KeyPath) -> Option<&Value> {
        path.lookup_in(&self.entries)
    }

    /// Get a value by path as a string slice
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(|v| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &Map<String, Value> {
        &self.entries
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.entries.clone())
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.entries)
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.entries
    }
}

impl TryFrom<Value> for ConfigFragment {
    type Error = FragmentError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl From<ConfigFragment> for Value {
    fn from(fragment: ConfigFragment) -> Self {
        fragment.into_value()
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a map",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_requires_object() {
        assert!(ConfigFragment::from_value(json!({"entry": "src/index"})).is_ok());

        let err = ConfigFragment::from_value(json!(["a"])).unwrap_err();
        assert!(err.to_string().contains("a sequence"));
    }

    #[test]
    fn test_with_returns_new_fragment() {
        let base = ConfigFragment::empty();
        let next = base.clone().with("mode", "development");

        assert!(base.is_empty());
        assert_eq!(next.get_str("mode"), Some("development"));
    }

    #[test]
    fn test_nested_get() {
        let fragment = ConfigFragment::from_value(json!({
            "devServer": {"host": "localhost", "port": 8066}
        }))
        .unwrap();

        assert_eq!(fragment.get_str("devServer.host"), Some("localhost"));
        assert_eq!(fragment.get("devServer.port"), Some(&json!(8066)));
        assert_eq!(fragment.get("devServer.missing"), None);
        assert_eq!(fragment.get(""), None);
    }

    #[test]
    fn test_keys_are_sorted() {
        let fragment = ConfigFragment::empty()
            .with("output", "dist")
            .with("entry", "src/index")
            .with("mode", "production");

        let keys: Vec<&String> = fragment.keys().collect();
        assert_eq!(keys, vec!["entry", "mode", "output"]);
        assert_eq!(
            serde_json::to_string(&fragment).unwrap(),
            r#"{"entry":"src/index","mode":"production","output":"dist"}"#
        );
    }
}
