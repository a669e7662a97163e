//! The final, validated configuration

use garfield_fragment::{ConfigFragment, KeyPath, Value};
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use crate::build::{Minimizer, ModuleRule, Plugin};
use crate::overlay::ENVIRONMENT_NAMESPACE;

/// Keys that contain secrets and should be redacted
const SECRET_KEYS: &[&str] = &[
    "password",
    "token",
    "secret",
    "private_key",
    "api_key",
    "apikey",
    "credential",
];

/// Placeholder written over redacted values
pub const REDACTED: &str = "[REDACTED]";

/// Dev-server section of a resolved config
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DevServerSettings {
    pub host: String,
    #[serde(deserialize_with = "port_number_or_string")]
    pub port: u16,
    #[serde(rename = "static")]
    pub static_dir: Option<String>,
    pub compress: bool,
    pub hot: bool,
    pub open: bool,
}

impl Default for DevServerSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8066,
            static_dir: None,
            compress: true,
            hot: true,
            open: true,
        }
    }
}

fn port_number_or_string<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Number(u64),
        Text(String),
    }

    let port = match Port::deserialize(deserializer)? {
        Port::Number(n) => u16::try_from(n).ok(),
        Port::Text(text) => text.trim().parse::<u16>().ok(),
    };
    port.filter(|p| *p != 0)
        .ok_or_else(|| serde::de::Error::custom("port must be an integer in [1, 65535]"))
}

/// A validated configuration, consumed once by the launcher.
///
/// Only produced by a successful merge: `entry` and `output` are present,
/// no placeholders remain, and the typed sections parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    fragment: ConfigFragment,
    output_path: String,
    rules: Vec<ModuleRule>,
    plugins: Vec<Plugin>,
    minimizers: Vec<Minimizer>,
    dev_server: DevServerSettings,
}

impl ResolvedConfig {
    pub(crate) fn new(
        fragment: ConfigFragment,
        output_path: String,
        rules: Vec<ModuleRule>,
        plugins: Vec<Plugin>,
        minimizers: Vec<Minimizer>,
        dev_server: DevServerSettings,
    ) -> Self {
        Self {
            fragment,
            output_path,
            rules,
            plugins,
            minimizers,
            dev_server,
        }
    }

    /// Named entry points; a single string entry is named `main`
    pub fn entry_points(&self) -> BTreeMap<String, String> {
        match self.fragment.get("entry") {
            Some(Value::String(entry)) => {
                [("main".to_string(), entry.clone())].into_iter().collect()
            }
            Some(Value::Object(entries)) => entries
                .iter()
                .filter_map(|(name, path)| Some((name.clone(), path.as_str()?.to_string())))
                .collect(),
            _ => BTreeMap::new(),
        }
    }

    pub fn output_path(&self) -> &str {
        &self.output_path
    }

    pub fn mode(&self) -> Option<&str> {
        self.fragment.get_str("mode")
    }

    pub fn rules(&self) -> &[ModuleRule] {
        &self.rules
    }

    pub fn plugins(&self) -> &[Plugin] {
        &self.plugins
    }

    pub fn minimizers(&self) -> &[Minimizer] {
        &self.minimizers
    }

    pub fn dev_server(&self) -> &DevServerSettings {
        &self.dev_server
    }

    pub fn environment_variables(&self) -> BTreeMap<String, String> {
        self.fragment
            .get(ENVIRONMENT_NAMESPACE)
            .and_then(Value::as_object)
            .map(|vars| {
                vars.iter()
                    .filter_map(|(k, v)| Some((k.clone(), v.as_str()?.to_string())))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Get a config value by path (dot-separated)
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.fragment.get(path)
    }

    pub fn fragment(&self) -> &ConfigFragment {
        &self.fragment
    }

    pub fn into_fragment(self) -> ConfigFragment {
        self.fragment
    }

    /// SHA-256 over the canonical (JCS) JSON form
    pub fn fingerprint(&self) -> Result<String, serde_json::Error> {
        let jcs_bytes =
            serde_json_canonicalizer::to_vec(&self.fragment).map_err(serde_json::Error::custom)?;
        let mut hasher = Sha256::new();
        hasher.update(&jcs_bytes);
        Ok(hex::encode(hasher.finalize()))
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.fragment)
    }

    /// Copy of the config with secret-like values redacted, plus the
    /// redacted key paths
    pub fn redacted(&self) -> (Value, Vec<String>) {
        let mut value = self.fragment.to_value();
        let mut redactions = Vec::new();
        redact_recursive(&mut value, &KeyPath::root(), &mut redactions);
        (value, redactions)
    }
}

fn redact_recursive(value: &mut Value, path: &KeyPath, redactions: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, val) in map.iter_mut() {
                let key_lower = key.to_lowercase();
                let current_path = path.child(key.as_str());

                // Check if this key contains secret-like words
                let is_secret = SECRET_KEYS.iter().any(|s| key_lower.contains(s));

                if is_secret && !val.is_object() && !val.is_array() {
                    *val = Value::String(REDACTED.to_string());
                    redactions.push(current_path.to_string());
                } else {
                    redact_recursive(val, &current_path, redactions);
                }
            }
        }
        Value::Array(arr) => {
            for (i, val) in arr.iter_mut().enumerate() {
                redact_recursive(val, &path.index(i), redactions);
            }
        }
        _ => {}
    }
}
