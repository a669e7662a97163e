//! Structural validation of a merged configuration

use garfield_fragment::{ConfigFragment, KeyPath, Value};
use serde::de::DeserializeOwned;

use super::resolved::{DevServerSettings, ResolvedConfig};
use crate::build::{Minimizer, ModuleRule, Plugin, RuleError};

/// Recognized values of the `mode` key
pub const MODES: &[&str] = &["development", "production", "none"];

/// Fatal resolution errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("missing required key '{path}'")]
    MissingKey { path: String },

    #[error("'{path}' must be {expected}")]
    InvalidShape { path: String, expected: &'static str },

    #[error("unresolved placeholder '${{{name}}}' at '{path}'")]
    UnresolvedPlaceholder { path: String, name: String },

    #[error("invalid value at '{path}': {reason}")]
    InvalidVariant { path: String, reason: String },

    #[error("invalid pattern at '{path}': {reason}")]
    InvalidPattern { path: String, reason: String },
}

impl From<RuleError> for ConfigValidationError {
    fn from(err: RuleError) -> Self {
        match err {
            RuleError::InvalidPattern { path, reason } => Self::InvalidPattern { path, reason },
        }
    }
}

fn non_empty_str(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.trim().is_empty())
}

fn check_entry(fragment: &ConfigFragment) -> Result<(), ConfigValidationError> {
    const EXPECTED: &str = "a non-empty string or a non-empty map of entry paths";
    let invalid = || ConfigValidationError::InvalidShape {
        path: "entry".to_string(),
        expected: EXPECTED,
    };

    match fragment.get("entry") {
        None | Some(Value::Null) => Err(ConfigValidationError::MissingKey {
            path: "entry".to_string(),
        }),
        Some(value @ Value::String(_)) => non_empty_str(value).map(|_| ()).ok_or_else(invalid),
        Some(Value::Object(entries)) if !entries.is_empty() => {
            match entries.iter().find(|(_, v)| non_empty_str(v).is_none()) {
                Some((name, _)) => Err(ConfigValidationError::InvalidShape {
                    path: KeyPath::parse("entry").child(name.as_str()).to_string(),
                    expected: "a non-empty string",
                }),
                None => Ok(()),
            }
        }
        Some(_) => Err(invalid()),
    }
}

fn check_output(fragment: &ConfigFragment) -> Result<String, ConfigValidationError> {
    match fragment.get("output") {
        None | Some(Value::Null) => Err(ConfigValidationError::MissingKey {
            path: "output".to_string(),
        }),
        Some(value @ Value::String(_)) => non_empty_str(value).map(str::to_string).ok_or_else(|| {
            ConfigValidationError::InvalidShape {
                path: "output".to_string(),
                expected: "a non-empty string or a map with 'path'",
            }
        }),
        Some(Value::Object(output)) => match output.get("path") {
            None | Some(Value::Null) => Err(ConfigValidationError::MissingKey {
                path: "output.path".to_string(),
            }),
            Some(path) => non_empty_str(path).map(str::to_string).ok_or_else(|| {
                ConfigValidationError::InvalidShape {
                    path: "output.path".to_string(),
                    expected: "a non-empty string",
                }
            }),
        },
        Some(_) => Err(ConfigValidationError::InvalidShape {
            path: "output".to_string(),
            expected: "a non-empty string or a map with 'path'",
        }),
    }
}

fn check_mode(fragment: &ConfigFragment) -> Result<(), ConfigValidationError> {
    match fragment.get("mode") {
        None => Ok(()),
        Some(Value::String(mode)) if MODES.contains(&mode.as_str()) => Ok(()),
        Some(_) => Err(ConfigValidationError::InvalidShape {
            path: "mode".to_string(),
            expected: "one of development, production, none",
        }),
    }
}

/// Parse an optional sequence of typed variants at `path`
fn typed_sequence<T: DeserializeOwned>(
    fragment: &ConfigFragment,
    path: &str,
) -> Result<Vec<T>, ConfigValidationError> {
    let key_path = KeyPath::parse(path);
    let items = match fragment.get_path(&key_path) {
        None => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(ConfigValidationError::InvalidShape {
                path: path.to_string(),
                expected: "a sequence",
            })
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value(item.clone()).map_err(|e| ConfigValidationError::InvalidVariant {
                path: key_path.index(i).to_string(),
                reason: e.to_string(),
            })
        })
        .collect()
}

fn dev_server(fragment: &ConfigFragment) -> Result<DevServerSettings, ConfigValidationError> {
    match fragment.get("devServer") {
        None => Ok(DevServerSettings::default()),
        Some(value @ Value::Object(_)) => serde_json::from_value(value.clone()).map_err(|e| {
            ConfigValidationError::InvalidVariant {
                path: "devServer".to_string(),
                reason: e.to_string(),
            }
        }),
        Some(_) => Err(ConfigValidationError::InvalidShape {
            path: "devServer".to_string(),
            expected: "a map",
        }),
    }
}

/// Validate a merged, placeholder-free fragment and wrap it
pub fn validate(fragment: ConfigFragment) -> Result<ResolvedConfig, ConfigValidationError> {
    check_entry(&fragment)?;
    let output_path = check_output(&fragment)?;
    check_mode(&fragment)?;

    let rules: Vec<ModuleRule> = typed_sequence(&fragment, "module.rules")?;
    let rules_path = KeyPath::parse("module.rules");
    for (i, rule) in rules.iter().enumerate() {
        rule.validate(&rules_path.index(i))?;
    }

    let plugins: Vec<Plugin> = typed_sequence(&fragment, "plugins")?;
    let minimizers: Vec<Minimizer> = typed_sequence(&fragment, "optimization.minimizer")?;
    let dev_server = dev_server(&fragment)?;

    Ok(ResolvedConfig::new(
        fragment,
        output_path,
        rules,
        plugins,
        minimizers,
        dev_server,
    ))
}
