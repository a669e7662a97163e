//! `${NAME}` placeholder expansion
//!
//! Names resolve against the `environmentVariables` map of the merged
//! config. The values in that map are literal and are never expanded
//! themselves; `$${` produces a literal `${` everywhere else.

use garfield_fragment::{ConfigFragment, KeyPath, Map, Value};
use regex_lite::Regex;
use std::sync::OnceLock;

use super::validate::ConfigValidationError;
use crate::overlay::ENVIRONMENT_NAMESPACE;

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\$\{|\$\{([A-Za-z_][A-Za-z0-9_.\-]*)\}")
            .expect("placeholder pattern is valid")
    })
}

/// Replace every placeholder in `input` using `lookup`
fn substitute<E>(
    input: &str,
    mut lookup: impl FnMut(&str) -> Result<String, E>,
) -> Result<String, E> {
    let mut out = String::with_capacity(input.len());
    let mut last = 0;
    for caps in pattern().captures_iter(input) {
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&input[last..whole.start()]);
        match caps.get(1) {
            Some(name) => out.push_str(&lookup(name.as_str())?),
            None => out.push_str("${"),
        }
        last = whole.end();
    }
    out.push_str(&input[last..]);
    Ok(out)
}

fn lookup(
    vars: &Map<String, Value>,
    name: &str,
    path: &KeyPath,
) -> Result<String, ConfigValidationError> {
    vars.get(name)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ConfigValidationError::UnresolvedPlaceholder {
            path: path.to_string(),
            name: name.to_string(),
        })
}

fn expand_value(
    value: Value,
    path: &KeyPath,
    vars: &Map<String, Value>,
) -> Result<Value, ConfigValidationError> {
    match value {
        Value::String(text) => {
            let expanded = substitute(&text, |name| lookup(vars, name, path))?;
            Ok(Value::String(expanded))
        }
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| expand_value(item, &path.index(i), vars))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut expanded = Map::new();
            for (key, item) in map {
                let child = path.child(key.as_str());
                expanded.insert(key, expand_value(item, &child, vars)?);
            }
            Ok(Value::Object(expanded))
        }
        other => Ok(other),
    }
}

/// Expand every placeholder in the fragment
pub fn expand_placeholders(
    fragment: ConfigFragment,
) -> Result<ConfigFragment, ConfigValidationError> {
    let empty = Map::new();
    let raw = match fragment.get(ENVIRONMENT_NAMESPACE) {
        None => &empty,
        Some(Value::Object(vars)) => {
            if let Some((name, _)) = vars.iter().find(|(_, v)| !v.is_string()) {
                return Err(ConfigValidationError::InvalidShape {
                    path: KeyPath::parse(ENVIRONMENT_NAMESPACE).child(name.as_str()).to_string(),
                    expected: "a string",
                });
            }
            vars
        }
        Some(_) => {
            return Err(ConfigValidationError::InvalidShape {
                path: ENVIRONMENT_NAMESPACE.to_string(),
                expected: "a map of strings",
            })
        }
    };

    let mut expanded = Map::new();
    for (key, value) in fragment.entries() {
        let value = if key == ENVIRONMENT_NAMESPACE {
            value.clone()
        } else {
            expand_value(value.clone(), &KeyPath::root().child(key.as_str()), raw)?
        };
        expanded.insert(key.clone(), value);
    }

    Ok(ConfigFragment::from_map(expanded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn expand(value: Value) -> Result<Value, ConfigValidationError> {
        expand_placeholders(ConfigFragment::from_value(value).unwrap())
            .map(ConfigFragment::into_value)
    }

    #[test]
    fn test_expands_from_namespace() {
        let result = expand(json!({
            "environmentVariables": {"PUBLIC_DIR": "public", "HOST": "0.0.0.0"},
            "plugins": [{"plugin": "html", "template": "${PUBLIC_DIR}/index.html"}],
            "devServer": {"host": "${HOST}"}
        }))
        .unwrap();

        assert_eq!(result["plugins"][0]["template"], "public/index.html");
        assert_eq!(result["devServer"]["host"], "0.0.0.0");
    }

    #[test]
    fn test_variable_values_are_literal() {
        let result = expand(json!({
            "environmentVariables": {
                "PATTERN": "${HOME}/cache",
                "NOTE": "$${KEEP}"
            },
            "entry": "src/index.tsx",
            "output": {"path": "${PATTERN}"}
        }))
        .unwrap();

        assert_eq!(result["environmentVariables"]["PATTERN"], "${HOME}/cache");
        assert_eq!(result["environmentVariables"]["NOTE"], "$${KEEP}");
        // Substituted text is not expanded again
        assert_eq!(result["output"]["path"], "${HOME}/cache");
    }

    #[test]
    fn test_unknown_name_reports_path() {
        let err = expand(json!({"output": {"path": "${OUT_DIR}/dist"}})).unwrap_err();
        assert_eq!(
            err,
            ConfigValidationError::UnresolvedPlaceholder {
                path: "output.path".to_string(),
                name: "OUT_DIR".to_string()
            }
        );
    }

    #[test]
    fn test_escape_and_templates_untouched() {
        let result = expand(json!({
            "output": {"filename": "js/[contenthash].[name].js", "note": "$${LITERAL}"}
        }))
        .unwrap();

        assert_eq!(result["output"]["filename"], "js/[contenthash].[name].js");
        assert_eq!(result["output"]["note"], "${LITERAL}");
    }

    #[test]
    fn test_non_string_variable_rejected() {
        let err = expand(json!({"environmentVariables": {"PORT": 8066}})).unwrap_err();
        let ConfigValidationError::InvalidShape { path, .. } = err else {
            panic!("expected an invalid shape error");
        };
        assert_eq!(path, "environmentVariables.PORT");
    }
}
