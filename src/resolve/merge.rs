//! Config merger
//!
//! Folds an ordered sequence of fragments into a [`ResolvedConfig`]:
//! - Maps: deep-merge by key
//! - Sequences: replace, except at additive paths where they concatenate
//! - Scalars and null: later layer wins
//!
//! Placeholders are expanded and the result validated only after the fold,
//! so the outcome depends on the composed fragment alone.

use garfield_fragment::{compose, ConfigFragment, MergePolicy};

use super::placeholder::expand_placeholders;
use super::resolved::ResolvedConfig;
use super::validate::{validate, ConfigValidationError};

/// Sequences that accumulate across layers
pub const ADDITIVE_PATHS: &[&str] = &["plugins", "module.rules", "optimization.minimizer"];

/// The merge policy used for every resolution
pub fn default_policy() -> MergePolicy {
    ADDITIVE_PATHS
        .iter()
        .fold(MergePolicy::new(), |policy, path| policy.additive(path))
}

/// Compose fragments without validating
pub fn merge_fragments(policy: &MergePolicy, fragments: &[ConfigFragment]) -> ConfigFragment {
    compose(policy, fragments)
}

/// Expand placeholders in a composed fragment and validate it
pub fn finalize(composed: ConfigFragment) -> Result<ResolvedConfig, ConfigValidationError> {
    let expanded = expand_placeholders(composed)?;
    validate(expanded)
}

/// Merge fragments in order (later fragments take precedence) with the
/// default policy
pub fn merge(fragments: &[ConfigFragment]) -> Result<ResolvedConfig, ConfigValidationError> {
    merge_with_policy(&default_policy(), fragments)
}

pub fn merge_with_policy(
    policy: &MergePolicy,
    fragments: &[ConfigFragment],
) -> Result<ResolvedConfig, ConfigValidationError> {
    let composed = merge_fragments(policy, fragments);
    tracing::debug!(layers = fragments.len(), keys = composed.len(), "fragments composed");
    finalize(composed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use garfield_fragment::{MergeStrategy, Value};
    use serde_json::json;

    fn fragment(value: Value) -> ConfigFragment {
        ConfigFragment::from_value(value).unwrap()
    }

    fn base() -> ConfigFragment {
        fragment(json!({
            "entry": "src/index.tsx",
            "output": {"path": "dist", "filename": "js/[name].js"},
            "mode": "development",
            "plugins": [{"plugin": "clean"}]
        }))
    }

    #[test]
    fn test_later_layer_wins() {
        let resolved = merge(&[base(), fragment(json!({"mode": "production"}))]).unwrap();
        assert_eq!(resolved.mode(), Some("production"));
        assert_eq!(resolved.get("output.filename"), Some(&json!("js/[name].js")));
    }

    #[test]
    fn test_plugins_accumulate() {
        let resolved = merge(&[
            base(),
            fragment(json!({"plugins": [{"plugin": "hot-module-replacement"}]})),
        ])
        .unwrap();

        let names: Vec<_> = resolved.plugins().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["clean", "hot-module-replacement"]);
    }

    #[test]
    fn test_non_additive_sequence_replaced() {
        let resolved = merge(&[
            base().with("resolve", json!({"extensions": [".ts", ".js"]})),
            fragment(json!({"resolve": {"extensions": [".tsx"]}})),
        ])
        .unwrap();
        assert_eq!(resolved.get("resolve.extensions"), Some(&json!([".tsx"])));
    }

    #[test]
    fn test_custom_policy() {
        let policy = default_policy().with_rule("plugins", MergeStrategy::Replace);
        let resolved = merge_with_policy(
            &policy,
            &[base(), fragment(json!({"plugins": [{"plugin": "hot-module-replacement"}]}))],
        )
        .unwrap();
        assert_eq!(resolved.plugins().len(), 1);
    }

    #[test]
    fn test_missing_entry_fails() {
        let err = merge(&[fragment(json!({"output": "dist"}))]).unwrap_err();
        assert!(matches!(err, ConfigValidationError::MissingKey { ref path } if path == "entry"));
    }

    #[test]
    fn test_deterministic() {
        let layers = [base(), fragment(json!({"devServer": {"port": 9000}}))];
        let first = merge(&layers).unwrap();
        let second = merge(&layers).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
    }

    #[test]
    fn test_associative_in_effect() {
        let a = base();
        let b = fragment(json!({
            "plugins": [{"plugin": "hot-module-replacement"}],
            "mode": "none"
        }));
        let c = fragment(json!({"devServer": {"host": "0.0.0.0"}, "mode": "production"}));

        let flat = merge(&[a.clone(), b.clone(), c.clone()]).unwrap();
        let nested = merge(&[merge(&[a, b]).unwrap().into_fragment(), c]).unwrap();
        assert_eq!(flat, nested);
    }

    #[test]
    fn test_placeholders_expand_after_merge() {
        let resolved = merge(&[
            base().with("devServer", json!({"host": "${HOST}"})),
            fragment(json!({"environmentVariables": {"HOST": "0.0.0.0"}})),
        ])
        .unwrap();
        assert_eq!(resolved.dev_server().host, "0.0.0.0");
    }
}
