//! Fragment merge logic
//!
//! Layers are applied in order, later layers overriding earlier ones:
//! - Maps: deep-merge by key
//! - Sequences: replace, or append when the policy flags the path additive
//! - Scalars and null: overlay wins

use serde_json::{Map, Value};

use crate::fragment::ConfigFragment;
use crate::path::KeyPath;
use crate::policy::{MergePolicy, MergeStrategy};

/// Merge two values found at `path`.
pub fn merge_values(policy: &MergePolicy, path: &KeyPath, base: Value, overlay: Value) -> Value {
    match policy.strategy_for(path, &base, &overlay) {
        MergeStrategy::MergeDeep => match (base, overlay) {
            (Value::Object(base_map), Value::Object(overlay_map)) => {
                Value::Object(merge_maps(policy, path, base_map, overlay_map))
            }
            (_, overlay) => overlay,
        },
        MergeStrategy::Concat => match (base, overlay) {
            (Value::Array(mut base_items), Value::Array(overlay_items)) => {
                base_items.extend(overlay_items);
                Value::Array(base_items)
            }
            (_, overlay) => overlay,
        },
        MergeStrategy::Replace => overlay,
    }
}

fn merge_maps(
    policy: &MergePolicy,
    path: &KeyPath,
    mut base: Map<String, Value>,
    overlay: Map<String, Value>,
) -> Map<String, Value> {
    for (key, overlay_value) in overlay {
        let merged = match base.remove(&key) {
            Some(base_value) => {
                merge_values(policy, &path.child(key.as_str()), base_value, overlay_value)
            }
            None => overlay_value,
        };
        base.insert(key, merged);
    }
    base
}

/// Merge `overlay` on top of `base`
pub fn merge_pair(
    policy: &MergePolicy,
    base: &ConfigFragment,
    overlay: &ConfigFragment,
) -> ConfigFragment {
    ConfigFragment::from_map(merge_maps(
        policy,
        &KeyPath::root(),
        base.entries().clone(),
        overlay.entries().clone(),
    ))
}

/// Fold fragments in order (first is the base, last has highest precedence)
pub fn compose<'a, I>(policy: &MergePolicy, fragments: I) -> ConfigFragment
where
    I: IntoIterator<Item = &'a ConfigFragment>,
{
    fragments
        .into_iter()
        .fold(ConfigFragment::empty(), |acc, next| merge_pair(policy, &acc, next))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fragment(value: Value) -> ConfigFragment {
        ConfigFragment::from_value(value).unwrap()
    }

    #[test]
    fn test_scalar_override() {
        let base = fragment(json!({"entry": "src/index", "output": "dist"}));
        let overlay = fragment(json!({"output": "build"}));
        let result = merge_pair(&MergePolicy::new(), &base, &overlay);

        assert_eq!(result.to_value(), json!({"entry": "src/index", "output": "build"}));
    }

    #[test]
    fn test_object_deep_merge() {
        let base = fragment(json!({
            "devServer": {"host": "localhost", "port": 8066}
        }));
        let overlay = fragment(json!({
            "devServer": {"port": 9000}
        }));
        let result = merge_pair(&MergePolicy::new(), &base, &overlay);

        assert_eq!(result.get_str("devServer.host"), Some("localhost"));
        assert_eq!(result.get("devServer.port"), Some(&json!(9000)));
    }

    #[test]
    fn test_array_replace_by_default() {
        let base = fragment(json!({"resolve": {"extensions": [".ts", ".js"]}}));
        let overlay = fragment(json!({"resolve": {"extensions": [".mjs"]}}));
        let result = merge_pair(&MergePolicy::new(), &base, &overlay);

        assert_eq!(result.get("resolve.extensions"), Some(&json!([".mjs"])));
    }

    #[test]
    fn test_additive_array_concat() {
        let policy = MergePolicy::new().additive("plugins");
        let base = fragment(json!({"plugins": ["html", "clean"]}));
        let overlay = fragment(json!({"plugins": ["hmr"]}));
        let result = merge_pair(&policy, &base, &overlay);

        assert_eq!(result.get("plugins"), Some(&json!(["html", "clean", "hmr"])));
    }

    #[test]
    fn test_nested_additive_path() {
        let policy = MergePolicy::new().additive("optimization.minimizer");
        let base = fragment(json!({
            "optimization": {"minimizer": ["terser"], "splitChunks": {"minSize": 3000}}
        }));
        let overlay = fragment(json!({
            "optimization": {"minimize": true, "minimizer": ["css"]}
        }));
        let result = merge_pair(&policy, &base, &overlay);

        assert_eq!(result.get("optimization.minimizer"), Some(&json!(["terser", "css"])));
        assert_eq!(result.get("optimization.minimize"), Some(&json!(true)));
        assert_eq!(result.get("optimization.splitChunks.minSize"), Some(&json!(3000)));
    }

    #[test]
    fn test_explicit_replace_on_map() {
        let policy = MergePolicy::new().with_rule("devServer", MergeStrategy::Replace);
        let base = fragment(json!({"devServer": {"host": "localhost", "port": 8066}}));
        let overlay = fragment(json!({"devServer": {"port": 9000}}));
        let result = merge_pair(&policy, &base, &overlay);

        assert_eq!(result.get("devServer"), Some(&json!({"port": 9000})));
    }

    #[test]
    fn test_null_override() {
        let base = fragment(json!({"devtool": "source-map"}));
        let overlay = fragment(json!({"devtool": null}));
        let result = merge_pair(&MergePolicy::new(), &base, &overlay);

        assert!(result.get("devtool").unwrap().is_null());
    }

    #[test]
    fn test_compose_is_associative() {
        let policy = MergePolicy::new().additive("plugins");
        let a = fragment(json!({"entry": "a", "plugins": [1], "nested": {"x": 1}}));
        let b = fragment(json!({"plugins": [2], "nested": {"y": 2}, "mode": "dev"}));
        let c = fragment(json!({"plugins": [3], "nested": {"x": 3}, "mode": null}));

        let flat = compose(&policy, [&a, &b, &c]);
        let left = compose(&policy, [&compose(&policy, [&a, &b]), &c]);
        let right = compose(&policy, [&a, &compose(&policy, [&b, &c])]);

        assert_eq!(flat, left);
        assert_eq!(flat, right);
        assert_eq!(flat.get("plugins"), Some(&json!([1, 2, 3])));
    }

    #[test]
    fn test_compose_empty_is_empty() {
        let none: Vec<&ConfigFragment> = Vec::new();
        assert!(compose(&MergePolicy::new(), none).is_empty());
    }
}
