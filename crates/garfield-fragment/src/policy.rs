//! Per-path merge rules.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::path::KeyPath;

/// How two values at the same key path combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MergeStrategy {
    /// Overlay value wins outright
    Replace,
    /// Sequences are appended, base elements first
    Concat,
    /// Maps merge key by key, recursively
    MergeDeep,
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replace => write!(f, "replace"),
            Self::Concat => write!(f, "concat"),
            Self::MergeDeep => write!(f, "mergeDeep"),
        }
    }
}

/// Merge rules keyed by path.
///
/// Paths without a rule merge maps deeply and replace everything else,
/// including sequences. A rule that does not fit the shapes it meets
/// (`concat` on non-sequences, `mergeDeep` on non-maps) falls back to
/// `replace`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergePolicy {
    rules: BTreeMap<KeyPath, MergeStrategy>,
}

impl MergePolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or overwrite the rule for a dot-separated path
    pub fn with_rule(mut self, path: &str, strategy: MergeStrategy) -> Self {
        self.rules.insert(KeyPath::parse(path), strategy);
        self
    }

    /// Flag a sequence path as additive
    pub fn additive(self, path: &str) -> Self {
        self.with_rule(path, MergeStrategy::Concat)
    }

    pub fn rule_for(&self, path: &KeyPath) -> Option<MergeStrategy> {
        self.rules.get(path).copied()
    }

    pub fn rules(&self) -> impl Iterator<Item = (&KeyPath, &MergeStrategy)> {
        self.rules.iter()
    }

    /// Strategy actually applied at `path` for this pair of values
    pub fn strategy_for(&self, path: &KeyPath, base: &Value, overlay: &Value) -> MergeStrategy {
        match self.rule_for(path) {
            Some(MergeStrategy::Replace) => MergeStrategy::Replace,
            Some(MergeStrategy::Concat) if base.is_array() && overlay.is_array() => {
                MergeStrategy::Concat
            }
            Some(MergeStrategy::MergeDeep) | None if base.is_object() && overlay.is_object() => {
                MergeStrategy::MergeDeep
            }
            _ => MergeStrategy::Replace,
        }
    }
}
