//! Module transformation rules
//!
//! Rules are a closed set of tagged variants. A rule matches module paths
//! by regular expression and either runs a loader chain or emits the file
//! as an asset.

use garfield_fragment::KeyPath;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};

/// Rule errors found while validating a resolved config
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("invalid pattern at '{path}': {reason}")]
    InvalidPattern { path: String, reason: String },
}

/// How matched files are emitted by an asset rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AssetKind {
    /// Separate file, referenced by URL
    Resource,
    /// Inlined as a data URI
    Inline,
    /// Inlined as source text
    Source,
}

/// A named loader in a transform chain
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "loader", rename_all = "kebab-case")]
pub enum Loader {
    Babel,
    Style,
    #[serde(rename_all = "camelCase")]
    Css {
        #[serde(default)]
        source_map: bool,
    },
    #[serde(rename_all = "camelCase")]
    Postcss {
        #[serde(default)]
        source_map: bool,
        #[serde(default)]
        autoprefixer: bool,
    },
    #[serde(rename_all = "camelCase")]
    Sass {
        #[serde(default)]
        source_map: bool,
    },
    ExtractCss,
}

/// What a rule does with the files it matches
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RuleAction {
    /// Run loaders, last to first
    Transform { uses: Vec<Loader> },
    /// Emit the file without transformation
    Asset { emit: AssetKind },
}

/// One module rule
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ModuleRule {
    /// Pattern matched against the module path
    pub test: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<String>,
    pub action: RuleAction,
}

impl ModuleRule {
    pub fn transform(test: &str, uses: Vec<Loader>) -> Self {
        Self {
            test: test.to_string(),
            include: None,
            exclude: None,
            action: RuleAction::Transform { uses },
        }
    }

    pub fn asset(test: &str, emit: AssetKind) -> Self {
        Self {
            test: test.to_string(),
            include: None,
            exclude: None,
            action: RuleAction::Asset { emit },
        }
    }

    pub fn including(mut self, pattern: &str) -> Self {
        self.include = Some(pattern.to_string());
        self
    }

    pub fn excluding(mut self, pattern: &str) -> Self {
        self.exclude = Some(pattern.to_string());
        self
    }

    /// Check every pattern compiles
    pub fn validate(&self, path: &KeyPath) -> Result<(), RuleError> {
        let patterns = [
            ("test", Some(&self.test)),
            ("include", self.include.as_ref()),
            ("exclude", self.exclude.as_ref()),
        ];
        for (field, pattern) in patterns {
            let Some(pattern) = pattern else { continue };
            Regex::new(pattern).map_err(|e| RuleError::InvalidPattern {
                path: path.child(field).to_string(),
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }
}
