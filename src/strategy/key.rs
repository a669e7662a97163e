//! Recognized environment keys

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A recognized environment.
///
/// The set is closed; `staging` and anything else is unrecognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentKey {
    Development,
    Production,
}

impl EnvironmentKey {
    pub const ALL: [EnvironmentKey; 2] = [EnvironmentKey::Development, EnvironmentKey::Production];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }

    /// Comma-separated list of recognized names, for messages
    pub fn recognized() -> String {
        Self::ALL
            .iter()
            .map(EnvironmentKey::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for EnvironmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A name outside the recognized set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized environment '{0}'")]
pub struct UnrecognizedEnvironment(pub String);

impl FromStr for EnvironmentKey {
    type Err = UnrecognizedEnvironment;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| UnrecognizedEnvironment(s.to_string()))
    }
}
