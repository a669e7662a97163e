//! Where each layer of a resolution came from

use serde::{Deserialize, Serialize};

/// Origin of a configuration layer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LayerOrigin {
    Base,
    Environment,
    Feature,
    Cli,
}

/// A contributing layer with provenance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LayerSource {
    /// Origin of this layer
    pub origin: LayerOrigin,

    /// Layer name (environment key or feature name)
    pub name: String,

    /// File path (None unless read from a file)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of raw file bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

impl LayerSource {
    pub fn new(origin: LayerOrigin, name: impl Into<String>) -> Self {
        Self {
            origin,
            name: name.into(),
            path: None,
            digest: None,
        }
    }

    pub fn with_file(mut self, path: Option<String>, digest: Option<String>) -> Self {
        self.path = path;
        self.digest = digest;
        self
    }
}
