//! Environment overlay loader
//!
//! Projects an environment-scoped variable set into a fragment under the
//! `environmentVariables` namespace. The process environment is never read
//! or written.

mod dotenv;
mod store;

pub use dotenv::parse_env;
pub use store::{EnvFileStore, KeyValueStore, MemoryStore, StoreEntry};

use garfield_fragment::{ConfigFragment, Map, Value};
use serde_json::json;
use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;

use crate::build::Plugin;
use crate::strategy::EnvironmentKey;

/// Fragment key holding the projected variables
pub const ENVIRONMENT_NAMESPACE: &str = "environmentVariables";

/// Overlay loading errors. All of them are recoverable.
#[derive(Debug, thiserror::Error)]
pub enum OverlayError {
    #[error("no overlay source for '{key}' at {location}")]
    NotFound {
        key: EnvironmentKey,
        location: String,
    },

    #[error("failed to read {location}: {source}")]
    Io {
        location: String,
        #[source]
        source: io::Error,
    },

    #[error("{location}: {source}")]
    Parse {
        location: String,
        #[source]
        source: dotenvy::Error,
    },
}

/// A loaded environment overlay
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentOverlay {
    pub key: EnvironmentKey,
    pub fragment: ConfigFragment,
    pub path: Option<PathBuf>,
    pub digest: Option<String>,
}

impl EnvironmentOverlay {
    /// Names of the projected variables, sorted
    pub fn variable_names(&self) -> Vec<String> {
        self.fragment
            .get(ENVIRONMENT_NAMESPACE)
            .and_then(Value::as_object)
            .map(|vars| vars.keys().cloned().collect())
            .unwrap_or_default()
    }
}

/// Project variables into an overlay fragment.
///
/// A non-empty set also registers an `environment` plugin listing the
/// variable names.
pub fn project(variables: &BTreeMap<String, String>) -> ConfigFragment {
    let vars: Map<String, Value> = variables
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();

    let fragment = ConfigFragment::empty().with(ENVIRONMENT_NAMESPACE, vars);
    if variables.is_empty() {
        return fragment;
    }

    let plugin = Plugin::Environment {
        keys: variables.keys().cloned().collect(),
    };
    fragment.with("plugins", json!([plugin]))
}

/// Load the overlay for `key` from `store`
pub fn load_overlay(
    key: EnvironmentKey,
    store: &dyn KeyValueStore,
) -> Result<EnvironmentOverlay, OverlayError> {
    let entry = store.load(key)?;
    tracing::debug!(
        environment = %key,
        location = %store.location(key),
        variables = entry.variables.len(),
        "environment overlay loaded"
    );
    Ok(EnvironmentOverlay {
        key,
        fragment: project(&entry.variables),
        path: entry.path,
        digest: entry.digest,
    })
}

/// Load the overlay for `key`, degrading to no overlay on any error
pub fn load_overlay_or_empty(
    key: EnvironmentKey,
    store: &dyn KeyValueStore,
) -> Option<EnvironmentOverlay> {
    match load_overlay(key, store) {
        Ok(overlay) => Some(overlay),
        Err(e) => {
            tracing::warn!(environment = %key, error = %e, "using empty environment overlay");
            None
        }
    }
}
