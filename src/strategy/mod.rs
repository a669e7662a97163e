//! Strategy dispatcher
//!
//! Maps an optional environment name to a recognized [`EnvironmentKey`],
//! and a key to the feature overlays it applies. An absent or unrecognized
//! name selects no overlays at all; that is a valid outcome, not an error.

mod features;
mod key;

pub use features::{feature_overlays, FeatureOverlay};
pub use key::{EnvironmentKey, UnrecognizedEnvironment};

/// Outcome of looking up an environment name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// No name given (or an empty one)
    Absent,
    /// A name outside the recognized set
    Unrecognized(String),
    Recognized(EnvironmentKey),
}

impl Selection {
    pub fn key(&self) -> Option<EnvironmentKey> {
        match self {
            Self::Recognized(key) => Some(*key),
            Self::Absent | Self::Unrecognized(_) => None,
        }
    }
}

/// Classify an environment name without logging
pub fn classify(name: Option<&str>) -> Selection {
    match name {
        None => Selection::Absent,
        Some(name) if name.trim().is_empty() => Selection::Absent,
        Some(name) => match name.parse::<EnvironmentKey>() {
            Ok(key) => Selection::Recognized(key),
            Err(_) => Selection::Unrecognized(name.to_string()),
        },
    }
}

/// Resolve an environment name to a key.
///
/// Unrecognized names are logged as a warning and resolve to `None`, the
/// same as an absent name.
pub fn resolve_strategy(name: Option<&str>) -> Option<EnvironmentKey> {
    let selection = classify(name);
    match &selection {
        Selection::Absent => {
            tracing::debug!("no environment given, applying no overlays");
        }
        Selection::Unrecognized(name) => {
            tracing::warn!(
                environment = %name,
                recognized = %EnvironmentKey::recognized(),
                "unrecognized environment, applying no overlays"
            );
        }
        Selection::Recognized(key) => {
            tracing::debug!(environment = %key, "environment selected");
        }
    }
    selection.key()
}
