//! Key-value sources for environment overlays

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::dotenv::parse_env;
use super::OverlayError;
use crate::strategy::EnvironmentKey;

/// Variables loaded for one environment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreEntry {
    pub variables: BTreeMap<String, String>,

    /// Backing file, when there is one
    pub path: Option<PathBuf>,

    /// SHA-256 of the raw file bytes
    pub digest: Option<String>,
}

/// A source of environment-scoped variable sets
pub trait KeyValueStore {
    /// Where the set for `key` lives, for diagnostics
    fn location(&self, key: EnvironmentKey) -> String;

    /// Load the variable set for `key`
    fn load(&self, key: EnvironmentKey) -> Result<StoreEntry, OverlayError>;
}

/// Reads `.env.<environment>` files from a directory
#[derive(Debug, Clone)]
pub struct EnvFileStore {
    dir: PathBuf,
}

impl EnvFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn file_for(&self, key: EnvironmentKey) -> PathBuf {
        self.dir.join(format!(".env.{}", key))
    }
}

impl KeyValueStore for EnvFileStore {
    fn location(&self, key: EnvironmentKey) -> String {
        self.file_for(key).display().to_string()
    }

    fn load(&self, key: EnvironmentKey) -> Result<StoreEntry, OverlayError> {
        let path = self.file_for(key);
        let bytes = fs::read(&path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => OverlayError::NotFound {
                key,
                location: self.location(key),
            },
            _ => OverlayError::Io {
                location: self.location(key),
                source,
            },
        })?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let digest = hex::encode(hasher.finalize());

        let contents = String::from_utf8(bytes).map_err(|e| OverlayError::Io {
            location: self.location(key),
            source: io::Error::new(io::ErrorKind::InvalidData, e),
        })?;

        let variables = parse_env(&contents).map_err(|source| OverlayError::Parse {
            location: self.location(key),
            source,
        })?;

        Ok(StoreEntry {
            variables,
            path: Some(path),
            digest: Some(digest),
        })
    }
}

/// In-memory variable sets
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    sets: BTreeMap<EnvironmentKey, BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the variable set for `key`, replacing any previous one
    pub fn with_set<I, K, V>(mut self, key: EnvironmentKey, variables: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let set = variables
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.sets.insert(key, set);
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn location(&self, key: EnvironmentKey) -> String {
        format!("memory:{}", key)
    }

    fn load(&self, key: EnvironmentKey) -> Result<StoreEntry, OverlayError> {
        let variables = self
            .sets
            .get(&key)
            .cloned()
            .ok_or_else(|| OverlayError::NotFound {
                key,
                location: self.location(key),
            })?;
        Ok(StoreEntry {
            variables,
            path: None,
            digest: None,
        })
    }
}
