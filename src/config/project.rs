//! Project configuration (garfield.toml)
//!
//! Every section is optional; an absent file yields the built-in defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::defaults::{BuildParams, DevServerParams};

/// Default project file name, looked up in the project root
pub const PROJECT_FILE: &str = "garfield.toml";

/// Placeholder in engine arguments replaced with the resolved config path
pub const CONFIG_ARG_PLACEHOLDER: &str = "{config}";

/// Error types for project config operations
#[derive(Debug, thiserror::Error)]
pub enum ProjectConfigError {
    #[error("Failed to read project config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Where environment files live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvironmentsConfig {
    /// Directory holding `.env.<environment>` files, relative to the root
    pub dir: String,
}

impl Default for EnvironmentsConfig {
    fn default() -> Self {
        Self { dir: ".".to_string() }
    }
}

/// External build/serve engine invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub program: String,

    /// Arguments; `{config}` is replaced with the resolved config path
    pub args: Vec<String>,

    /// Where the resolved config is written, relative to the root
    pub config_out: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program: "npx".to_string(),
            args: vec![
                "webpack".to_string(),
                "serve".to_string(),
                "--config".to_string(),
                CONFIG_ARG_PLACEHOLDER.to_string(),
            ],
            config_out: ".garfield/resolved.json".to_string(),
        }
    }
}

/// Project configuration from garfield.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    pub build: BuildParams,
    pub dev_server: DevServerParams,
    pub environments: EnvironmentsConfig,
    pub engine: EngineConfig,
}

impl ProjectConfig {
    /// Load the project config for `root`.
    ///
    /// An explicit path must exist. Without one, `<root>/garfield.toml` is
    /// used when present and the built-in defaults otherwise.
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self, ProjectConfigError> {
        let config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = root.join(PROJECT_FILE);
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    tracing::debug!(root = %root.display(), "no project file, using defaults");
                    Self::default()
                }
            }
        };
        Ok(config.with_root(root))
    }

    /// Load and parse config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ProjectConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ProjectConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }

    /// Parse config from a TOML string
    pub fn parse(s: &str) -> Result<Self, ProjectConfigError> {
        let config: ProjectConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_root(mut self, root: &Path) -> Self {
        self.build.root = root.to_path_buf();
        self
    }

    pub fn root(&self) -> &Path {
        &self.build.root
    }

    pub fn environments_dir(&self) -> PathBuf {
        self.build.root.join(&self.environments.dir)
    }

    pub fn engine_config_out(&self) -> PathBuf {
        self.build.root.join(&self.engine.config_out)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ProjectConfigError> {
        let required = [
            ("build.entry", &self.build.entry),
            ("build.output_dir", &self.build.output_dir),
            ("build.script_filename", &self.build.script_filename),
            ("build.asset_filename", &self.build.asset_filename),
            ("dev_server.host", &self.dev_server.host),
            ("engine.program", &self.engine.program),
            ("engine.config_out", &self.engine.config_out),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(ProjectConfigError::Validation(format!(
                    "'{}' must not be empty",
                    key
                )));
            }
        }

        if self.dev_server.port == 0 {
            return Err(ProjectConfigError::Validation(
                "'dev_server.port' must be in [1, 65535]".to_string(),
            ));
        }

        if let Some(alias) = self.build.aliases.keys().find(|alias| alias.is_empty()) {
            return Err(ProjectConfigError::Validation(format!(
                "empty alias name '{}' in 'build.aliases'",
                alias
            )));
        }

        if self.build.extensions.iter().any(|ext| !ext.starts_with('.')) {
            return Err(ProjectConfigError::Validation(
                "every entry in 'build.extensions' must start with '.'".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_empty_file_yields_defaults() {
        let config = ProjectConfig::parse("").unwrap();
        assert_eq!(config, ProjectConfig::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = ProjectConfig::parse(
            r#"
            [build]
            entry = "src/main.tsx"

            [build.aliases]
            "~" = "src"

            [dev_server]
            port = 3000
            "#,
        )
        .unwrap();

        assert_eq!(config.build.entry, "src/main.tsx");
        assert_eq!(config.build.output_dir, "dist");
        assert_eq!(config.build.aliases.len(), 1);
        assert_eq!(config.dev_server.port, 3000);
        assert_eq!(config.dev_server.host, "localhost");
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = ProjectConfig::parse("[build]\nentrypoint = \"x\"\n");
        assert!(matches!(result, Err(ProjectConfigError::Parse(_))));
    }

    #[test]
    fn test_validation_empty_entry() {
        let result = ProjectConfig::parse("[build]\nentry = \"  \"\n");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("build.entry"), "unexpected error: {}", err);
    }

    #[test]
    fn test_validation_zero_port() {
        let result = ProjectConfig::parse("[dev_server]\nport = 0\n");
        assert!(matches!(result, Err(ProjectConfigError::Validation(_))));
    }

    #[test]
    fn test_validation_extension_without_dot() {
        let result = ProjectConfig::parse("[build]\nextensions = [\"ts\"]\n");
        assert!(matches!(result, Err(ProjectConfigError::Validation(_))));
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ProjectConfig::load(dir.path(), None).unwrap();

        assert_eq!(config.root(), dir.path());
        assert_eq!(config.environments_dir(), dir.path().join("."));
        assert_eq!(config.build.entry, "src/index.tsx");
    }

    #[test]
    fn test_load_default_file_from_root() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(PROJECT_FILE),
            "[environments]\ndir = \"env\"\n",
        )
        .unwrap();

        let config = ProjectConfig::load(dir.path(), None).unwrap();
        assert_eq!(config.environments_dir(), dir.path().join("env"));
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        let result = ProjectConfig::load(dir.path(), Some(&missing));
        assert!(matches!(result, Err(ProjectConfigError::Io { .. })));
    }

    #[test]
    fn test_load_explicit_file() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, "[engine]").unwrap();
        writeln!(temp, "program = \"node\"").unwrap();
        writeln!(temp, "args = [\"serve.js\", \"{{config}}\"]").unwrap();

        let config = ProjectConfig::load(Path::new("/srv/app"), Some(temp.path())).unwrap();
        assert_eq!(config.engine.program, "node");
        assert_eq!(config.engine.args, vec!["serve.js", CONFIG_ARG_PLACEHOLDER]);
        assert_eq!(
            config.engine_config_out(),
            PathBuf::from("/srv/app/.garfield/resolved.json")
        );
    }
}
