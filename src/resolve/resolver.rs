//! End-to-end resolution: select, load, compose, validate

use garfield_fragment::{ConfigFragment, MergePolicy};
use serde::Serialize;

use super::merge::{default_policy, merge_with_policy};
use super::provenance::{LayerOrigin, LayerSource};
use super::resolved::ResolvedConfig;
use super::validate::ConfigValidationError;
use crate::build::build_base;
use crate::config::ProjectConfig;
use crate::overlay::{load_overlay_or_empty, KeyValueStore};
use crate::strategy::{feature_overlays, resolve_strategy, EnvironmentKey};

/// Outcome of a successful resolution
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Selected environment; `None` when absent or unrecognized
    pub environment: Option<EnvironmentKey>,
    pub config: ResolvedConfig,
    /// Contributing layers, in application order
    pub sources: Vec<LayerSource>,
}

/// Machine-readable summary of a resolution
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionReport {
    pub environment: Option<EnvironmentKey>,
    pub fingerprint: String,
    pub sources: Vec<LayerSource>,
    pub config: serde_json::Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub redactions: Vec<String>,
}

impl Resolution {
    /// Build a report; secret-like values are redacted unless `raw`
    pub fn report(&self, raw: bool) -> Result<ResolutionReport, serde_json::Error> {
        let (config, redactions) = if raw {
            (self.config.fragment().to_value(), Vec::new())
        } else {
            self.config.redacted()
        };
        Ok(ResolutionReport {
            environment: self.environment,
            fingerprint: self.config.fingerprint()?,
            sources: self.sources.clone(),
            config,
            redactions,
        })
    }
}

/// Resolves a project's configuration for a named environment
pub struct Resolver<S: KeyValueStore> {
    project: ProjectConfig,
    store: S,
    policy: MergePolicy,
    cli: Option<ConfigFragment>,
}

impl<S: KeyValueStore> Resolver<S> {
    pub fn new(project: ProjectConfig, store: S) -> Self {
        Self {
            project,
            store,
            policy: default_policy(),
            cli: None,
        }
    }

    /// Apply `overrides` as the last, highest-precedence layer
    pub fn with_cli_overrides(mut self, overrides: ConfigFragment) -> Self {
        self.cli = (!overrides.is_empty()).then_some(overrides);
        self
    }

    pub fn project(&self) -> &ProjectConfig {
        &self.project
    }

    /// Resolve the configuration for `env_name`.
    ///
    /// Layers apply in order: base, environment overlay, feature overlays,
    /// command-line overrides. An absent or unrecognized name contributes
    /// no environment or feature layers. A missing or unreadable overlay
    /// source degrades to no overlay.
    pub fn resolve(&self, env_name: Option<&str>) -> Result<Resolution, ConfigValidationError> {
        let environment = resolve_strategy(env_name);

        let mut fragments = vec![build_base(&self.project.build)];
        let mut sources = vec![LayerSource::new(LayerOrigin::Base, "base")];

        if let Some(key) = environment {
            if let Some(overlay) = load_overlay_or_empty(key, &self.store) {
                sources.push(
                    LayerSource::new(LayerOrigin::Environment, key.as_str()).with_file(
                        overlay.path.as_ref().map(|p| p.display().to_string()),
                        overlay.digest.clone(),
                    ),
                );
                fragments.push(overlay.fragment);
            }

            for feature in feature_overlays(key, &self.project) {
                sources.push(LayerSource::new(LayerOrigin::Feature, feature.name));
                fragments.push(feature.fragment);
            }
        }

        if let Some(cli) = &self.cli {
            sources.push(LayerSource::new(LayerOrigin::Cli, "cli"));
            fragments.push(cli.clone());
        }

        let config = merge_with_policy(&self.policy, &fragments)?;
        tracing::info!(
            environment = environment.map(|k| k.as_str()).unwrap_or("none"),
            layers = sources.len(),
            "configuration resolved"
        );

        Ok(Resolution {
            environment,
            config,
            sources,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::Plugin;
    use crate::overlay::MemoryStore;
    use serde_json::json;

    fn resolver(store: MemoryStore) -> Resolver<MemoryStore> {
        Resolver::new(ProjectConfig::default(), store)
    }

    #[test]
    fn test_absent_and_unrecognized_equal_base() {
        let r = resolver(MemoryStore::new());
        let base = build_base(&ProjectConfig::default().build);

        for name in [None, Some("staging"), Some("")] {
            let resolution = r.resolve(name).unwrap();
            assert!(resolution.environment.is_none());
            assert_eq!(resolution.config.fragment(), &base);
            assert_eq!(resolution.sources.len(), 1);
        }
    }

    #[test]
    fn test_development_layers() {
        let store =
            MemoryStore::new().with_set(EnvironmentKey::Development, [("API_URL", "http://dev")]);
        let resolution = resolver(store).resolve(Some("development")).unwrap();

        let names: Vec<_> = resolution.sources.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["base", "development", "mode", "dev-server", "hot-reload"]
        );
        assert_eq!(resolution.config.mode(), Some("development"));
        assert_eq!(resolution.config.environment_variables()["API_URL"], "http://dev");
        assert!(resolution
            .config
            .plugins()
            .iter()
            .any(|p| matches!(p, Plugin::HotModuleReplacement)));
    }

    #[test]
    fn test_missing_overlay_still_applies_features() {
        let resolution = resolver(MemoryStore::new()).resolve(Some("production")).unwrap();
        assert_eq!(resolution.environment, Some(EnvironmentKey::Production));
        assert!(resolution
            .sources
            .iter()
            .all(|s| s.origin != LayerOrigin::Environment));
        assert_eq!(resolution.config.minimizers().len(), 2);
    }

    #[test]
    fn test_cli_overrides_win() {
        let overrides = ConfigFragment::empty().with("devServer", json!({"port": 3000}));
        let resolution = resolver(MemoryStore::new())
            .with_cli_overrides(overrides)
            .resolve(Some("development"))
            .unwrap();

        assert_eq!(resolution.config.dev_server().port, 3000);
        assert_eq!(resolution.sources.last().map(|s| s.origin), Some(LayerOrigin::Cli));
    }

    #[test]
    fn test_empty_cli_overrides_ignored() {
        let resolution = resolver(MemoryStore::new())
            .with_cli_overrides(ConfigFragment::empty())
            .resolve(None)
            .unwrap();
        assert_eq!(resolution.sources.len(), 1);
    }

    #[test]
    fn test_report_redacts() {
        let store =
            MemoryStore::new().with_set(EnvironmentKey::Production, [("SENTRY_TOKEN", "t0k")]);
        let resolution = resolver(store).resolve(Some("production")).unwrap();

        let report = resolution.report(false).unwrap();
        assert_eq!(report.config["environmentVariables"]["SENTRY_TOKEN"], "[REDACTED]");
        assert_eq!(report.redactions, vec!["environmentVariables.SENTRY_TOKEN"]);
        assert_eq!(report.fingerprint, resolution.config.fingerprint().unwrap());

        let raw = resolution.report(true).unwrap();
        assert_eq!(raw.config["environmentVariables"]["SENTRY_TOKEN"], "t0k");
    }
}
