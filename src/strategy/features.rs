//! Feature overlays selected per environment

use garfield_fragment::ConfigFragment;
use serde_json::json;

use super::EnvironmentKey;
use crate::build::{Minimizer, Plugin};
use crate::config::ProjectConfig;

/// A named fragment applied on top of the base and environment layers
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureOverlay {
    pub name: &'static str,
    pub fragment: ConfigFragment,
}

impl FeatureOverlay {
    fn new(name: &'static str, fragment: ConfigFragment) -> Self {
        Self { name, fragment }
    }
}

/// Feature overlays for `key`, in application order
pub fn feature_overlays(key: EnvironmentKey, project: &ProjectConfig) -> Vec<FeatureOverlay> {
    match key {
        EnvironmentKey::Development => development(project),
        EnvironmentKey::Production => production(),
    }
}

fn development(project: &ProjectConfig) -> Vec<FeatureOverlay> {
    let server = &project.dev_server;

    vec![
        FeatureOverlay::new(
            "mode",
            ConfigFragment::empty()
                .with("mode", "development")
                .with("devtool", "source-map")
                .with("stats", "none"),
        ),
        FeatureOverlay::new(
            "dev-server",
            ConfigFragment::empty().with(
                "devServer",
                json!({
                    "static": project.build.output_path(),
                    "compress": server.compress,
                    "hot": server.hot,
                    "open": server.open,
                    "host": server.host,
                    "port": server.port
                }),
            ),
        ),
        FeatureOverlay::new(
            "hot-reload",
            ConfigFragment::empty().with("plugins", json!([Plugin::HotModuleReplacement])),
        ),
    ]
}

fn production() -> Vec<FeatureOverlay> {
    let minimizers = [
        Minimizer::Terser {
            drop_console: true,
            drop_debugger: true,
        },
        Minimizer::CssMinimizer,
    ];

    vec![
        FeatureOverlay::new(
            "mode",
            ConfigFragment::empty()
                .with("mode", "production")
                .with("stats", "errors-only"),
        ),
        FeatureOverlay::new(
            "minification",
            ConfigFragment::empty().with(
                "optimization",
                json!({
                    "minimize": true,
                    "minimizer": minimizers
                }),
            ),
        ),
    ]
}
