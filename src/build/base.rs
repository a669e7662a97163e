//! Base configuration (layer 1)
//!
//! Environment-independent description of build inputs, outputs, module
//! rules and module resolution.

use garfield_fragment::ConfigFragment;
use serde_json::{json, Map, Value};

use super::plugins::{HtmlMinify, Plugin};
use super::rules::{AssetKind, Loader, ModuleRule};
use crate::config::BuildParams;

/// Modules under this pattern are third-party
pub const VENDOR_PATTERN: &str = "node_modules";

/// The fixed module rule set
pub fn default_rules() -> Vec<ModuleRule> {
    vec![
        ModuleRule::transform(r"\.(js|ts)x?$", vec![Loader::Babel]).excluding(VENDOR_PATTERN),
        ModuleRule::transform(
            r"(?i)\.css$",
            vec![Loader::ExtractCss, Loader::Css { source_map: false }],
        )
        .including(VENDOR_PATTERN),
        ModuleRule::transform(
            r"(?i)\.s[ac]ss$",
            vec![
                Loader::Style,
                Loader::Css { source_map: true },
                Loader::Postcss {
                    source_map: true,
                    autoprefixer: true,
                },
                Loader::Sass { source_map: true },
            ],
        )
        .excluding(VENDOR_PATTERN),
        ModuleRule::asset(r"\.(woff|woff2|ttf|eot|svg)$", AssetKind::Resource)
            .excluding(VENDOR_PATTERN),
        ModuleRule::asset(r"\.(png|jpg|gif|jpeg|ico|cur)$", AssetKind::Resource)
            .excluding(VENDOR_PATTERN),
    ]
}

fn default_plugins(params: &BuildParams) -> Vec<Plugin> {
    vec![
        Plugin::Html {
            template: params.resolve_path(&params.html_template),
            title: params.title.clone(),
            filename: "index.html".to_string(),
            minify: HtmlMinify {
                collapse_whitespace: true,
                remove_comments: true,
            },
        },
        Plugin::ExtractCss {
            filename: params.css_filename.clone(),
            chunk_filename: params.css_chunk_filename.clone(),
        },
        Plugin::Clean,
    ]
}

/// Build the base configuration fragment.
///
/// Pure function of the build parameters; never fails.
pub fn build_base(params: &BuildParams) -> ConfigFragment {
    let aliases: Map<String, Value> = params
        .aliases
        .iter()
        .map(|(alias, target)| (alias.clone(), Value::String(params.resolve_path(target))))
        .collect();

    ConfigFragment::empty()
        .with("entry", params.entry_path())
        .with(
            "output",
            json!({
                "path": params.output_path(),
                "filename": params.script_filename,
                "assetModuleFilename": params.asset_filename
            }),
        )
        .with(
            "module",
            json!({
                "rules": default_rules()
            }),
        )
        .with(
            "resolve",
            json!({
                "extensions": params.extensions,
                "alias": aliases
            }),
        )
        .with("plugins", json!(default_plugins(params)))
        .with(
            "optimization",
            json!({
                "splitChunks": {
                    "minSize": 3000,
                    "cacheGroups": {
                        "vendors": {
                            "test": r"[\\/]node_modules[\\/]",
                            "name": "vendors",
                            "chunks": "all"
                        }
                    }
                }
            }),
        )
}
