//! Built-in build parameters
//!
//! The defaults describe the standard project layout: a TypeScript React
//! entry under `src/`, output in `dist/` and an HTML template in `public/`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Static build parameters supplied by the hosting project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildParams {
    /// Project root; every other path is relative to it
    #[serde(skip)]
    pub root: PathBuf,

    /// Entry module (default: "src/index.tsx")
    pub entry: String,

    /// Output directory (default: "dist")
    pub output_dir: String,

    /// HTML template (default: "public/index.html")
    pub html_template: String,

    /// Document title injected into the HTML template
    pub title: String,

    /// Script bundle naming template
    pub script_filename: String,

    /// Asset module naming template
    pub asset_filename: String,

    /// Extracted stylesheet naming template
    pub css_filename: String,

    /// Extracted stylesheet chunk naming template
    pub css_chunk_filename: String,

    /// Extensions that may be omitted in imports, in lookup order
    pub extensions: Vec<String>,

    /// Import aliases, target relative to the project root
    pub aliases: BTreeMap<String, String>,
}

impl Default for BuildParams {
    fn default() -> Self {
        let aliases = [
            ("@", "src"),
            ("@assets", "src/assets"),
            ("@components", "src/components"),
        ]
        .into_iter()
        .map(|(alias, target)| (alias.to_string(), target.to_string()))
        .collect();

        Self {
            root: PathBuf::from("."),
            entry: "src/index.tsx".to_string(),
            output_dir: "dist".to_string(),
            html_template: "public/index.html".to_string(),
            title: "react-zero-to-one".to_string(),
            script_filename: "js/[contenthash].[name].js".to_string(),
            asset_filename: "static/[hash][ext]".to_string(),
            css_filename: "css/[name].[contenthash:8].css".to_string(),
            css_chunk_filename: "[id].css".to_string(),
            extensions: [".tsx", ".ts", ".jsx", ".js", ".json", ".d.ts"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            aliases,
        }
    }
}

impl BuildParams {
    /// Join a root-relative path onto the project root
    pub fn resolve_path(&self, relative: &str) -> String {
        self.root.join(relative).to_string_lossy().into_owned()
    }

    pub fn entry_path(&self) -> String {
        self.resolve_path(&self.entry)
    }

    pub fn output_path(&self) -> String {
        self.resolve_path(&self.output_dir)
    }
}

/// Dev-server settings applied by the development strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DevServerParams {
    pub host: String,
    pub port: u16,
    pub compress: bool,
    pub hot: bool,
    pub open: bool,
}

impl Default for DevServerParams {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8066,
            compress: true,
            hot: true,
            open: true,
        }
    }
}
