//! Build plugins and minimizers

use serde::{Deserialize, Serialize};

/// HTML minification switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HtmlMinify {
    #[serde(default)]
    pub collapse_whitespace: bool,
    #[serde(default)]
    pub remove_comments: bool,
}

/// A named build plugin
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "plugin", rename_all = "kebab-case")]
pub enum Plugin {
    ProgressBar {
        format: String,
    },
    HotModuleReplacement,
    Html {
        template: String,
        title: String,
        filename: String,
        #[serde(default)]
        minify: HtmlMinify,
    },
    #[serde(rename_all = "camelCase")]
    ExtractCss {
        filename: String,
        chunk_filename: String,
    },
    Clean,
    /// Exposes the listed environment variables to the bundle
    Environment {
        keys: Vec<String>,
    },
}

impl Plugin {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ProgressBar { .. } => "progress-bar",
            Self::HotModuleReplacement => "hot-module-replacement",
            Self::Html { .. } => "html",
            Self::ExtractCss { .. } => "extract-css",
            Self::Clean => "clean",
            Self::Environment { .. } => "environment",
        }
    }
}

/// Output minimizers, run when `optimization.minimize` is set
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "minimizer", rename_all = "kebab-case")]
pub enum Minimizer {
    #[serde(rename_all = "camelCase")]
    Terser {
        #[serde(default)]
        drop_console: bool,
        #[serde(default)]
        drop_debugger: bool,
    },
    CssMinimizer,
}
