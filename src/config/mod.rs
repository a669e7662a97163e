//! Project configuration
//!
//! Static inputs supplied by the hosting project:
//! 1. Built-in build parameters (source layout, naming templates)
//! 2. Optional `garfield.toml` in the project root overriding them

mod defaults;
mod project;

pub use defaults::{BuildParams, DevServerParams};
pub use project::{
    EngineConfig, EnvironmentsConfig, ProjectConfig, ProjectConfigError, CONFIG_ARG_PLACEHOLDER,
    PROJECT_FILE,
};
