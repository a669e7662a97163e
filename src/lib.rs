//! Garfield CLI - layered build-configuration resolver
//!
//! Resolves the build configuration of a frontend project for a named
//! environment and launches an external dev-server engine with it:
//! strategy dispatch, base layer, environment overlay, feature overlays,
//! merge and validation, launch.

pub mod build;
pub mod config;
pub mod launcher;
pub mod logging;
pub mod overlay;
pub mod resolve;
pub mod strategy;

pub use config::{ProjectConfig, ProjectConfigError};
pub use garfield_fragment::{ConfigFragment, KeyPath, MergePolicy, MergeStrategy};
pub use launcher::{
    claim_process_slot, BuildEngine, EngineEvent, EngineStartError, LaunchError, LaunchHandle,
    LaunchState, Launcher, MockEngine, ProcessEngine, ReadyEvent,
};
pub use overlay::{load_overlay, EnvFileStore, KeyValueStore, MemoryStore, OverlayError};
pub use resolve::{merge, ConfigValidationError, Resolution, ResolvedConfig, Resolver};
pub use strategy::{resolve_strategy, EnvironmentKey};
