//! Configuration resolution
//!
//! Composes the base layer, the environment overlay, feature overlays and
//! command-line overrides into one validated [`ResolvedConfig`]:
//! 1. Base layer (always)
//! 2. Environment overlay (`.env.<environment>`, optional)
//! 3. Feature overlays for the selected environment
//! 4. Command-line overrides
//!
//! Later layers take precedence. Resolution is deterministic: the same
//! inputs produce structurally equal results with the same fingerprint.

mod merge;
mod placeholder;
mod provenance;
mod resolved;
mod resolver;
mod validate;

pub use merge::{
    default_policy, finalize, merge, merge_fragments, merge_with_policy, ADDITIVE_PATHS,
};
pub use placeholder::expand_placeholders;
pub use provenance::{LayerOrigin, LayerSource};
pub use resolved::{DevServerSettings, ResolvedConfig, REDACTED};
pub use resolver::{Resolution, ResolutionReport, Resolver};
pub use validate::{validate, ConfigValidationError, MODES};
