//! Base config builder
//!
//! Produces the environment-independent base layer and defines the closed
//! set of rule, loader, plugin and minimizer variants a resolved config may
//! contain.

mod base;
mod plugins;
mod rules;

pub use base::{build_base, default_rules, VENDOR_PATTERN};
pub use plugins::{HtmlMinify, Minimizer, Plugin};
pub use rules::{AssetKind, Loader, ModuleRule, RuleAction, RuleError};
