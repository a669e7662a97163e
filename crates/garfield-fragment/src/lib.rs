//! Immutable configuration fragments and a path-aware deep merge.
//!
//! A [`ConfigFragment`] is one layer of build configuration. Layers are
//! folded left to right by [`compose`], with a [`MergePolicy`] deciding per
//! key path whether the overlay replaces, concatenates or recurses.
//!
//! Maps are backed by `serde_json::Map` without `preserve_order`, so keys
//! always iterate in sorted order and merging is independent of insertion
//! order.

mod fragment;
mod merge;
mod path;
mod policy;

pub use fragment::{ConfigFragment, FragmentError};
pub use merge::{compose, merge_pair, merge_values};
pub use path::KeyPath;
pub use policy::{MergePolicy, MergeStrategy};

pub use serde_json::{Map, Value};
