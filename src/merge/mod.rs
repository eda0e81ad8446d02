//! Configuration resolver: merges a base tree with an overlay tree.
//!
//! The resolver is split into three parts:
//! 1. **Classifier** - picks a [`Strategy`] for each object key
//! 2. **Merger** - walks both trees and applies the chosen strategies
//! 3. **Dedupe** - identity keys for first-wins array de-duplication
//!
//! ## Strategy priority
//! Custom merger, then `concat_keys`, `replace_keys`, `dedupe_keys`, and
//! finally the smart default, which looks at the overlay value's shape:
//! objects recurse, arrays follow [`ArrayStrategy`], everything else is
//! replaced.

mod classify;
mod dedupe;
mod merger;
mod options;
mod strategy;

pub use classify::{Strategy, classify};
pub use dedupe::{dedupe, find_duplicates, has_identity, item_key};
pub use merger::{merge, merge_all, merge_trees};
pub use options::{
    ArrayStrategy, DEFAULT_IDENTITY_KEYS, LOCATION_CONCAT_KEYS, LOCATION_DEDUPE_KEYS,
    LOCATION_REPLACE_KEYS, MergeOptions,
};
pub use strategy::{Concat, DeepMerge, Dedupe, FnMerger, KeyMerger, PreferOverlay, Replace};
