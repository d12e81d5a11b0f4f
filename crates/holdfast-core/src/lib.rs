//! # Holdfast Core
//!
//! Pure primitives for Holdfast: context sets, nodes, and meta selectors.
//!
//! This crate contains no locking, no storage, no I/O. It is pure value
//! computation over the grants a permission holder owns.
//!
//! ## Key Types
//!
//! - [`ContextSet`] - Qualifier pairs restricting where a node applies
//! - [`ContextFilter`] - Selects nodes by context (exact, applies-in, includes)
//! - [`Node`] - An immutable grant: kind, value flag, context, optional expiry
//! - [`MetaType`] - Selector over meta, prefix and suffix nodes
//! - [`ChatMetaType`] - Prefix or suffix

pub mod context;
pub mod error;
pub mod meta_type;
pub mod node;

pub use context::{ContextFilter, ContextSet, SERVER_KEY, WORLD_KEY};
pub use error::{CoreError, Result};
pub use meta_type::{ChatMetaType, MetaType};
pub use node::{
    now_millis, Node, NodeBuilder, NodeKind, META_KEY, PREFIX_KEY, SUFFIX_KEY, WEIGHT_KEY,
};
