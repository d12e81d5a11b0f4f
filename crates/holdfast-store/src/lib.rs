//! # Holdfast Store
//!
//! The node store owned by each permission holder.
//!
//! ## Overview
//!
//! A holder's grants live in a [`NodeStore`]: an insertion-ordered list of
//! unique [`Node`](holdfast_core::Node)s behind a per-holder `RwLock`.
//! Single-node and predicate mutations lock internally; operations that must
//! read and mutate as one unit take [`NodeStore::write`] and work on the
//! [`NodeSet`] behind the guard.
//!
//! ## Usage
//!
//! ```rust
//! use holdfast_core::{ContextFilter, MetaType, Node};
//! use holdfast_store::{MutateResult, NodeStore};
//!
//! let store = NodeStore::new();
//! let node = Node::prefix(10, "[Admin]").build().unwrap();
//!
//! assert_eq!(store.add(node.clone()), MutateResult::Success);
//! assert_eq!(store.add(node), MutateResult::AlreadyHas);
//!
//! let removed = store.remove_if(&ContextFilter::Any, |n| MetaType::Chat.matches(n));
//! assert_eq!(removed, 1);
//! ```
//!
//! ## Design Notes
//!
//! - **Set semantics**: adding a node equal to a present one returns `AlreadyHas`
//! - **Counted removal**: `remove_if` returns the number of nodes it removed
//! - **Consistent snapshots**: `snapshot` copies under the read lock

pub mod store;

pub use store::{MutateResult, NodeSet, NodeStore};
