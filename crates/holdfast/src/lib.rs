//! # Holdfast
//!
//! Context-aware permission and meta grants for users and groups.
//!
//! ## Overview
//!
//! Every [`Holder`] (a user or a group) owns a store of nodes. Each node is a
//! permission, a meta key/value, or a prefix/suffix at a priority, scoped by a
//! [`ContextSet`]. Holdfast provides:
//!
//! - **Resolution**: effective meta and chat meta for a query context,
//!   across the holder and its ancestors ([`Holder::accumulate_meta`])
//! - **Clear meta**: remove meta by selector and context ([`Holder::clear_meta`])
//! - **Set chat meta**: replace a prefix/suffix with automatic priority
//!   ([`Holder::set_chat_meta`])
//!
//! Each mutation runs as one critical section on the holder's store and is
//! reported to an optional [`CommitHook`] for persistence and auditing.
//!
//! ## Usage
//!
//! ```rust
//! use holdfast::{ChatMetaType, ContextSet, Holder, MetaType, Node};
//!
//! let group = Holder::group("admins").unwrap().with_weight(100);
//! let outcome = group.set_chat_meta(ChatMetaType::Prefix, None, "[Admin]", &ContextSet::global());
//! assert_eq!(outcome.priority(), 100);
//!
//! let user = Holder::user("alice").unwrap();
//! user.add_node(Node::meta("color", "red").build().unwrap());
//!
//! let view = user.accumulate_meta(&ContextSet::global(), &[group.store()]);
//! assert_eq!(view.prefix(), Some("[Admin]"));
//! assert_eq!(view.meta("color"), Some("red"));
//!
//! assert_eq!(user.clear_meta(MetaType::Any, &ContextSet::global()), 1);
//! ```
//!
//! ## Re-exports
//!
//! - `holdfast::core` - Contexts, nodes and selectors
//! - `holdfast::store` - The per-holder node store
//! - `holdfast::meta` - Meta accumulation

pub mod error;
pub mod holder;
pub mod mutation;

// Re-export component crates
pub use holdfast_core as core;
pub use holdfast_meta as meta;
pub use holdfast_store as store;

pub use error::{HoldfastError, Result};
pub use holder::{Holder, HolderConfig, HolderId, HolderKind};
pub use mutation::{CommitHook, MutationAction, MutationRecord, SetChatMetaOutcome};

// Re-export commonly used types
pub use holdfast_core::{ChatMetaType, ContextFilter, ContextSet, MetaType, Node, NodeKind};
pub use holdfast_meta::{AccumulatorConfig, MetaView, Precedence};
pub use holdfast_store::{MutateResult, NodeStore};
