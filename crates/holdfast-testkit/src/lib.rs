//! # Holdfast Testkit
//!
//! Testing utilities for Holdfast.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Scenario vectors**: Named clear-meta and auto-priority cases with expected outcomes
//! - **Generators**: Proptest strategies for contexts, nodes and holders
//! - **Fixtures**: Holders wired to a recording commit hook
//!
//! ## Scenario Vectors
//!
//! ```rust
//! use holdfast_testkit::scenarios::{auto_priority_vectors, holder_from_vector};
//! use holdfast::{ChatMetaType, ContextSet};
//!
//! for vector in auto_priority_vectors() {
//!     let holder = holder_from_vector(&vector);
//!     let outcome = holder.set_chat_meta(ChatMetaType::Prefix, None, "x", &ContextSet::global());
//!     assert_eq!(outcome.priority(), vector.expected, "{}", vector.name);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use holdfast_testkit::generators::{holder_from_params, HolderParams};
//!
//! proptest! {
//!     #[test]
//!     fn clearing_is_idempotent(params: HolderParams) {
//!         let holder = holder_from_params(&params);
//!         holder.clear_meta(MetaType::Any, &ContextSet::global());
//!         prop_assert_eq!(holder.clear_meta(MetaType::Any, &ContextSet::global()), 0);
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use holdfast_testkit::fixtures::{scenario_nodes, HolderFixture};
//!
//! let fixture = HolderFixture::user("alice").with_nodes(scenario_nodes());
//! assert_eq!(fixture.holder.nodes().len(), 3);
//! assert!(fixture.hook.is_empty());
//! ```

pub mod fixtures;
pub mod generators;
pub mod scenarios;

pub use fixtures::{group_chain, scenario_nodes, HolderFixture, RecordingHook};
pub use generators::{holder_from_params, HolderParams};
pub use scenarios::{
    auto_priority_vectors, clear_vectors, holder_from_vector, verify_auto_priority_vectors,
    verify_clear_vectors, AutoPriorityVector, ClearVector,
};
