//! # Holdfast Meta
//!
//! Resolution of effective meta and chat meta for a permission holder.
//!
//! ## Overview
//!
//! Meta is computed, never stored. A [`MetaAccumulator`] walks the holder's
//! own [`NodeStore`](holdfast_store::NodeStore) and then each inherited store
//! in the order supplied by the caller, collecting:
//!
//! - **Meta keys**: `key -> value`, one value per key
//! - **Chat meta**: per prefix/suffix, `priority -> value`, one value per slot
//!
//! [`MetaAccumulator::complete`] resolves duplicates according to the
//! configured [`Precedence`] and yields a read-only [`MetaView`]. The
//! effective prefix or suffix is the entry with the highest priority.
//!
//! ## Usage
//!
//! ```rust
//! use holdfast_core::{ContextFilter, ContextSet, Node};
//! use holdfast_meta::{AccumulatorConfig, MetaAccumulator};
//! use holdfast_store::NodeStore;
//!
//! let store = NodeStore::from_nodes([
//!     Node::prefix(1, "low").build().unwrap(),
//!     Node::prefix(5, "high").build().unwrap(),
//! ]);
//!
//! let mut acc = MetaAccumulator::new(AccumulatorConfig::default());
//! acc.accumulate_store(&store, &ContextFilter::AppliesIn(ContextSet::global()));
//! let view = acc.complete();
//!
//! assert_eq!(view.prefix(), Some("high"));
//! ```

pub mod accumulator;

pub use accumulator::{AccumulatorConfig, MetaAccumulator, MetaView, Precedence};
