//! Meta accumulation.
//!
//! A [`MetaAccumulator`] is fed nodes from a holder's own store and then from
//! each inherited store, in an order the caller has already decided (most
//! specific source first). Once every source has been visited,
//! [`MetaAccumulator::complete`] folds the inputs into a [`MetaView`]:
//! one value per meta key and one value per chat meta priority slot.
//!
//! The accumulator is transient. Build one per resolution, read the view,
//! drop it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use holdfast_core::{now_millis, ChatMetaType, ContextFilter, Node, NodeKind};
use holdfast_store::{NodeSet, NodeStore};

/// Which input wins when two sources supply the same meta key or the same
/// chat meta priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precedence {
    /// The first value accumulated wins.
    #[default]
    FirstSeen,
    /// The last value accumulated wins.
    LastSeen,
}

/// Configuration for meta accumulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccumulatorConfig {
    /// Tie-break for meta keys.
    pub meta_precedence: Precedence,
    /// Tie-break for chat meta entries at the same priority.
    pub chat_meta_precedence: Precedence,
    /// Whether nodes with a `false` value flag contribute.
    pub include_negated: bool,
}

impl Default for AccumulatorConfig {
    fn default() -> Self {
        Self {
            meta_precedence: Precedence::FirstSeen,
            chat_meta_precedence: Precedence::FirstSeen,
            include_negated: false,
        }
    }
}

/// Accumulates meta from a sequence of node sources.
#[derive(Debug)]
pub struct MetaAccumulator {
    config: AccumulatorConfig,
    now: i64,
    meta: Vec<(String, String)>,
    prefixes: Vec<(i32, String)>,
    suffixes: Vec<(i32, String)>,
    sources: usize,
}

impl MetaAccumulator {
    /// Create an accumulator that treats nodes expiring before now as absent.
    pub fn new(config: AccumulatorConfig) -> Self {
        Self::at(config, now_millis())
    }

    /// Create an accumulator evaluating expiry against `now` (Unix ms).
    pub fn at(config: AccumulatorConfig, now: i64) -> Self {
        Self {
            config,
            now,
            meta: Vec::new(),
            prefixes: Vec::new(),
            suffixes: Vec::new(),
            sources: 0,
        }
    }

    /// Offer a single node, ignoring its context.
    ///
    /// Returns `true` if the node contributed. Permission nodes, expired
    /// nodes and (unless configured otherwise) negated nodes do not.
    pub fn accumulate_node(&mut self, node: &Node) -> bool {
        if node.has_expired(self.now) {
            return false;
        }
        if !node.value_flag() && !self.config.include_negated {
            return false;
        }

        match node.kind() {
            NodeKind::Permission { .. } => return false,
            NodeKind::Meta { key, value } => self.meta.push((key.clone(), value.clone())),
            NodeKind::Prefix { priority, value } => self.prefixes.push((*priority, value.clone())),
            NodeKind::Suffix { priority, value } => self.suffixes.push((*priority, value.clone())),
        }
        true
    }

    /// Offer every node of a set that passes `filter`.
    ///
    /// Returns the number of nodes that contributed.
    pub fn accumulate_set(&mut self, set: &NodeSet, filter: &ContextFilter) -> usize {
        self.accumulate_nodes(set.iter(), filter)
    }

    /// Offer every node of a store that passes `filter`, under its read lock.
    pub fn accumulate_store(&mut self, store: &NodeStore, filter: &ContextFilter) -> usize {
        self.accumulate_set(&store.read(), filter)
    }

    /// Offer nodes from any iterator.
    pub fn accumulate_nodes<'a, I>(&mut self, nodes: I, filter: &ContextFilter) -> usize
    where
        I: IntoIterator<Item = &'a Node>,
    {
        let mut contributed = 0;
        for node in nodes {
            if filter.matches(node.context()) && self.accumulate_node(node) {
                contributed += 1;
            }
        }

        self.sources += 1;
        tracing::trace!(source = self.sources, contributed, "accumulated meta source");
        contributed
    }

    /// Number of sources visited so far.
    pub fn sources(&self) -> usize {
        self.sources
    }

    /// Finish accumulation and resolve every tie.
    pub fn complete(self) -> MetaView {
        let meta_precedence = self.config.meta_precedence;
        let chat_precedence = self.config.chat_meta_precedence;

        MetaView {
            meta: fold(self.meta, meta_precedence),
            prefixes: fold(self.prefixes, chat_precedence),
            suffixes: fold(self.suffixes, chat_precedence),
        }
    }
}

fn fold<K: Ord, V>(entries: Vec<(K, V)>, precedence: Precedence) -> BTreeMap<K, V> {
    let mut map = BTreeMap::new();
    for (key, value) in entries {
        match precedence {
            Precedence::FirstSeen => {
                map.entry(key).or_insert(value);
            }
            Precedence::LastSeen => {
                map.insert(key, value);
            }
        }
    }
    map
}

/// Completed, read-only meta for one resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaView {
    meta: BTreeMap<String, String>,
    prefixes: BTreeMap<i32, String>,
    suffixes: BTreeMap<i32, String>,
}

impl MetaView {
    /// The effective value of a meta key.
    pub fn meta(&self, key: &str) -> Option<&str> {
        self.meta.get(key).map(String::as_str)
    }

    /// Every effective meta key and value.
    pub fn meta_keys(&self) -> &BTreeMap<String, String> {
        &self.meta
    }

    /// The priority -> value mapping for a chat meta type.
    pub fn chat_meta(&self, chat_type: ChatMetaType) -> &BTreeMap<i32, String> {
        match chat_type {
            ChatMetaType::Prefix => &self.prefixes,
            ChatMetaType::Suffix => &self.suffixes,
        }
    }

    /// The highest priority present for a chat meta type.
    pub fn max_priority(&self, chat_type: ChatMetaType) -> Option<i32> {
        self.chat_meta(chat_type).keys().next_back().copied()
    }

    /// The entry with the highest priority for a chat meta type.
    pub fn effective(&self, chat_type: ChatMetaType) -> Option<(i32, &str)> {
        self.chat_meta(chat_type)
            .iter()
            .next_back()
            .map(|(priority, value)| (*priority, value.as_str()))
    }

    /// The effective prefix.
    pub fn prefix(&self) -> Option<&str> {
        self.effective(ChatMetaType::Prefix).map(|(_, value)| value)
    }

    /// The effective suffix.
    pub fn suffix(&self) -> Option<&str> {
        self.effective(ChatMetaType::Suffix).map(|(_, value)| value)
    }

    /// Whether nothing contributed.
    pub fn is_empty(&self) -> bool {
        self.meta.is_empty() && self.prefixes.is_empty() && self.suffixes.is_empty()
    }
}
