//! Node storage for a single permission holder.
//!
//! [`NodeSet`] is the unlocked data: an insertion-ordered list of unique
//! nodes. [`NodeStore`] wraps it in a `RwLock` so that every mutation is one
//! critical section and every snapshot is a consistent point-in-time copy.
//! Multi-step operations take [`NodeStore::write`] once and run all their
//! steps against the guard.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use holdfast_core::{ContextFilter, Node};

/// Result of a single-node mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutateResult {
    /// The store changed.
    Success,
    /// An equal node is already present; nothing changed.
    AlreadyHas,
    /// No equal node is present; nothing changed.
    LacksNode,
}

impl MutateResult {
    /// Whether the store changed.
    pub fn is_success(self) -> bool {
        self == MutateResult::Success
    }
}

/// An insertion-ordered collection of unique nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeSet {
    nodes: Vec<Node>,
}

impl NodeSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from nodes, dropping later duplicates.
    pub fn from_nodes(nodes: impl IntoIterator<Item = Node>) -> Self {
        let mut set = Self::new();
        for node in nodes {
            set.add(node);
        }
        set
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the set holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    /// Whether an equal node is present.
    pub fn contains(&self, node: &Node) -> bool {
        self.nodes.contains(node)
    }

    /// Insert `node` unless an equal node is present.
    pub fn add(&mut self, node: Node) -> MutateResult {
        if self.contains(&node) {
            return MutateResult::AlreadyHas;
        }
        self.nodes.push(node);
        MutateResult::Success
    }

    /// Remove the node equal to `node`.
    pub fn remove(&mut self, node: &Node) -> MutateResult {
        match self.nodes.iter().position(|n| n == node) {
            Some(index) => {
                self.nodes.remove(index);
                MutateResult::Success
            }
            None => MutateResult::LacksNode,
        }
    }

    /// Remove every node whose context passes `filter` and which satisfies
    /// `predicate`. Returns the number removed.
    pub fn remove_if<F>(&mut self, filter: &ContextFilter, mut predicate: F) -> usize
    where
        F: FnMut(&Node) -> bool,
    {
        let before = self.nodes.len();
        self.nodes
            .retain(|node| !(filter.matches(node.context()) && predicate(node)));
        before - self.nodes.len()
    }

    /// Remove temporary nodes whose expiry lies before `now`.
    pub fn remove_expired(&mut self, now: i64) -> usize {
        self.remove_if(&ContextFilter::Any, |node| node.has_expired(now))
    }

    /// Copy out the nodes in insertion order.
    pub fn to_vec(&self) -> Vec<Node> {
        self.nodes.clone()
    }
}

impl<'a> IntoIterator for &'a NodeSet {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

/// A holder's node store. Thread-safe via RwLock.
///
/// Writers are mutually exclusive with each other and with readers, so a
/// reader never observes a half-applied mutation.
#[derive(Debug, Default)]
pub struct NodeStore {
    inner: RwLock<NodeSet>,
}

impl NodeStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `nodes`, dropping later duplicates.
    pub fn from_nodes(nodes: impl IntoIterator<Item = Node>) -> Self {
        Self {
            inner: RwLock::new(NodeSet::from_nodes(nodes)),
        }
    }

    /// Acquire shared read access.
    ///
    /// A poisoned lock is recovered: every mutation replaces the node list
    /// in one step, so a panicking writer cannot leave it half-applied.
    pub fn read(&self) -> RwLockReadGuard<'_, NodeSet> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Acquire exclusive write access for a multi-step operation.
    pub fn write(&self) -> RwLockWriteGuard<'_, NodeSet> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current node count.
    pub fn size(&self) -> usize {
        self.read().len()
    }

    /// Whether an equal node is present.
    pub fn contains(&self, node: &Node) -> bool {
        self.read().contains(node)
    }

    /// Insert `node` unless an equal node is present.
    pub fn add(&self, node: Node) -> MutateResult {
        let result = self.write().add(node);
        tracing::trace!(?result, "node store add");
        result
    }

    /// Remove the node equal to `node`.
    pub fn remove(&self, node: &Node) -> MutateResult {
        self.write().remove(node)
    }

    /// Atomically remove every node matching `filter` and `predicate`.
    pub fn remove_if<F>(&self, filter: &ContextFilter, predicate: F) -> usize
    where
        F: FnMut(&Node) -> bool,
    {
        let removed = self.write().remove_if(filter, predicate);
        tracing::trace!(removed, "node store remove_if");
        removed
    }

    /// Remove expired temporary nodes.
    pub fn remove_expired(&self, now: i64) -> usize {
        let removed = self.write().remove_expired(now);
        if removed > 0 {
            tracing::debug!(removed, "purged expired nodes");
        }
        removed
    }

    /// Replace the whole contents, dropping later duplicates.
    pub fn replace(&self, nodes: impl IntoIterator<Item = Node>) {
        let replacement = NodeSet::from_nodes(nodes);
        *self.write() = replacement;
    }

    /// A consistent point-in-time copy of the nodes.
    pub fn snapshot(&self) -> Vec<Node> {
        self.read().to_vec()
    }
}
