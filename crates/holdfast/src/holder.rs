//! Permission holders and their meta operations.
//!
//! A [`Holder`] is a user or a group owning one [`NodeStore`]. Inheritance
//! is resolved elsewhere: operations that need inherited nodes take the
//! ancestors' stores as an already-ordered slice, closest ancestor first.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use holdfast_core::{ChatMetaType, ContextFilter, ContextSet, MetaType, Node};
use holdfast_meta::{AccumulatorConfig, MetaAccumulator, MetaView};
use holdfast_store::{MutateResult, NodeSet, NodeStore};

use crate::error::{HoldfastError, Result};
use crate::mutation::{CommitHook, MutationAction, MutationRecord, SetChatMetaOutcome};

/// Configuration for a holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HolderConfig {
    /// How meta is accumulated.
    pub accumulator: AccumulatorConfig,
    /// Whether a group's weight raises auto-assigned chat meta priorities.
    pub weight_biases_priority: bool,
}

impl Default for HolderConfig {
    fn default() -> Self {
        Self {
            accumulator: AccumulatorConfig::default(),
            weight_biases_priority: true,
        }
    }
}

/// Whether a holder is a user or a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HolderKind {
    User,
    Group,
}

/// A holder's identifier: a user's unique id or a group's name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HolderId(String);

impl HolderId {
    /// Validate and wrap an identifier.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() || id.chars().any(char::is_whitespace) {
            return Err(HoldfastError::InvalidHolderId(id));
        }
        Ok(Self(id))
    }

    /// The identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A user or group and the grants it owns.
pub struct Holder {
    id: HolderId,
    kind: HolderKind,
    config: HolderConfig,
    weight: Option<i32>,
    store: Arc<NodeStore>,
    hook: Option<Arc<dyn CommitHook>>,
}

impl fmt::Debug for Holder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Holder")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("weight", &self.weight)
            .field("nodes", &self.store.size())
            .finish()
    }
}

impl Holder {
    /// Create a holder with an empty store.
    pub fn new(id: HolderId, kind: HolderKind, config: HolderConfig) -> Self {
        Self::with_store(id, kind, config, NodeStore::new())
    }

    /// Create a holder owning an existing store.
    pub fn with_store(id: HolderId, kind: HolderKind, config: HolderConfig, store: NodeStore) -> Self {
        Self {
            id,
            kind,
            config,
            weight: None,
            store: Arc::new(store),
            hook: None,
        }
    }

    /// Create a user with the default configuration.
    pub fn user(id: impl Into<String>) -> Result<Self> {
        Ok(Self::new(HolderId::new(id)?, HolderKind::User, HolderConfig::default()))
    }

    /// Create a group with the default configuration.
    pub fn group(name: impl Into<String>) -> Result<Self> {
        Ok(Self::new(HolderId::new(name)?, HolderKind::Group, HolderConfig::default()))
    }

    /// Declare an explicit weight, overriding any `weight.N` nodes.
    pub fn with_weight(mut self, weight: i32) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Install the commit trigger.
    pub fn with_commit_hook(mut self, hook: Arc<dyn CommitHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    /// The holder's identifier.
    pub fn id(&self) -> &HolderId {
        &self.id
    }

    /// User or group.
    pub fn kind(&self) -> HolderKind {
        self.kind
    }

    /// The holder's configuration.
    pub fn config(&self) -> &HolderConfig {
        &self.config
    }

    /// The holder's own store, for use as an ancestor of other holders.
    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    /// A shared handle to the holder's own store.
    pub fn store_handle(&self) -> Arc<NodeStore> {
        Arc::clone(&self.store)
    }

    /// A consistent snapshot of the holder's own nodes.
    pub fn nodes(&self) -> Vec<Node> {
        self.store.snapshot()
    }

    /// Add a node to the holder's own store.
    pub fn add_node(&self, node: Node) -> MutateResult {
        self.store.add(node)
    }

    /// Remove a node from the holder's own store.
    pub fn remove_node(&self, node: &Node) -> MutateResult {
        self.store.remove(node)
    }

    /// Purge temporary nodes that have expired by `now` (Unix ms).
    pub fn remove_expired(&self, now: i64) -> usize {
        self.store.remove_expired(now)
    }

    /// The holder's weight.
    ///
    /// The explicitly declared weight if there is one, otherwise the largest
    /// `N` among the holder's own `weight.N` nodes.
    pub fn weight(&self) -> Option<i32> {
        self.weight_in(&self.store.read())
    }

    fn weight_in(&self, nodes: &NodeSet) -> Option<i32> {
        self.weight.or_else(|| {
            nodes
                .iter()
                .filter(|node| node.value_flag())
                .filter_map(Node::weight)
                .max()
        })
    }

    /// Resolve effective meta under a query context.
    ///
    /// Nodes apply when their context is satisfied by `context`. The holder's
    /// own nodes are visited first, then each ancestor in order.
    pub fn accumulate_meta(&self, context: &ContextSet, ancestors: &[&NodeStore]) -> MetaView {
        self.accumulate_meta_with(&ContextFilter::AppliesIn(context.clone()), ancestors)
    }

    /// Resolve effective meta with an arbitrary context filter.
    pub fn accumulate_meta_with(&self, filter: &ContextFilter, ancestors: &[&NodeStore]) -> MetaView {
        let mut acc = MetaAccumulator::new(self.config.accumulator.clone());
        acc.accumulate_store(&self.store, filter);
        for ancestor in self.distinct_ancestors(ancestors) {
            acc.accumulate_store(ancestor, filter);
        }
        acc.complete()
    }

    /// Remove every node of the holder's own store covered by `selector`
    /// and carrying every pair of `context`. An empty context clears in
    /// every context.
    ///
    /// Returns the number of nodes removed. Zero is not an error.
    pub fn clear_meta(&self, selector: MetaType, context: &ContextSet) -> usize {
        let filter = ContextFilter::clearing(context.clone());
        let removed = {
            let mut nodes = self.store.write();
            let before = nodes.len();
            nodes.remove_if(&filter, |node| selector.matches(node));
            before - nodes.len()
        };

        tracing::debug!(
            holder = %self.id,
            selector = %selector,
            context = %context,
            removed,
            "cleared meta"
        );

        self.commit(MutationAction::ClearMeta { selector, removed }, context);
        removed
    }

    /// Set the holder's prefix or suffix in `context`, with no ancestors
    /// taking part in auto-priority.
    pub fn set_chat_meta(
        &self,
        chat_type: ChatMetaType,
        priority: Option<i32>,
        value: impl Into<String>,
        context: &ContextSet,
    ) -> SetChatMetaOutcome {
        self.set_chat_meta_inherited(chat_type, priority, value, context, &[])
    }

    /// Set the holder's prefix or suffix in `context`.
    ///
    /// Every existing node of the same chat meta type in exactly `context`
    /// is removed first. Without an explicit priority, the new node is placed
    /// one above the highest priority of that type across the holder and its
    /// ancestors in all contexts; a group whose weight exceeds that uses its
    /// weight instead.
    pub fn set_chat_meta_inherited(
        &self,
        chat_type: ChatMetaType,
        priority: Option<i32>,
        value: impl Into<String>,
        context: &ContextSet,
        ancestors: &[&NodeStore],
    ) -> SetChatMetaOutcome {
        let value = value.into();

        // Ancestors are only read, so they are accumulated before taking our
        // own write lock; no two holder locks are ever held together.
        let inherited = match priority {
            Some(_) => None,
            None => {
                let mut acc = MetaAccumulator::new(self.config.accumulator.clone());
                for ancestor in self.distinct_ancestors(ancestors) {
                    acc.accumulate_store(ancestor, &ContextFilter::Any);
                }
                Some(acc)
            }
        };

        let (priority, result) = {
            let mut nodes = self.store.write();
            nodes.remove_if(&ContextFilter::Exact(context.clone()), |node| {
                chat_type.matches(node)
            });

            let priority = match (priority, inherited) {
                (Some(priority), _) => priority,
                (None, inherited) => {
                    let mut acc = inherited
                        .unwrap_or_else(|| MetaAccumulator::new(self.config.accumulator.clone()));
                    acc.accumulate_set(&nodes, &ContextFilter::Any);
                    self.auto_priority(acc.complete(), chat_type, &nodes)
                }
            };

            let node = Node::new_chat_meta(chat_type, priority, value.clone(), context.clone());
            (priority, nodes.add(node))
        };

        match result {
            MutateResult::Success => {
                tracing::debug!(
                    holder = %self.id,
                    chat_type = %chat_type,
                    priority,
                    context = %context,
                    "set chat meta"
                );
                self.commit(
                    MutationAction::SetChatMeta {
                        chat_type,
                        priority,
                        value,
                    },
                    context,
                );
                SetChatMetaOutcome::Success {
                    priority,
                    context: context.clone(),
                }
            }
            MutateResult::AlreadyHas | MutateResult::LacksNode => {
                tracing::debug!(
                    holder = %self.id,
                    chat_type = %chat_type,
                    priority,
                    context = %context,
                    "chat meta already present"
                );
                SetChatMetaOutcome::Conflict { priority }
            }
        }
    }

    fn auto_priority(&self, view: MetaView, chat_type: ChatMetaType, nodes: &NodeSet) -> i32 {
        let next = view.max_priority(chat_type).unwrap_or(0).saturating_add(1);

        if self.kind != HolderKind::Group || !self.config.weight_biases_priority {
            return next;
        }
        match self.weight_in(nodes) {
            Some(weight) if weight > next => weight,
            _ => next,
        }
    }

    fn distinct_ancestors<'a>(
        &'a self,
        ancestors: &'a [&'a NodeStore],
    ) -> impl Iterator<Item = &'a NodeStore> + 'a {
        let own: &NodeStore = &self.store;
        ancestors.iter().copied().filter(move |ancestor| {
            let aliased = std::ptr::eq(*ancestor, own);
            if aliased {
                tracing::warn!(holder = %self.id, "ancestor is the holder's own store, skipping");
            }
            !aliased
        })
    }

    fn commit(&self, action: MutationAction, context: &ContextSet) {
        if let Some(hook) = &self.hook {
            hook.commit(&MutationRecord {
                holder: self.id.clone(),
                holder_kind: self.kind,
                action,
                context: context.clone(),
            });
        }
    }
}
