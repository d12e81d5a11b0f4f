//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::{Arc, Mutex, PoisonError};

use holdfast::{CommitHook, Holder, HolderConfig, HolderId, HolderKind, MutationRecord};
use holdfast_core::{ChatMetaType, ContextSet, Node};

/// A commit hook that keeps every record it receives.
#[derive(Debug, Default)]
pub struct RecordingHook {
    records: Mutex<Vec<MutationRecord>>,
}

impl RecordingHook {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far.
    pub fn records(&self) -> Vec<MutationRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of records so far.
    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CommitHook for RecordingHook {
    fn commit(&self, record: &MutationRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
    }
}

/// A holder wired to a [`RecordingHook`].
pub struct HolderFixture {
    pub holder: Holder,
    pub hook: Arc<RecordingHook>,
}

impl HolderFixture {
    /// A user with the default configuration.
    pub fn user(id: &str) -> Self {
        Self::build(id, HolderKind::User, None)
    }

    /// A group, optionally with a declared weight.
    pub fn group(name: &str, weight: Option<i32>) -> Self {
        Self::build(name, HolderKind::Group, weight)
    }

    fn build(id: &str, kind: HolderKind, weight: Option<i32>) -> Self {
        let hook = Arc::new(RecordingHook::new());
        let id = HolderId::new(id).expect("fixture holder id must be valid");
        let mut holder = Holder::new(id, kind, HolderConfig::default())
            .with_commit_hook(Arc::clone(&hook) as Arc<dyn CommitHook>);
        if let Some(weight) = weight {
            holder = holder.with_weight(weight);
        }
        Self { holder, hook }
    }

    /// Add nodes to the holder, panicking on duplicates.
    pub fn with_nodes(self, nodes: impl IntoIterator<Item = Node>) -> Self {
        for node in nodes {
            assert!(
                self.holder.add_node(node.clone()).is_success(),
                "duplicate fixture node {}",
                node.key()
            );
        }
        self
    }
}

/// The nodes of the reference clear-meta scenario:
/// a global meta node, a global prefix, and a suffix in `world=nether`.
pub fn scenario_nodes() -> Vec<Node> {
    vec![
        Node::meta("x", "1").build().expect("valid meta node"),
        Node::new_chat_meta(ChatMetaType::Prefix, 1, "A", ContextSet::global()),
        Node::new_chat_meta(
            ChatMetaType::Suffix,
            2,
            "B",
            ContextSet::of("world", "nether"),
        ),
    ]
}

/// A chain of groups, closest first, each carrying one global prefix.
///
/// Group `i` is named `tier-i` and holds a prefix `[tier-i]` at priority
/// `(count - i) * 10`, so closer groups carry higher priorities.
pub fn group_chain(count: usize) -> Vec<Holder> {
    (0..count)
        .map(|i| {
            let name = format!("tier-{i}");
            let group = Holder::new(
                HolderId::new(name.clone()).expect("generated group name is valid"),
                HolderKind::Group,
                HolderConfig::default(),
            );
            let priority = ((count - i) * 10) as i32;
            group.add_node(Node::new_chat_meta(
                ChatMetaType::Prefix,
                priority,
                format!("[{name}]"),
                ContextSet::global(),
            ));
            group
        })
        .collect()
}
