//! Mutation outcomes and the commit trigger.
//!
//! Holdfast does not persist or audit anything itself. After each mutating
//! operation the holder hands a [`MutationRecord`] to its [`CommitHook`], and
//! the host decides how to save and log it.

use holdfast_core::{ChatMetaType, ContextSet, MetaType};

use crate::holder::{HolderId, HolderKind};

/// What a mutation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationAction {
    /// Meta was cleared.
    ClearMeta {
        /// The selector used.
        selector: MetaType,
        /// Number of nodes removed. May be zero.
        removed: usize,
    },

    /// A prefix or suffix was set.
    SetChatMeta {
        /// Prefix or suffix.
        chat_type: ChatMetaType,
        /// The priority the node was stored at.
        priority: i32,
        /// The chat meta value.
        value: String,
    },
}

/// A mutation applied to a holder, for persistence and audit collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    /// The holder that changed.
    pub holder: HolderId,
    /// User or group.
    pub holder_kind: HolderKind,
    /// What changed.
    pub action: MutationAction,
    /// The context the mutation was scoped to.
    pub context: ContextSet,
}

/// Outcome of set-chat-meta.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetChatMetaOutcome {
    /// The node was added.
    Success {
        /// The priority used, explicit or auto-assigned.
        priority: i32,
        /// The context the node was added in.
        context: ContextSet,
    },

    /// An equal node already existed; nothing was added.
    Conflict {
        /// The priority that was attempted.
        priority: i32,
    },
}

impl SetChatMetaOutcome {
    /// Whether the node was added.
    pub fn is_success(&self) -> bool {
        matches!(self, SetChatMetaOutcome::Success { .. })
    }

    /// The priority used or attempted.
    pub fn priority(&self) -> i32 {
        match self {
            SetChatMetaOutcome::Success { priority, .. }
            | SetChatMetaOutcome::Conflict { priority } => *priority,
        }
    }
}

/// Receives a record after every mutation that changed, or attempted to
/// change, a holder's store. Not invoked on [`SetChatMetaOutcome::Conflict`].
///
/// Called after the holder's lock has been released.
pub trait CommitHook: Send + Sync {
    fn commit(&self, record: &MutationRecord);
}

impl<F> CommitHook for F
where
    F: Fn(&MutationRecord) + Send + Sync,
{
    fn commit(&self, record: &MutationRecord) {
        self(record)
    }
}
