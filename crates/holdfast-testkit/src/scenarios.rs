//! Named scenario vectors for the meta operations.
//!
//! Each vector pins down one observable outcome of clear-meta or of the
//! auto-priority rule, so any change in behavior shows up by name.

use holdfast::{ChatMetaType, ContextSet, Holder, HolderConfig, HolderId, HolderKind, MetaType};
use holdfast_core::Node;

use crate::fixtures::scenario_nodes;

/// A clear-meta step applied in sequence to the reference scenario holder.
#[derive(Debug, Clone)]
pub struct ClearVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Selector passed to clear-meta.
    pub selector: MetaType,
    /// Context pairs passed to clear-meta.
    pub context: &'static [(&'static str, &'static str)],
    /// Expected removed count.
    pub expected_removed: usize,
    /// Expected node count afterwards.
    pub expected_remaining: usize,
}

/// An auto-priority case for set-chat-meta.
#[derive(Debug, Clone)]
pub struct AutoPriorityVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// User or group.
    pub kind: HolderKind,
    /// Declared weight.
    pub weight: Option<i32>,
    /// Priorities of existing prefixes, placed in `world=nether`.
    pub existing: &'static [i32],
    /// Expected auto-assigned priority for a new global prefix.
    pub expected: i32,
}

/// The clear-meta sequence over [`scenario_nodes`].
pub fn clear_vectors() -> Vec<ClearVector> {
    vec![
        ClearVector {
            name: "meta selector in global context removes only the meta node",
            selector: MetaType::Meta,
            context: &[],
            expected_removed: 1,
            expected_remaining: 2,
        },
        ClearVector {
            name: "any selector in world=nether removes only the nether suffix",
            selector: MetaType::Any,
            context: &[("world", "nether")],
            expected_removed: 1,
            expected_remaining: 1,
        },
        ClearVector {
            name: "suffix selector finds nothing left",
            selector: MetaType::Suffix,
            context: &[],
            expected_removed: 0,
            expected_remaining: 1,
        },
        ClearVector {
            name: "chat selector in global context removes the global prefix",
            selector: MetaType::Chat,
            context: &[],
            expected_removed: 1,
            expected_remaining: 0,
        },
    ]
}

/// All auto-priority vectors.
pub fn auto_priority_vectors() -> Vec<AutoPriorityVector> {
    vec![
        AutoPriorityVector {
            name: "empty holder starts at one",
            kind: HolderKind::User,
            weight: None,
            existing: &[],
            expected: 1,
        },
        AutoPriorityVector {
            name: "one above the highest existing priority",
            kind: HolderKind::User,
            weight: None,
            existing: &[1, 3, 5],
            expected: 6,
        },
        AutoPriorityVector {
            name: "group weight wins when higher",
            kind: HolderKind::Group,
            weight: Some(10),
            existing: &[3],
            expected: 10,
        },
        AutoPriorityVector {
            name: "existing priority wins over lower group weight",
            kind: HolderKind::Group,
            weight: Some(2),
            existing: &[7],
            expected: 8,
        },
        AutoPriorityVector {
            name: "user weight is ignored",
            kind: HolderKind::User,
            weight: Some(50),
            existing: &[4],
            expected: 5,
        },
        AutoPriorityVector {
            name: "negative priorities still count up",
            kind: HolderKind::User,
            weight: None,
            existing: &[-8, -3],
            expected: -2,
        },
    ]
}

/// Build the holder described by an auto-priority vector.
pub fn holder_from_vector(vector: &AutoPriorityVector) -> Holder {
    let id = HolderId::new("vector").expect("static holder id is valid");
    let mut holder = Holder::new(id, vector.kind, HolderConfig::default());
    if let Some(weight) = vector.weight {
        holder = holder.with_weight(weight);
    }
    for &priority in vector.existing {
        holder.add_node(Node::new_chat_meta(
            ChatMetaType::Prefix,
            priority,
            format!("p{priority}"),
            ContextSet::of("world", "nether"),
        ));
    }
    holder
}

/// Run the clear vectors in order against a fresh scenario holder.
///
/// Panics with the vector's name on the first mismatch.
pub fn verify_clear_vectors() {
    let holder = Holder::user("scenario").expect("static holder id is valid");
    for node in scenario_nodes() {
        holder.add_node(node);
    }

    for vector in clear_vectors() {
        let context: ContextSet = vector.context.iter().copied().collect();
        let removed = holder.clear_meta(vector.selector, &context);

        assert_eq!(removed, vector.expected_removed, "vector '{}'", vector.name);
        assert_eq!(
            holder.nodes().len(),
            vector.expected_remaining,
            "vector '{}'",
            vector.name
        );
    }
}

/// Check every auto-priority vector.
///
/// Panics with the vector's name on the first mismatch.
pub fn verify_auto_priority_vectors() {
    for vector in auto_priority_vectors() {
        let holder = holder_from_vector(&vector);
        let outcome =
            holder.set_chat_meta(ChatMetaType::Prefix, None, "auto", &ContextSet::global());

        assert_eq!(outcome.priority(), vector.expected, "vector '{}'", vector.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_vectors() {
        verify_clear_vectors();
    }

    #[test]
    fn test_auto_priority_vectors() {
        verify_auto_priority_vectors();
    }

    #[test]
    fn test_vector_names_are_unique() {
        let mut names: Vec<&str> = clear_vectors().iter().map(|v| v.name).collect();
        names.extend(auto_priority_vectors().iter().map(|v| v.name));
        let total = names.len();

        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
    }
}
