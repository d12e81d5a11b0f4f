//! Node: a single grant held by a permission holder.
//!
//! Nodes are immutable once built. Changing a node's scope or value means
//! removing it and adding a replacement.

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

use crate::context::ContextSet;
use crate::error::{CoreError, Result};
use crate::meta_type::ChatMetaType;

/// Encoded-key prefix of meta nodes.
pub const META_KEY: &str = "meta";

/// Encoded-key prefix of prefix nodes.
pub const PREFIX_KEY: &str = "prefix";

/// Encoded-key prefix of suffix nodes.
pub const SUFFIX_KEY: &str = "suffix";

/// Permission prefix of weight nodes (`weight.<n>`).
pub const WEIGHT_KEY: &str = "weight";

/// What a node grants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// A plain permission string.
    Permission { permission: String },

    /// An arbitrary meta key/value pair.
    Meta { key: String, value: String },

    /// A prefix at a priority.
    Prefix { priority: i32, value: String },

    /// A suffix at a priority.
    Suffix { priority: i32, value: String },
}

impl NodeKind {
    /// Build the chat meta kind for `chat_type`.
    pub fn chat_meta(chat_type: ChatMetaType, priority: i32, value: impl Into<String>) -> Self {
        let value = value.into();
        match chat_type {
            ChatMetaType::Prefix => NodeKind::Prefix { priority, value },
            ChatMetaType::Suffix => NodeKind::Suffix { priority, value },
        }
    }

    /// Classify a raw permission string.
    ///
    /// Strings shaped like `meta.<key>.<value>`, `prefix.<priority>.<value>`
    /// or `suffix.<priority>.<value>` become the typed kind, with escapes
    /// removed. The value is everything after the second unescaped dot.
    /// Anything else stays a plain permission.
    pub fn from_permission(permission: impl Into<String>) -> Self {
        let permission = permission.into();
        if let [head, middle, value] = split_key(&permission).as_slice() {
            let head = head.to_ascii_lowercase();
            match head.as_str() {
                META_KEY if !middle.trim().is_empty() => {
                    return NodeKind::Meta {
                        key: middle.clone(),
                        value: value.clone(),
                    };
                }
                PREFIX_KEY | SUFFIX_KEY => {
                    if let Ok(priority) = middle.trim().parse() {
                        let value = value.clone();
                        return if head == PREFIX_KEY {
                            NodeKind::Prefix { priority, value }
                        } else {
                            NodeKind::Suffix { priority, value }
                        };
                    }
                }
                _ => {}
            }
        }
        NodeKind::Permission { permission }
    }

    fn normalize(self) -> Self {
        match self {
            NodeKind::Permission { permission } => NodeKind::from_permission(permission),
            kind => kind,
        }
    }
}

/// A grant: kind, value flag, context and optional expiry.
///
/// Identity is `(kind, value_flag, context)`. The expiry is not part of it:
/// a temporary and a permanent copy of the same grant in the same context
/// are the same node.
///
/// Permission strings that encode meta or chat meta are stored as the typed
/// kind, both when built and when decoded, so `permission("prefix.1.A")` and
/// `prefix(1, "A")` are the same node.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "NodeRecord")]
pub struct Node {
    kind: NodeKind,
    value: bool,
    context: ContextSet,
    expiry: Option<i64>,
}

/// Wire shape of [`Node`] before the kind is normalized.
#[derive(Deserialize)]
struct NodeRecord {
    kind: NodeKind,
    value: bool,
    context: ContextSet,
    expiry: Option<i64>,
}

impl From<NodeRecord> for Node {
    fn from(record: NodeRecord) -> Self {
        Node {
            kind: record.kind.normalize(),
            value: record.value,
            context: record.context,
            expiry: record.expiry,
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.value == other.value && self.context == other.context
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.value.hash(state);
        self.context.hash(state);
    }
}

impl Node {
    /// Start building a permission node.
    pub fn permission(permission: impl Into<String>) -> NodeBuilder {
        NodeBuilder::new(NodeKind::Permission {
            permission: permission.into(),
        })
    }

    /// Start building a meta node.
    pub fn meta(key: impl Into<String>, value: impl Into<String>) -> NodeBuilder {
        NodeBuilder::new(NodeKind::Meta {
            key: key.into(),
            value: value.into(),
        })
    }

    /// Start building a prefix node.
    pub fn prefix(priority: i32, value: impl Into<String>) -> NodeBuilder {
        NodeBuilder::new(NodeKind::chat_meta(ChatMetaType::Prefix, priority, value))
    }

    /// Start building a suffix node.
    pub fn suffix(priority: i32, value: impl Into<String>) -> NodeBuilder {
        NodeBuilder::new(NodeKind::chat_meta(ChatMetaType::Suffix, priority, value))
    }

    /// Start building a chat meta node of the given type.
    pub fn chat_meta(chat_type: ChatMetaType, priority: i32, value: impl Into<String>) -> NodeBuilder {
        NodeBuilder::new(NodeKind::chat_meta(chat_type, priority, value))
    }

    /// A permanent chat meta node in `context`.
    ///
    /// Chat meta has no required fields, so unlike the builders this cannot fail.
    pub fn new_chat_meta(
        chat_type: ChatMetaType,
        priority: i32,
        value: impl Into<String>,
        context: ContextSet,
    ) -> Node {
        Node {
            kind: NodeKind::chat_meta(chat_type, priority, value),
            value: true,
            context,
            expiry: None,
        }
    }

    /// What this node grants.
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// The value flag. `false` negates the grant.
    pub fn value_flag(&self) -> bool {
        self.value
    }

    /// The contexts this node is restricted to.
    pub fn context(&self) -> &ContextSet {
        &self.context
    }

    /// Expiry time in Unix milliseconds, for temporary nodes.
    pub fn expiry(&self) -> Option<i64> {
        self.expiry
    }

    /// Whether this node carries an expiry.
    pub fn is_temporary(&self) -> bool {
        self.expiry.is_some()
    }

    /// Whether this node's expiry lies before `now` (Unix milliseconds).
    pub fn has_expired(&self, now: i64) -> bool {
        matches!(self.expiry, Some(expiry) if expiry < now)
    }

    /// The encoded key, e.g. `meta.color.red` or `prefix.10.[Admin]`.
    ///
    /// Dots and backslashes inside components are escaped with a backslash.
    pub fn key(&self) -> String {
        match &self.kind {
            NodeKind::Permission { permission } => permission.clone(),
            NodeKind::Meta { key, value } => {
                format!("{META_KEY}.{}.{}", escape(key), escape(value))
            }
            NodeKind::Prefix { priority, value } => {
                format!("{PREFIX_KEY}.{priority}.{}", escape(value))
            }
            NodeKind::Suffix { priority, value } => {
                format!("{SUFFIX_KEY}.{priority}.{}", escape(value))
            }
        }
    }

    /// The meta key for meta nodes.
    pub fn meta_key(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Meta { key, .. } => Some(key.as_str()),
            _ => None,
        }
    }

    /// The string value of meta and chat meta nodes.
    pub fn meta_value(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Meta { value, .. }
            | NodeKind::Prefix { value, .. }
            | NodeKind::Suffix { value, .. } => Some(value.as_str()),
            NodeKind::Permission { .. } => None,
        }
    }

    /// The priority of chat meta nodes.
    pub fn priority(&self) -> Option<i32> {
        match &self.kind {
            NodeKind::Prefix { priority, .. } | NodeKind::Suffix { priority, .. } => {
                Some(*priority)
            }
            _ => None,
        }
    }

    /// The chat meta type of prefix and suffix nodes.
    pub fn chat_meta_type(&self) -> Option<ChatMetaType> {
        match &self.kind {
            NodeKind::Prefix { .. } => Some(ChatMetaType::Prefix),
            NodeKind::Suffix { .. } => Some(ChatMetaType::Suffix),
            _ => None,
        }
    }

    /// Whether this is a meta key/value node.
    pub fn is_meta(&self) -> bool {
        matches!(self.kind, NodeKind::Meta { .. })
    }

    /// Whether this is a prefix or suffix node.
    pub fn is_chat_meta(&self) -> bool {
        self.chat_meta_type().is_some()
    }

    /// The `N` of a `weight.N` permission node.
    pub fn weight(&self) -> Option<i32> {
        match &self.kind {
            NodeKind::Permission { permission } => permission
                .strip_prefix(WEIGHT_KEY)
                .and_then(|rest| rest.strip_prefix('.'))
                .and_then(|n| n.parse().ok()),
            _ => None,
        }
    }

    /// Serialize to CBOR bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf)
            .map_err(|e| CoreError::EncodingError(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize from CBOR bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        ciborium::from_reader(bytes).map_err(|e| CoreError::DecodingError(e.to_string()))
    }
}

/// Builder for [`Node`].
#[derive(Debug, Clone)]
pub struct NodeBuilder {
    kind: NodeKind,
    value: bool,
    context: ContextSet,
    expiry: Option<i64>,
}

impl NodeBuilder {
    /// Start from a kind. The value flag defaults to `true`, the context to
    /// global and the node is permanent.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            value: true,
            context: ContextSet::global(),
            expiry: None,
        }
    }

    /// Set the value flag.
    pub fn value(mut self, value: bool) -> Self {
        self.value = value;
        self
    }

    /// Replace the context.
    pub fn context(mut self, context: ContextSet) -> Self {
        self.context = context;
        self
    }

    /// Add every pair of `context` to the node's context.
    pub fn with_extra_context(mut self, context: &ContextSet) -> Self {
        for (k, v) in context.iter() {
            self.context.add(k, v);
        }
        self
    }

    /// Add a single context pair.
    pub fn with_context(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.context.add(key, value);
        self
    }

    /// Make the node temporary, expiring at `expiry` (Unix milliseconds).
    pub fn expiry(mut self, expiry: i64) -> Self {
        self.expiry = Some(expiry);
        self
    }

    /// Validate and build the node.
    pub fn build(self) -> Result<Node> {
        match &self.kind {
            NodeKind::Permission { permission } if permission.trim().is_empty() => {
                return Err(CoreError::InvalidNode("empty permission".into()));
            }
            NodeKind::Meta { key, .. } if key.trim().is_empty() => {
                return Err(CoreError::InvalidNode("empty meta key".into()));
            }
            _ => {}
        }

        Ok(Node {
            kind: self.kind.normalize(),
            value: self.value,
            context: self.context,
            expiry: self.expiry,
        })
    }
}

/// Current time in Unix milliseconds.
pub fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// Split an encoded key on unescaped dots into at most three components,
/// removing escapes. The last component keeps any further dots.
fn split_key(encoded: &str) -> Vec<String> {
    let mut parts = Vec::with_capacity(3);
    let mut current = String::new();
    let mut chars = encoded.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => current.push(chars.next().unwrap_or('\\')),
            '.' if parts.len() < 2 => parts.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    parts.push(current);
    parts
}

fn escape(component: &str) -> String {
    let mut out = String::with_capacity(component.len());
    for c in component.chars() {
        if c == '.' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoded_keys() {
        let meta = Node::meta("color", "red").build().unwrap();
        let prefix = Node::prefix(10, "[Admin]").build().unwrap();
        let suffix = Node::suffix(2, "v1.2").build().unwrap();

        assert_eq!(meta.key(), "meta.color.red");
        assert_eq!(prefix.key(), "prefix.10.[Admin]");
        assert_eq!(suffix.key(), "suffix.2.v1\\.2");
    }

    #[test]
    fn test_identity_ignores_expiry() {
        let permanent = Node::prefix(1, "A").build().unwrap();
        let temporary = Node::prefix(1, "A").expiry(5000).build().unwrap();

        assert_eq!(permanent, temporary);
    }

    #[test]
    fn test_identity_includes_context_and_value() {
        let global = Node::prefix(1, "A").build().unwrap();
        let scoped = Node::prefix(1, "A")
            .with_context("world", "nether")
            .build()
            .unwrap();
        let negated = Node::prefix(1, "A").value(false).build().unwrap();

        assert_ne!(global, scoped);
        assert_ne!(global, negated);
    }

    #[test]
    fn test_accessors() {
        let node = Node::suffix(7, "!").build().unwrap();

        assert_eq!(node.priority(), Some(7));
        assert_eq!(node.meta_value(), Some("!"));
        assert_eq!(node.chat_meta_type(), Some(ChatMetaType::Suffix));
        assert!(node.is_chat_meta());
        assert!(!node.is_meta());
        assert_eq!(node.meta_key(), None);
    }

    #[test]
    fn test_expiry() {
        let node = Node::meta("k", "v").expiry(1000).build().unwrap();

        assert!(node.is_temporary());
        assert!(!node.has_expired(1000));
        assert!(node.has_expired(1001));
    }

    #[test]
    fn test_weight_nodes() {
        let weight = Node::permission("weight.25").build().unwrap();
        let other = Node::permission("weightless.5").build().unwrap();

        assert_eq!(weight.weight(), Some(25));
        assert_eq!(other.weight(), None);
    }

    #[test]
    fn test_build_rejects_empty_keys() {
        assert!(Node::permission("  ").build().is_err());
        assert!(Node::meta("", "v").build().is_err());
    }

    #[test]
    fn test_encoded_permissions_become_typed() {
        let raw_prefix = Node::permission("prefix.1.A").build().unwrap();
        let raw_meta = Node::permission("META.color.dark\\.red").build().unwrap();
        let raw_suffix = Node::permission("suffix.3.v1.2").build().unwrap();

        assert_eq!(raw_prefix, Node::prefix(1, "A").build().unwrap());
        assert_eq!(raw_meta.meta_key(), Some("color"));
        assert_eq!(raw_meta.meta_value(), Some("dark.red"));
        assert_eq!(raw_suffix.meta_value(), Some("v1.2"));
        assert_eq!(raw_suffix.priority(), Some(3));
    }

    #[test]
    fn test_escaped_keys_parse_back() {
        let typed = Node::meta("a.b", "c\\d").build().unwrap();
        let reparsed = Node::permission(typed.key()).build().unwrap();

        assert_eq!(typed, reparsed);
    }

    #[test]
    fn test_other_permissions_stay_plain() {
        for permission in ["prefix.high.A", "meta..v", "chat.color", "prefix.1", "weight.10"] {
            let node = Node::permission(permission).build().unwrap();
            assert_eq!(
                node.kind(),
                &NodeKind::Permission {
                    permission: permission.to_string()
                }
            );
        }
    }

    #[test]
    fn test_decoding_normalizes_kind_and_context() {
        // written by another producer: raw key, mixed-case context key
        #[derive(Serialize)]
        struct Foreign {
            kind: NodeKind,
            value: bool,
            context: serde_json::Value,
            expiry: Option<i64>,
        }
        let foreign = Foreign {
            kind: NodeKind::Permission {
                permission: "suffix.2.B".into(),
            },
            value: true,
            context: serde_json::json!({ "pairs": [["World", "nether"]] }),
            expiry: None,
        };
        let mut bytes = Vec::new();
        ciborium::into_writer(&foreign, &mut bytes).unwrap();

        let decoded = Node::from_bytes(&bytes).unwrap();
        let expected = Node::suffix(2, "B")
            .with_context("world", "nether")
            .build()
            .unwrap();

        assert_eq!(decoded, expected);
        assert_eq!(decoded.chat_meta_type(), Some(ChatMetaType::Suffix));
    }

    #[test]
    fn test_now_millis_is_positive() {
        assert!(now_millis() > 0);
    }

    #[test]
    fn test_cbor_roundtrip_keeps_expiry() {
        let node = Node::meta("rank", "gold")
            .with_context("server", "lobby")
            .expiry(42)
            .build()
            .unwrap();

        let recovered = Node::from_bytes(&node.to_bytes().unwrap()).unwrap();

        assert_eq!(node, recovered);
        assert_eq!(recovered.expiry(), Some(42));
    }
}
