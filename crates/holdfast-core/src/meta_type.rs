//! Meta selectors.
//!
//! [`MetaType`] selects which meta-bearing nodes an operation touches.
//! [`ChatMetaType`] names one of the two priority-ordered chat meta kinds.
//! Free-form aliases are resolved once, through a lookup table, at the
//! boundary where user input enters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::node::{Node, NodeKind, META_KEY, PREFIX_KEY, SUFFIX_KEY};

/// Selector over meta-bearing node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetaType {
    /// Meta, prefix and suffix nodes.
    #[default]
    Any,
    /// Prefix and suffix nodes.
    Chat,
    /// Meta key/value nodes.
    Meta,
    /// Prefix nodes.
    Prefix,
    /// Suffix nodes.
    Suffix,
}

/// Normalized alias -> selector.
const ALIASES: &[(&str, MetaType)] = &[
    ("any", MetaType::Any),
    ("all", MetaType::Any),
    ("*", MetaType::Any),
    ("chat", MetaType::Chat),
    ("chatmeta", MetaType::Chat),
    (META_KEY, MetaType::Meta),
    (PREFIX_KEY, MetaType::Prefix),
    ("prefixes", MetaType::Prefix),
    (SUFFIX_KEY, MetaType::Suffix),
    ("suffixes", MetaType::Suffix),
];

impl MetaType {
    /// Resolve an alias, case-insensitively.
    pub fn from_alias(alias: &str) -> Option<Self> {
        let alias = alias.trim().to_lowercase();
        ALIASES
            .iter()
            .find(|(name, _)| *name == alias)
            .map(|(_, meta_type)| *meta_type)
    }

    /// Split a leading selector alias off an argument list.
    ///
    /// If the first argument is a known alias it is consumed; otherwise the
    /// selector defaults to [`MetaType::Any`] and every argument is left for
    /// the caller (typically as context tokens).
    pub fn split_leading<S: AsRef<str>>(args: &[S]) -> (Self, &[S]) {
        match args.split_first() {
            Some((first, rest)) => match Self::from_alias(first.as_ref()) {
                Some(meta_type) => (meta_type, rest),
                None => (MetaType::Any, args),
            },
            None => (MetaType::Any, args),
        }
    }

    /// Whether a node falls under this selector.
    ///
    /// Permission nodes never match.
    pub fn matches(self, node: &Node) -> bool {
        match node.kind() {
            NodeKind::Permission { .. } => false,
            NodeKind::Meta { .. } => matches!(self, MetaType::Any | MetaType::Meta),
            NodeKind::Prefix { .. } => {
                matches!(self, MetaType::Any | MetaType::Chat | MetaType::Prefix)
            }
            NodeKind::Suffix { .. } => {
                matches!(self, MetaType::Any | MetaType::Chat | MetaType::Suffix)
            }
        }
    }

    /// Lower-case name.
    pub fn name(self) -> &'static str {
        match self {
            MetaType::Any => "any",
            MetaType::Chat => "chat",
            MetaType::Meta => META_KEY,
            MetaType::Prefix => PREFIX_KEY,
            MetaType::Suffix => SUFFIX_KEY,
        }
    }
}

impl FromStr for MetaType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_alias(s).ok_or_else(|| CoreError::UnknownMetaType(s.to_string()))
    }
}

impl fmt::Display for MetaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<ChatMetaType> for MetaType {
    fn from(chat_type: ChatMetaType) -> Self {
        match chat_type {
            ChatMetaType::Prefix => MetaType::Prefix,
            ChatMetaType::Suffix => MetaType::Suffix,
        }
    }
}

/// One of the two chat meta kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMetaType {
    Prefix,
    Suffix,
}

impl ChatMetaType {
    /// Both chat meta types.
    pub const ALL: [ChatMetaType; 2] = [ChatMetaType::Prefix, ChatMetaType::Suffix];

    /// Whether a node is chat meta of this type.
    pub fn matches(self, node: &Node) -> bool {
        node.chat_meta_type() == Some(self)
    }

    /// Lower-case name.
    pub fn name(self) -> &'static str {
        match self {
            ChatMetaType::Prefix => PREFIX_KEY,
            ChatMetaType::Suffix => SUFFIX_KEY,
        }
    }
}

impl FromStr for ChatMetaType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match MetaType::from_alias(s) {
            Some(MetaType::Prefix) => Ok(ChatMetaType::Prefix),
            Some(MetaType::Suffix) => Ok(ChatMetaType::Suffix),
            _ => Err(CoreError::UnknownChatMetaType(s.to_string())),
        }
    }
}

impl fmt::Display for ChatMetaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases() {
        for alias in ["any", "ALL", "*"] {
            assert_eq!(alias.parse::<MetaType>().unwrap(), MetaType::Any);
        }
        assert_eq!("chatmeta".parse::<MetaType>().unwrap(), MetaType::Chat);
        assert_eq!("Meta".parse::<MetaType>().unwrap(), MetaType::Meta);
        assert_eq!("prefixes".parse::<MetaType>().unwrap(), MetaType::Prefix);
        assert_eq!("suffix".parse::<MetaType>().unwrap(), MetaType::Suffix);
        assert!("colour".parse::<MetaType>().is_err());
    }

    #[test]
    fn test_split_leading() {
        let args = ["prefix", "world=nether"];
        let (meta_type, rest) = MetaType::split_leading(&args);
        assert_eq!(meta_type, MetaType::Prefix);
        assert_eq!(rest, &["world=nether"]);

        let args = ["world=nether"];
        let (meta_type, rest) = MetaType::split_leading(&args);
        assert_eq!(meta_type, MetaType::Any);
        assert_eq!(rest, &["world=nether"]);

        let empty: [&str; 0] = [];
        assert_eq!(MetaType::split_leading(&empty).0, MetaType::Any);
    }

    #[test]
    fn test_matches() {
        let meta = Node::meta("k", "v").build().unwrap();
        let prefix = Node::prefix(1, "p").build().unwrap();
        let suffix = Node::suffix(1, "s").build().unwrap();
        let perm = Node::permission("a.b").build().unwrap();

        assert!(MetaType::Any.matches(&meta));
        assert!(MetaType::Any.matches(&prefix));
        assert!(!MetaType::Any.matches(&perm));
        assert!(MetaType::Chat.matches(&suffix));
        assert!(!MetaType::Chat.matches(&meta));
        assert!(MetaType::Prefix.matches(&prefix));
        assert!(!MetaType::Prefix.matches(&suffix));
        assert!(ChatMetaType::Suffix.matches(&suffix));
        assert!(!ChatMetaType::Suffix.matches(&prefix));
    }

    #[test]
    fn test_chat_meta_type_parse() {
        assert_eq!("suffixes".parse::<ChatMetaType>().unwrap(), ChatMetaType::Suffix);
        assert!("chat".parse::<ChatMetaType>().is_err());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&MetaType::Chat).unwrap();
        assert_eq!(json, "\"chat\"");
    }
}
