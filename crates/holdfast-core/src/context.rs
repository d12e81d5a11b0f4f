//! Context sets: the qualifiers restricting where a node applies.
//!
//! A context set is a set of `(key, value)` pairs. A key may carry several
//! values (`world=nether` and `world=end` can coexist). The empty set is the
//! global context.
//!
//! The central relation is [`ContextSet::is_satisfied_by`]: `a` is satisfied
//! by `b` when every pair of `a` is also present in `b`. A node applies under
//! a query context when the node's context is satisfied by the query.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::{CoreError, Result};

/// Key filled by the first bare (`=`-less) token in [`ContextSet::parse`].
pub const SERVER_KEY: &str = "server";

/// Key filled by the second bare token in [`ContextSet::parse`].
pub const WORLD_KEY: &str = "world";

/// A set of `(key, value)` qualifier pairs.
///
/// Keys are trimmed and lower-cased on insertion; values are trimmed but keep
/// their case. Pairs are kept sorted, so two sets holding the same pairs are
/// equal and hash identically regardless of insertion order. Decoded sets go
/// through the same normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawContextSet")]
pub struct ContextSet {
    pairs: BTreeSet<(String, String)>,
}

/// Wire shape of [`ContextSet`] before key normalization.
#[derive(Deserialize)]
struct RawContextSet {
    pairs: BTreeSet<(String, String)>,
}

impl From<RawContextSet> for ContextSet {
    fn from(raw: RawContextSet) -> Self {
        raw.pairs.into_iter().collect()
    }
}

impl ContextSet {
    /// Create an empty (global) context set.
    pub fn new() -> Self {
        Self::default()
    }

    /// The global context. Alias for [`ContextSet::new`].
    pub fn global() -> Self {
        Self::default()
    }

    /// Create a set holding a single pair.
    pub fn of(key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        let mut set = Self::new();
        set.add(key, value);
        set
    }

    /// Parse raw command tokens into a context set.
    ///
    /// Tokens take the form `key=value`. A bare token fills [`SERVER_KEY`],
    /// a second bare token fills [`WORLD_KEY`]; any further bare token is
    /// rejected, as are empty keys and empty values.
    pub fn parse<I, S>(tokens: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        let mut bare = 0usize;

        for token in tokens {
            let token = token.as_ref().trim();
            if token.is_empty() {
                continue;
            }

            match token.split_once('=') {
                Some((key, value)) => {
                    let (key, value) = (key.trim(), value.trim());
                    if key.is_empty() {
                        return Err(CoreError::MalformedContext(format!(
                            "missing key in '{token}'"
                        )));
                    }
                    if value.is_empty() {
                        return Err(CoreError::MalformedContext(format!(
                            "missing value in '{token}'"
                        )));
                    }
                    set.add(key, value);
                }
                None => {
                    let key = match bare {
                        0 => SERVER_KEY,
                        1 => WORLD_KEY,
                        _ => {
                            return Err(CoreError::MalformedContext(format!(
                                "unexpected bare token '{token}'"
                            )))
                        }
                    };
                    bare += 1;
                    set.add(key, token);
                }
            }
        }

        Ok(set)
    }

    /// Add a pair. Returns `false` if the exact pair was already present.
    pub fn add(&mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> bool {
        let key = key.as_ref().trim().to_lowercase();
        let value = value.as_ref().trim().to_string();
        self.pairs.insert((key, value))
    }

    /// Builder-style [`ContextSet::add`].
    pub fn with(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.add(key, value);
        self
    }

    /// Remove a pair. Returns `true` if it was present.
    pub fn remove(&mut self, key: &str, value: &str) -> bool {
        let key = key.trim().to_lowercase();
        self.pairs.remove(&(key, value.trim().to_string()))
    }

    /// Whether this is the global context.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether the exact pair is present.
    pub fn contains(&self, key: &str, value: &str) -> bool {
        let key = key.trim().to_lowercase();
        self.pairs.contains(&(key, value.trim().to_string()))
    }

    /// Whether any pair uses `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        let key = key.trim().to_lowercase();
        self.pairs
            .range((key.clone(), String::new())..)
            .next()
            .is_some_and(|(k, _)| *k == key)
    }

    /// All values recorded for `key`, in sorted order.
    pub fn values<'a>(&'a self, key: &str) -> impl Iterator<Item = &'a str> + 'a {
        let key = key.trim().to_lowercase();
        self.pairs
            .range((key.clone(), String::new())..)
            .take_while(move |(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate over all pairs in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Whether every pair of `self` is present in `other`.
    ///
    /// The empty set is satisfied by every set; a non-empty set is never
    /// satisfied by the empty set.
    pub fn is_satisfied_by(&self, other: &ContextSet) -> bool {
        self.pairs.is_subset(&other.pairs)
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for ContextSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (k, v) in iter {
            set.add(k, v);
        }
        set
    }
}

impl fmt::Display for ContextSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "global");
        }
        let mut first = true;
        for (k, v) in self.iter() {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{k}={v}")?;
            first = false;
        }
        Ok(())
    }
}

/// Selects nodes by their context.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ContextFilter {
    /// Every node, whatever its context.
    #[default]
    Any,

    /// Nodes whose context equals the set exactly.
    Exact(ContextSet),

    /// Nodes that apply under the given query context
    /// (`node.context.is_satisfied_by(query)`).
    AppliesIn(ContextSet),

    /// Nodes whose context carries every pair of the given set
    /// (`set.is_satisfied_by(node.context)`).
    Includes(ContextSet),
}

impl ContextFilter {
    /// The filter used to clear meta: global when the set is empty,
    /// otherwise every node carrying all of the set's pairs.
    pub fn clearing(context: ContextSet) -> Self {
        if context.is_empty() {
            ContextFilter::Any
        } else {
            ContextFilter::Includes(context)
        }
    }

    /// Check a node context against this filter.
    pub fn matches(&self, node_context: &ContextSet) -> bool {
        match self {
            ContextFilter::Any => true,
            ContextFilter::Exact(set) => set == node_context,
            ContextFilter::AppliesIn(query) => node_context.is_satisfied_by(query),
            ContextFilter::Includes(set) => set.is_satisfied_by(node_context),
        }
    }
}
