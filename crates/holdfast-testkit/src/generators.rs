//! Proptest generators for property-based testing.

use proptest::prelude::*;

use holdfast::{Holder, HolderConfig, HolderId, HolderKind};
use holdfast_core::{ChatMetaType, ContextSet, MetaType, Node};

/// Generate a context key from a small pool, so sets overlap often.
pub fn context_key() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("server".to_string()),
        Just("world".to_string()),
        Just("region".to_string()),
    ]
}

/// Generate a context value.
pub fn context_value() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("lobby".to_string()),
        Just("nether".to_string()),
        Just("end".to_string()),
        "[a-z]{1,6}".prop_map(String::from),
    ]
}

/// Generate a context set of up to `max_pairs` pairs.
pub fn context_set(max_pairs: usize) -> impl Strategy<Value = ContextSet> {
    prop::collection::vec((context_key(), context_value()), 0..=max_pairs)
        .prop_map(|pairs| pairs.into_iter().collect())
}

/// Generate a chat meta type.
pub fn chat_meta_type() -> impl Strategy<Value = ChatMetaType> {
    prop_oneof![Just(ChatMetaType::Prefix), Just(ChatMetaType::Suffix)]
}

/// Generate a meta selector.
pub fn meta_type() -> impl Strategy<Value = MetaType> {
    prop_oneof![
        Just(MetaType::Any),
        Just(MetaType::Chat),
        Just(MetaType::Meta),
        Just(MetaType::Prefix),
        Just(MetaType::Suffix),
    ]
}

/// Generate a chat meta priority.
pub fn priority() -> impl Strategy<Value = i32> {
    -10i32..=100
}

/// Generate a prefix or suffix node.
pub fn chat_meta_node() -> impl Strategy<Value = Node> {
    (chat_meta_type(), priority(), "[A-Za-z\\[\\]]{1,8}", context_set(2))
        .prop_map(|(chat_type, priority, value, context)| {
            Node::new_chat_meta(chat_type, priority, value, context)
        })
}

/// Generate a meta key/value node.
pub fn meta_node() -> impl Strategy<Value = Node> {
    ("[a-z]{1,6}", "[a-z0-9]{0,6}", context_set(2)).prop_filter_map(
        "meta key must be non-empty",
        |(key, value, context)| Node::meta(key, value).context(context).build().ok(),
    )
}

/// Generate a permission node.
pub fn permission_node() -> impl Strategy<Value = Node> {
    ("[a-z]{1,6}\\.[a-z]{1,6}", context_set(1)).prop_filter_map(
        "permission must be non-empty",
        |(permission, context)| Node::permission(permission).context(context).build().ok(),
    )
}

/// Generate any node kind.
pub fn node() -> impl Strategy<Value = Node> {
    prop_oneof![chat_meta_node(), meta_node(), permission_node()]
}

/// Parameters for generating a holder.
#[derive(Debug, Clone)]
pub struct HolderParams {
    pub kind: HolderKind,
    pub weight: Option<i32>,
    pub nodes: Vec<Node>,
}

impl Arbitrary for HolderParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            prop_oneof![Just(HolderKind::User), Just(HolderKind::Group)],
            proptest::option::of(0i32..=200),
            prop::collection::vec(node(), 0..24),
        )
            .prop_map(|(kind, weight, nodes)| HolderParams {
                kind,
                weight,
                nodes,
            })
            .boxed()
    }
}

/// Build a holder from parameters.
pub fn holder_from_params(params: &HolderParams) -> Holder {
    let name = match params.kind {
        HolderKind::User => "generated-user",
        HolderKind::Group => "generated-group",
    };
    let id = HolderId::new(name).expect("static holder id is valid");
    let mut holder = Holder::new(id, params.kind, HolderConfig::default());
    if let Some(weight) = params.weight {
        holder = holder.with_weight(weight);
    }
    for node in &params.nodes {
        holder.add_node(node.clone());
    }
    holder
}
