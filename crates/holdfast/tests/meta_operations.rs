//! End-to-end behavior of clear-meta, set-chat-meta and meta resolution.

use holdfast::{
    ChatMetaType, ContextFilter, ContextSet, Holder, MetaType, MutationAction, Node,
    SetChatMetaOutcome,
};
use holdfast_testkit::{group_chain, scenario_nodes, HolderFixture};

fn nether() -> ContextSet {
    ContextSet::of("world", "nether")
}

#[test]
fn test_clear_any_global_twice() {
    let fixture = HolderFixture::user("alice").with_nodes(scenario_nodes());

    assert_eq!(fixture.holder.clear_meta(MetaType::Any, &ContextSet::global()), 3);
    assert_eq!(fixture.holder.clear_meta(MetaType::Any, &ContextSet::global()), 0);

    // a zero-count clear is still reported
    let records = fixture.hook.records();
    assert_eq!(records.len(), 2);
    assert_eq!(
        records[1].action,
        MutationAction::ClearMeta {
            selector: MetaType::Any,
            removed: 0,
        }
    );
}

#[test]
fn test_clear_scenario_sequence() {
    let fixture = HolderFixture::user("alice").with_nodes(scenario_nodes());
    let holder = &fixture.holder;

    assert_eq!(holder.clear_meta(MetaType::Meta, &ContextSet::global()), 1);
    assert_eq!(holder.nodes().len(), 2);

    assert_eq!(holder.clear_meta(MetaType::Any, &nether()), 1);
    let remaining = holder.nodes();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].chat_meta_type(), Some(ChatMetaType::Prefix));
}

#[test]
fn test_add_then_remove_round_trip() {
    let holder = Holder::user("alice").unwrap();
    let node = Node::suffix(9, "~").context(nether()).build().unwrap();

    assert!(holder.add_node(node.clone()).is_success());
    let removed = holder
        .store()
        .remove_if(&ContextFilter::Exact(nether()), |n| MetaType::Suffix.matches(n));

    assert_eq!(removed, 1);
    assert!(!holder.nodes().contains(&node));
}

#[test]
fn test_auto_priority_monotonic() {
    let holder = Holder::user("alice").unwrap();
    for priority in [1, 3, 5] {
        holder.add_node(Node::prefix(priority, format!("p{priority}")).build().unwrap());
    }

    let outcome = holder.set_chat_meta(ChatMetaType::Prefix, None, "next", &nether());
    assert_eq!(
        outcome,
        SetChatMetaOutcome::Success {
            priority: 6,
            context: nether(),
        }
    );
}

#[test]
fn test_group_weight_override() {
    let group = Holder::group("staff").unwrap().with_weight(10);
    group.add_node(Node::prefix(3, "[Old]").context(nether()).build().unwrap());

    let outcome = group.set_chat_meta(ChatMetaType::Prefix, None, "[Staff]", &ContextSet::global());
    assert_eq!(outcome.priority(), 10);
}

#[test]
fn test_dedup_on_set() {
    let fixture = HolderFixture::user("alice");
    let holder = &fixture.holder;

    assert!(holder
        .set_chat_meta(ChatMetaType::Prefix, None, "a", &nether())
        .is_success());
    assert!(holder
        .set_chat_meta(ChatMetaType::Prefix, None, "b", &nether())
        .is_success());

    let in_nether: Vec<Node> = holder
        .nodes()
        .into_iter()
        .filter(|n| ChatMetaType::Prefix.matches(n) && n.context() == &nether())
        .collect();
    assert_eq!(in_nether.len(), 1);
    assert_eq!(in_nether[0].meta_value(), Some("b"));

    // the first prefix was removed before priorities were computed
    assert_eq!(in_nether[0].priority(), Some(1));
    assert_eq!(fixture.hook.len(), 2);
}

#[test]
fn test_accumulate_priority_buckets() {
    let holder = Holder::user("alice").unwrap();
    holder.add_node(Node::prefix(1, "low").build().unwrap());
    holder.add_node(Node::prefix(5, "high").build().unwrap());

    let view = holder.accumulate_meta(&ContextSet::global(), &[]);
    let prefixes: Vec<(i32, &str)> = view
        .chat_meta(ChatMetaType::Prefix)
        .iter()
        .map(|(p, v)| (*p, v.as_str()))
        .collect();

    assert_eq!(prefixes, vec![(1, "low"), (5, "high")]);
    assert_eq!(view.prefix(), Some("high"));
}

#[test]
fn test_accumulate_respects_query_context() {
    let holder = Holder::user("alice").unwrap();
    holder.add_node(Node::suffix(1, "global").build().unwrap());
    holder.add_node(Node::suffix(5, "nether").context(nether()).build().unwrap());

    let in_nether = holder.accumulate_meta(&nether(), &[]);
    assert_eq!(in_nether.suffix(), Some("nether"));

    let elsewhere = holder.accumulate_meta(&ContextSet::of("world", "end"), &[]);
    assert_eq!(elsewhere.suffix(), Some("global"));

    let global = holder.accumulate_meta(&ContextSet::global(), &[]);
    assert_eq!(global.chat_meta(ChatMetaType::Suffix).len(), 1);
}

#[test]
fn test_inheritance_chain_resolution() {
    let chain = group_chain(3);
    let ancestors: Vec<_> = chain.iter().map(|g| g.store()).collect();

    let user = Holder::user("alice").unwrap();
    user.add_node(Node::meta("rank", "gold").build().unwrap());
    chain[1].add_node(Node::meta("rank", "silver").build().unwrap());
    chain[2].add_node(Node::meta("motto", "onward").build().unwrap());

    let view = user.accumulate_meta(&ContextSet::global(), &ancestors);

    assert_eq!(view.meta("rank"), Some("gold"));
    assert_eq!(view.meta("motto"), Some("onward"));
    assert_eq!(view.chat_meta(ChatMetaType::Prefix).len(), 3);
    assert_eq!(view.prefix(), Some("[tier-0]"));

    let outcome = user.set_chat_meta_inherited(
        ChatMetaType::Prefix,
        None,
        "[Alice]",
        &ContextSet::global(),
        &ancestors,
    );
    assert_eq!(outcome.priority(), 31);

    let view = user.accumulate_meta(&ContextSet::global(), &ancestors);
    assert_eq!(view.prefix(), Some("[Alice]"));
}

#[test]
fn test_expired_nodes_do_not_count() {
    let holder = Holder::user("alice").unwrap();
    holder.add_node(Node::prefix(50, "[Trial]").expiry(1).build().unwrap());

    let outcome = holder.set_chat_meta(ChatMetaType::Prefix, None, "[Member]", &nether());
    assert_eq!(outcome.priority(), 1);

    assert_eq!(holder.remove_expired(holdfast::core::now_millis()), 1);
    assert_eq!(holder.nodes().len(), 1);
}

#[test]
fn test_parsed_selector_and_context() -> anyhow::Result<()> {
    let holder = Holder::user("alice")?;
    holder.add_node(Node::prefix(1, "[A]").context(ContextSet::of("server", "lobby")).build()?);
    holder.add_node(Node::meta("k", "v").build()?);

    let args = ["prefixes", "lobby"];
    let (selector, rest) = MetaType::split_leading(&args);
    let context = ContextSet::parse(rest)?;

    assert_eq!(holder.clear_meta(selector, &context), 1);
    assert_eq!(holder.nodes().len(), 1);
    Ok(())
}

#[test]
fn test_holder_config_from_json() -> anyhow::Result<()> {
    let config: holdfast::HolderConfig = serde_json::from_str(
        r#"{"weight_biases_priority": false, "accumulator": {"chat_meta_precedence": "last_seen"}}"#,
    )?;

    assert!(!config.weight_biases_priority);
    assert_eq!(config.accumulator.chat_meta_precedence, holdfast::Precedence::LastSeen);
    assert_eq!(config.accumulator.meta_precedence, holdfast::Precedence::FirstSeen);
    Ok(())
}
