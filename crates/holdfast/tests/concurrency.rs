//! Concurrent mutation of a single holder.

use std::sync::Arc;

use holdfast::{ChatMetaType, ContextSet, Holder, MetaType, MutationAction, Node};
use holdfast_testkit::HolderFixture;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

fn world(i: usize) -> ContextSet {
    ContextSet::of("world", format!("w{i}"))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_sets_keep_one_prefix_per_context() {
    init_tracing();
    let holder = Arc::new(Holder::user("alice").unwrap());

    let mut tasks = Vec::new();
    for i in 0..32 {
        let holder = Arc::clone(&holder);
        tasks.push(tokio::task::spawn_blocking(move || {
            holder.set_chat_meta(ChatMetaType::Prefix, None, format!("v{i}"), &world(i % 4))
        }));
    }

    for task in tasks {
        assert!(task.await.unwrap().is_success());
    }

    let nodes = holder.nodes();
    assert_eq!(nodes.len(), 4);

    // every set lands above all surviving prefixes, so survivors never share a priority
    let mut priorities: Vec<i32> = nodes.iter().filter_map(Node::priority).collect();
    priorities.sort_unstable();
    priorities.dedup();
    assert_eq!(priorities.len(), 4);
    for i in 0..4 {
        let count = nodes
            .iter()
            .filter(|n| n.context() == &world(i))
            .count();
        assert_eq!(count, 1);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_clears_count_each_node_once() {
    init_tracing();
    let fixture = Arc::new(HolderFixture::user("bob"));
    for i in 0..200 {
        fixture
            .holder
            .add_node(Node::meta(format!("k{i}"), "v").build().unwrap());
    }

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let fixture = Arc::clone(&fixture);
        tasks.push(tokio::task::spawn_blocking(move || {
            fixture.holder.clear_meta(MetaType::Any, &ContextSet::global())
        }));
    }

    let mut total = 0;
    for task in tasks {
        total += task.await.unwrap();
    }

    assert_eq!(total, 200);
    assert!(fixture.holder.nodes().is_empty());

    let reported: usize = fixture
        .hook
        .records()
        .iter()
        .map(|r| match r.action {
            MutationAction::ClearMeta { removed, .. } => removed,
            _ => 0,
        })
        .sum();
    assert_eq!(reported, 200);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_snapshots_never_see_half_applied_sets() {
    let holder = Arc::new(Holder::user("carol").unwrap());
    holder.set_chat_meta(ChatMetaType::Suffix, Some(1), "seed", &ContextSet::global());

    let writer = {
        let holder = Arc::clone(&holder);
        tokio::task::spawn_blocking(move || {
            for i in 0..500 {
                let value = format!("s{i}");
                holder.set_chat_meta(ChatMetaType::Suffix, Some(1), value, &ContextSet::global());
            }
        })
    };

    let reader = {
        let holder = Arc::clone(&holder);
        tokio::task::spawn_blocking(move || {
            for _ in 0..500 {
                // remove + add happen under one lock, so exactly one suffix is visible
                assert_eq!(holder.nodes().len(), 1);
            }
        })
    };

    writer.await.unwrap();
    reader.await.unwrap();
}
