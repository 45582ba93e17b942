use crate::integration::support::{dir, file, ScriptedListing};
use fsspec_tree::config::ExpansionConfig;
use fsspec_tree::error::ApiError;
use fsspec_tree::expansion::{ExpandOutcome, FetchState, LazyExpansionController};
use fsspec_tree::listing::{ListingResponse, ListingService};
use fsspec_tree::views::ViewEvent;
use parking_lot::Mutex;
use std::sync::Arc;

async fn populated(
    service: &Arc<ScriptedListing>,
    config: ExpansionConfig,
) -> LazyExpansionController {
    service.respond_entries(
        "/data",
        vec![dir("/data/a"), file("/data/a/keep.txt", 7), file("/data/b.txt", 3)],
    );
    let controller =
        LazyExpansionController::new(Arc::clone(service) as Arc<dyn ListingService>, config);
    controller.reset("local", "/data");
    controller.populate_root().await.unwrap();
    controller
}

fn record_events(controller: &LazyExpansionController) -> Arc<Mutex<Vec<ViewEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    controller.subscribe(Arc::new(move |event: &ViewEvent| {
        sink.lock().push(event.clone());
    }));
    events
}

#[tokio::test]
async fn expanding_fetches_children_once() {
    let service = ScriptedListing::new();
    let controller = populated(&service, ExpansionConfig::default()).await;
    service.respond_entries("/data/a", vec![file("/data/a/c.csv", 12)]);

    let first = controller.request_expand("/data/a").await.unwrap();
    assert!(matches!(first, ExpandOutcome::Fetched(report) if report.created == 1));
    let second = controller.request_expand("/data/a").await.unwrap();
    assert_eq!(second, ExpandOutcome::Cached);

    assert_eq!(service.call_count("/data/a"), 1);
    assert_eq!(controller.fetch_state("/data/a"), Some(FetchState::Fetched));
    let tree = controller.tree();
    let a = tree.node_for_path("/data/a").unwrap();
    assert_eq!(a.children.len(), 2);
    assert_eq!(tree.node_for_path("/data/a/c.csv").unwrap().size(), Some(12));
}

#[tokio::test]
async fn concurrent_expansions_issue_a_single_listing() {
    let service = ScriptedListing::new();
    let controller = populated(&service, ExpansionConfig::default()).await;
    service.respond_entries("/data/a", vec![file("/data/a/c.csv", 1)]);
    let gate = service.hold("/data/a");

    let (first, second, _) = tokio::join!(
        controller.request_expand("/data/a"),
        controller.request_expand("/data/a"),
        async {
            assert_eq!(controller.fetch_state("/data/a"), Some(FetchState::Fetching));
            gate.notify_one();
        }
    );

    assert!(matches!(first.unwrap(), ExpandOutcome::Fetched(_)));
    assert_eq!(second.unwrap(), ExpandOutcome::AlreadyPending);
    assert_eq!(service.call_count("/data/a"), 1);
    assert_eq!(controller.fetch_state("/data/a"), Some(FetchState::Fetched));
}

#[tokio::test]
async fn failed_listing_leaves_node_unfetched_and_retryable() {
    let service = ScriptedListing::new();
    let controller = populated(&service, ExpansionConfig::default()).await;
    service.respond("/data/a", ListingResponse::failure("permission denied"));

    let err = controller.request_expand("/data/a").await.unwrap_err();
    assert!(err.is_retryable());
    match err {
        ApiError::ListingFailed { path, reason } => {
            assert_eq!(path, "/data/a");
            assert_eq!(reason, "permission denied");
        }
        other => panic!("unexpected error: {other}"),
    }
    {
        let tree = controller.tree();
        let a = tree.node_for_path("/data/a").unwrap();
        assert!(!a.fetched);
        assert_eq!(a.children.keys().collect::<Vec<_>>(), vec!["keep.txt"]);
    }

    service.respond_entries("/data/a", vec![file("/data/a/late.txt", 2)]);
    let retried = controller.request_expand("/data/a").await.unwrap();
    assert!(matches!(retried, ExpandOutcome::Fetched(_)));
    assert_eq!(service.call_count("/data/a"), 2);
}

#[tokio::test]
async fn response_after_reset_is_discarded() {
    let service = ScriptedListing::new();
    let controller = populated(&service, ExpansionConfig::default()).await;
    service.respond_entries("/data/a", vec![file("/data/a/old.txt", 1)]);
    let gate = service.hold("/data/a");
    let events = record_events(&controller);

    let (stale, generation) = tokio::join!(controller.request_expand("/data/a"), async {
        let generation = controller.reset("local", "/data");
        gate.notify_one();
        generation
    });

    assert!(matches!(stale, Err(ApiError::StaleResponse { path }) if path == "/data/a"));
    {
        let tree = controller.tree();
        assert_eq!(tree.generation(), generation);
        assert_eq!(tree.len(), 1);
        assert!(tree.node_for_path("/data/a/old.txt").is_none());
    }
    assert!(events.lock().is_empty());

    controller.populate_root().await.unwrap();
    assert_eq!(
        controller.fetch_state("/data/a"),
        Some(FetchState::Unfetched)
    );
    controller.request_expand("/data/a").await.unwrap();
    assert!(controller.tree().node_for_path("/data/a/old.txt").is_some());
}

#[tokio::test]
async fn expansion_emits_subtree_then_expansion_events() {
    let service = ScriptedListing::new();
    let controller = populated(&service, ExpansionConfig::default()).await;
    service.respond_entries("/data/a", vec![]);
    let events = record_events(&controller);
    let a = controller.tree().resolve("/data/a").unwrap();

    controller.request_expand("/data/a").await.unwrap();
    controller.request_expand("/data/a").await.unwrap();

    assert_eq!(
        *events.lock(),
        vec![
            ViewEvent::SubtreeChanged {
                node: a,
                path: "/data/a".into()
            },
            ViewEvent::NodeExpansionRequested {
                path: "/data/a".into()
            },
            ViewEvent::NodeExpansionRequested {
                path: "/data/a".into()
            },
        ]
    );
}

#[tokio::test]
async fn auto_expand_can_be_disabled() {
    let service = ScriptedListing::new();
    let controller = populated(&service, ExpansionConfig { auto_expand: false }).await;
    service.respond_entries("/data/a", vec![]);
    let events = record_events(&controller);

    controller.request_expand("/data/a").await.unwrap();
    let recorded = events.lock();
    assert_eq!(recorded.len(), 1);
    assert!(matches!(recorded[0], ViewEvent::SubtreeChanged { .. }));
}

#[tokio::test]
async fn reveal_expands_each_ancestor_in_order() {
    let service = ScriptedListing::new();
    let controller = populated(&service, ExpansionConfig::default()).await;
    service.respond_entries("/data/a", vec![dir("/data/a/b")]);
    service.respond_entries("/data/a/b", vec![file("/data/a/b/deep.txt", 9)]);

    let outcomes = controller.reveal("/data/a/b").await.unwrap();
    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0], ExpandOutcome::Cached);
    assert!(outcomes[1..]
        .iter()
        .all(|o| matches!(o, ExpandOutcome::Fetched(_))));

    let paths: Vec<String> = service.calls().into_iter().map(|(_, p)| p).collect();
    assert_eq!(paths, vec!["/data", "/data/a", "/data/a/b"]);
    assert!(controller.tree().node_for_path("/data/a/b/deep.txt").is_some());
}

#[tokio::test]
async fn reveal_stops_at_missing_segment() {
    let service = ScriptedListing::new();
    let controller = populated(&service, ExpansionConfig::default()).await;
    service.respond_entries("/data/a", vec![]);

    let err = controller.reveal("/data/a/ghost/x").await.unwrap_err();
    assert!(matches!(err, ApiError::NodeNotFound(p) if p == "/data/a/ghost"));
    assert_eq!(controller.fetch_state("/data/a"), Some(FetchState::Fetched));
}

#[tokio::test]
async fn listing_uses_active_filesystem_key() {
    let service = ScriptedListing::new();
    let controller = populated(&service, ExpansionConfig::default()).await;
    service.respond_entries("/data/a", vec![]);
    controller.request_expand("/data/a").await.unwrap();

    assert!(service.calls().iter().all(|(key, _)| key == "local"));
}
