use crate::integration::support::{dir, file, filesystem, ScriptedListing, StaticSource};
use fsspec_tree::config::ExpansionConfig;
use fsspec_tree::error::ApiError;
use fsspec_tree::expansion::{ExpandOutcome, LazyExpansionController};
use fsspec_tree::listing::ListingService;
use fsspec_tree::session::BrowserSession;
use std::sync::Arc;

fn session(service: &Arc<ScriptedListing>) -> BrowserSession {
    let controller = Arc::new(LazyExpansionController::new(
        Arc::clone(service) as Arc<dyn ListingService>,
        ExpansionConfig::default(),
    ));
    let source = Arc::new(StaticSource(vec![
        filesystem("local", "/data"),
        filesystem("scratch", "/tmp/scratch"),
    ]));
    BrowserSession::new(source, controller)
}

#[tokio::test]
async fn select_builds_tree_for_filesystem() {
    let service = ScriptedListing::new();
    service.respond_entries("/data", vec![dir("/data/a"), file("/data/b.txt", 1)]);
    let session = session(&service);

    let loaded = session.load_filesystems().await.unwrap();
    assert_eq!(loaded.len(), 2);
    assert!(session.active().is_none());

    let outcome = session.select("local").await.unwrap();
    assert!(matches!(outcome, ExpandOutcome::Fetched(r) if r.created == 2));
    assert_eq!(session.active().unwrap().key, "local");

    let tree = session.controller().tree();
    assert_eq!(tree.key(), "local");
    assert_eq!(tree.root_path(), "/data");
    assert!(tree.node_for_path("/data/a").is_some());
}

#[tokio::test]
async fn switching_filesystems_replaces_tree() {
    let service = ScriptedListing::new();
    service.respond_entries("/data", vec![dir("/data/a")]);
    service.respond_entries("/tmp/scratch", vec![file("/tmp/scratch/x", 5)]);
    let session = session(&service);
    session.load_filesystems().await.unwrap();

    session.select("local").await.unwrap();
    session.select("scratch").await.unwrap();

    let tree = session.controller().tree();
    assert_eq!(tree.key(), "scratch");
    assert!(tree.node_for_path("/data/a").is_none());
    assert_eq!(tree.node_for_path("/tmp/scratch/x").unwrap().size(), Some(5));
    let last = service.calls().pop().unwrap();
    assert_eq!(last, ("scratch".to_string(), "/tmp/scratch".to_string()));
}

#[tokio::test]
async fn refresh_rebuilds_active_filesystem() {
    let service = ScriptedListing::new();
    service.respond_entries("/data", vec![dir("/data/a")]);
    service.respond_entries("/data/a", vec![file("/data/a/inner", 1)]);
    let session = session(&service);
    session.load_filesystems().await.unwrap();
    session.select("local").await.unwrap();
    session.controller().request_expand("/data/a").await.unwrap();
    let before = session.controller().tree().generation();

    session.refresh().await.unwrap();

    let tree = session.controller().tree();
    assert_eq!(tree.generation(), before + 1);
    let a = tree.node_for_path("/data/a").unwrap();
    assert!(!a.fetched);
    assert!(a.children.is_empty());
    assert_eq!(service.call_count("/data"), 2);
}

#[tokio::test]
async fn selection_errors() {
    let service = ScriptedListing::new();
    let session = session(&service);

    assert!(matches!(
        session.refresh().await,
        Err(ApiError::NoActiveFilesystem)
    ));
    session.load_filesystems().await.unwrap();
    assert!(matches!(
        session.select("nope").await,
        Err(ApiError::FilesystemNotFound(key)) if key == "nope"
    ));
    assert!(service.calls().is_empty());
}
