use fsspec_tree::tree::{PathTree, TreeSynchronizer};
use proptest::prelude::*;
use serde_json::{json, Value};
use std::collections::BTreeMap;

const ROOT: &str = "/root";

fn listing_strategy() -> impl Strategy<Value = BTreeMap<String, bool>> {
    prop::collection::btree_map(
        prop::collection::vec("[a-c]{1,2}", 1..4).prop_map(|segments| segments.join("/")),
        any::<bool>(),
        0..24,
    )
}

fn entries(listing: &BTreeMap<String, bool>) -> Vec<Value> {
    listing
        .iter()
        .map(|(relative, is_dir)| {
            let name = format!("{}/{}", ROOT, relative);
            if *is_dir {
                json!({"name": name, "type": "directory", "size": 0})
            } else {
                json!({"name": name, "type": "file", "size": relative.len()})
            }
        })
        .collect()
}

proptest! {
    #[test]
    fn merge_is_idempotent(listing in listing_strategy()) {
        let mut tree = PathTree::new("mem", ROOT);
        let root = tree.root_id();
        let entries = entries(&listing);

        let first = TreeSynchronizer::merge(&mut tree, root, &entries, ROOT).unwrap();
        let snapshot = tree.clone();
        let second = TreeSynchronizer::merge(&mut tree, root, &entries, ROOT).unwrap();

        prop_assert!(second.is_noop());
        prop_assert_eq!(first.skipped, 0);
        prop_assert_eq!(tree.len(), snapshot.len());
        for relative in listing.keys() {
            let path = format!("{}/{}", ROOT, relative);
            prop_assert_eq!(tree.node_for_path(&path), snapshot.node_for_path(&path));
        }
    }

    #[test]
    fn resolve_round_trips_absolute_paths(listing in listing_strategy()) {
        let mut tree = PathTree::new("mem", ROOT);
        let root = tree.root_id();
        TreeSynchronizer::merge(&mut tree, root, &entries(&listing), ROOT).unwrap();

        for relative in listing.keys() {
            let path = format!("{}/{}", ROOT, relative);
            let id = tree.resolve(&path);
            prop_assert!(id.is_some());
            let id = id.unwrap();
            prop_assert_eq!(&tree.get(id).unwrap().absolute_path, &path);
            prop_assert_eq!(tree.reconstruct_path(id), Some(path));
        }
    }

    #[test]
    fn every_listed_node_has_metadata(listing in listing_strategy()) {
        let mut tree = PathTree::new("mem", ROOT);
        let root = tree.root_id();
        TreeSynchronizer::merge(&mut tree, root, &entries(&listing), ROOT).unwrap();

        for (relative, is_dir) in &listing {
            let node = tree.node_for_path(&format!("{}/{}", ROOT, relative)).unwrap();
            let metadata = node.metadata.as_ref().unwrap();
            prop_assert_eq!(metadata.is_directory(), *is_dir);
            prop_assert!(!node.fetched);
        }
    }
}
