use crate::integration::support::*;
use nsmeta::events::NullSink;
use nsmeta::store::{MetadataStore, SledBackend};
use nsmeta::tree::{ContentSummary, NamespaceTree, PartitionPolicy};
use tempfile::TempDir;

#[test]
fn namespace_survives_reopen() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("store");
    let policy = PartitionPolicy::new(1);

    {
        let store = formatted(SledBackend::open(&path).unwrap(), policy);
        store
            .transaction(|txn| {
                let mut tree = NamespaceTree::new(txn, policy, &NullSink);
                build(
                    &mut tree,
                    vec![
                        ("/user", dir(2)),
                        ("/user/alice", dir(3)),
                        ("/user/alice/data", file(4, &[64, 36], 2)),
                        ("/user/alice/logs", dir(5)),
                    ],
                );
                Ok(())
            })
            .unwrap();
    }

    let store = MetadataStore::new(SledBackend::open(&path).unwrap());
    let mut txn = store.begin();
    let tree = NamespaceTree::new(&mut txn, policy, &NullSink);
    let root = tree.root().unwrap();
    let data = tree
        .get_node(&root, "/user/alice/data", false)
        .unwrap()
        .unwrap();
    assert_eq!(data.id, 4);
    assert_eq!(data.partition_key, 3);

    let alice = tree.get_node(&root, "/user/alice", false).unwrap().unwrap();
    let names: Vec<String> = tree
        .children_list(&alice)
        .unwrap()
        .iter()
        .map(|c| c.local_name())
        .collect();
    assert_eq!(names, vec!["data", "logs"]);

    let summary = tree
        .compute_content_summary(&root, ContentSummary::default())
        .unwrap();
    assert_eq!(summary.length, 100);
    assert_eq!(summary.space_consumed, 200);
}

#[test]
fn random_level_listing_spans_partitions() {
    let temp = TempDir::new().unwrap();
    let store = formatted(
        SledBackend::open(&temp.path().join("store")).unwrap(),
        PartitionPolicy::new(2),
    );
    let mut txn = store.begin();
    let mut tree = NamespaceTree::new(&mut txn, PartitionPolicy::new(2), &NullSink);
    let entries: Vec<_> = (0..20u64)
        .map(|i| (format!("/d{:02}", i), dir(10 + i)))
        .collect();
    for (path, node) in &entries {
        let root = tree.root().unwrap();
        assert!(tree.add_by_path(&root, path, node.clone()).unwrap());
    }
    let root = tree.root().unwrap();
    let children = tree.children_list(&root).unwrap();
    assert_eq!(children.len(), 20);
    let partitions: std::collections::HashSet<_> =
        children.iter().map(|c| c.partition_key).collect();
    assert!(partitions.len() > 1);
    drop(tree);
    txn.commit().unwrap();
}
