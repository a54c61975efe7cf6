use crate::integration::support::*;
use nsmeta::events::NullSink;
use nsmeta::tree::{BlockCollector, ContentSummary, DirCounts, NamespaceTree, PartitionPolicy};

#[test]
fn delete_returns_subtree_size_and_unlinks_everything() {
    let store = memory_store();
    let mut txn = store.begin();
    let mut tree = NamespaceTree::new(&mut txn, PartitionPolicy::new(1), &NullSink);
    let paths = [
        "/top",
        "/top/a",
        "/top/a/b",
        "/top/a/b/f1",
        "/top/a/f2",
        "/top/c",
        "/top/c/f3",
    ];
    build(
        &mut tree,
        vec![
            (paths[0], dir(2)),
            (paths[1], dir(3)),
            (paths[2], dir(4)),
            (paths[3], file(5, &[10, 20], 3)),
            (paths[4], file(6, &[5], 1)),
            (paths[5], dir(7)),
            (paths[6], file(8, &[], 1)),
        ],
    );
    build(&mut tree, vec![("/keep", file(9, &[1], 1))]);
    let root = tree.root().unwrap();

    let mut collector = BlockCollector::new();
    let removed = tree.delete(&root, "/top", &mut collector).unwrap();
    assert_eq!(removed, paths.len());
    assert_eq!(collector.blocks().len(), 3);

    for path in paths {
        assert_eq!(tree.get_node(&root, path, false).unwrap(), None, "{}", path);
    }
    let remaining = tree.children_list(&tree.root().unwrap()).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].local_name(), "keep");
}

#[test]
fn deleted_subtree_stays_gone_after_commit() {
    let store = memory_store();
    store
        .transaction(|txn| {
            let mut tree = NamespaceTree::new(txn, PartitionPolicy::default(), &NullSink);
            build(
                &mut tree,
                vec![("/d", dir(2)), ("/d/e", dir(3)), ("/d/e/f", file(4, &[1], 1))],
            );
            Ok(())
        })
        .unwrap();
    let removed = store
        .transaction(|txn| {
            let mut tree = NamespaceTree::new(txn, PartitionPolicy::default(), &NullSink);
            let root = tree.root()?;
            tree.delete(&root, "/d", &mut BlockCollector::new())
        })
        .unwrap();
    assert_eq!(removed, 3);
    assert_eq!(store.backend().len(), 1);
}

#[test]
fn content_summary_matches_manual_enumeration() {
    let store = memory_store();
    let mut txn = store.begin();
    let mut tree = NamespaceTree::new(&mut txn, PartitionPolicy::default(), &NullSink);
    let sizes: [(&str, &[u64], u16); 4] = [
        ("/x/f1", &[100, 28], 3),
        ("/x/y/f2", &[7], 2),
        ("/x/y/z/f3", &[], 1),
        ("/f4", &[1, 2, 3], 1),
    ];
    build(
        &mut tree,
        vec![("/x", dir(2)), ("/x/y", dir(3)), ("/x/y/z", dir(4))],
    );
    for (i, (path, blocks, replication)) in sizes.iter().enumerate() {
        build(&mut tree, vec![(*path, file(10 + i as u64, blocks, *replication))]);
    }
    let root = tree.root().unwrap();

    let summary = tree
        .compute_content_summary(&root, ContentSummary::default())
        .unwrap();
    let length: u64 = sizes.iter().flat_map(|(_, b, _)| b.iter()).sum();
    let space: u64 = sizes
        .iter()
        .map(|(_, b, r)| b.iter().sum::<u64>() * *r as u64)
        .sum();
    assert_eq!(summary.length, length);
    assert_eq!(summary.space_consumed, space);
    assert_eq!(summary.file_count, 4);
    assert_eq!(summary.directory_count, 4);

    let x = tree.get_node(&root, "/x", false).unwrap().unwrap();
    let x_summary = tree
        .compute_content_summary(&x, ContentSummary::default())
        .unwrap();
    assert_eq!(x_summary.directory_count, 3);
    assert_eq!(x_summary.file_count, 3);

    let counts = tree
        .space_consumed_in_tree(&root, DirCounts::default())
        .unwrap();
    assert_eq!(counts.ns_count, 8);
    assert_eq!(counts.ds_count, space);
}
