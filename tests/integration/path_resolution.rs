use crate::integration::support::*;
use nsmeta::error::NamespaceError;
use nsmeta::events::NullSink;
use nsmeta::tree::{INode, NamespaceTree, PartitionPolicy};

fn slot_names(inodes: &[Option<INode>]) -> Vec<Option<String>> {
    inodes
        .iter()
        .map(|n| n.as_ref().map(|n| n.local_name()))
        .collect()
}

#[test]
fn capacity_selects_trailing_slots() {
    let store = memory_store();
    let mut txn = store.begin();
    let mut tree = NamespaceTree::new(&mut txn, PartitionPolicy::default(), &NullSink);
    build(&mut tree, vec![("/c1", dir(2)), ("/c1/c2", dir(3))]);
    let root = tree.root().unwrap();
    let path = comps(&["", "c1", "c2", "c3"]);

    let one = tree.get_existing_path_inodes(&root, &path, 1, false).unwrap();
    assert_eq!(slot_names(one.inodes()), vec![None]);

    let two = tree.get_existing_path_inodes(&root, &path, 2, false).unwrap();
    assert_eq!(slot_names(two.inodes()), vec![Some("c2".to_string()), None]);

    let four = tree.get_existing_path_inodes(&root, &path, 4, false).unwrap();
    assert_eq!(
        slot_names(four.inodes()),
        vec![
            Some(String::new()),
            Some("c1".to_string()),
            Some("c2".to_string()),
            None
        ]
    );
    assert_eq!(four.count(), 3);
}

#[test]
fn lookups_work_below_the_random_levels() {
    let store = memory_store();
    let mut txn = store.begin();
    let mut tree = NamespaceTree::new(&mut txn, PartitionPolicy::new(0), &NullSink);
    build(
        &mut tree,
        vec![
            ("/a", dir(2)),
            ("/a/b", dir(3)),
            ("/a/b/c", dir(4)),
            ("/a/b/c/f", file(5, &[1], 1)),
        ],
    );
    let root = tree.root().unwrap();
    let f = tree.get_node(&root, "/a/b/c/f", false).unwrap().unwrap();
    assert_eq!(f.id, 5);
    assert_eq!(f.depth, 4);
    assert_eq!(f.partition_key, 4);

    let a = tree.get_node(&root, "/a", false).unwrap().unwrap();
    assert_eq!(a.partition_key, 1);
}

#[test]
fn file_in_the_middle_stops_the_walk() {
    let store = memory_store();
    let mut txn = store.begin();
    let mut tree = NamespaceTree::new(&mut txn, PartitionPolicy::default(), &NullSink);
    build(&mut tree, vec![("/f", file(2, &[], 1))]);
    let root = tree.root().unwrap();

    let iip = tree
        .get_existing_path_inodes_for(&root, "/f/x/y", false)
        .unwrap();
    assert_eq!(iip.count(), 2);
    assert_eq!(iip.inodes()[1].as_ref().map(|n| n.id), Some(2));
    assert!(iip.inodes()[2].is_none());
    assert!(iip.inodes()[3].is_none());

    let err = tree.get_parent(&root, &comps(&["", "f", "x"])).unwrap_err();
    assert!(matches!(err, NamespaceError::NotADirectory(ref p) if p == "/f"));
}

#[test]
fn intermediate_symlink_always_fails() {
    let store = memory_store();
    let mut txn = store.begin();
    let mut tree = NamespaceTree::new(&mut txn, PartitionPolicy::default(), &NullSink);
    build(
        &mut tree,
        vec![
            ("/c1", dir(2)),
            ("/c1/l", INode::symlink(3, b"", "/elsewhere", perm(), 0)),
        ],
    );
    let root = tree.root().unwrap();
    let path = comps(&["", "c1", "l", "x", "y"]);

    for resolve_link in [false, true] {
        let err = tree
            .get_existing_path_inodes(&root, &path, path.len(), resolve_link)
            .unwrap_err();
        match err {
            NamespaceError::UnresolvedSymlink {
                path,
                preceding,
                remainder,
                target,
            } => {
                assert_eq!(path, "/c1/l/x/y");
                assert_eq!(preceding, "/c1");
                assert_eq!(remainder, "x/y");
                assert_eq!(target, "/elsewhere");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }
}

#[test]
fn final_symlink_follows_the_flag() {
    let store = memory_store();
    let mut txn = store.begin();
    let mut tree = NamespaceTree::new(&mut txn, PartitionPolicy::default(), &NullSink);
    build(
        &mut tree,
        vec![("/l", INode::symlink(2, b"", "/target", perm(), 0))],
    );
    let root = tree.root().unwrap();

    let link = tree.get_node(&root, "/l", false).unwrap().unwrap();
    assert!(link.is_symlink());
    assert!(matches!(
        tree.get_node(&root, "/l", true),
        Err(NamespaceError::UnresolvedSymlink { .. })
    ));
}

#[test]
fn relative_paths_are_rejected() {
    let store = memory_store();
    let mut txn = store.begin();
    let tree = NamespaceTree::new(&mut txn, PartitionPolicy::default(), &NullSink);
    let root = tree.root().unwrap();
    assert!(matches!(
        tree.get_node(&root, "a/b", false),
        Err(NamespaceError::InvalidArgument(_))
    ));
}

#[test]
fn repeated_separators_resolve_like_single_ones() {
    let store = memory_store();
    let mut txn = store.begin();
    let mut tree = NamespaceTree::new(&mut txn, PartitionPolicy::default(), &NullSink);
    build(&mut tree, vec![("/a", dir(2))]);
    let root = tree.root().unwrap();
    assert!(tree.add_by_path(&root, "/a//b", dir(3)).unwrap());

    let root = tree.root().unwrap();
    assert_eq!(tree.get_node(&root, "//a", false).unwrap().map(|n| n.id), Some(2));
    let b = tree.get_node(&root, "/a/b", false).unwrap().unwrap();
    assert_eq!(b.id, 3);
    assert_eq!(b.local_name(), "b");
}
