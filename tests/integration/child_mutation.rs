use crate::integration::support::*;
use nsmeta::error::NamespaceError;
use nsmeta::events::{MutationOperation, NullSink, RecordingSink};
use nsmeta::tree::{INode, NamespaceTree, PartitionPolicy};

#[test]
fn duplicate_add_writes_nothing() {
    let store = memory_store();
    let mut txn = store.begin();
    {
        let mut tree = NamespaceTree::new(&mut txn, PartitionPolicy::default(), &NullSink);
        build(&mut tree, vec![("/a", dir(2))]);
    }
    let before = txn.pending_writes();
    let mut tree = NamespaceTree::new(&mut txn, PartitionPolicy::default(), &NullSink);
    let mut root = tree.root().unwrap();
    let mut dup = INode::file(3, b"a", perm(), 77, 1, 64);
    assert!(!tree.add_child(&mut root, &mut dup, true).unwrap());
    assert!(!dup.in_tree);
    drop(tree);
    assert_eq!(txn.pending_writes(), before);
}

#[test]
fn replace_without_child_is_invalid_and_writes_nothing() {
    let store = memory_store();
    let mut txn = store.begin();
    let mut tree = NamespaceTree::new(&mut txn, PartitionPolicy::default(), &NullSink);
    let root = tree.root().unwrap();
    let mut ghost = INode::directory(9, b"ghost", perm(), 0);
    ghost.parent_id = root.id;
    assert!(matches!(
        tree.replace_child(&root, &mut ghost),
        Err(NamespaceError::InvalidArgument(_))
    ));
    drop(tree);
    assert_eq!(txn.pending_writes(), 0);
}

#[test]
fn replace_with_foreign_parent_is_invalid() {
    let store = memory_store();
    let mut txn = store.begin();
    let mut tree = NamespaceTree::new(&mut txn, PartitionPolicy::default(), &NullSink);
    build(&mut tree, vec![("/a", dir(2))]);
    let root = tree.root().unwrap();
    let mut stranger = INode::directory(3, b"a", perm(), 0);
    stranger.parent_id = 42;
    assert!(matches!(
        tree.replace_child(&root, &mut stranger),
        Err(NamespaceError::InvalidArgument(_))
    ));
}

#[test]
fn remove_is_idempotent() {
    let store = memory_store();
    store
        .transaction(|txn| {
            let mut tree = NamespaceTree::new(txn, PartitionPolicy::default(), &NullSink);
            build(&mut tree, vec![("/a", dir(2))]);
            Ok(())
        })
        .unwrap();

    let mut txn = store.begin();
    let mut tree = NamespaceTree::new(&mut txn, PartitionPolicy::default(), &NullSink);
    let root = tree.root().unwrap();
    let missing = INode::directory(5, b"missing", perm(), 0);
    assert_eq!(tree.remove_child(&root, &missing).unwrap(), None);

    let a = tree.lookup_child(&root, b"a").unwrap().unwrap();
    let removed = tree.remove_child(&root, &a).unwrap().unwrap();
    assert!(!removed.in_tree);
    assert_eq!(tree.lookup_child(&root, b"a").unwrap(), None);
    assert_eq!(tree.remove_child(&root, &a).unwrap(), None);
    drop(tree);
    assert_eq!(txn.pending_writes(), 1);
}

#[test]
fn add_emits_event_and_bumps_mtime() {
    let store = memory_store();
    let sink = RecordingSink::new();
    let mut txn = store.begin();
    let mut tree = NamespaceTree::new(&mut txn, PartitionPolicy::default(), &sink);
    let mut root = tree.root().unwrap();
    let mut child = INode::file(
        2,
        b"f",
        nsmeta::tree::PermissionStatus::new("alice", None, 0o644),
        1234,
        1,
        64,
    );
    assert!(tree.add_child(&mut root, &mut child, true).unwrap());
    assert_eq!(child.group_name(), Some("supergroup"));
    assert_eq!(tree.root().unwrap().modification_time, 1234);

    let events = sink.take();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].operation, MutationOperation::ChildAdded);
    assert_eq!(events[0].parent_id, root.id);
    assert_eq!(events[0].child_name, "f");
}

#[test]
fn add_by_path_rejects_root_and_missing_parent() {
    let store = memory_store();
    let mut txn = store.begin();
    let mut tree = NamespaceTree::new(&mut txn, PartitionPolicy::default(), &NullSink);
    let root = tree.root().unwrap();
    assert!(!tree.add_by_path(&root, "/", dir(2)).unwrap());
    assert!(matches!(
        tree.add_by_path(&root, "/no/such", dir(3)),
        Err(NamespaceError::NotFound(_))
    ));
}
