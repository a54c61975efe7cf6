use crate::integration::support::*;
use nsmeta::events::NullSink;
use nsmeta::tree::{NamespaceTree, PartitionPolicy};

#[test]
fn concurrent_add_of_same_name_has_one_winner() {
    let store = memory_store();
    let policy = PartitionPolicy::default();

    let mut first = store.begin();
    let mut second = store.begin();
    {
        let mut tree = NamespaceTree::new(&mut first, policy, &NullSink);
        let mut root = tree.root().unwrap();
        let mut node = dir(2);
        node.set_local_name(b"race");
        assert!(tree.add_child(&mut root, &mut node, false).unwrap());
    }
    {
        let mut tree = NamespaceTree::new(&mut second, policy, &NullSink);
        let mut root = tree.root().unwrap();
        let mut node = dir(3);
        node.set_local_name(b"race");
        assert!(tree.add_child(&mut root, &mut node, false).unwrap());
    }

    first.commit().unwrap();
    let err = nsmeta::error::NamespaceError::from(second.commit().unwrap_err());
    assert!(err.is_conflict());

    let mut retry = store.begin();
    let mut tree = NamespaceTree::new(&mut retry, policy, &NullSink);
    let mut root = tree.root().unwrap();
    let mut node = dir(3);
    node.set_local_name(b"race");
    assert!(!tree.add_child(&mut root, &mut node, false).unwrap());
    assert_eq!(tree.lookup_child(&root, b"race").unwrap().unwrap().id, 2);
}

#[test]
fn failed_closure_discards_writes() {
    let store = memory_store();
    let result: Result<(), _> = store.transaction(|txn| {
        let mut tree = NamespaceTree::new(txn, PartitionPolicy::default(), &NullSink);
        build(&mut tree, vec![("/tmp", dir(2))]);
        let root = tree.root()?;
        tree.add_by_path(&root, "/missing/child", dir(3))?;
        Ok(())
    });
    assert!(result.is_err());

    let mut txn = store.begin();
    let tree = NamespaceTree::new(&mut txn, PartitionPolicy::default(), &NullSink);
    let root = tree.root().unwrap();
    assert_eq!(tree.get_node(&root, "/tmp", false).unwrap(), None);
}

#[test]
fn readers_do_not_block_writers() {
    let store = memory_store();
    let mut reader = store.begin();
    {
        let tree = NamespaceTree::new(&mut reader, PartitionPolicy::default(), &NullSink);
        let root = tree.root().unwrap();
        assert!(tree.children_list(&root).unwrap().is_empty());
    }
    store
        .transaction(|txn| {
            let mut tree = NamespaceTree::new(txn, PartitionPolicy::default(), &NullSink);
            build(&mut tree, vec![("/new", dir(2))]);
            Ok(())
        })
        .unwrap();
    reader.commit().unwrap();
}
