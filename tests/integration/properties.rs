use crate::integration::support::*;
use nsmeta::events::NullSink;
use nsmeta::tree::{BlockCollector, ContentSummary, NamespaceTree, PartitionPolicy};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn partition_key_is_pure(parent in any::<u64>(), name in proptest::collection::vec(any::<u8>(), 0..32), depth in 1u16..16, level in 0u16..4) {
        let policy = PartitionPolicy::new(level);
        let a = policy.compute_partition_key(parent, &name, depth);
        let b = PartitionPolicy::new(level).compute_partition_key(parent, &name, depth);
        prop_assert_eq!(a, b);
        if !policy.is_randomly_partitioned(depth) {
            prop_assert_eq!(a, parent);
        }
    }

    #[test]
    fn flat_directory_totals(sizes in proptest::collection::vec(proptest::collection::vec(1u64..1000, 0..4), 1..12)) {
        let store = memory_store();
        let mut txn = store.begin();
        let mut tree = NamespaceTree::new(&mut txn, PartitionPolicy::default(), &NullSink);
        build(&mut tree, vec![("/d", dir(2))]);
        for (i, blocks) in sizes.iter().enumerate() {
            let path = format!("/d/f{}", i);
            build(&mut tree, vec![(path.as_str(), file(10 + i as u64, blocks, 2))]);
        }
        let root = tree.root().unwrap();
        let summary = tree.compute_content_summary(&root, ContentSummary::default()).unwrap();
        let total: u64 = sizes.iter().flatten().sum();
        prop_assert_eq!(summary.length, total);
        prop_assert_eq!(summary.space_consumed, total * 2);
        prop_assert_eq!(summary.file_count, sizes.len() as u64);

        let mut collector = BlockCollector::new();
        let removed = tree.delete(&root, "/d", &mut collector).unwrap();
        prop_assert_eq!(removed, sizes.len() + 1);
        prop_assert_eq!(collector.blocks().len(), sizes.iter().map(Vec::len).sum::<usize>());
        prop_assert!(tree.children_list(&tree.root().unwrap()).unwrap().is_empty());
    }
}
