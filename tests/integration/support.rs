use nsmeta::events::NullSink;
use nsmeta::store::{MemoryBackend, MetadataStore, RecordBackend};
use nsmeta::tree::{Block, INode, NamespaceTree, PartitionPolicy, PermissionStatus};

pub fn perm() -> PermissionStatus {
    PermissionStatus::new("hdfs", Some("supergroup".to_string()), 0o755)
}

pub fn formatted<B: RecordBackend>(backend: B, policy: PartitionPolicy) -> MetadataStore<B> {
    let store = MetadataStore::new(backend);
    store
        .transaction(|txn| NamespaceTree::new(txn, policy, &NullSink).format(perm(), 0))
        .unwrap();
    store
}

pub fn memory_store() -> MetadataStore<MemoryBackend> {
    formatted(MemoryBackend::new(), PartitionPolicy::default())
}

pub fn dir(id: u64) -> INode {
    INode::directory(id, b"", perm(), 0)
}

/// File whose blocks have the given sizes
pub fn file(id: u64, sizes: &[u64], replication: u16) -> INode {
    let mut node = INode::file(id, b"", perm(), 0, replication, 128);
    if let Some(attrs) = node.file_attrs_mut() {
        attrs.blocks = sizes
            .iter()
            .enumerate()
            .map(|(i, n)| Block {
                block_id: id * 1000 + i as u64,
                num_bytes: *n,
                generation_stamp: 1001,
            })
            .collect();
    }
    node
}

pub fn comps(parts: &[&str]) -> Vec<Vec<u8>> {
    parts.iter().map(|p| p.as_bytes().to_vec()).collect()
}

/// Add each `(path, node)` in order, failing the test on a rejected add
pub fn build<T: nsmeta::store::MetadataTxn + ?Sized>(
    tree: &mut NamespaceTree<'_, T>,
    entries: Vec<(&str, INode)>,
) {
    for (path, node) in entries {
        let root = tree.root().unwrap();
        assert!(tree.add_by_path(&root, path, node).unwrap(), "add {}", path);
    }
}
