//! In-memory record backend.

use super::{ChildQuery, INodeKey, RecordBackend};
use crate::error::StorageError;
use crate::tree::INode;
use crate::types::{INodeId, ROOT_INODE_ID};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Ordered map of committed records
pub struct MemoryBackend {
    records: RwLock<BTreeMap<INodeKey, INode>>,
    next_id: AtomicU64,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(ROOT_INODE_ID + 1),
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl RecordBackend for MemoryBackend {
    fn get(&self, key: &INodeKey) -> Result<Option<INode>, StorageError> {
        Ok(self.records.read().get(key).cloned())
    }

    fn scan(&self, query: &ChildQuery) -> Result<Vec<INode>, StorageError> {
        let records = self.records.read();
        let rows = match *query {
            ChildQuery::ByParentIdAndPartition {
                parent_id,
                partition_key,
            } => {
                let start = INodeKey::new(partition_key, parent_id, &[]);
                records
                    .range(start..)
                    .take_while(|(k, _)| query.matches(k))
                    .map(|(_, v)| v.clone())
                    .collect()
            }
            ChildQuery::ByParentId(_) => records
                .iter()
                .filter(|(k, _)| query.matches(k))
                .map(|(_, v)| v.clone())
                .collect(),
        };
        Ok(rows)
    }

    fn apply(&self, writes: Vec<(INodeKey, Option<INode>)>) -> Result<(), StorageError> {
        let mut records = self.records.write();
        for (key, write) in writes {
            match write {
                Some(node) => {
                    records.insert(key, node);
                }
                None => {
                    records.remove(&key);
                }
            }
        }
        Ok(())
    }

    fn allocate_id(&self) -> Result<INodeId, StorageError> {
        Ok(self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}
