//! INode Store
//!
//! Keyed storage for namespace records. A record lives under the composite key
//! `(partition_key, parent_id, name)`; there is no in-memory child collection,
//! so every "look over children" is a point or range lookup here.

pub mod memory;
pub mod persistence;
pub mod txn;

use crate::error::StorageError;
use crate::tree::INode;
use crate::types::{INodeId, PartitionKey};
use serde::{Deserialize, Serialize};
use std::fmt;

pub use memory::MemoryBackend;
pub use persistence::SledBackend;
pub use txn::{MetadataStore, StoreTxn};

/// Primary key of a record
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct INodeKey {
    pub partition_key: PartitionKey,
    pub parent_id: INodeId,
    pub name: Vec<u8>,
}

impl INodeKey {
    pub fn new(partition_key: PartitionKey, parent_id: INodeId, name: &[u8]) -> Self {
        Self {
            partition_key,
            parent_id,
            name: name.to_vec(),
        }
    }

    /// Key a record is stored under
    pub fn of(node: &INode) -> Self {
        Self::new(node.partition_key, node.parent_id, &node.name)
    }
}

impl fmt::Display for INodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(partition={:016x}, parent={}, name={:?})",
            self.partition_key,
            self.parent_id,
            String::from_utf8_lossy(&self.name)
        )
    }
}

/// Range lookup over the children of a directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildQuery {
    /// Every record with this parent, across partitions
    ByParentId(INodeId),
    /// Records with this parent inside a single partition
    ByParentIdAndPartition {
        parent_id: INodeId,
        partition_key: PartitionKey,
    },
}

impl ChildQuery {
    pub fn matches(&self, key: &INodeKey) -> bool {
        match *self {
            ChildQuery::ByParentId(parent_id) => key.parent_id == parent_id,
            ChildQuery::ByParentIdAndPartition {
                parent_id,
                partition_key,
            } => key.parent_id == parent_id && key.partition_key == partition_key,
        }
    }
}

/// Store facade the namespace tree calls into.
///
/// Every call happens inside a transaction opened by the caller; writes are
/// only visible to others once that transaction commits.
pub trait MetadataTxn {
    fn find(&self, key: &INodeKey) -> Result<Option<INode>, StorageError>;

    fn find_list(&self, query: &ChildQuery) -> Result<Vec<INode>, StorageError>;

    /// Insert a new record under its key
    fn add(&mut self, node: &INode) -> Result<(), StorageError>;

    /// Overwrite the record stored under the node's key
    fn update(&mut self, node: &INode) -> Result<(), StorageError>;

    /// Delete the record under the node's key; removing an absent record is a no-op
    fn remove(&mut self, node: &INode) -> Result<(), StorageError>;
}

/// Committed-state storage underneath [`MetadataStore`].
pub trait RecordBackend: Send + Sync {
    fn get(&self, key: &INodeKey) -> Result<Option<INode>, StorageError>;

    /// Records matching `query`, in key order
    fn scan(&self, query: &ChildQuery) -> Result<Vec<INode>, StorageError>;

    /// Apply a write set atomically; `None` deletes
    fn apply(&self, writes: Vec<(INodeKey, Option<INode>)>) -> Result<(), StorageError>;

    /// Fresh node id, never the root's
    fn allocate_id(&self) -> Result<INodeId, StorageError>;
}
