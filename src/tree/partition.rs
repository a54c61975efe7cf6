//! Partition key computation
//!
//! Shallow tree levels are randomly partitioned so the fan-out near the root is
//! spread over the cluster. Deeper levels colocate every child with its parent's
//! id, which keeps a directory listing inside a single partition.

use crate::store::ChildQuery;
use crate::types::{Depth, INodeId, PartitionKey, ROOT_DIR_DEPTH, ROOT_DIR_PARTITION_KEY};
use serde::{Deserialize, Serialize};

fn default_random_partitioning_max_level() -> Depth {
    1
}

/// Per-depth partitioning policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionPolicy {
    /// Deepest level that is still randomly partitioned
    #[serde(default = "default_random_partitioning_max_level")]
    pub random_partitioning_max_level: Depth,
}

impl Default for PartitionPolicy {
    fn default() -> Self {
        Self {
            random_partitioning_max_level: default_random_partitioning_max_level(),
        }
    }
}

impl PartitionPolicy {
    pub fn new(random_partitioning_max_level: Depth) -> Self {
        Self {
            random_partitioning_max_level,
        }
    }

    pub fn is_randomly_partitioned(&self, depth: Depth) -> bool {
        depth <= self.random_partitioning_max_level
    }

    /// Partition key of a child named `name` under `parent_id` at `depth`
    pub fn compute_partition_key(
        &self,
        parent_id: INodeId,
        name: &[u8],
        depth: Depth,
    ) -> PartitionKey {
        if depth == ROOT_DIR_DEPTH {
            return ROOT_DIR_PARTITION_KEY;
        }
        if self.is_randomly_partitioned(depth) {
            hash_partition_key(parent_id, name)
        } else {
            parent_id
        }
    }

    /// Range lookup that returns every child of `parent_id`
    pub fn children_query(&self, parent_id: INodeId, child_depth: Depth) -> ChildQuery {
        if self.is_randomly_partitioned(child_depth) {
            ChildQuery::ByParentId(parent_id)
        } else {
            ChildQuery::ByParentIdAndPartition {
                parent_id,
                partition_key: parent_id,
            }
        }
    }
}

/// Stable across restarts and platforms; persisted as part of the record key.
fn hash_partition_key(parent_id: INodeId, name: &[u8]) -> PartitionKey {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&parent_id.to_le_bytes());
    hasher.update(name);
    let digest = hasher.finalize();
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&digest.as_bytes()[..8]);
    PartitionKey::from_le_bytes(buf)
}

/// Partition key of the root directory, identical under every policy
pub fn root_partition_key() -> PartitionKey {
    ROOT_DIR_PARTITION_KEY
}
