//! Sled-backed record backend.
//!
//! Two trees: `inodes` holds bincode records under
//! `partition_key BE ‖ parent_id BE ‖ name`, and `children` indexes every
//! record under `parent_id BE ‖ partition_key BE ‖ name` so that a
//! cross-partition child listing is a single prefix scan.

use super::{ChildQuery, INodeKey, RecordBackend};
use crate::error::StorageError;
use crate::tree::INode;
use crate::types::{INodeId, ROOT_INODE_ID};
use sled::transaction::{ConflictableTransactionError, TransactionError};
use sled::Transactional;
use std::path::Path;

const INODES_TREE: &str = "inodes";
const CHILDREN_TREE: &str = "children";

fn primary_key(key: &INodeKey) -> Vec<u8> {
    let mut buf = Vec::with_capacity(16 + key.name.len());
    buf.extend_from_slice(&key.partition_key.to_be_bytes());
    buf.extend_from_slice(&key.parent_id.to_be_bytes());
    buf.extend_from_slice(&key.name);
    buf
}

fn child_index_key(key: &INodeKey) -> Vec<u8> {
    let mut buf = Vec::with_capacity(16 + key.name.len());
    buf.extend_from_slice(&key.parent_id.to_be_bytes());
    buf.extend_from_slice(&key.partition_key.to_be_bytes());
    buf.extend_from_slice(&key.name);
    buf
}

fn partition_prefix(parent_id: INodeId, partition_key: u64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(16);
    buf.extend_from_slice(&partition_key.to_be_bytes());
    buf.extend_from_slice(&parent_id.to_be_bytes());
    buf
}

/// Persistent INode store over sled
pub struct SledBackend {
    db: sled::Db,
    inodes: sled::Tree,
    children: sled::Tree,
}

impl SledBackend {
    /// Open or create a store at `path`
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if path.as_os_str().is_empty() {
            return Err(StorageError::InvalidPath("empty store path".to_string()));
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    pub fn from_db(db: sled::Db) -> Result<Self, StorageError> {
        let inodes = db.open_tree(INODES_TREE)?;
        let children = db.open_tree(CHILDREN_TREE)?;
        Ok(Self {
            db,
            inodes,
            children,
        })
    }

    pub fn flush(&self) -> Result<(), StorageError> {
        self.db.flush()?;
        Ok(())
    }

    fn decode(bytes: &[u8]) -> Result<INode, StorageError> {
        Ok(bincode::deserialize(bytes)?)
    }
}

impl RecordBackend for SledBackend {
    fn get(&self, key: &INodeKey) -> Result<Option<INode>, StorageError> {
        match self.inodes.get(primary_key(key))? {
            Some(bytes) => Ok(Some(Self::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn scan(&self, query: &ChildQuery) -> Result<Vec<INode>, StorageError> {
        let mut rows = Vec::new();
        match *query {
            ChildQuery::ByParentIdAndPartition {
                parent_id,
                partition_key,
            } => {
                for entry in self
                    .inodes
                    .scan_prefix(partition_prefix(parent_id, partition_key))
                {
                    let (_, value) = entry?;
                    rows.push(Self::decode(&value)?);
                }
            }
            ChildQuery::ByParentId(parent_id) => {
                for entry in self.children.scan_prefix(parent_id.to_be_bytes()) {
                    let (_, pointer) = entry?;
                    if let Some(value) = self.inodes.get(&pointer)? {
                        rows.push(Self::decode(&value)?);
                    }
                }
                rows.sort_by(|a, b| INodeKey::of(a).cmp(&INodeKey::of(b)));
            }
        }
        Ok(rows)
    }

    fn apply(&self, writes: Vec<(INodeKey, Option<INode>)>) -> Result<(), StorageError> {
        // Encode up front: the sled closure may run more than once.
        let mut encoded = Vec::with_capacity(writes.len());
        for (key, write) in &writes {
            let value = match write {
                Some(node) => Some(bincode::serialize(node)?),
                None => None,
            };
            encoded.push((primary_key(key), child_index_key(key), value));
        }

        (&self.inodes, &self.children)
            .transaction(|(inodes, children)| {
                for (primary, index, value) in &encoded {
                    match value {
                        Some(bytes) => {
                            inodes.insert(primary.as_slice(), bytes.as_slice())?;
                            children.insert(index.as_slice(), primary.as_slice())?;
                        }
                        None => {
                            inodes.remove(primary.as_slice())?;
                            children.remove(index.as_slice())?;
                        }
                    }
                }
                Ok::<(), ConflictableTransactionError<()>>(())
            })
            .map_err(|e: TransactionError<()>| match e {
                TransactionError::Abort(()) => {
                    StorageError::Backend("sled transaction aborted".to_string())
                }
                TransactionError::Storage(e) => StorageError::from(e),
            })?;
        self.flush()
    }

    fn allocate_id(&self) -> Result<INodeId, StorageError> {
        Ok(self.db.generate_id()? + ROOT_INODE_ID + 1)
    }
}
