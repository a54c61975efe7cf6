//! Partitioned namespace tree
//!
//! [`NamespaceTree`] is a view over one open store transaction. It owns no
//! nodes: directories find their children by computing the child's partition
//! key and asking the store for `(partition_key, parent_id, name)`.

pub mod aggregate;
pub mod directory;
pub mod dump;
pub mod node;
pub mod partition;
pub mod path;
pub mod resolve;
pub mod status;

pub use aggregate::{BlockCollector, ContentSummary, DirCounts};
pub use node::{
    Block, DirectoryAttrs, DirectoryQuota, FileAttrs, INode, INodeKind, PermissionStatus,
    SymlinkAttrs,
};
pub use partition::{root_partition_key, PartitionPolicy};
pub use path::{construct_path, get_path_components};
pub use resolve::INodesInPath;
pub use status::{FileStatus, LocatedBlock, LocatedFileStatus};

use crate::error::NamespaceError;
use crate::events::MutationSink;
use crate::store::{INodeKey, MetadataTxn};
use crate::types::{ROOT_DIR_PARTITION_KEY, ROOT_NAME, ROOT_PARENT_ID};
use tracing::info;

/// Namespace operations bound to a transaction
pub struct NamespaceTree<'t, T: MetadataTxn + ?Sized> {
    txn: &'t mut T,
    policy: PartitionPolicy,
    sink: &'t dyn MutationSink,
}

impl<'t, T: MetadataTxn + ?Sized> NamespaceTree<'t, T> {
    pub fn new(txn: &'t mut T, policy: PartitionPolicy, sink: &'t dyn MutationSink) -> Self {
        Self { txn, policy, sink }
    }

    pub fn policy(&self) -> &PartitionPolicy {
        &self.policy
    }

    /// Key of the root directory record
    pub fn root_key() -> INodeKey {
        INodeKey::new(ROOT_DIR_PARTITION_KEY, ROOT_PARENT_ID, ROOT_NAME)
    }

    /// Load the root directory
    pub fn root(&self) -> Result<INode, NamespaceError> {
        self.txn
            .find(&Self::root_key())?
            .ok_or_else(|| NamespaceError::NotFound("Namespace is not formatted".to_string()))
    }

    /// Create the root directory if the store has none; returns the root either way
    pub fn format(
        &mut self,
        permission: PermissionStatus,
        mtime: i64,
    ) -> Result<INode, NamespaceError> {
        if let Some(root) = self.txn.find(&Self::root_key())? {
            return Ok(root);
        }
        let root = INode::root(permission, mtime);
        self.txn.add(&root)?;
        info!(root_id = root.id, "Formatted namespace");
        Ok(root)
    }
}
