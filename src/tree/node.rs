//! Namespace node types
//!
//! Every node shares the identity fields in [`INode`]; variant-specific payload
//! lives in [`INodeKind`]. Parent/child links are ids, never pointers: children
//! are recovered from the store by `(partition_key, parent_id, name)`.

use crate::types::{
    Depth, INodeId, PartitionKey, ROOT_DIR_DEPTH, ROOT_DIR_PARTITION_KEY, ROOT_INODE_ID,
    ROOT_NAME, ROOT_PARENT_ID,
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Owner, group and mode bits of a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionStatus {
    pub user: String,
    pub group: Option<String>,
    pub mode: u16,
}

impl PermissionStatus {
    pub fn new(user: impl Into<String>, group: Option<String>, mode: u16) -> Self {
        Self {
            user: user.into(),
            group,
            mode,
        }
    }
}

/// A data block of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub block_id: u64,
    pub num_bytes: u64,
    pub generation_stamp: u64,
}

/// Quota extension of a directory with cached usage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryQuota {
    pub ns_quota: Option<u64>,
    pub ds_quota: Option<u64>,
    pub namespace_consumed: u64,
    pub diskspace_consumed: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryAttrs {
    pub quota: Option<DirectoryQuota>,
    /// Gates dataset bookkeeping on mutation events
    pub meta_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAttrs {
    pub replication: u16,
    pub preferred_block_size: u64,
    pub blocks: Vec<Block>,
}

impl FileAttrs {
    /// Sum of block lengths
    pub fn compute_file_size(&self) -> u64 {
        self.blocks.iter().map(|b| b.num_bytes).sum()
    }

    /// Raw space used across all replicas
    pub fn diskspace_consumed(&self) -> u64 {
        self.compute_file_size() * u64::from(self.replication)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymlinkAttrs {
    pub target: String,
}

/// Node variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum INodeKind {
    Directory(DirectoryAttrs),
    File(FileAttrs),
    Symlink(SymlinkAttrs),
}

/// A namespace node record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct INode {
    pub id: INodeId,
    pub parent_id: INodeId,
    pub name: Vec<u8>,
    pub permission: PermissionStatus,
    pub modification_time: i64,
    pub access_time: i64,
    pub partition_key: PartitionKey,
    pub depth: Depth,
    pub in_tree: bool,
    pub kind: INodeKind,
}

impl INode {
    fn with_kind(
        id: INodeId,
        name: &[u8],
        permission: PermissionStatus,
        mtime: i64,
        kind: INodeKind,
    ) -> Self {
        Self {
            id,
            parent_id: ROOT_PARENT_ID,
            name: name.to_vec(),
            permission,
            modification_time: mtime,
            access_time: mtime,
            partition_key: 0,
            depth: 0,
            in_tree: false,
            kind,
        }
    }

    /// Unattached directory
    pub fn directory(id: INodeId, name: &[u8], permission: PermissionStatus, mtime: i64) -> Self {
        Self::with_kind(
            id,
            name,
            permission,
            mtime,
            INodeKind::Directory(DirectoryAttrs::default()),
        )
    }

    /// Unattached file
    pub fn file(
        id: INodeId,
        name: &[u8],
        permission: PermissionStatus,
        mtime: i64,
        replication: u16,
        preferred_block_size: u64,
    ) -> Self {
        Self::with_kind(
            id,
            name,
            permission,
            mtime,
            INodeKind::File(FileAttrs {
                replication,
                preferred_block_size,
                blocks: Vec::new(),
            }),
        )
    }

    /// Unattached symlink
    pub fn symlink(
        id: INodeId,
        name: &[u8],
        target: impl Into<String>,
        permission: PermissionStatus,
        mtime: i64,
    ) -> Self {
        Self::with_kind(
            id,
            name,
            permission,
            mtime,
            INodeKind::Symlink(SymlinkAttrs {
                target: target.into(),
            }),
        )
    }

    /// The root directory, already linked into the tree
    pub fn root(permission: PermissionStatus, mtime: i64) -> Self {
        let mut root = Self::directory(ROOT_INODE_ID, ROOT_NAME, permission, mtime);
        root.parent_id = ROOT_PARENT_ID;
        root.depth = ROOT_DIR_DEPTH;
        root.partition_key = ROOT_DIR_PARTITION_KEY;
        root.in_tree = true;
        root
    }

    pub fn is_directory(&self) -> bool {
        matches!(self.kind, INodeKind::Directory(_))
    }

    pub fn is_file(&self) -> bool {
        matches!(self.kind, INodeKind::File(_))
    }

    pub fn is_symlink(&self) -> bool {
        matches!(self.kind, INodeKind::Symlink(_))
    }

    pub fn is_root(&self) -> bool {
        self.id == ROOT_INODE_ID
    }

    pub fn local_name(&self) -> String {
        String::from_utf8_lossy(&self.name).into_owned()
    }

    pub fn set_local_name(&mut self, name: &[u8]) {
        self.name = name.to_vec();
    }

    pub fn my_depth(&self) -> Depth {
        self.depth
    }

    pub fn group_name(&self) -> Option<&str> {
        self.permission.group.as_deref()
    }

    pub fn symlink_target(&self) -> Option<&str> {
        match &self.kind {
            INodeKind::Symlink(link) => Some(&link.target),
            _ => None,
        }
    }

    pub fn directory_attrs(&self) -> Option<&DirectoryAttrs> {
        match &self.kind {
            INodeKind::Directory(attrs) => Some(attrs),
            _ => None,
        }
    }

    pub fn directory_attrs_mut(&mut self) -> Option<&mut DirectoryAttrs> {
        match &mut self.kind {
            INodeKind::Directory(attrs) => Some(attrs),
            _ => None,
        }
    }

    pub fn file_attrs(&self) -> Option<&FileAttrs> {
        match &self.kind {
            INodeKind::File(attrs) => Some(attrs),
            _ => None,
        }
    }

    pub fn file_attrs_mut(&mut self) -> Option<&mut FileAttrs> {
        match &mut self.kind {
            INodeKind::File(attrs) => Some(attrs),
            _ => None,
        }
    }

    pub fn is_meta_enabled(&self) -> bool {
        self.directory_attrs().map(|d| d.meta_enabled).unwrap_or(false)
    }

    /// Order by local name, the sibling ordering used by listings and dumps
    pub fn compare_name(&self, name: &[u8]) -> Ordering {
        self.name.as_slice().cmp(name)
    }

    /// Short `Kind@id` tag used in diagnostics
    pub fn object_string(&self) -> String {
        let kind = match self.kind {
            INodeKind::Directory(_) => "INodeDirectory",
            INodeKind::File(_) => "INodeFile",
            INodeKind::Symlink(_) => "INodeSymlink",
        };
        format!("{}@{}", kind, self.id)
    }
}

impl fmt::Display for INode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\":{}", self.local_name(), self.object_string())
    }
}
