//! File status projections handed to listing and stat callers.

use super::{Block, INode, INodeKind, NamespaceTree};
use crate::error::NamespaceError;
use crate::store::MetadataTxn;
use crate::types::{INodeId, PartitionKey};
use serde::{Deserialize, Serialize};

/// Attributes of one namespace entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStatus {
    pub path: String,
    pub length: u64,
    pub is_dir: bool,
    pub replication: u16,
    pub block_size: u64,
    pub modification_time: i64,
    pub access_time: i64,
    pub permission: u16,
    pub owner: String,
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symlink: Option<String>,
    pub file_id: INodeId,
    pub children_num: usize,
    pub partition_key: PartitionKey,
}

impl FileStatus {
    pub fn from_inode(node: &INode, path: impl Into<String>, children_num: usize) -> Self {
        let (length, replication, block_size) = match &node.kind {
            INodeKind::File(file) => (
                file.compute_file_size(),
                file.replication,
                file.preferred_block_size,
            ),
            _ => (0, 0, 0),
        };
        Self {
            path: path.into(),
            length,
            is_dir: node.is_directory(),
            replication,
            block_size,
            modification_time: node.modification_time,
            access_time: node.access_time,
            permission: node.permission.mode,
            owner: node.permission.user.clone(),
            group: node.permission.group.clone(),
            symlink: node.symlink_target().map(str::to_string),
            file_id: node.id,
            children_num,
            partition_key: node.partition_key,
        }
    }

    pub fn is_symlink(&self) -> bool {
        self.symlink.is_some()
    }
}

/// A block with its byte offset in the file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatedBlock {
    pub block: Block,
    pub offset: u64,
}

/// File status together with the file's block list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatedFileStatus {
    pub status: FileStatus,
    pub blocks: Vec<LocatedBlock>,
}

impl LocatedFileStatus {
    pub fn from_inode(node: &INode, path: impl Into<String>, children_num: usize) -> Self {
        let mut offset = 0;
        let blocks: Vec<LocatedBlock> = node
            .file_attrs()
            .map(|file| {
                file.blocks
                    .iter()
                    .map(|block| {
                        let located = LocatedBlock {
                            block: *block,
                            offset,
                        };
                        offset += block.num_bytes;
                        located
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self {
            status: FileStatus::from_inode(node, path, children_num),
            blocks,
        }
    }
}

fn child_path(parent: &str, name: &str) -> String {
    if parent.ends_with('/') {
        format!("{}{}", parent, name)
    } else {
        format!("{}/{}", parent, name)
    }
}

impl<'t, T: MetadataTxn + ?Sized> NamespaceTree<'t, T> {
    fn children_num(&self, node: &INode) -> Result<usize, NamespaceError> {
        if node.is_directory() {
            Ok(self.children_list(node)?.len())
        } else {
            Ok(0)
        }
    }

    /// Status of the entry at `path`; a final symlink is reported, not followed
    pub fn file_status(
        &self,
        start: &INode,
        path: &str,
    ) -> Result<Option<FileStatus>, NamespaceError> {
        match self.get_node(start, path, false)? {
            Some(node) => Ok(Some(FileStatus::from_inode(
                &node,
                path,
                self.children_num(&node)?,
            ))),
            None => Ok(None),
        }
    }

    pub fn located_file_status(
        &self,
        start: &INode,
        path: &str,
    ) -> Result<Option<LocatedFileStatus>, NamespaceError> {
        match self.get_node(start, path, false)? {
            Some(node) => Ok(Some(LocatedFileStatus::from_inode(
                &node,
                path,
                self.children_num(&node)?,
            ))),
            None => Ok(None),
        }
    }

    /// Entries of the directory at `path` sorting after `start_after`.
    ///
    /// A non-directory lists as itself.
    pub fn list_status(
        &self,
        start: &INode,
        path: &str,
        start_after: &[u8],
    ) -> Result<Vec<FileStatus>, NamespaceError> {
        let node = self
            .get_node(start, path, true)?
            .ok_or_else(|| NamespaceError::NotFound(format!("File does not exist: {}", path)))?;
        if !node.is_directory() {
            return Ok(vec![FileStatus::from_inode(&node, path, 0)]);
        }
        let skip = self.next_child(&node, start_after)?;
        self.children_list(&node)?
            .iter()
            .skip(skip)
            .map(|child| -> Result<FileStatus, NamespaceError> {
                Ok(FileStatus::from_inode(
                    child,
                    child_path(path, &child.local_name()),
                    self.children_num(child)?,
                ))
            })
            .collect()
    }
}
