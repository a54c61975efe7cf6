//! Recursive subtree aggregation: space usage, content summaries and the
//! terminal step of a subtree delete.

use super::path::get_path_components;
use super::{Block, INode, INodeKind, NamespaceTree};
use crate::error::NamespaceError;
use crate::store::MetadataTxn;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Namespace and disk space counts of a subtree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirCounts {
    pub ns_count: u64,
    pub ds_count: u64,
}

/// Aggregate counts over a subtree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSummary {
    pub length: u64,
    pub file_count: u64,
    pub directory_count: u64,
    pub space_consumed: u64,
}

impl ContentSummary {
    pub fn merge(&mut self, other: &ContentSummary) {
        self.length += other.length;
        self.file_count += other.file_count;
        self.directory_count += other.directory_count;
        self.space_consumed += other.space_consumed;
    }
}

/// Blocks released by a subtree delete
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockCollector {
    to_delete: Vec<Block>,
}

impl BlockCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_delete_block(&mut self, block: Block) {
        self.to_delete.push(block);
    }

    pub fn blocks(&self) -> &[Block] {
        &self.to_delete
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.to_delete
    }
}

impl<'t, T: MetadataTxn + ?Sized> NamespaceTree<'t, T> {
    pub fn space_consumed_in_tree(
        &self,
        node: &INode,
        mut counts: DirCounts,
    ) -> Result<DirCounts, NamespaceError> {
        counts.ns_count += 1;
        match &node.kind {
            INodeKind::Directory(_) => {
                if node.in_tree {
                    for child in self.children_list(node)? {
                        counts = self.space_consumed_in_tree(&child, counts)?;
                    }
                }
            }
            INodeKind::File(file) => counts.ds_count += file.diskspace_consumed(),
            INodeKind::Symlink(_) => {}
        }
        Ok(counts)
    }

    /// Fold the subtree rooted at `node` into `summary`.
    ///
    /// Directories with a disk space quota compare their cached usage with the
    /// computed one and log a warning on mismatch; the summary is still returned.
    pub fn compute_content_summary(
        &self,
        node: &INode,
        mut summary: ContentSummary,
    ) -> Result<ContentSummary, NamespaceError> {
        match &node.kind {
            INodeKind::Directory(attrs) => {
                let mut subtree = ContentSummary::default();
                if let Some(children) = self.children(node)? {
                    for child in &children {
                        subtree = self.compute_content_summary(child, subtree)?;
                    }
                }
                if let Some(quota) = &attrs.quota {
                    if quota.ds_quota.is_some()
                        && quota.diskspace_consumed != subtree.space_consumed
                    {
                        warn!(
                            "Inconsistent diskspace for directory {}. Cached: {} Computed: {}",
                            node.local_name(),
                            quota.diskspace_consumed,
                            subtree.space_consumed
                        );
                    }
                }
                summary.merge(&subtree);
                summary.directory_count += 1;
            }
            INodeKind::File(file) => {
                summary.length += file.compute_file_size();
                summary.file_count += 1;
                summary.space_consumed += file.diskspace_consumed();
            }
            INodeKind::Symlink(_) => summary.file_count += 1,
        }
        Ok(summary)
    }

    /// Collect the blocks of every file under `node` and unlink the subtree.
    ///
    /// Depth first: descendants are cleared before their directory. Files and
    /// symlinks are unlinked by their parent directory; a directory unlinks its
    /// children and then itself. Returns the number of nodes visited.
    pub fn collect_subtree_blocks_and_clear(
        &mut self,
        node: &INode,
        collector: &mut BlockCollector,
    ) -> Result<usize, NamespaceError> {
        match &node.kind {
            INodeKind::File(file) => {
                for block in &file.blocks {
                    collector.add_delete_block(*block);
                }
                Ok(1)
            }
            INodeKind::Symlink(_) => Ok(1),
            INodeKind::Directory(_) => {
                let mut total = 1;
                let Some(children) = self.children(node)? else {
                    return Ok(total);
                };
                for child in &children {
                    total += self.collect_subtree_blocks_and_clear(child, collector)?;
                }
                for child in &children {
                    self.txn.remove(child)?;
                }
                self.txn.remove(node)?;
                Ok(total)
            }
        }
    }

    /// Delete the node at `path` with everything under it.
    ///
    /// Returns the number of nodes removed, 0 when the path does not exist.
    pub fn delete(
        &mut self,
        start: &INode,
        path: &str,
        collector: &mut BlockCollector,
    ) -> Result<usize, NamespaceError> {
        let components = get_path_components(path)?;
        if components.len() < 2 {
            return Err(NamespaceError::InvalidArgument(
                "The root cannot be deleted".to_string(),
            ));
        }
        let parent = self.get_parent(start, &components)?;
        let Some(target) = self.lookup_child(&parent, &components[components.len() - 1])? else {
            return Ok(0);
        };
        // Unlink before clearing; a cleared directory no longer resolves by name.
        self.remove_child(&parent, &target)?;
        self.collect_subtree_blocks_and_clear(&target, collector)
    }
}
