//! Child lookup and mutation of directories.

use super::path::get_path_components;
use super::{INode, NamespaceTree};
use crate::error::NamespaceError;
use crate::events::{MutationEvent, MutationOperation};
use crate::store::{INodeKey, MetadataTxn};
use crate::types::Depth;
use tracing::warn;

/// Depth of the children of `dir`
pub(crate) fn children_depth(dir: &INode) -> Result<Depth, NamespaceError> {
    dir.my_depth().checked_add(1).ok_or_else(|| {
        NamespaceError::InvalidArgument(format!(
            "Directory {} is at the maximum depth {}",
            dir.local_name(),
            Depth::MAX
        ))
    })
}

impl<'t, T: MetadataTxn + ?Sized> NamespaceTree<'t, T> {
    fn child_key(&self, dir: &INode, name: &[u8]) -> Result<INodeKey, NamespaceError> {
        let partition_key = self
            .policy
            .compute_partition_key(dir.id, name, children_depth(dir)?);
        Ok(INodeKey::new(partition_key, dir.id, name))
    }

    fn emit(&self, operation: MutationOperation, dir: &INode, child: &INode) {
        self.sink.record(&MutationEvent {
            operation,
            parent_id: dir.id,
            child_id: child.id,
            child_name: child.local_name(),
            meta_enabled: dir.is_meta_enabled(),
        });
    }

    /// Live child of `dir` called `name`.
    ///
    /// Records that exist but are not in the tree count as absent.
    pub fn lookup_child(&self, dir: &INode, name: &[u8]) -> Result<Option<INode>, NamespaceError> {
        let found = self.txn.find(&self.child_key(dir, name)?)?;
        Ok(found.filter(|n| n.in_tree))
    }

    /// Link `node` under `dir`.
    ///
    /// Returns `false` without writing anything when a live child with the same
    /// name exists. A node that is already in the tree only has its parent
    /// link updated: its partition key is kept as is, re-keying goes through
    /// [`NamespaceTree::replace_child`].
    pub fn add_child(
        &mut self,
        dir: &mut INode,
        node: &mut INode,
        update_mod_time: bool,
    ) -> Result<bool, NamespaceError> {
        if self.lookup_child(dir, &node.name)?.is_some() {
            return Ok(false);
        }

        if node.permission.group.is_none() {
            node.permission.group = dir.permission.group.clone();
        }

        let child_depth = children_depth(dir)?;
        node.parent_id = dir.id;
        node.depth = child_depth;
        if !node.in_tree {
            node.in_tree = true;
            node.partition_key = self
                .policy
                .compute_partition_key(node.parent_id, &node.name, child_depth);
            self.txn.add(node)?;
        } else {
            let expected = self
                .policy
                .compute_partition_key(node.parent_id, &node.name, child_depth);
            if expected != node.partition_key {
                warn!(
                    node = %node,
                    kept = node.partition_key,
                    expected,
                    "Attached node keeps a partition key that lookups will not find"
                );
            }
            self.txn.update(node)?;
        }

        if update_mod_time {
            dir.modification_time = node.modification_time;
            self.txn.update(dir)?;
        }

        self.emit(MutationOperation::ChildAdded, dir, node);
        Ok(true)
    }

    /// Replace the child carrying `new_child`'s name with `new_child`, re-keyed
    /// for this directory. Updates in place.
    pub fn replace_child(&mut self, dir: &INode, new_child: &mut INode) -> Result<(), NamespaceError> {
        let existing = self.lookup_child(dir, &new_child.name)?.ok_or_else(|| {
            NamespaceError::InvalidArgument("No child exists to be replaced".to_string())
        })?;
        if existing.parent_id != new_child.parent_id {
            return Err(NamespaceError::InvalidArgument(format!(
                "Invalid parent id {} for child {}, expected {}",
                new_child.parent_id,
                new_child.local_name(),
                existing.parent_id
            )));
        }
        let child_depth = children_depth(dir)?;
        new_child.depth = child_depth;
        new_child.in_tree = existing.in_tree;
        new_child.partition_key =
            self.policy
                .compute_partition_key(dir.id, &new_child.name, child_depth);
        self.txn.update(new_child)?;
        self.emit(MutationOperation::ChildReplaced, dir, new_child);
        Ok(())
    }

    /// Unlink the child with `node`'s name, returning it detached
    pub fn remove_child(&mut self, dir: &INode, node: &INode) -> Result<Option<INode>, NamespaceError> {
        let Some(mut existing) = self.lookup_child(dir, &node.name)? else {
            return Ok(None);
        };
        self.txn.remove(&existing)?;
        existing.in_tree = false;
        self.emit(MutationOperation::ChildRemoved, dir, &existing);
        Ok(Some(existing))
    }

    /// Add `new_node` at `path`, naming it after the final component.
    ///
    /// Returns `false` for the root path or when the name is taken.
    pub fn add_by_path(
        &mut self,
        start: &INode,
        path: &str,
        mut new_node: INode,
    ) -> Result<bool, NamespaceError> {
        let components = get_path_components(path)?;
        if components.len() < 2 {
            return Ok(false);
        }
        if let Some(last) = components.last() {
            new_node.set_local_name(last);
        }
        let mut parent = self.get_parent(start, &components)?;
        self.add_child(&mut parent, &mut new_node, true)
    }

    /// Live children sorted by name, `None` when `dir` is not in the tree
    pub fn children(&self, dir: &INode) -> Result<Option<Vec<INode>>, NamespaceError> {
        if !dir.in_tree || !dir.is_directory() {
            return Ok(None);
        }
        let query = self.policy.children_query(dir.id, children_depth(dir)?);
        let mut children: Vec<INode> = self
            .txn
            .find_list(&query)?
            .into_iter()
            .filter(|c| c.in_tree && c.parent_id == dir.id)
            .collect();
        children.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(Some(children))
    }

    pub fn children_list(&self, dir: &INode) -> Result<Vec<INode>, NamespaceError> {
        Ok(self.children(dir)?.unwrap_or_default())
    }

    /// Index of the first child that sorts after `name`
    pub fn next_child(&self, dir: &INode, name: &[u8]) -> Result<usize, NamespaceError> {
        if name.is_empty() {
            return Ok(0);
        }
        let children = self.children_list(dir)?;
        Ok(match children.binary_search_by(|c| c.compare_name(name)) {
            Ok(pos) => pos + 1,
            Err(pos) => pos,
        })
    }
}
