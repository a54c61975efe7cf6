//! Path resolution over partitioned children.

use super::path::{construct_path, get_path_components, path_to_string};
use super::{INode, NamespaceTree};
use crate::error::NamespaceError;
use crate::store::MetadataTxn;
use std::cmp::Ordering;
use tracing::debug;

/// Nodes found along a path.
///
/// Holds one slot per requested component. When the capacity is smaller than
/// the path only the trailing components are kept, so the last slot always
/// refers to the final component. Unresolved components stay `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct INodesInPath {
    inodes: Vec<Option<INode>>,
    count: usize,
}

impl INodesInPath {
    fn new(num_slots: usize) -> Self {
        Self {
            inodes: vec![None; num_slots],
            count: 0,
        }
    }

    pub fn inodes(&self) -> &[Option<INode>] {
        &self.inodes
    }

    pub fn into_inodes(self) -> Vec<Option<INode>> {
        self.inodes
    }

    /// Number of path components resolved before the walk stopped
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn len(&self) -> usize {
        self.inodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inodes.is_empty()
    }

    /// Node in the final slot
    pub fn last(&self) -> Option<&INode> {
        self.inodes.last().and_then(Option::as_ref)
    }
}

/// Require `node` to be an existing directory
pub fn directory_value_of(node: Option<INode>, path: &str) -> Result<INode, NamespaceError> {
    match node {
        None => Err(NamespaceError::NotFound(format!(
            "Directory does not exist: {}",
            path
        ))),
        Some(n) if !n.is_directory() => Err(NamespaceError::NotADirectory(path.to_string())),
        Some(n) => Ok(n),
    }
}

impl<'t, T: MetadataTxn + ?Sized> NamespaceTree<'t, T> {
    /// Walk `components` from `start`, which must be the node named by
    /// `components[0]`.
    ///
    /// A symlink on an intermediate component always fails with
    /// [`NamespaceError::UnresolvedSymlink`]; on the final component only when
    /// `resolve_link` is set.
    pub fn get_existing_path_inodes(
        &self,
        start: &INode,
        components: &[Vec<u8>],
        num_slots: usize,
        resolve_link: bool,
    ) -> Result<INodesInPath, NamespaceError> {
        debug_assert!(
            components
                .first()
                .map(|c| start.compare_name(c) == Ordering::Equal)
                .unwrap_or(false),
            "Incorrect name {} expected {:?}",
            start.local_name(),
            components.first().map(|c| String::from_utf8_lossy(c).into_owned())
        );

        let mut existing = INodesInPath::new(num_slots);
        let mut index = num_slots as isize - components.len() as isize;
        if index > 0 {
            index = 0;
        }

        let mut count = 0;
        let mut current = Some(start.clone());
        while count < components.len() {
            let Some(node) = current.take() else {
                break;
            };
            let last_comp = count == components.len() - 1;

            if node.is_symlink() && (!last_comp || resolve_link) {
                let path = construct_path(components, 0, components.len());
                let preceding = construct_path(components, 0, count);
                let remainder = construct_path(components, count + 1, components.len());
                let target = node.symlink_target().unwrap_or_default().to_string();
                debug!(
                    %path,
                    %preceding,
                    count,
                    link = %String::from_utf8_lossy(&components[count]),
                    %target,
                    %remainder,
                    "UnresolvedPathException"
                );
                return Err(NamespaceError::UnresolvedSymlink {
                    path,
                    preceding,
                    remainder,
                    target,
                });
            }

            count += 1;
            existing.count = count;
            let stop = last_comp || !node.is_directory();
            let next = if stop {
                None
            } else {
                self.lookup_child(&node, &components[count])?
            };
            if index >= 0 {
                existing.inodes[index as usize] = Some(node);
            }
            index += 1;
            if stop {
                break;
            }
            current = next;
        }
        Ok(existing)
    }

    /// Every node from `start` to the end of `path`
    pub fn get_existing_path_inodes_for(
        &self,
        start: &INode,
        path: &str,
        resolve_link: bool,
    ) -> Result<INodesInPath, NamespaceError> {
        let components = get_path_components(path)?;
        self.get_existing_path_inodes(start, &components, components.len(), resolve_link)
    }

    /// Node named by the last component of `path`, if it exists
    pub fn get_node(
        &self,
        start: &INode,
        path: &str,
        resolve_link: bool,
    ) -> Result<Option<INode>, NamespaceError> {
        let components = get_path_components(path)?;
        let inodes = self.get_existing_path_inodes(start, &components, 1, resolve_link)?;
        Ok(inodes.into_inodes().pop().flatten())
    }

    /// Directory that would hold the last component
    pub fn get_parent(
        &self,
        start: &INode,
        components: &[Vec<u8>],
    ) -> Result<INode, NamespaceError> {
        if components.len() < 2 {
            return Err(NamespaceError::InvalidArgument(
                "The root has no parent".to_string(),
            ));
        }
        let inodes = self.get_existing_path_inodes(start, components, 2, false)?;
        let parent_path = path_to_string(&components[..components.len() - 1]);
        directory_value_of(inodes.into_inodes().swap_remove(0), &parent_path)
    }
}
