//! Text rendering of a subtree for debugging.
//!
//! ```text
//!     (INodeDirectory@1)
//! +- a   (INodeDirectory@2)
//!   +- f1   (INodeFile@4)
//!   \- f2   (INodeFile@5)
//! \- z   (INodeFile@3)
//! ```

use super::{INode, NamespaceTree};
use crate::error::NamespaceError;
use crate::store::MetadataTxn;

pub const DUMPTREE_EXCEPT_LAST_ITEM: &str = "+-";
pub const DUMPTREE_LAST_ITEM: &str = "\\-";

impl<'t, T: MetadataTxn + ?Sized> NamespaceTree<'t, T> {
    /// Depth-first dump of `node` and its descendants, siblings sorted by name
    pub fn dump_tree_recursively(&self, node: &INode) -> Result<String, NamespaceError> {
        let mut out = String::new();
        self.dump_node(node, String::new(), &mut out)?;
        Ok(out)
    }

    fn dump_node(&self, node: &INode, prefix: String, out: &mut String) -> Result<(), NamespaceError> {
        out.push_str(&format!(
            "{} {}   ({})\n",
            prefix,
            node.local_name(),
            node.object_string()
        ));
        if !node.is_directory() {
            return Ok(());
        }

        let mut base = prefix;
        if base.len() >= 2 {
            base.truncate(base.len() - 2);
            base.push_str("  ");
        }
        let children = self.children_list(node)?;
        let last = children.len().saturating_sub(1);
        for (i, child) in children.iter().enumerate() {
            let connector = if i == last {
                DUMPTREE_LAST_ITEM
            } else {
                DUMPTREE_EXCEPT_LAST_ITEM
            };
            self.dump_node(child, format!("{}{}", base, connector), out)?;
        }
        Ok(())
    }
}
