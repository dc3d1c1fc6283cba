//! Snapshot writing
//!
//! Turns an ordered item list (usually fresh from the catalog) into stored
//! blobs plus a tree object, and exposes the tree both as a value and as a
//! digest.

use crate::areas::repository::Repository;
use crate::artifacts::objects::blob::{Blob, Item};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::{Tree, TreeEntry};

impl Repository {
    /// Store blobs for every item and build the ordered tree value
    pub(crate) fn snapshot_tree(&self, items: &[Item]) -> anyhow::Result<Tree> {
        let entries = items
            .iter()
            .map(|item| {
                let oid = self.database().store(&Blob::new(item.clone()))?;
                Ok(TreeEntry::new(0, item.uri.clone(), oid, item.name.clone()))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(Tree::from_ordered(entries))
    }

    /// Store blobs and the tree, returning the tree digest
    pub(crate) fn write_snapshot(&self, items: &[Item]) -> anyhow::Result<(ObjectId, Tree)> {
        let tree = self.snapshot_tree(items)?;
        let oid = self.database().store(&tree)?;
        Ok((oid, tree))
    }

    /// Load the items of a tree, preserving order
    pub(crate) fn items_of(&self, tree: &Tree) -> anyhow::Result<Vec<Item>> {
        tree.entries()
            .iter()
            .map(|entry| {
                self.database()
                    .parse_blob(&entry.oid)?
                    .map(|blob| blob.into_item())
                    .ok_or_else(|| anyhow::anyhow!("tree entry {} is not a blob", entry.oid))
            })
            .collect()
    }
}
