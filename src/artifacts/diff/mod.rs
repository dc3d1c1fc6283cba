//! List diffs and commit deltas
//!
//! Two related views of "what changed":
//!
//! - `ListDiff` compares two ordered uri sequences positionally, for `status`
//!   and `diff` output: additions, removals, and surviving items that moved.
//! - `Delta` is the applicable change a commit made relative to its first
//!   parent. Cherry-pick applies a delta to a different base; revert applies
//!   its inverse.

use crate::artifacts::objects::tree::{Tree, TreeEntry};
use std::collections::{HashMap, HashSet};

/// One side of a positional diff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffEntry {
    pub uri: String,
    pub position: u32,
}

/// Positional comparison of two ordered sequences
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListDiff {
    /// Present only in the new sequence, with new positions
    pub added: Vec<DiffEntry>,
    /// Present only in the old sequence, with old positions
    pub removed: Vec<DiffEntry>,
    /// Present in both but at a different position: `(uri, old, new)`
    pub reordered: Vec<(String, u32, u32)>,
}

impl ListDiff {
    pub fn between(old: &[String], new: &[String]) -> Self {
        let old_positions: HashMap<&String, u32> = old
            .iter()
            .enumerate()
            .map(|(position, uri)| (uri, position as u32))
            .collect();
        let new_positions: HashMap<&String, u32> = new
            .iter()
            .enumerate()
            .map(|(position, uri)| (uri, position as u32))
            .collect();

        let mut diff = ListDiff::default();

        for (position, uri) in new.iter().enumerate() {
            match old_positions.get(uri) {
                None => diff.added.push(DiffEntry {
                    uri: uri.clone(),
                    position: position as u32,
                }),
                Some(&old_position) if old_position != position as u32 => {
                    diff.reordered.push((uri.clone(), old_position, position as u32));
                }
                Some(_) => {}
            }
        }

        for (position, uri) in old.iter().enumerate() {
            if !new_positions.contains_key(uri) {
                diff.removed.push(DiffEntry {
                    uri: uri.clone(),
                    position: position as u32,
                });
            }
        }

        diff
    }

    pub fn between_trees(old: &Tree, new: &Tree) -> Self {
        Self::between(&old.uris(), &new.uris())
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.reordered.is_empty()
    }
}

/// The change a commit made versus its first parent, in applicable form
///
/// Carries full tree entries on both sides so the delta can be inverted
/// without consulting the object store again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delta {
    added: Vec<TreeEntry>,
    removed: Vec<TreeEntry>,
    /// Order of the child tree, used when the delta is a pure reorder
    target_order: Vec<String>,
}

impl Delta {
    /// Delta turning `parent` into `child`
    pub fn between(parent: &Tree, child: &Tree) -> Self {
        let added = child
            .entries()
            .iter()
            .filter(|entry| !parent.contains(&entry.uri))
            .cloned()
            .collect();
        let removed = parent
            .entries()
            .iter()
            .filter(|entry| !child.contains(&entry.uri))
            .cloned()
            .collect();

        Delta {
            added,
            removed,
            target_order: child.uris(),
        }
    }

    /// The delta that undoes this one
    pub fn invert(self) -> Self {
        Delta {
            added: self.removed,
            removed: self.added,
            target_order: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    /// Apply to an arbitrary base tree
    ///
    /// Removals drop matching uris; additions append (skipping uris the base
    /// already carries). When the result holds exactly the items of the
    /// original child tree, its order is adopted wholesale so that
    /// reorder-only commits replay faithfully.
    pub fn apply(&self, base: &Tree) -> Tree {
        let removed: HashSet<&str> = self.removed.iter().map(|entry| entry.uri.as_str()).collect();

        let mut entries: Vec<TreeEntry> = base
            .entries()
            .iter()
            .filter(|entry| !removed.contains(entry.uri.as_str()))
            .cloned()
            .collect();

        for entry in &self.added {
            if !entries.iter().any(|existing| existing.uri == entry.uri) {
                entries.push(entry.clone());
            }
        }

        let result_uris: HashSet<&str> = entries.iter().map(|entry| entry.uri.as_str()).collect();
        let target_uris: HashSet<&str> =
            self.target_order.iter().map(|uri| uri.as_str()).collect();
        if !self.target_order.is_empty() && result_uris == target_uris {
            let by_uri: HashMap<String, TreeEntry> = entries
                .into_iter()
                .map(|entry| (entry.uri.clone(), entry))
                .collect();
            entries = self
                .target_order
                .iter()
                .filter_map(|uri| by_uri.get(uri).cloned())
                .collect();
        }

        Tree::from_ordered(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::object_id::ObjectId;
    use pretty_assertions::assert_eq;

    fn oid(seed: u8) -> ObjectId {
        ObjectId::try_parse(format!("{:02x}", seed).repeat(20)).unwrap()
    }

    fn entry(uri: &str) -> TreeEntry {
        TreeEntry::new(0, uri.to_string(), oid(1), format!("name of {uri}"))
    }

    fn tree(uris: &[&str]) -> Tree {
        Tree::from_ordered(uris.iter().map(|uri| entry(uri)))
    }

    fn seq(uris: &[&str]) -> Vec<String> {
        uris.iter().map(|uri| uri.to_string()).collect()
    }

    #[test]
    fn diff_reports_added_and_removed_with_positions() {
        let diff = ListDiff::between(&seq(&["a", "b"]), &seq(&["a", "c"]));
        assert_eq!(diff.added, vec![DiffEntry { uri: "c".into(), position: 1 }]);
        assert_eq!(diff.removed, vec![DiffEntry { uri: "b".into(), position: 1 }]);
        assert!(diff.reordered.is_empty());
    }

    #[test]
    fn diff_reports_moves_of_surviving_items() {
        let diff = ListDiff::between(&seq(&["a", "b", "c"]), &seq(&["c", "a", "b"]));
        assert!(diff.added.is_empty());
        assert!(diff.removed.is_empty());
        assert_eq!(
            diff.reordered,
            vec![("c".into(), 2, 0), ("a".into(), 0, 1), ("b".into(), 1, 2)]
        );
    }

    #[test]
    fn identical_sequences_diff_empty() {
        assert!(ListDiff::between(&seq(&["a", "b"]), &seq(&["a", "b"])).is_empty());
    }

    #[test]
    fn delta_apply_reproduces_the_child_on_its_own_parent() {
        let parent = tree(&["a", "b"]);
        let child = tree(&["a", "b", "d"]);

        let delta = Delta::between(&parent, &child);
        assert_eq!(delta.apply(&parent).uris(), child.uris());
    }

    #[test]
    fn delta_applies_to_a_diverged_base() {
        let parent = tree(&["a", "b"]);
        let child = tree(&["a", "b", "d"]);
        let base = tree(&["a", "b", "c"]);

        let delta = Delta::between(&parent, &child);
        assert_eq!(delta.apply(&base).uris(), seq(&["a", "b", "c", "d"]));
    }

    #[test]
    fn applying_a_delta_to_its_own_child_is_a_no_op() {
        let parent = tree(&["a", "b"]);
        let child = tree(&["a", "b", "d"]);

        let delta = Delta::between(&parent, &child);
        assert_eq!(delta.apply(&child).uris(), child.uris());
    }

    #[test]
    fn two_inversions_cancel_at_the_tree_level() {
        let parent = tree(&["a", "b"]);
        let child = tree(&["a", "b", "d"]);

        let delta = Delta::between(&parent, &child);
        let reverted = delta.clone().invert().apply(&child);
        assert_eq!(reverted.uris(), parent.uris());

        let restored = delta.apply(&reverted);
        assert_eq!(restored.uris(), child.uris());
    }

    #[test]
    fn reorder_only_deltas_replay_the_child_order() {
        let parent = tree(&["a", "b", "c"]);
        let child = tree(&["c", "a", "b"]);

        let delta = Delta::between(&parent, &child);
        assert!(delta.is_empty());
        assert_eq!(delta.apply(&parent).uris(), child.uris());
    }
}
