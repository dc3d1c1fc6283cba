//! Undo a commit with a new commit
//!
//! Computes the delta the commit made against its first parent, inverts it,
//! and applies the inverse to HEAD's tree. Reverting a revert restores the
//! original tree.

use crate::areas::repository::Repository;
use crate::artifacts::branch::revision::Revision;
use crate::artifacts::core::EngineError;
use crate::artifacts::diff::Delta;
use crate::artifacts::objects::tree::Tree;
use colored::Colorize;
use std::io::Write as _;

impl Repository {
    pub fn revert(&mut self, revision: &str) -> anyhow::Result<()> {
        let oid = Revision::try_parse(revision)?.resolve_required(self)?;
        let commit = self
            .database()
            .parse_commit(&oid)?
            .ok_or_else(|| EngineError::user(format!("'{}' is not a commit", revision)))?;

        let (head_oid, _) = self
            .head_commit()?
            .ok_or_else(|| EngineError::user("cannot revert before the first commit"))?;

        let parent_tree = match commit.parent() {
            Some(parent_oid) => {
                let parent = self
                    .database()
                    .parse_commit(parent_oid)?
                    .ok_or_else(|| anyhow::anyhow!("parent {} is not a commit", parent_oid))?;
                self.tree_of(&parent)?
            }
            None => Tree::default(),
        };
        let commit_tree = self.tree_of(&commit)?;

        let head_tree = self.head_tree()?;
        let reverted_tree = Delta::between(&parent_tree, &commit_tree)
            .invert()
            .apply(&head_tree);
        let tree_oid = self.database().store(&reverted_tree)?;

        let message = format!(
            "Revert \"{}\"\n\nThis reverts commit {}.",
            commit.short_message(),
            oid
        );

        let new_oid = self.write_commit_on_current(
            vec![head_oid],
            tree_oid,
            message,
            "revert",
            &oid.to_short_oid(),
        )?;

        self.rebuild_index_from_head()?;

        writeln!(
            self.writer(),
            "Reverted {} with {}",
            oid.to_short_oid().yellow(),
            new_oid.to_short_oid().yellow()
        )?;

        Ok(())
    }
}
