//! Apply one commit's change onto HEAD
//!
//! The change is the commit's delta versus its first parent. A delta whose
//! application leaves HEAD's tree untouched is a no-op and creates nothing.

use crate::areas::repository::Repository;
use crate::artifacts::branch::revision::Revision;
use crate::artifacts::core::EngineError;
use crate::artifacts::diff::Delta;
use crate::artifacts::objects::tree::Tree;
use colored::Colorize;
use std::io::Write as _;

impl Repository {
    pub fn cherry_pick(&mut self, revision: &str) -> anyhow::Result<()> {
        let oid = Revision::try_parse(revision)?.resolve_required(self)?;

        let picked = self.apply_commit_onto_head(revision)?;
        match picked {
            Some(new_oid) => writeln!(
                self.writer(),
                "Cherry-picked {} as {}",
                oid.to_short_oid().yellow(),
                new_oid.to_short_oid().yellow()
            )?,
            None => writeln!(
                self.writer(),
                "Nothing to cherry-pick from {}",
                oid.to_short_oid().yellow()
            )?,
        }

        Ok(())
    }

    /// Replay a commit's delta onto HEAD; `None` when the tree is unchanged
    ///
    /// Shared with rebase, which replays a whole chain this way.
    pub(crate) fn apply_commit_onto_head(
        &mut self,
        revision: &str,
    ) -> anyhow::Result<Option<crate::artifacts::objects::object_id::ObjectId>> {
        let oid = Revision::try_parse(revision)?.resolve_required(self)?;
        let commit = self
            .database()
            .parse_commit(&oid)?
            .ok_or_else(|| EngineError::user(format!("'{}' is not a commit", revision)))?;

        let (head_oid, head_commit) = self
            .head_commit()?
            .ok_or_else(|| EngineError::user("cannot cherry-pick before the first commit"))?;

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
        let new_tree = Delta::between(&parent_tree, &commit_tree).apply(&head_tree);
        let tree_oid = self.database().store(&new_tree)?;

        if &tree_oid == head_commit.tree_oid() {
            return Ok(None);
        }

        let message = format!(
            "{}\n\n(cherry picked from commit {})",
            commit.message(),
            oid
        );

        let new_oid = self.write_commit_on_current_as(
            vec![head_oid],
            tree_oid,
            commit.author().clone(),
            message,
            "cherry-pick",
            &commit.short_message(),
        )?;

        self.rebuild_index_from_head()?;
        Ok(Some(new_oid))
    }
}
