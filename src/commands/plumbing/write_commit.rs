//! Shared commit creation
//!
//! Every operation that grows history (commit, merge, pull, revert,
//! cherry-pick, rebase steps) funnels through here, so the object → ref →
//! reflog ordering is enforced in exactly one place.

use crate::areas::repository::Repository;
use crate::artifacts::branch::ref_name::RefName;
use crate::artifacts::objects::commit::{Author, Commit};
use crate::artifacts::objects::object_id::ObjectId;

impl Repository {
    /// Write a commit and advance the current branch (or detached HEAD) to it
    ///
    /// `expected_head` is the compare-and-swap guard: the value the caller
    /// last observed. The reflog action/message pair becomes the entry on
    /// both the branch log and `logs/HEAD`.
    pub(crate) fn write_commit_on_current(
        &self,
        parents: Vec<ObjectId>,
        tree_oid: ObjectId,
        message: String,
        action: &str,
        reflog_message: &str,
    ) -> anyhow::Result<ObjectId> {
        let author = self.config().author();
        self.write_commit_on_current_as(parents, tree_oid, author, message, action, reflog_message)
    }

    /// Same, but with an explicit author (cherry-pick and rebase preserve
    /// the original author while committing as the configured identity)
    pub(crate) fn write_commit_on_current_as(
        &self,
        parents: Vec<ObjectId>,
        tree_oid: ObjectId,
        author: Author,
        message: String,
        action: &str,
        reflog_message: &str,
    ) -> anyhow::Result<ObjectId> {
        let expected_head = parents.first().cloned();
        let committer = self.config().author();
        let commit = Commit::new_with_committer(parents, tree_oid, author, committer, message);

        let oid = self.database().store(&commit)?;

        // works for branches and detached HEAD alike: the ref layer follows
        // HEAD's one symbolic level
        self.update_ref_with_log(
            &RefName::head(),
            expected_head.as_ref(),
            &oid,
            action,
            reflog_message,
        )?;

        Ok(oid)
    }
}
