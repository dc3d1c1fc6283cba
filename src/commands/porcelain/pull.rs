//! Fetch the remote list and commit it onto the current branch
//!
//! Objects are written before any ref moves, so a failing remote call leaves
//! local state untouched. The remote-tracking ref advances alongside the
//! branch, and the index is rebuilt from the new HEAD.

use crate::areas::repository::Repository;
use crate::artifacts::branch::ref_name::RefName;
use colored::Colorize;
use std::io::Write as _;

impl Repository {
    pub fn pull(&mut self, remote: &str) -> anyhow::Result<()> {
        let branch = self.require_current_branch()?;
        let (catalog, list_id) = self.catalog_for(remote)?;

        writeln!(self.writer(), "Pulling from {}...", remote)?;
        let items = catalog.fetch_items(&list_id)?;
        writeln!(self.writer(), "Received {} item(s)", items.len())?;

        let (tree_oid, _) = self.write_snapshot(&items)?;
        let head = self.head_commit()?;

        if let Some((_, ref head_commit)) = head {
            if head_commit.tree_oid() == &tree_oid {
                writeln!(self.writer(), "Already up to date.")?;
                return Ok(());
            }
        }

        let parents = head.map(|(oid, _)| vec![oid]).unwrap_or_default();
        let new_oid = self.write_commit_on_current(
            parents,
            tree_oid,
            format!("Pull from {}", remote),
            &format!("pull {}", remote),
            "snapshot of the remote list",
        )?;

        self.update_tracking_ref(remote, &branch, &new_oid)?;
        self.rebuild_index_from_head()?;

        writeln!(self.writer(), "Successfully pulled from {}", remote.green())?;
        Ok(())
    }

    pub(crate) fn update_tracking_ref(
        &self,
        remote: &str,
        branch: &crate::artifacts::branch::branch_name::BranchName,
        oid: &crate::artifacts::objects::object_id::ObjectId,
    ) -> anyhow::Result<()> {
        let tracking = RefName::remote_tracking(remote, branch);
        if self.refs().read(&tracking)?.as_ref() == Some(oid) {
            return Ok(());
        }
        self.update_ref_with_log(&tracking, None, oid, "update by pull/fetch", remote)
    }
}
