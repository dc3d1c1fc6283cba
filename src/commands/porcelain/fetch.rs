//! Snapshot the remote list without touching the current branch
//!
//! The snapshot becomes a commit chained onto the previous tracking tip, and
//! only `refs/remotes/<remote>/<branch>` advances.

use crate::areas::repository::Repository;
use crate::artifacts::branch::ref_name::RefName;
use colored::Colorize;
use std::io::Write as _;

impl Repository {
    pub fn fetch(&mut self, remote: &str) -> anyhow::Result<()> {
        let branch = self.require_current_branch()?;
        let (catalog, list_id) = self.catalog_for(remote)?;

        writeln!(self.writer(), "Fetching from {}...", remote)?;
        let items = catalog.fetch_items(&list_id)?;
        writeln!(self.writer(), "Received {} item(s)", items.len())?;

        let (tree_oid, _) = self.write_snapshot(&items)?;

        let tracking = RefName::remote_tracking(remote, &branch);
        let old_tip = self.refs().read(&tracking)?;

        if let Some(old_oid) = &old_tip {
            if let Some(old_commit) = self.database().parse_commit(old_oid)? {
                if old_commit.tree_oid() == &tree_oid {
                    writeln!(self.writer(), "Already up to date.")?;
                    return Ok(());
                }
            }
        }

        let author = self.config().author();
        let commit = crate::artifacts::objects::commit::Commit::new(
            old_tip.clone().into_iter().collect(),
            tree_oid,
            author,
            format!("Fetch from {}", remote),
        );
        let new_oid = self.database().store(&commit)?;

        self.update_ref_with_log(
            &tracking,
            old_tip.as_ref(),
            &new_oid,
            &format!("fetch {}", remote),
            "snapshot of the remote list",
        )?;

        writeln!(
            self.writer(),
            "Updated {} to {}",
            tracking.short_name().green(),
            new_oid.to_short_oid().yellow()
        )?;
        writeln!(self.writer(), "Run 'spgit merge {}/{}' to integrate", remote, branch)?;
        Ok(())
    }
}
