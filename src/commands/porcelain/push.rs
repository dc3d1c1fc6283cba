//! Publish HEAD's tree to the remote list
//!
//! The catalog call happens before any local mutation; a remote failure
//! leaves the repository exactly as it was. Afterwards the tracking ref
//! records what was published.

use crate::areas::repository::Repository;
use crate::artifacts::core::EngineError;
use colored::Colorize;
use std::io::Write as _;

impl Repository {
    pub fn push(&mut self, remote: &str) -> anyhow::Result<()> {
        let branch = self.require_current_branch()?;
        let (catalog, list_id) = self.catalog_for(remote)?;

        let (head_oid, _) = self
            .head_commit()?
            .ok_or_else(|| EngineError::user("no commits to push"))?;
        let tree = self.head_tree()?;

        writeln!(self.writer(), "Pushing to {}...", remote)?;
        catalog.replace_items(&list_id, &tree.uris())?;

        self.update_tracking_ref(remote, &branch, &head_oid)?;

        writeln!(self.writer(), "Pushed {} item(s)", tree.len())?;
        writeln!(self.writer(), "Successfully pushed to {}", remote.green())?;
        Ok(())
    }
}
