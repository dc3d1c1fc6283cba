//! Working tree status
//!
//! Reports the checked-out branch and the staged differences against HEAD's
//! tree, with positions for reordered items.

use crate::areas::repository::Repository;
use colored::Colorize;
use std::io::Write as _;

impl Repository {
    pub fn status(&mut self) -> anyhow::Result<()> {
        match self.refs().current_branch()? {
            Some(branch) => writeln!(self.writer(), "On branch {}", branch.to_string().green())?,
            None => {
                let head = self.refs().read_head()?;
                let at = head
                    .map(|oid| oid.to_short_oid())
                    .unwrap_or_else(|| "?".to_string());
                writeln!(self.writer(), "HEAD detached at {}", at.yellow())?;
            }
        }

        if self.head_commit()?.is_none() {
            writeln!(self.writer(), "\nNo commits yet")?;
        }

        let head_tree = self.head_tree()?;
        let diff = self.index().diff_against(&head_tree);

        if diff.is_empty() {
            if self.index().is_dirty() {
                writeln!(self.writer(), "\nnothing staged (index rewritten in place)")?;
            } else {
                writeln!(self.writer(), "\nnothing to commit, working list clean")?;
            }
            return Ok(());
        }

        writeln!(self.writer(), "\nChanges staged for commit:")?;
        let index_tree = self.index().as_tree(self.database())?;

        for entry in &diff.added {
            let name = index_tree
                .entry(&entry.uri)
                .map(|entry| entry.name.clone())
                .unwrap_or_else(|| entry.uri.clone());
            writeln!(
                self.writer(),
                "  {} {} (at {})",
                "added:".green(),
                name,
                entry.position
            )?;
        }
        for entry in &diff.removed {
            let name = head_tree
                .entry(&entry.uri)
                .map(|entry| entry.name.clone())
                .unwrap_or_else(|| entry.uri.clone());
            writeln!(
                self.writer(),
                "  {} {} (was {})",
                "removed:".red(),
                name,
                entry.position
            )?;
        }
        for (uri, old_position, new_position) in &diff.reordered {
            let name = index_tree
                .entry(uri)
                .map(|entry| entry.name.clone())
                .unwrap_or_else(|| uri.clone());
            writeln!(
                self.writer(),
                "  {} {} ({} -> {})",
                "moved:".yellow(),
                name,
                old_position,
                new_position
            )?;
        }

        Ok(())
    }
}
