//! Show changes
//!
//! Without arguments, compares the index against HEAD's tree (the staged
//! changes). With two revisions, compares their trees.

use crate::areas::repository::Repository;
use crate::artifacts::branch::revision::Revision;
use crate::artifacts::core::EngineError;
use crate::artifacts::diff::ListDiff;
use crate::artifacts::objects::tree::Tree;
use colored::Colorize;
use std::io::Write as _;

impl Repository {
    pub fn diff(&mut self, revisions: &[String]) -> anyhow::Result<()> {
        let (old_tree, new_tree) = match revisions {
            [] => (self.head_tree()?, self.index().as_tree(self.database())?),
            [old, new] => (self.tree_of_revision(old)?, self.tree_of_revision(new)?),
            _ => {
                return Err(EngineError::user(
                    "diff takes no revisions (staged changes) or exactly two",
                ))
            }
        };

        let diff = ListDiff::between_trees(&old_tree, &new_tree);
        if diff.is_empty() {
            writeln!(self.writer(), "no changes")?;
            return Ok(());
        }

        for entry in &diff.added {
            let name = new_tree
                .entry(&entry.uri)
                .map(|entry| entry.name.clone())
                .unwrap_or_else(|| entry.uri.clone());
            writeln!(self.writer(), "{} {} (at {})", "+".green(), name, entry.position)?;
        }
        for entry in &diff.removed {
            let name = old_tree
                .entry(&entry.uri)
                .map(|entry| entry.name.clone())
                .unwrap_or_else(|| entry.uri.clone());
            writeln!(self.writer(), "{} {} (was {})", "-".red(), name, entry.position)?;
        }
        for (uri, old_position, new_position) in &diff.reordered {
            let name = new_tree
                .entry(uri)
                .map(|entry| entry.name.clone())
                .unwrap_or_else(|| uri.clone());
            writeln!(
                self.writer(),
                "{} {} ({} -> {})",
                "~".yellow(),
                name,
                old_position,
                new_position
            )?;
        }

        Ok(())
    }

    fn tree_of_revision(&self, spec: &str) -> anyhow::Result<Tree> {
        let oid = Revision::try_parse(spec)?.resolve_required(self)?;
        let commit = self
            .database()
            .parse_commit(&oid)?
            .ok_or_else(|| EngineError::user(format!("'{}' is not a commit", spec)))?;
        self.tree_of(&commit)
    }
}
