//! Report the commit that introduced an item
//!
//! Walks HEAD's ancestors oldest first and picks the first commit whose tree
//! contains the identifier while its first parent's tree does not. Items
//! that only moved are never reported; introduction is the defined event.

use crate::areas::repository::Repository;
use crate::artifacts::core::EngineError;
use crate::artifacts::objects::tree::Tree;
use colored::Colorize;
use std::io::Write as _;

impl Repository {
    pub fn blame(&mut self, uri: &str) -> anyhow::Result<()> {
        let head = self
            .refs()
            .read_head()?
            .ok_or_else(|| EngineError::user("no commits yet"))?;

        let mut commits = self.history().by_timestamp(&head)?;
        commits.reverse(); // oldest first

        for slim in commits {
            let commit = self
                .database()
                .parse_commit(&slim.oid)?
                .ok_or_else(|| anyhow::anyhow!("blame hit non-commit {}", slim.oid))?;

            let tree = self.tree_of(&commit)?;
            let Some(entry) = tree.entry(uri) else {
                continue;
            };

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

            if parent_tree.contains(uri) {
                continue;
            }

            let display = self
                .database()
                .parse_blob(&entry.oid)?
                .map(|blob| blob.item().display_line())
                .unwrap_or_else(|| uri.to_string());

            writeln!(
                self.writer(),
                "{} ({}) {}",
                slim.oid.to_short_oid().yellow(),
                commit.author().readable_timestamp(),
                display
            )?;
            writeln!(self.writer(), "  Added by: {}", commit.author().display_name())?;
            writeln!(self.writer(), "  Message: {}", commit.short_message())?;
            return Ok(());
        }

        Err(EngineError::user(format!("item '{}' not found in history", uri)))
    }
}
