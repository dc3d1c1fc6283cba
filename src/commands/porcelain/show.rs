//! Show a commit and its items

use crate::areas::repository::Repository;
use crate::artifacts::branch::revision::Revision;
use crate::artifacts::core::EngineError;
use crate::artifacts::objects::object_id::ObjectId;
use colored::Colorize;
use std::io::Write as _;

/// Items listed before eliding the rest
const SHOWN_ITEMS: usize = 10;

impl Repository {
    pub fn show(&mut self, revision: Option<&str>) -> anyhow::Result<()> {
        let oid = match revision {
            Some(spec) => Revision::try_parse(spec)?.resolve_required(self)?,
            None => self
                .refs()
                .read_head()?
                .ok_or_else(|| EngineError::user("no commits yet"))?,
        };

        let commit = self
            .database()
            .parse_commit(&oid)?
            .ok_or_else(|| EngineError::user(format!("{} is not a commit", oid.to_short_oid())))?;

        writeln!(self.writer(), "{}", format!("commit {}", oid).yellow())?;
        if commit.is_merge() {
            let parents: Vec<String> = commit.parents().iter().map(ObjectId::to_short_oid).collect();
            writeln!(self.writer(), "Merge: {}", parents.join(" "))?;
        }
        writeln!(self.writer(), "Author: {}", commit.author().display_name())?;
        writeln!(self.writer(), "Date:   {}", commit.author().readable_timestamp())?;
        writeln!(self.writer())?;
        for line in commit.message().lines() {
            writeln!(self.writer(), "    {}", line)?;
        }
        writeln!(self.writer())?;

        let tree = self.tree_of(&commit)?;
        writeln!(self.writer(), "{}", format!("Items ({}):", tree.len()).bold())?;

        for entry in tree.entries().iter().take(SHOWN_ITEMS) {
            match self.database().parse_blob(&entry.oid)? {
                Some(blob) => writeln!(self.writer(), "  {}", blob.item().display_line())?,
                None => writeln!(self.writer(), "  {}", entry.uri)?,
            }
        }
        if tree.len() > SHOWN_ITEMS {
            writeln!(self.writer(), "  ... and {} more", tree.len() - SHOWN_ITEMS)?;
        }

        Ok(())
    }
}
