//! Commit history
//!
//! Walks everything reachable from HEAD, newest first by commit timestamp,
//! with ref decoration from the reverse-ref map.

use crate::areas::repository::Repository;
use crate::artifacts::branch::ref_name::RefName;
use crate::artifacts::core::EngineError;
use crate::artifacts::objects::object_id::ObjectId;
use colored::Colorize;
use std::collections::HashMap;
use std::io::Write as _;

impl Repository {
    pub fn log(&mut self, oneline: bool, limit: Option<usize>) -> anyhow::Result<()> {
        let head = match self.refs().read_head()? {
            Some(oid) => oid,
            None => return Err(EngineError::user("no commits yet")),
        };

        let commits = self.history().by_timestamp(&head)?;
        let reverse_refs = self.refs().reverse_refs()?;
        let current_ref = self.refs().current_ref()?;

        let count = limit.unwrap_or(usize::MAX);
        for slim in commits.into_iter().take(count) {
            let commit = self
                .database()
                .parse_commit(&slim.oid)?
                .ok_or_else(|| anyhow::anyhow!("log hit non-commit {}", slim.oid))?;

            let decoration = Self::decorate(&slim.oid, &reverse_refs, &current_ref);

            if oneline {
                writeln!(
                    self.writer(),
                    "{}{} {}",
                    slim.oid.to_short_oid().yellow(),
                    decoration,
                    commit.short_message()
                )?;
            } else {
                writeln!(self.writer(), "{}{}", format!("commit {}", slim.oid).yellow(), decoration)?;
                if commit.is_merge() {
                    let parents: Vec<String> = commit
                        .parents()
                        .iter()
                        .map(ObjectId::to_short_oid)
                        .collect();
                    writeln!(self.writer(), "Merge: {}", parents.join(" "))?;
                }
                writeln!(self.writer(), "Author: {}", commit.author().display_name())?;
                writeln!(self.writer(), "Date:   {}", commit.author().readable_timestamp())?;
                writeln!(self.writer())?;
                for line in commit.message().lines() {
                    writeln!(self.writer(), "    {}", line)?;
                }
                writeln!(self.writer())?;
            }
        }

        Ok(())
    }

    fn decorate(
        oid: &ObjectId,
        reverse_refs: &HashMap<ObjectId, Vec<RefName>>,
        current_ref: &RefName,
    ) -> String {
        let mut names = Vec::new();

        if let Some(refs) = reverse_refs.get(oid) {
            let head_here = refs.iter().any(|name| name.is_head());

            for name in refs {
                if name.is_head() {
                    continue;
                }
                let label = if name.is_tag() {
                    format!("tag: {}", name.short_name())
                } else {
                    name.short_name().to_string()
                };

                if head_here && name == current_ref {
                    names.insert(0, format!("HEAD -> {label}"));
                } else {
                    names.push(label);
                }
            }

            if head_here && current_ref.is_head() {
                names.insert(0, "HEAD".to_string());
            }
        }

        if names.is_empty() {
            String::new()
        } else {
            format!(" ({})", names.join(", "))
        }
    }
}
