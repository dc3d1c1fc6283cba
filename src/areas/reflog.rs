//! Reflogs
//!
//! Every ref movement appends one line to `logs/<ref-path>`:
//!
//! ```text
//! <old> <new> <name> <<email>> <unix-ts> <tz>\t<action>: <message>
//! ```
//!
//! The old digest is all zeros when the ref did not exist yet. `logs/HEAD`
//! receives an entry on every HEAD movement regardless of which branch HEAD
//! points at. Files are append-only, read newest-first; the single exception
//! is the stash ref, whose log doubles as the stash stack and is rewritten
//! when entries are popped or dropped.

use crate::artifacts::branch::ref_name::RefName;
use crate::artifacts::objects::commit::Author;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use derive_new::new;
use rand;
use std::io::Write;
use std::path::{Path, PathBuf};

/// One reflog line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflogEntry {
    pub old: ObjectId,
    pub new: ObjectId,
    pub actor: Author,
    pub action: String,
    pub message: String,
}

impl ReflogEntry {
    pub fn new(
        old: Option<ObjectId>,
        new: ObjectId,
        actor: Author,
        action: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ReflogEntry {
            old: old.unwrap_or_else(ObjectId::zero),
            new,
            actor,
            action: action.into(),
            message: message.into(),
        }
    }

    fn to_line(&self) -> String {
        format!(
            "{} {} {}\t{}: {}\n",
            self.old,
            self.new,
            self.actor.display(),
            self.action,
            self.message
        )
    }

    fn try_parse(line: &str) -> anyhow::Result<Self> {
        let (left, right) = line
            .split_once('\t')
            .with_context(|| format!("malformed reflog line: {:?}", line))?;

        let mut fields = left.splitn(3, ' ');
        let old = ObjectId::try_parse(
            fields
                .next()
                .context("reflog line is missing the old digest")?
                .to_string(),
        )?;
        let new = ObjectId::try_parse(
            fields
                .next()
                .context("reflog line is missing the new digest")?
                .to_string(),
        )?;
        let actor = Author::try_from(fields.next().context("reflog line is missing the actor")?)?;

        let (action, message) = right
            .split_once(": ")
            .map(|(action, message)| (action.to_string(), message.to_string()))
            .unwrap_or_else(|| (right.to_string(), String::new()));

        Ok(ReflogEntry {
            old,
            new,
            actor,
            action,
            message,
        })
    }
}

/// Reflog storage rooted at the `logs/` directory
#[derive(Debug, new)]
pub struct Reflog {
    path: Box<Path>,
}

impl Reflog {
    pub fn log_path(&self, name: &RefName) -> PathBuf {
        self.path.join(name.to_path())
    }

    /// Append one entry to a ref's log
    pub fn append(&self, name: &RefName, entry: &ReflogEntry) -> anyhow::Result<()> {
        let path = self.log_path(name);
        std::fs::create_dir_all(
            path.parent()
                .with_context(|| format!("log file {:?} has no parent directory", path))?,
        )?;

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("failed to open reflog at {:?}", path))?;
        file.write_all(entry.to_line().as_bytes())
            .with_context(|| format!("failed to append to reflog at {:?}", path))?;

        Ok(())
    }

    /// Entries in file order, oldest first
    pub fn read(&self, name: &RefName) -> anyhow::Result<Vec<ReflogEntry>> {
        let path = self.log_path(name);
        if !path.exists() {
            return Ok(Vec::new());
        }

        std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read reflog at {:?}", path))?
            .lines()
            .filter(|line| !line.is_empty())
            .map(ReflogEntry::try_parse)
            .collect()
    }

    /// Entries newest first, the order shown to the user
    pub fn read_newest_first(&self, name: &RefName) -> anyhow::Result<Vec<ReflogEntry>> {
        let mut entries = self.read(name)?;
        entries.reverse();
        Ok(entries)
    }

    /// Replace a log wholesale (stash stack maintenance)
    ///
    /// An empty entry list removes the file.
    pub fn rewrite(&self, name: &RefName, entries: &[ReflogEntry]) -> anyhow::Result<()> {
        let path = self.log_path(name);

        if entries.is_empty() {
            if path.exists() {
                std::fs::remove_file(&path)
                    .with_context(|| format!("failed to remove reflog at {:?}", path))?;
            }
            return Ok(());
        }

        let parent = path
            .parent()
            .with_context(|| format!("log file {:?} has no parent directory", path))?;
        std::fs::create_dir_all(parent)?;

        let content: String = entries.iter().map(ReflogEntry::to_line).collect();
        let temp_path = parent.join(format!("tmp-log-{}", rand::random::<u32>()));
        std::fs::write(&temp_path, content)
            .with_context(|| format!("failed to write reflog at {:?}", temp_path))?;
        std::fs::rename(&temp_path, &path)
            .with_context(|| format!("failed to move reflog into place at {:?}", path))?;

        Ok(())
    }
}
