//! Show a ref's log, newest first

use crate::areas::repository::Repository;
use crate::artifacts::branch::ref_name::RefName;
use crate::artifacts::core::EngineError;
use colored::Colorize;
use std::io::Write as _;

impl Repository {
    pub fn reflog_show(&mut self, reference: Option<&str>) -> anyhow::Result<()> {
        let spec = reference.unwrap_or("HEAD");

        // accept both full ref paths and branch short names
        let candidates = [
            RefName::new(spec.to_string()),
            RefName::new(format!("refs/heads/{spec}")),
        ];
        let name = candidates
            .iter()
            .find(|name| self.reflog().log_path(name).exists())
            .cloned()
            .ok_or_else(|| EngineError::user(format!("no reflog for '{}'", spec)))?;

        for (index, entry) in self
            .reflog()
            .read_newest_first(&name)?
            .iter()
            .enumerate()
        {
            writeln!(
                self.writer(),
                "{} {}@{{{}}}: {}: {}",
                entry.new.to_short_oid().yellow(),
                spec,
                index,
                entry.action,
                entry.message
            )?;
        }

        Ok(())
    }
}
