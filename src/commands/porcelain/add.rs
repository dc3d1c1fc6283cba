//! Stage items
//!
//! `add .` reconciles the index with the current remote snapshot; explicit
//! identifiers stage selectively: present in the snapshot means staged,
//! absent means removed from the index.

use crate::areas::catalog::{FileCatalog, RemoteList};
use crate::areas::repository::Repository;
use colored::Colorize;
use std::io::Write as _;

impl Repository {
    pub fn add(&mut self, specs: &[String]) -> anyhow::Result<()> {
        let list_id = self.working_list_id()?;
        let snapshot = FileCatalog::new().fetch_items(&list_id)?;

        let reconcile_all = specs.is_empty() || specs.iter().any(|spec| spec == ".");

        let before = self.index().uris();

        if reconcile_all {
            let mut index = self.index();
            index.stage_from(&snapshot, self.database())?;
            index.write_updates()?;
        } else {
            let mut index = self.index();
            index.stage_selected(specs, &snapshot, self.database())?;
            index.write_updates()?;
        }

        let after = self.index().uris();
        self.report_staging_changes(&before, &after, &snapshot)?;

        Ok(())
    }

    fn report_staging_changes(
        &self,
        before: &[String],
        after: &[String],
        snapshot: &[crate::artifacts::objects::blob::Item],
    ) -> anyhow::Result<()> {
        let added: Vec<&String> = after.iter().filter(|uri| !before.contains(uri)).collect();
        let removed: Vec<&String> = before.iter().filter(|uri| !after.contains(uri)).collect();

        if added.is_empty() && removed.is_empty() {
            writeln!(self.writer(), "No changes ({} items staged)", after.len())?;
            return Ok(());
        }

        let display = |uri: &str| {
            snapshot
                .iter()
                .find(|item| item.uri == uri)
                .map(|item| item.display_line())
                .unwrap_or_else(|| uri.to_string())
        };

        if !added.is_empty() {
            writeln!(self.writer(), "Added {} item(s)", added.len())?;
            for uri in &added {
                writeln!(self.writer(), "  {} {}", "+".green(), display(uri))?;
            }
        }
        if !removed.is_empty() {
            writeln!(self.writer(), "Removed {} item(s)", removed.len())?;
            for uri in &removed {
                writeln!(self.writer(), "  {} {}", "-".red(), display(uri))?;
            }
        }

        Ok(())
    }
}
