//! Fork a remote list
//!
//! Clones the source list, then creates a fresh list on the catalog,
//! repoints `origin` at it and publishes the snapshot there.

use crate::areas::catalog::{FileCatalog, RemoteList};
use crate::areas::repository::Repository;
use colored::Colorize;
use std::io::Write as _;

impl Repository {
    pub fn fork(&mut self, url: &str, name: &str) -> anyhow::Result<()> {
        self.clone_list(url)?;

        let catalog = FileCatalog::new();
        let new_list_id = catalog.create_list(name)?;

        {
            let mut config = self.config();
            config.remote.insert(
                "upstream".to_string(),
                crate::areas::config::RemoteConfig { url: url.to_string() },
            );
            config.remote.insert(
                "origin".to_string(),
                crate::areas::config::RemoteConfig {
                    url: new_list_id.clone(),
                },
            );
            config.playlist.id = Some(new_list_id.clone());
            config.playlist.name = Some(name.to_string());
        }
        self.save_config()?;

        self.push("origin")?;

        writeln!(
            self.writer(),
            "Forked {} into '{}' ({})",
            url,
            name.green(),
            new_list_id
        )?;
        Ok(())
    }
}
