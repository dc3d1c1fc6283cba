//! Clone a remote list into a fresh repository
//!
//! Resolves the url, initializes the repository, binds `origin` and
//! `playlist.id`, and pulls the initial snapshot as the root commit.

use crate::areas::catalog::{FileCatalog, RemoteList};
use crate::areas::repository::Repository;

impl Repository {
    pub fn clone_list(&mut self, url: &str) -> anyhow::Result<()> {
        let catalog = FileCatalog::new();
        let list_id = catalog.resolve_url(url)?;

        let name = self
            .path()
            .file_name()
            .map(|name| name.to_string_lossy().to_string());
        self.init(name.as_deref())?;

        {
            let mut config = self.config();
            config.remote.insert(
                "origin".to_string(),
                crate::areas::config::RemoteConfig { url: url.to_string() },
            );
            config.playlist.id = Some(list_id);
        }
        self.save_config()?;

        self.pull("origin")
    }
}
