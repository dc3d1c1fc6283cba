//! Initialize a repository
//!
//! Creates the `.spgit` skeleton with `HEAD` pointing at the unborn `main`
//! branch: `refs/heads/main` itself only appears with the first commit.

use crate::areas::repository::Repository;
use crate::artifacts::core::EngineError;
use anyhow::Context;
use std::io::Write as _;

impl Repository {
    pub fn init(&mut self, playlist_name: Option<&str>) -> anyhow::Result<()> {
        let spgit_dir = self.spgit_dir();
        if spgit_dir.exists() {
            return Err(EngineError::user(format!(
                "repository already exists at {}",
                self.path().display()
            )));
        }

        for dir in [
            "objects",
            "refs/heads",
            "refs/tags",
            "refs/remotes",
            "logs/refs/heads",
        ] {
            std::fs::create_dir_all(spgit_dir.join(dir))
                .with_context(|| format!("failed to create {}", spgit_dir.join(dir).display()))?;
        }

        std::fs::write(spgit_dir.join("HEAD"), "ref: refs/heads/main\n")
            .context("failed to write HEAD")?;

        {
            let mut config = self.config();
            config.playlist.name = Some(
                playlist_name
                    .map(str::to_string)
                    .unwrap_or_else(|| {
                        self.path()
                            .file_name()
                            .map(|name| name.to_string_lossy().to_string())
                            .unwrap_or_else(|| "playlist".to_string())
                    }),
            );
        }
        self.save_config()?;

        self.index().write_updates()?;

        writeln!(
            self.writer(),
            "Initialized empty spgit repository in {}",
            spgit_dir.display()
        )?;

        Ok(())
    }
}
