//! Manage remotes

use crate::areas::repository::Repository;
use crate::artifacts::core::EngineError;
use std::io::Write as _;

impl Repository {
    pub fn remote_list(&mut self, verbose: bool) -> anyhow::Result<()> {
        let remotes: Vec<(String, String)> = self
            .config()
            .remote
            .iter()
            .map(|(name, remote)| (name.clone(), remote.url.clone()))
            .collect();

        for (name, url) in remotes {
            if verbose {
                writeln!(self.writer(), "{}\t{}", name, url)?;
            } else {
                writeln!(self.writer(), "{}", name)?;
            }
        }

        Ok(())
    }

    pub fn remote_add(&mut self, name: &str, url: &str) -> anyhow::Result<()> {
        {
            let mut config = self.config();
            if config.remote.contains_key(name) {
                return Err(EngineError::user(format!("remote '{}' already exists", name)));
            }
            config.remote.insert(
                name.to_string(),
                crate::areas::config::RemoteConfig { url: url.to_string() },
            );
        }
        self.save_config()?;

        writeln!(self.writer(), "Added remote '{}'", name)?;
        Ok(())
    }

    pub fn remote_remove(&mut self, name: &str) -> anyhow::Result<()> {
        {
            let mut config = self.config();
            if config.remote.remove(name).is_none() {
                return Err(EngineError::user(format!("remote '{}' does not exist", name)));
            }
        }
        self.save_config()?;

        writeln!(self.writer(), "Removed remote '{}'", name)?;
        Ok(())
    }
}
