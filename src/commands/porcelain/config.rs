//! Inspect and edit configuration
//!
//! Operates on the per-repo file by default; `--global` targets
//! `~/.spgit/config`. Keys are dotted paths like `remote.origin.url`.

use crate::areas::config::Config;
use crate::areas::repository::Repository;
use crate::artifacts::core::EngineError;
use std::io::Write as _;
use std::path::PathBuf;

impl Repository {
    pub fn config_list(&mut self, global: bool) -> anyhow::Result<()> {
        let entries = if global {
            Config::load(&Self::global_config_path()?)?.list_entries()?
        } else {
            self.config().list_entries()?
        };

        for (key, value) in entries {
            writeln!(self.writer(), "{}={}", key, value)?;
        }

        Ok(())
    }

    pub fn config_get(&mut self, key: &str, global: bool) -> anyhow::Result<()> {
        let value = if global {
            Config::load(&Self::global_config_path()?)?.get_entry(key)?
        } else {
            self.config().get_entry(key)?
        };

        match value {
            Some(value) => {
                writeln!(self.writer(), "{}", value)?;
                Ok(())
            }
            None => Err(EngineError::user(format!("config key '{}' is not set", key))),
        }
    }

    pub fn config_set(&mut self, key: &str, value: &str, global: bool) -> anyhow::Result<()> {
        if global {
            let path = Self::global_config_path()?;
            let mut config = Config::load(&path)?;
            config.set_entry(key, value)?;
            config.save(&path)?;
        } else {
            self.config().set_entry(key, value)?;
            self.save_config()?;
        }

        Ok(())
    }

    pub fn config_unset(&mut self, key: &str, global: bool) -> anyhow::Result<()> {
        let removed = if global {
            let path = Self::global_config_path()?;
            let mut config = Config::load(&path)?;
            let removed = config.unset_entry(key)?;
            if removed {
                config.save(&path)?;
            }
            removed
        } else {
            let removed = self.config().unset_entry(key)?;
            if removed {
                self.save_config()?;
            }
            removed
        };

        if removed {
            Ok(())
        } else {
            Err(EngineError::user(format!("config key '{}' is not set", key)))
        }
    }

    fn global_config_path() -> anyhow::Result<PathBuf> {
        Config::global_path().ok_or_else(|| EngineError::user("cannot locate the home directory"))
    }
}
