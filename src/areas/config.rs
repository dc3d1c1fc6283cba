//! Configuration
//!
//! Config is an explicit value loaded when the repository opens and threaded
//! through the `Repository` handle, never ambient state. Two JSON files feed
//! it: the global `~/.spgit/config` (identity defaults) and the per-repo
//! `.spgit/config` (playlist binding, remotes, branch tracking), with the
//! per-repo file winning.
//!
//! ```json
//! {
//!   "core": { "repositoryformatversion": 0 },
//!   "playlist": { "name": "road trip", "id": "..." },
//!   "user": { "name": "...", "email": "..." },
//!   "remote": { "origin": { "url": "..." } },
//!   "branch": { "main": { "remote": "origin" } }
//! }
//! ```

use crate::artifacts::core::EngineError;
use crate::artifacts::objects::commit::Author;
use anyhow::Context;
use rand;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const DEFAULT_AUTHOR_NAME: &str = "spgit";
const DEFAULT_AUTHOR_EMAIL: &str = "spgit@localhost";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct CoreConfig {
    #[serde(default)]
    pub repositoryformatversion: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct PlaylistConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct UserConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct RemoteConfig {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct BranchConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub core: CoreConfig,
    #[serde(default)]
    pub playlist: PlaylistConfig,
    #[serde(default)]
    pub user: UserConfig,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub remote: BTreeMap<String, RemoteConfig>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub branch: BTreeMap<String, BranchConfig>,
}

impl Config {
    /// Load a config file; a missing file is an empty config
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {:?}", path))?;
        serde_json::from_str(&content).with_context(|| format!("invalid config at {:?}", path))
    }

    /// Load the per-repo config with global identity defaults folded in
    pub fn load_with_global(repo_config: &Path) -> anyhow::Result<Self> {
        let mut config = Config::load(repo_config)?;

        if let Some(global_path) = Self::global_path() {
            let global = Config::load(&global_path)?;
            if config.user.name.is_none() {
                config.user.name = global.user.name;
            }
            if config.user.email.is_none() {
                config.user.email = global.user.email;
            }
        }

        Ok(config)
    }

    /// `~/.spgit/config`
    pub fn global_path() -> Option<PathBuf> {
        std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".spgit").join("config"))
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let parent = path
            .parent()
            .with_context(|| format!("config file {:?} has no parent directory", path))?;
        std::fs::create_dir_all(parent)?;

        let content = serde_json::to_string_pretty(self).context("unable to encode config")?;
        let temp_path = parent.join(format!("tmp-config-{}", rand::random::<u32>()));
        std::fs::write(&temp_path, content)
            .with_context(|| format!("failed to write config at {:?}", temp_path))?;
        std::fs::rename(&temp_path, path)
            .with_context(|| format!("failed to move config into place at {:?}", path))?;

        Ok(())
    }

    pub fn remote_url(&self, remote: &str) -> Option<&str> {
        self.remote.get(remote).map(|config| config.url.as_str())
    }

    /// The identity used for commits and reflog entries
    ///
    /// Environment overrides win over config; missing pieces fall back to
    /// the built-in identity. `SPGIT_AUTHOR_DATE` (RFC 3339) pins the
    /// timestamp, which keeps test runs reproducible.
    pub fn author(&self) -> Author {
        let name = std::env::var("SPGIT_AUTHOR_NAME")
            .ok()
            .or_else(|| self.user.name.clone())
            .unwrap_or_else(|| DEFAULT_AUTHOR_NAME.to_string());
        let email = std::env::var("SPGIT_AUTHOR_EMAIL")
            .ok()
            .or_else(|| self.user.email.clone())
            .unwrap_or_else(|| DEFAULT_AUTHOR_EMAIL.to_string());

        let timestamp = std::env::var("SPGIT_AUTHOR_DATE")
            .ok()
            .and_then(|date| chrono::DateTime::parse_from_rfc3339(&date).ok());

        match timestamp {
            Some(timestamp) => Author::new_with_timestamp(name, email, timestamp),
            None => Author::new(name, email),
        }
    }

    /// Read a dotted key such as `remote.origin.url`
    pub fn get_entry(&self, key: &str) -> anyhow::Result<Option<String>> {
        let value = serde_json::to_value(self)?;
        let mut current = &value;

        for part in key.split('.') {
            match current.get(part) {
                Some(next) => current = next,
                None => return Ok(None),
            }
        }

        Ok(Some(match current {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }))
    }

    /// Set a dotted key, creating intermediate sections
    pub fn set_entry(&mut self, key: &str, new_value: &str) -> anyhow::Result<()> {
        let mut value = serde_json::to_value(&*self)?;

        let parts: Vec<&str> = key.split('.').collect();
        if parts.iter().any(|part| part.is_empty()) {
            return Err(EngineError::user(format!("invalid config key: {:?}", key)));
        }

        let mut current = &mut value;
        for part in &parts[..parts.len() - 1] {
            let object = current
                .as_object_mut()
                .ok_or_else(|| EngineError::User(format!("invalid config key: {:?}", key)))?;
            current = object
                .entry(part.to_string())
                .or_insert_with(|| serde_json::Value::Object(Default::default()));
        }

        let leaf = parts[parts.len() - 1];
        let parsed: serde_json::Value = serde_json::from_str(new_value)
            .unwrap_or_else(|_| serde_json::Value::String(new_value.to_string()));
        current
            .as_object_mut()
            .ok_or_else(|| EngineError::User(format!("invalid config key: {:?}", key)))?
            .insert(leaf.to_string(), parsed);

        *self = serde_json::from_value(value)
            .map_err(|source| EngineError::User(format!("invalid config value: {}", source)))?;
        Ok(())
    }

    /// Remove a dotted key; reports whether it existed
    pub fn unset_entry(&mut self, key: &str) -> anyhow::Result<bool> {
        let mut value = serde_json::to_value(&*self)?;

        let parts: Vec<&str> = key.split('.').collect();
        let mut current = &mut value;
        for part in &parts[..parts.len() - 1] {
            match current.get_mut(*part) {
                Some(next) => current = next,
                None => return Ok(false),
            }
        }

        let removed = current
            .as_object_mut()
            .map(|object| object.remove(parts[parts.len() - 1]).is_some())
            .unwrap_or(false);

        if removed {
            *self = serde_json::from_value(value)?;
        }
        Ok(removed)
    }

    /// Flattened `key=value` listing, for `config --list`
    pub fn list_entries(&self) -> anyhow::Result<Vec<(String, String)>> {
        fn walk(prefix: &str, value: &serde_json::Value, out: &mut Vec<(String, String)>) {
            match value {
                serde_json::Value::Object(object) => {
                    for (key, child) in object {
                        let nested = if prefix.is_empty() {
                            key.clone()
                        } else {
                            format!("{prefix}.{key}")
                        };
                        walk(&nested, child, out);
                    }
                }
                serde_json::Value::String(s) => out.push((prefix.to_string(), s.clone())),
                other => out.push((prefix.to_string(), other.to_string())),
            }
        }

        let mut entries = Vec::new();
        walk("", &serde_json::to_value(self)?, &mut entries);
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_loads_as_default() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(&dir.path().join("config")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn save_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config");

        let mut config = Config::default();
        config.playlist.name = Some("road trip".into());
        config.remote.insert(
            "origin".into(),
            RemoteConfig {
                url: "file:///tmp/list.json".into(),
            },
        );
        config.save(&path).unwrap();

        let reloaded = Config::load(&path).unwrap();
        assert_eq!(reloaded, config);
        assert_eq!(reloaded.remote_url("origin"), Some("file:///tmp/list.json"));
    }

    #[test]
    fn dotted_get_set_unset() {
        let mut config = Config::default();

        config.set_entry("remote.origin.url", "file:list.json").unwrap();
        assert_eq!(
            config.get_entry("remote.origin.url").unwrap(),
            Some("file:list.json".to_string())
        );
        assert_eq!(config.remote_url("origin"), Some("file:list.json"));

        config.set_entry("user.name", "Ada").unwrap();
        assert_eq!(config.user.name.as_deref(), Some("Ada"));

        assert!(config.unset_entry("user.name").unwrap());
        assert!(config.user.name.is_none());
        assert!(!config.unset_entry("user.name").unwrap());
    }

    #[test]
    fn listing_flattens_sections() {
        let mut config = Config::default();
        config.set_entry("playlist.name", "mix").unwrap();

        let entries = config.list_entries().unwrap();
        assert!(entries.contains(&("playlist.name".to_string(), "mix".to_string())));
        assert!(entries.contains(&("core.repositoryformatversion".to_string(), "0".to_string())));
    }

    #[test]
    fn author_falls_back_to_the_builtin_identity() {
        // Scoped to names no other test sets
        std::env::remove_var("SPGIT_AUTHOR_NAME");
        std::env::remove_var("SPGIT_AUTHOR_EMAIL");

        let config = Config::default();
        let author = config.author();
        assert_eq!(author.display_name(), "spgit <spgit@localhost>");
    }
}
