//! Stash the staged snapshot
//!
//! A stash entry is an ordinary commit: tree = the staged snapshot, parent =
//! the HEAD it was saved on. `refs/stash` points at the top entry and the
//! stack order lives in its reflog, newest last on disk; `pop` and `drop`
//! rewrite that log and repoint (or delete) the ref. Application is a
//! three-way union merge of the stash tree onto the current HEAD tree,
//! landing in the index as staged changes.

use crate::areas::reflog::ReflogEntry;
use crate::areas::repository::Repository;
use crate::artifacts::branch::ref_name::RefName;
use crate::artifacts::core::EngineError;
use crate::artifacts::merge::MergeStrategy;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::Tree;
use colored::Colorize;
use std::io::Write as _;

impl Repository {
    pub fn stash_save(&mut self, message: Option<&str>) -> anyhow::Result<()> {
        let (head_oid, head_commit) = self
            .head_commit()?
            .ok_or_else(|| EngineError::user("cannot stash before the first commit"))?;

        let tree_oid = self.index().to_tree(self.database())?;
        if &tree_oid == head_commit.tree_oid() && !self.index().is_dirty() {
            writeln!(self.writer(), "No local changes to save")?;
            return Ok(());
        }

        let branch_display = self
            .refs()
            .current_branch()?
            .map(|branch| branch.to_string())
            .unwrap_or_else(|| "(detached)".to_string());
        let message = match message {
            Some(custom) => format!("On {}: {}", branch_display, custom),
            None => format!(
                "WIP on {}: {} {}",
                branch_display,
                head_oid.to_short_oid(),
                head_commit.short_message()
            ),
        };

        let author = self.config().author();
        let commit = crate::artifacts::objects::commit::Commit::new(
            vec![head_oid.clone()],
            tree_oid,
            author.clone(),
            message.clone(),
        );
        let stash_oid = self.database().store(&commit)?;

        let stash_ref = RefName::stash();
        let old_top = self.refs().read(&stash_ref)?;
        self.refs().update(&stash_ref, old_top.as_ref(), &stash_oid)?;
        self.reflog().append(
            &stash_ref,
            &ReflogEntry::new(old_top, stash_oid.clone(), author, "stash", message.as_str()),
        )?;

        // the index goes back to mirroring HEAD
        self.rebuild_index_from_head()?;

        writeln!(
            self.writer(),
            "Saved working state {} ({})",
            message,
            stash_oid.to_short_oid().yellow()
        )?;

        Ok(())
    }

    pub fn stash_list(&mut self) -> anyhow::Result<()> {
        let entries = self.reflog().read_newest_first(&RefName::stash())?;
        if entries.is_empty() {
            writeln!(self.writer(), "No stash entries")?;
            return Ok(());
        }

        for (index, entry) in entries.iter().enumerate() {
            writeln!(self.writer(), "stash@{{{}}}: {}", index, entry.message)?;
        }

        Ok(())
    }

    pub fn stash_apply(&mut self, selector: Option<&str>) -> anyhow::Result<()> {
        let index = Self::parse_selector(selector)?;
        let (stash_oid, _) = self.stash_entry(index)?;

        let stash_commit = self
            .database()
            .parse_commit(&stash_oid)?
            .ok_or_else(|| anyhow::anyhow!("stash entry {} is not a commit", stash_oid))?;
        let stash_tree = self.tree_of(&stash_commit)?;

        let head_tree = self.head_tree()?;
        let merged_uris = MergeStrategy::Union.combine(&head_tree.uris(), &stash_tree.uris());
        let merged_tree = Tree::from_ordered(merged_uris.iter().filter_map(|uri| {
            head_tree
                .entry(uri)
                .or_else(|| stash_tree.entry(uri))
                .cloned()
        }));

        // the merged result lands staged, so the index is dirty again
        let items = self.items_of(&merged_tree)?;
        {
            let mut staged = self.index();
            staged.stage_from(&items, self.database())?;
            staged.write_updates()?;
        }

        writeln!(self.writer(), "Applied stash@{{{}}}", index)?;
        Ok(())
    }

    pub fn stash_pop(&mut self, selector: Option<&str>) -> anyhow::Result<()> {
        let index = Self::parse_selector(selector)?;
        self.stash_apply(selector)?;
        self.stash_drop_quiet(index)?;
        writeln!(self.writer(), "Dropped stash@{{{}}}", index)?;
        Ok(())
    }

    pub fn stash_drop(&mut self, selector: Option<&str>) -> anyhow::Result<()> {
        let index = Self::parse_selector(selector)?;
        self.stash_drop_quiet(index)?;
        writeln!(self.writer(), "Dropped stash@{{{}}}", index)?;
        Ok(())
    }

    /// Remove entry `index` from the stack, repointing or deleting the ref
    fn stash_drop_quiet(&mut self, index: usize) -> anyhow::Result<()> {
        let stash_ref = RefName::stash();
        let mut newest_first = self.reflog().read_newest_first(&stash_ref)?;

        if index >= newest_first.len() {
            return Err(EngineError::user(format!("stash entry {} not found", index)));
        }
        newest_first.remove(index);

        let new_top = newest_first.first().map(|entry| entry.new.clone());

        // oldest-first on disk
        let mut oldest_first = newest_first;
        oldest_first.reverse();
        self.reflog().rewrite(&stash_ref, &oldest_first)?;

        match new_top {
            Some(oid) => self.refs().update(&stash_ref, None, &oid)?,
            None => {
                let path = self.refs().ref_path(&stash_ref);
                if path.exists() {
                    std::fs::remove_file(path)?;
                }
            }
        }

        Ok(())
    }

    /// The stash commit at stack position `index` (0 = newest)
    fn stash_entry(&self, index: usize) -> anyhow::Result<(ObjectId, String)> {
        let entries = self.reflog().read_newest_first(&RefName::stash())?;
        entries
            .get(index)
            .map(|entry| (entry.new.clone(), entry.message.clone()))
            .ok_or_else(|| EngineError::user(format!("stash entry {} not found", index)))
    }

    /// `stash@{2}` → 2; missing selector → 0
    fn parse_selector(selector: Option<&str>) -> anyhow::Result<usize> {
        match selector {
            None => Ok(0),
            Some(spec) => {
                let inner = spec
                    .strip_prefix("stash@{")
                    .and_then(|rest| rest.strip_suffix('}'))
                    .unwrap_or(spec);
                inner
                    .parse::<usize>()
                    .map_err(|_| EngineError::user(format!("invalid stash selector: '{}'", spec)))
            }
        }
    }
}
