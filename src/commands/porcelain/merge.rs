//! Merge a branch into the current one
//!
//! Order of checks: already-up-to-date (incoming is an ancestor of HEAD),
//! fast-forward (HEAD is the merge base), then a strategy merge producing a
//! two-parent commit. Strategies are total, so no conflict state exists.

use crate::areas::repository::Repository;
use crate::artifacts::branch::ref_name::RefName;
use crate::artifacts::branch::revision::Revision;
use crate::artifacts::core::EngineError;
use crate::artifacts::merge::MergeStrategy;
use crate::artifacts::objects::tree::Tree;
use colored::Colorize;
use std::io::Write as _;

impl Repository {
    pub fn merge(
        &mut self,
        target: &str,
        strategy: MergeStrategy,
        message: Option<&str>,
    ) -> anyhow::Result<()> {
        let current_branch = self.require_current_branch()?;
        let head_oid = self
            .refs()
            .read_head()?
            .ok_or_else(|| EngineError::user("cannot merge before the first commit"))?;

        let incoming_oid = Revision::try_parse(target)?.resolve_required(self)?;

        if self.history().is_ancestor(&incoming_oid, &head_oid)? {
            writeln!(self.writer(), "Already up to date.")?;
            return Ok(());
        }

        let base_oid = self.history().merge_base(&head_oid, &incoming_oid)?;

        // fast-forward: HEAD is the base, the incoming side strictly ahead
        if base_oid.as_ref() == Some(&head_oid) {
            writeln!(
                self.writer(),
                "Updating {}..{}",
                head_oid.to_short_oid(),
                incoming_oid.to_short_oid()
            )?;
            writeln!(self.writer(), "Fast-forward")?;

            self.update_ref_with_log(
                &RefName::branch(&current_branch),
                Some(&head_oid),
                &incoming_oid,
                &format!("merge {}", target),
                "fast-forward",
            )?;

            self.rebuild_index_from_head()?;
            writeln!(
                self.writer(),
                "Merged {} into {}",
                target.green(),
                current_branch.to_string().green()
            )?;
            return Ok(());
        }

        let current_tree = self.head_tree()?;
        let incoming_commit = self
            .database()
            .parse_commit(&incoming_oid)?
            .ok_or_else(|| EngineError::user(format!("'{}' is not a commit", target)))?;
        let incoming_tree = self.tree_of(&incoming_commit)?;

        let merged_uris = strategy.combine(&current_tree.uris(), &incoming_tree.uris());
        let merged_tree = Tree::from_ordered(merged_uris.iter().filter_map(|uri| {
            current_tree
                .entry(uri)
                .or_else(|| incoming_tree.entry(uri))
                .cloned()
        }));

        let tree_oid = self.database().store(&merged_tree)?;
        let message = message
            .map(str::to_string)
            .unwrap_or_else(|| format!("Merge branch '{}'", target));

        writeln!(
            self.writer(),
            "Merge made by the '{}' strategy.",
            strategy.as_str()
        )?;

        self.write_commit_on_current(
            vec![head_oid, incoming_oid],
            tree_oid,
            message,
            &format!("merge {}", target),
            &format!("Merge made by the '{}' strategy.", strategy.as_str()),
        )?;

        self.rebuild_index_from_head()?;
        writeln!(
            self.writer(),
            "Merged {} into {}",
            target.green(),
            current_branch.to_string().green()
        )?;

        Ok(())
    }

    pub(crate) fn rebuild_index_from_head(&self) -> anyhow::Result<()> {
        let tree = self.head_tree()?;
        let mut index = self.index();
        index.reset_to_tree(&tree);
        index.write_updates()
    }
}
