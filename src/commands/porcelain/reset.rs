//! Move the current branch to another commit

use crate::areas::repository::Repository;
use crate::artifacts::branch::ref_name::RefName;
use crate::artifacts::branch::revision::Revision;
use crate::artifacts::core::EngineError;
use colored::Colorize;
use std::io::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResetMode {
    /// Move the ref only
    Soft,
    /// Move the ref and rebuild the index from the target
    #[default]
    Mixed,
    /// Like mixed; the next push overwrites the remote list
    Hard,
}

impl Repository {
    pub fn reset(&mut self, mode: ResetMode, revision: &str) -> anyhow::Result<()> {
        let branch = self.require_current_branch()?;
        let old_head = self
            .refs()
            .read_head()?
            .ok_or_else(|| EngineError::user("cannot reset before the first commit"))?;

        let target = Revision::try_parse(revision)?.resolve_required(self)?;
        let commit = self
            .database()
            .parse_commit(&target)?
            .ok_or_else(|| EngineError::user(format!("'{}' is not a commit", revision)))?;

        self.update_ref_with_log(
            &RefName::branch(&branch),
            Some(&old_head),
            &target,
            "reset",
            &format!("moving to {}", revision),
        )?;

        if matches!(mode, ResetMode::Mixed | ResetMode::Hard) {
            let tree = self.tree_of(&commit)?;
            let mut index = self.index();
            index.reset_to_tree(&tree);
            index.write_updates()?;
        }

        writeln!(
            self.writer(),
            "HEAD is now at {} {}",
            target.to_short_oid().yellow(),
            commit.short_message()
        )?;

        Ok(())
    }
}
