//! Replay the current branch on top of another
//!
//! The commits reachable from HEAD but not from the upstream are replayed
//! oldest first. Any error rolls the branch back to the HEAD recorded before
//! the first step, so the reflog shows one movement out and one back.

use crate::areas::repository::Repository;
use crate::artifacts::branch::ref_name::RefName;
use crate::artifacts::branch::revision::Revision;
use crate::artifacts::core::EngineError;
use colored::Colorize;
use std::io::Write as _;

impl Repository {
    pub fn rebase(&mut self, upstream: &str) -> anyhow::Result<()> {
        let branch = self.require_current_branch()?;
        let head_oid = self
            .refs()
            .read_head()?
            .ok_or_else(|| EngineError::user("cannot rebase before the first commit"))?;

        let upstream_oid = Revision::try_parse(upstream)?.resolve_required(self)?;

        if self.history().is_ancestor(&head_oid, &upstream_oid)? {
            // nothing of ours to replay: adopt the upstream tip
            if head_oid != upstream_oid {
                self.update_ref_with_log(
                    &RefName::branch(&branch),
                    Some(&head_oid),
                    &upstream_oid,
                    &format!("rebase onto {}", upstream),
                    "fast-forward",
                )?;
                self.rebuild_index_from_head()?;
            }
            writeln!(self.writer(), "Fast-forwarded {} to {}", branch, upstream)?;
            return Ok(());
        }

        if self.history().merge_base(&head_oid, &upstream_oid)?.is_none() {
            return Err(EngineError::MergeImpossible(format!(
                "'{}' shares no history with '{}'",
                upstream, branch
            ))
            .into());
        }

        let chain = self.history().rev_list(&head_oid, &upstream_oid)?;

        writeln!(
            self.writer(),
            "Rebasing {} onto {} ({} commit{})",
            branch.to_string().green(),
            upstream.green(),
            chain.len(),
            if chain.len() == 1 { "" } else { "s" }
        )?;

        self.update_ref_with_log(
            &RefName::branch(&branch),
            Some(&head_oid),
            &upstream_oid,
            &format!("rebase onto {}", upstream),
            "checkout",
        )?;
        self.rebuild_index_from_head()?;

        for oid in &chain {
            if let Err(error) = self.apply_commit_onto_head(oid.as_ref()) {
                // roll back to where we started; the reflog explains both moves
                let current = self.refs().read_head()?;
                self.update_ref_with_log(
                    &RefName::branch(&branch),
                    current.as_ref(),
                    &head_oid,
                    "rebase (abort)",
                    &format!("returning to {}", head_oid.to_short_oid()),
                )?;
                self.rebuild_index_from_head()?;

                return Err(error.context(format!(
                    "rebase aborted while replaying {}",
                    oid.to_short_oid()
                )));
            }
        }

        writeln!(
            self.writer(),
            "Successfully rebased {} onto {}",
            branch.to_string().green(),
            upstream.green()
        )?;

        Ok(())
    }
}
