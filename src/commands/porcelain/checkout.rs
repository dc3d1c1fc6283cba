//! Switch branches or detach onto a commit
//!
//! A dirty index (staged but uncommitted changes) blocks the switch unless
//! forced; the index is rebuilt from the target's tree afterwards.

use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::branch::ref_name::RefName;
use crate::artifacts::branch::revision::Revision;
use crate::artifacts::core::EngineError;
use crate::artifacts::objects::object_id::ObjectId;
use colored::Colorize;
use std::io::Write as _;

impl Repository {
    pub fn checkout(&mut self, target: &str, create: bool, force: bool) -> anyhow::Result<()> {
        if create {
            self.branch_create(target, None)?;
        }

        let head_tree = self.head_tree()?;
        if !force && !self.index().diff_against(&head_tree).is_empty() {
            return Err(EngineError::user(
                "your staged changes would be lost by checkout; commit, stash, or force",
            ));
        }

        let from = self.describe_head()?;
        let old_head = self.refs().read_head()?;

        let branch = BranchName::try_parse(target.to_string()).ok();
        let branch_exists = branch
            .as_ref()
            .map(|branch| {
                self.refs()
                    .read(&RefName::branch(branch))
                    .map(|oid| oid.is_some())
            })
            .transpose()?
            .unwrap_or(false);

        let new_head = if let (Some(branch), true) = (branch, branch_exists) {
            self.refs().set_head_to_branch(&branch)?;
            self.refs().read_head()?
        } else {
            let oid = Revision::try_parse(target)?.resolve_required(self)?;
            if self.database().parse_commit(&oid)?.is_none() {
                return Err(EngineError::user(format!("'{}' is not a commit", target)));
            }
            self.refs().set_head_detached(&oid)?;
            Some(oid)
        };

        if let Some(new_oid) = &new_head {
            self.log_head_movement(&from, target, old_head, new_oid)?;

            let commit = self
                .database()
                .parse_commit(new_oid)?
                .ok_or_else(|| anyhow::anyhow!("HEAD object {} is not a commit", new_oid))?;
            let tree = self.tree_of(&commit)?;
            let mut index = self.index();
            index.reset_to_tree(&tree);
            index.write_updates()?;
        }

        writeln!(self.writer(), "Switched to '{}'", target.green())?;
        Ok(())
    }

    fn describe_head(&self) -> anyhow::Result<String> {
        Ok(match self.refs().current_branch()? {
            Some(branch) => branch.to_string(),
            None => self
                .refs()
                .read_head()?
                .map(|oid| oid.to_short_oid())
                .unwrap_or_else(|| "unborn".to_string()),
        })
    }

    fn log_head_movement(
        &self,
        from: &str,
        to: &str,
        old: Option<ObjectId>,
        new: &ObjectId,
    ) -> anyhow::Result<()> {
        let entry = crate::areas::reflog::ReflogEntry::new(
            old,
            new.clone(),
            self.config().author(),
            "checkout",
            format!("moving from {} to {}", from, to),
        );
        self.reflog().append(&RefName::head(), &entry)
    }
}
