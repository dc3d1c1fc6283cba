//! List, create and delete branches

use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::branch::ref_name::RefName;
use crate::artifacts::branch::revision::Revision;
use crate::artifacts::core::EngineError;
use colored::Colorize;
use std::io::Write as _;

impl Repository {
    pub fn branch_list(&mut self) -> anyhow::Result<()> {
        let current = self.refs().current_branch()?;

        for name in self.refs().list_branches()? {
            let Some(branch) = name.as_branch() else {
                continue;
            };

            if Some(&branch) == current.as_ref() {
                writeln!(self.writer(), "* {}", branch.to_string().green())?;
            } else {
                writeln!(self.writer(), "  {}", branch)?;
            }
        }

        Ok(())
    }

    /// Create a branch at a revision (default: HEAD)
    pub fn branch_create(&mut self, name: &str, start: Option<&str>) -> anyhow::Result<()> {
        let branch = BranchName::try_parse(name.to_string())
            .map_err(|err| EngineError::User(err.to_string()))?;
        let ref_name = RefName::branch(&branch);

        if self.refs().read(&ref_name)?.is_some() {
            return Err(EngineError::user(format!("branch '{}' already exists", branch)));
        }

        let start_oid = match start {
            Some(spec) => Revision::try_parse(spec)?.resolve_required(self)?,
            None => self
                .refs()
                .read_head()?
                .ok_or_else(|| EngineError::user("cannot branch before the first commit"))?,
        };

        if self.database().parse_commit(&start_oid)?.is_none() {
            return Err(EngineError::user(format!(
                "'{}' is not a commit",
                start_oid.to_short_oid()
            )));
        }

        self.update_ref_with_log(
            &ref_name,
            None,
            &start_oid,
            "branch",
            &format!("created from {}", start.unwrap_or("HEAD")),
        )?;

        writeln!(
            self.writer(),
            "Created branch '{}' at {}",
            branch.to_string().green(),
            start_oid.to_short_oid().yellow()
        )?;

        Ok(())
    }

    /// Delete a branch; unmerged branches need `force`
    pub fn branch_delete(&mut self, name: &str, force: bool) -> anyhow::Result<()> {
        let branch = BranchName::try_parse(name.to_string())
            .map_err(|err| EngineError::User(err.to_string()))?;
        let ref_name = RefName::branch(&branch);

        let target = self
            .refs()
            .read(&ref_name)?
            .ok_or_else(|| EngineError::user(format!("branch '{}' does not exist", branch)))?;

        if !force {
            if let Some(head) = self.refs().read_head()? {
                let merged = self.history().is_ancestor(&target, &head)?;
                if !merged {
                    return Err(EngineError::user(format!(
                        "branch '{}' is not fully merged; use force to delete it",
                        branch
                    )));
                }
            }
        }

        let deleted = self.refs().delete(&ref_name)?;
        writeln!(
            self.writer(),
            "Deleted branch '{}' (was {})",
            branch,
            deleted.to_short_oid().yellow()
        )?;

        Ok(())
    }
}
