//! Record the staged snapshot as a commit

use crate::areas::repository::Repository;
use crate::artifacts::core::EngineError;
use colored::Colorize;
use std::io::Write as _;

impl Repository {
    pub fn commit(&mut self, message: &str) -> anyhow::Result<()> {
        if message.trim().is_empty() {
            return Err(EngineError::user("empty commit message"));
        }

        let head = self.head_commit()?;
        let tree_oid = self.index().to_tree(self.database())?;

        if let Some((_, ref head_commit)) = head {
            if head_commit.tree_oid() == &tree_oid {
                return Err(EngineError::user("nothing to commit"));
            }
        } else if self.index().is_empty() {
            return Err(EngineError::user("nothing to commit"));
        }

        let parents = head.map(|(oid, _)| vec![oid]).unwrap_or_default();
        let subject = message.lines().next().unwrap_or(message).to_string();
        let action = if parents.is_empty() {
            "commit (initial)"
        } else {
            "commit"
        };

        let oid = self.write_commit_on_current(
            parents,
            tree_oid,
            message.to_string(),
            action,
            &subject,
        )?;

        // the index now mirrors HEAD
        {
            let tree = self.head_tree()?;
            let mut index = self.index();
            index.reset_to_tree(&tree);
            index.write_updates()?;
        }

        let item_count = self.head_tree()?.len();
        let branch_display = self
            .refs()
            .current_branch()?
            .map(|branch| branch.to_string())
            .unwrap_or_else(|| "detached HEAD".to_string());

        writeln!(
            self.writer(),
            "[{} {}] {}",
            branch_display.green(),
            oid.to_short_oid().yellow(),
            subject
        )?;
        writeln!(
            self.writer(),
            "{} item{}",
            item_count,
            if item_count == 1 { "" } else { "s" }
        )?;

        Ok(())
    }
}
