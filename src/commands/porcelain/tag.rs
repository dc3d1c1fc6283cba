//! Create, list and delete tags
//!
//! Without a message the tag is lightweight: a plain ref to the commit.
//! With one, an annotated tag object is stored and the ref points at it.

use crate::areas::repository::Repository;
use crate::artifacts::branch::ref_name::RefName;
use crate::artifacts::branch::revision::Revision;
use crate::artifacts::core::EngineError;
use crate::artifacts::objects::tag::Tag;
use colored::Colorize;
use std::io::Write as _;

impl Repository {
    pub fn tag_list(&mut self) -> anyhow::Result<()> {
        let tags = self.refs().list_tags()?;
        if tags.is_empty() {
            writeln!(self.writer(), "No tags")?;
            return Ok(());
        }

        for tag in tags {
            writeln!(self.writer(), "{}", tag.short_name())?;
        }

        Ok(())
    }

    pub fn tag_create(
        &mut self,
        name: &str,
        revision: Option<&str>,
        message: Option<&str>,
    ) -> anyhow::Result<()> {
        let ref_name = RefName::tag(name);
        if self.refs().read(&ref_name)?.is_some() {
            return Err(EngineError::user(format!("tag '{}' already exists", name)));
        }

        let target = match revision {
            Some(spec) => Revision::try_parse(spec)?.resolve_required(self)?,
            None => self
                .refs()
                .read_head()?
                .ok_or_else(|| EngineError::user("cannot tag before the first commit"))?,
        };

        let ref_target = match message {
            Some(message) => {
                let target_kind = self.database().kind_of(&target)?;
                let tag = Tag::new(
                    target.clone(),
                    target_kind,
                    name.to_string(),
                    self.config().author(),
                    message.to_string(),
                );
                self.database().store(&tag)?
            }
            None => target.clone(),
        };

        self.update_ref_with_log(
            &ref_name,
            None,
            &ref_target,
            "tag",
            &format!("tagging {}", target.to_short_oid()),
        )?;

        writeln!(
            self.writer(),
            "Created tag '{}' at {}",
            name.green(),
            target.to_short_oid().yellow()
        )?;

        Ok(())
    }

    pub fn tag_delete(&mut self, name: &str) -> anyhow::Result<()> {
        let deleted = self.refs().delete(&RefName::tag(name))?;
        writeln!(
            self.writer(),
            "Deleted tag '{}' (was {})",
            name,
            deleted.to_short_oid().yellow()
        )?;
        Ok(())
    }
}
