//! Revision specifications
//!
//! A revision names a commit: `HEAD` (or its alias `@`), a branch, a tag, a
//! remote-tracking ref, a full 40-hex object id, an unambiguous id prefix, or
//! any of those followed by ancestor notation `~<n>` (first-parent steps).
//!
//! Refs win over object ids when a name could be both; tags pointing at
//! annotated tag objects are peeled to the tagged commit.

use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::branch::ref_name::RefName;
use crate::artifacts::branch::ANCESTOR_REGEX;
use crate::artifacts::core::EngineError;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_kind::ObjectKind;
use crate::artifacts::objects::OBJECT_ID_LENGTH;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revision {
    /// The current HEAD
    Head,
    /// A branch, tag, remote-tracking ref, or object id
    Ref(String),
    /// The Nth first-parent ancestor of a revision (e.g. `HEAD~3`)
    Ancestor(Box<Revision>, usize),
}

impl Revision {
    pub fn try_parse(spec: &str) -> anyhow::Result<Self> {
        if spec.is_empty() {
            return Err(EngineError::user("empty revision"));
        }

        if let Some(captures) = regex::Regex::new(ANCESTOR_REGEX)?.captures(spec) {
            let base = Self::try_parse(&captures[1])?;
            let generations = captures[2].parse::<usize>().unwrap_or(1);
            return Ok(Revision::Ancestor(Box::new(base), generations));
        }

        match spec {
            "HEAD" | "@" => Ok(Revision::Head),
            other => Ok(Revision::Ref(other.to_string())),
        }
    }

    pub fn resolve(&self, repository: &Repository) -> anyhow::Result<Option<ObjectId>> {
        match self {
            Revision::Head => repository.refs().read_head(),
            Revision::Ref(name) => Self::resolve_name(name, repository),
            Revision::Ancestor(base, generations) => {
                let mut oid = base.resolve(repository)?;
                for _ in 0..*generations {
                    oid = Self::first_parent(oid, repository)?;
                }
                Ok(oid)
            }
        }
    }

    /// Resolve and fail with a user error when nothing matches
    pub fn resolve_required(&self, repository: &Repository) -> anyhow::Result<ObjectId> {
        self.resolve(repository)?
            .ok_or_else(|| EngineError::user(format!("unknown revision: '{}'", self)))
    }

    fn resolve_name(name: &str, repository: &Repository) -> anyhow::Result<Option<ObjectId>> {
        let candidates = Self::candidate_refs(name);
        for candidate in &candidates {
            if let Some(oid) = repository.refs().read(candidate)? {
                return Ok(Some(Self::peel(oid, repository)?));
            }
        }

        if Self::looks_like_oid(name) {
            return Self::resolve_oid(name, repository);
        }

        Ok(None)
    }

    fn candidate_refs(name: &str) -> Vec<RefName> {
        let mut candidates = Vec::new();
        if let Ok(branch) = BranchName::try_parse(name.to_string()) {
            candidates.push(RefName::branch(&branch));
            candidates.push(RefName::tag(name));
            candidates.push(RefName::new(format!("refs/remotes/{name}")));
        }
        candidates
    }

    /// Follow an annotated tag down to the object it names
    fn peel(oid: ObjectId, repository: &Repository) -> anyhow::Result<ObjectId> {
        let mut current = oid;
        while repository.database().kind_of(&current)? == ObjectKind::Tag {
            let tag = repository
                .database()
                .parse_tag(&current)?
                .ok_or_else(|| anyhow::anyhow!("object {} vanished while peeling", current))?;
            current = tag.object().clone();
        }
        Ok(current)
    }

    fn first_parent(
        oid: Option<ObjectId>,
        repository: &Repository,
    ) -> anyhow::Result<Option<ObjectId>> {
        match oid {
            Some(oid) => {
                let commit = repository
                    .database()
                    .parse_commit(&oid)?
                    .ok_or_else(|| anyhow::anyhow!("object {} is not a commit", oid))?;
                Ok(commit.parent().cloned())
            }
            None => Ok(None),
        }
    }

    fn looks_like_oid(name: &str) -> bool {
        name.len() >= 4
            && name.len() <= OBJECT_ID_LENGTH
            && name.chars().all(|c| c.is_ascii_hexdigit())
    }

    fn resolve_oid(name: &str, repository: &Repository) -> anyhow::Result<Option<ObjectId>> {
        if name.len() == OBJECT_ID_LENGTH {
            let oid = ObjectId::try_parse(name.to_string())?;
            return if repository.database().exists(&oid) {
                Ok(Some(oid))
            } else {
                Ok(None)
            };
        }

        let mut matches = repository.database().find_by_prefix(name)?;
        if matches.len() > 1 {
            return Err(EngineError::user(format!(
                "ambiguous revision '{}' matches {} objects",
                name,
                matches.len()
            )));
        }
        Ok(matches.pop())
    }
}

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Revision::Head => write!(f, "HEAD"),
            Revision::Ref(name) => write!(f, "{}", name),
            Revision::Ancestor(base, generations) => write!(f, "{}~{}", base, generations),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn head_and_alias_parse_the_same() {
        assert_eq!(Revision::try_parse("HEAD").unwrap(), Revision::Head);
        assert_eq!(Revision::try_parse("@").unwrap(), Revision::Head);
    }

    #[test]
    fn names_parse_as_refs() {
        assert_eq!(
            Revision::try_parse("feature/x").unwrap(),
            Revision::Ref("feature/x".into())
        );
    }

    #[test]
    fn ancestor_notation_parses_with_and_without_count() {
        assert_eq!(
            Revision::try_parse("HEAD~3").unwrap(),
            Revision::Ancestor(Box::new(Revision::Head), 3)
        );
        assert_eq!(
            Revision::try_parse("main~").unwrap(),
            Revision::Ancestor(Box::new(Revision::Ref("main".into())), 1)
        );
    }

    #[test]
    fn nested_ancestors_accumulate() {
        let rev = Revision::try_parse("main~2~1").unwrap();
        assert_eq!(
            rev,
            Revision::Ancestor(
                Box::new(Revision::Ancestor(Box::new(Revision::Ref("main".into())), 2)),
                1
            )
        );
        assert_eq!(rev.to_string(), "main~2~1");
    }

    #[test]
    fn empty_spec_is_rejected() {
        assert!(Revision::try_parse("").is_err());
    }
}
