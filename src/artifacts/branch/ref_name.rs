//! Full ref paths
//!
//! A `RefName` is the repository-relative path of a ref file: `HEAD`,
//! `refs/heads/<branch>`, `refs/tags/<tag>`, `refs/remotes/<remote>/<branch>`
//! or `refs/stash`. Reflog files mirror these paths under `logs/`.

use crate::artifacts::branch::branch_name::BranchName;
use std::path::PathBuf;

pub const HEAD_REF_NAME: &str = "HEAD";
pub const STASH_REF_NAME: &str = "refs/stash";

const HEADS_PREFIX: &str = "refs/heads/";
const TAGS_PREFIX: &str = "refs/tags/";
const REMOTES_PREFIX: &str = "refs/remotes/";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RefName(String);

impl RefName {
    pub fn new(path: String) -> Self {
        RefName(path)
    }

    pub fn head() -> Self {
        RefName(HEAD_REF_NAME.to_string())
    }

    pub fn stash() -> Self {
        RefName(STASH_REF_NAME.to_string())
    }

    pub fn branch(name: &BranchName) -> Self {
        RefName(format!("{HEADS_PREFIX}{name}"))
    }

    pub fn tag(name: &str) -> Self {
        RefName(format!("{TAGS_PREFIX}{name}"))
    }

    pub fn remote_tracking(remote: &str, branch: &BranchName) -> Self {
        RefName(format!("{REMOTES_PREFIX}{remote}/{branch}"))
    }

    pub fn is_head(&self) -> bool {
        self.0 == HEAD_REF_NAME
    }

    /// The branch short name, when this is a `refs/heads/` ref
    pub fn as_branch(&self) -> Option<BranchName> {
        self.0
            .strip_prefix(HEADS_PREFIX)
            .and_then(|name| BranchName::try_parse(name.to_string()).ok())
    }

    pub fn is_tag(&self) -> bool {
        self.0.starts_with(TAGS_PREFIX)
    }

    /// Display name without the `refs/heads/` or `refs/tags/` prefix
    pub fn short_name(&self) -> &str {
        self.0
            .strip_prefix(HEADS_PREFIX)
            .or_else(|| self.0.strip_prefix(TAGS_PREFIX))
            .or_else(|| self.0.strip_prefix(REMOTES_PREFIX))
            .unwrap_or(&self.0)
    }

    /// Path of the ref file, relative to the repository directory
    pub fn to_path(&self) -> PathBuf {
        PathBuf::from(&self.0)
    }
}

impl AsRef<str> for RefName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RefName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn branch(name: &str) -> BranchName {
        BranchName::try_parse(name.to_string()).unwrap()
    }

    #[test]
    fn constructors_build_the_expected_paths() {
        assert_eq!(RefName::head().as_ref(), "HEAD");
        assert_eq!(RefName::branch(&branch("main")).as_ref(), "refs/heads/main");
        assert_eq!(RefName::tag("v1").as_ref(), "refs/tags/v1");
        assert_eq!(
            RefName::remote_tracking("origin", &branch("main")).as_ref(),
            "refs/remotes/origin/main"
        );
        assert_eq!(RefName::stash().as_ref(), "refs/stash");
    }

    #[test]
    fn branch_extraction_only_works_for_heads() {
        assert_eq!(RefName::branch(&branch("main")).as_branch(), Some(branch("main")));
        assert_eq!(RefName::tag("v1").as_branch(), None);
        assert_eq!(RefName::head().as_branch(), None);
    }

    #[test]
    fn short_names_strip_known_prefixes() {
        assert_eq!(RefName::branch(&branch("feature/x")).short_name(), "feature/x");
        assert_eq!(RefName::tag("v1").short_name(), "v1");
        assert_eq!(
            RefName::remote_tracking("origin", &branch("main")).short_name(),
            "origin/main"
        );
        assert_eq!(RefName::stash().short_name(), "refs/stash");
    }
}
