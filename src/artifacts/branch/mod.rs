//! Branch names, ref names and revision parsing
//!
//! - Branch name validation (git ref-name rules)
//! - Full ref paths (`refs/heads/...`, `refs/tags/...`, `refs/remotes/...`)
//! - Revision specifications: branch or tag names, `HEAD`, the `@` alias,
//!   full or abbreviated object ids, and ancestor notation `<rev>~<n>`

pub mod branch_name;
pub mod ref_name;
pub mod revision;

/// Regex matching anything a ref name must not contain
pub const INVALID_BRANCH_NAME_REGEX: &str =
    r"^\.|\/\.|\.\.|^\/|\/$|\.lock$|@\{|[\x00-\x20\*:\?\[\\~\^\x7f]";

/// Regex for ancestor notation (e.g. "HEAD~3")
pub const ANCESTOR_REGEX: &str = r"^(.+)\~(\d*)$";
