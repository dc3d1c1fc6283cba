//! Contract-level error kinds
//!
//! Low layers surface these typed errors; the façade and `main` decide what is
//! fatal and map each kind onto a process exit code:
//!
//! - 1: user error (bad arguments, unknown ref, nothing to commit)
//! - 2: repository error (corruption, I/O)
//! - 3: remote catalog error
//!
//! Everything crosses layer boundaries wrapped in `anyhow::Error` so call
//! sites can attach context; classification walks the chain looking for the
//! innermost `EngineError`.

use std::path::PathBuf;
use thiserror::Error;

/// Exit code for user errors
pub const EXIT_USER: i32 = 1;
/// Exit code for repository errors
pub const EXIT_REPOSITORY: i32 = 2;
/// Exit code for remote catalog errors
pub const EXIT_REMOTE: i32 = 3;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Bad arguments, unknown refs, nothing to commit, and friends
    #[error("{0}")]
    User(String),

    /// No `.spgit` directory in the current directory or any parent
    #[error("not a spgit repository (or any of the parent directories): {0}")]
    NotARepository(PathBuf),

    /// Header/length mismatch, truncated zlib stream, wrong kind
    #[error("object {oid} is corrupt: {reason}")]
    CorruptObject { oid: String, reason: String },

    /// Object header names a kind this engine does not know
    #[error("unknown object kind '{0}'")]
    UnknownKind(String),

    /// Compare-and-swap failed on a ref update
    #[error("ref '{name}' moved: expected {expected}, found {found}")]
    RefRace {
        name: String,
        expected: String,
        found: String,
    },

    /// The external catalog failed or was unreachable
    #[error("remote: {0}")]
    Remote(String),

    /// Reserved for strategies that would require a merge base
    #[error("refusing to merge unrelated histories: {0}")]
    MergeImpossible(String),

    /// Filesystem-level failure
    #[error("storage: {0}")]
    Storage(#[from] std::io::Error),
}

impl EngineError {
    /// Shorthand for a user error already wrapped in `anyhow::Error`
    pub fn user(message: impl Into<String>) -> anyhow::Error {
        EngineError::User(message.into()).into()
    }

    /// Shorthand for a remote error already wrapped in `anyhow::Error`
    pub fn remote(message: impl Into<String>) -> anyhow::Error {
        EngineError::Remote(message.into()).into()
    }

    pub fn is_user(&self) -> bool {
        matches!(self, EngineError::User(_) | EngineError::NotARepository(_))
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            EngineError::User(_) | EngineError::NotARepository(_) => EXIT_USER,
            EngineError::Remote(_) => EXIT_REMOTE,
            EngineError::CorruptObject { .. }
            | EngineError::UnknownKind(_)
            | EngineError::RefRace { .. }
            | EngineError::MergeImpossible(_)
            | EngineError::Storage(_) => EXIT_REPOSITORY,
        }
    }
}

/// Classify an error chain into an exit code
///
/// Unclassified errors count as repository errors: they come from the engine,
/// not from the user or the remote.
pub fn exit_code_for(error: &anyhow::Error) -> i32 {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<EngineError>())
        .map(EngineError::exit_code)
        .unwrap_or(EXIT_REPOSITORY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let user = EngineError::User("branch 'x' already exists".into());
        assert!(user.is_user());
        assert_eq!(user.exit_code(), EXIT_USER);

        let corrupt = EngineError::CorruptObject {
            oid: "ab".repeat(20),
            reason: "declared length 10, payload 7".into(),
        };
        assert!(!corrupt.is_user());
        assert_eq!(corrupt.exit_code(), EXIT_REPOSITORY);

        assert_eq!(EngineError::Remote("timeout".into()).exit_code(), EXIT_REMOTE);
    }

    #[test]
    fn test_exit_code_walks_the_chain() {
        let inner = EngineError::user("unknown revision 'nope'");
        let wrapped = inner.context("while resolving merge target");
        assert_eq!(exit_code_for(&wrapped), EXIT_USER);

        let plain = anyhow::anyhow!("something else entirely");
        assert_eq!(exit_code_for(&plain), EXIT_REPOSITORY);
    }
}
