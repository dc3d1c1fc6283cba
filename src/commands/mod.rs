//! Command implementations
//!
//! - `plumbing`: shared low-level building blocks (commit creation, snapshot
//!   writing) used by several porcelain operations
//! - `porcelain`: the user-facing operations, one file per command, each an
//!   `impl Repository` block composing the storage areas

pub mod plumbing;
pub mod porcelain;
