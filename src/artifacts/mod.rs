//! Domain types and algorithms
//!
//! Everything here is storage-agnostic: object kinds and their canonical
//! forms, ref and revision names, graph traversal, merge strategies, diffs,
//! and the contract-level error kinds. The `areas` layer persists these.

pub mod branch;
pub mod core;
pub mod diff;
pub mod history;
pub mod index;
pub mod merge;
pub mod objects;
