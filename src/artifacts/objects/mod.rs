//! Object model for the content-addressed store
//!
//! Four object kinds exist: blobs (single items), trees (ordered snapshots),
//! commits and annotated tags. All of them serialize to
//! `<kind> <byte-length>\0<payload>` and are addressed by the SHA-1 of those
//! uncompressed bytes.

pub mod blob;
pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_kind;
pub mod tag;
pub mod tree;

/// Length of a hex-encoded object id
pub const OBJECT_ID_LENGTH: usize = 40;

/// Length of a packed (binary) object id
pub const OBJECT_ID_PACKED_LENGTH: usize = 20;
