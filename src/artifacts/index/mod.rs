//! Index file format
//!
//! The staging area persists as a single binary file:
//!
//! ```text
//! Header (16 bytes):
//!   - Signature: "SPIX" (4 bytes)
//!   - Version: 1 (4 bytes)
//!   - Entry count (4 bytes)
//!   - Flags (4 bytes, bit 0 = modified since last HEAD sync)
//!
//! Entries (variable length, 8-byte aligned):
//!   - Packed object id, position, identifier
//!
//! Checksum (20 bytes):
//!   - SHA-1 of all preceding bytes
//! ```

pub mod checksum;
pub mod index_entry;
pub mod index_header;

/// Size of the SHA-1 trailer in bytes
pub const CHECKSUM_SIZE: usize = 20;

/// Size of the index header in bytes
pub const HEADER_SIZE: usize = 16;

/// Magic signature identifying index files
pub const SIGNATURE: &str = "SPIX";

/// Index file format version
pub const VERSION: u32 = 1;

/// Header flag: the index was modified since it last mirrored a commit
pub const FLAG_DIRTY: u32 = 1;
