//! Core object traits
//!
//! - `Packable`: serialization to the storage format (header included)
//! - `Unpackable`: deserialization from the payload (header already consumed)
//! - `Object`: common operations (id computation, display)
//!
//! The object id is the SHA-1 of the serialized bytes, computed before any
//! compression, so digests are reproducible regardless of storage settings.

use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_kind::ObjectKind;
use crate::artifacts::objects::tag::Tag;
use crate::artifacts::objects::tree::Tree;
use anyhow::Result;
use bytes::Bytes;
use sha1::{Digest, Sha1};
use std::io::BufRead;
use std::path::PathBuf;

/// Trait for serializing objects to the storage format
pub trait Packable {
    /// Serialize the object to bytes, header included
    fn serialize(&self) -> Result<Bytes>;
}

/// Trait for deserializing objects from their payload bytes
pub trait Unpackable {
    /// Deserialize from a reader positioned after the header
    fn deserialize(reader: impl BufRead) -> Result<Self>
    where
        Self: Sized;
}

/// Common object operations, implemented by all four kinds
pub trait Object: Packable {
    fn kind(&self) -> ObjectKind;

    /// Human-readable payload, used by `show`
    fn display(&self) -> String;

    /// Compute the object id by hashing the serialized content
    fn object_id(&self) -> Result<ObjectId> {
        let content = self.serialize()?;
        let mut hasher = Sha1::new();
        hasher.update(&content);

        let oid = hasher.finalize();
        ObjectId::try_parse(format!("{oid:x}"))
    }

    /// Fan-out path where this object would be stored
    fn object_path(&self) -> Result<PathBuf> {
        Ok(self.object_id()?.to_path())
    }
}

/// Type-erased object container for reads where the kind is unknown
pub enum ObjectBox {
    Blob(Box<Blob>),
    Tree(Box<Tree>),
    Commit(Box<Commit>),
    Tag(Box<Tag>),
}

impl ObjectBox {
    pub fn kind(&self) -> ObjectKind {
        match self {
            ObjectBox::Blob(_) => ObjectKind::Blob,
            ObjectBox::Tree(_) => ObjectKind::Tree,
            ObjectBox::Commit(_) => ObjectKind::Commit,
            ObjectBox::Tag(_) => ObjectKind::Tag,
        }
    }

    pub fn display(&self) -> String {
        match self {
            ObjectBox::Blob(blob) => blob.display(),
            ObjectBox::Tree(tree) => tree.display(),
            ObjectBox::Commit(commit) => commit.display(),
            ObjectBox::Tag(tag) => tag.display(),
        }
    }
}

/// Build the `<kind> <byte-length>\0<payload>` bytes for a payload
pub(crate) fn pack_with_header(kind: ObjectKind, payload: &[u8]) -> Bytes {
    let mut bytes = Vec::with_capacity(payload.len() + 16);
    bytes.extend_from_slice(format!("{} {}\0", kind.as_str(), payload.len()).as_bytes());
    bytes.extend_from_slice(payload);
    Bytes::from(bytes)
}
