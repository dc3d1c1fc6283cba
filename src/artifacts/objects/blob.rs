//! Items and blob objects
//!
//! An item is an opaque catalog identifier (a track uri) plus display
//! metadata. Identity is the uri alone; the metadata exists for
//! human-readable diffs and never participates in comparisons.
//!
//! A blob is the canonical JSON form of a single item. Struct fields are
//! declared in lexicographic order so the serialized key order is stable and
//! re-hashing a parsed blob reproduces its digest.

use crate::artifacts::objects::object::{pack_with_header, Object, Packable, Unpackable};
use crate::artifacts::objects::object_kind::ObjectKind;
use anyhow::Context;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::io::BufRead;

/// A single entry of the remote list
// Field order is load-bearing: serde_json emits keys in declaration order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub album: String,
    pub artist: String,
    pub duration_ms: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    pub uri: String,
}

impl Item {
    pub fn new(uri: String, name: String, artist: String, album: String, duration_ms: u64) -> Self {
        Item {
            album,
            artist,
            duration_ms,
            name,
            position: None,
            uri,
        }
    }

    /// Duration formatted as M:SS
    pub fn duration_display(&self) -> String {
        let seconds = self.duration_ms / 1000;
        format!("{}:{:02}", seconds / 60, seconds % 60)
    }

    /// One-line form used by diffs and `show`
    pub fn display_line(&self) -> String {
        format!("{} - {}", self.name, self.artist)
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.uri == other.uri
    }
}

impl Eq for Item {}

impl std::hash::Hash for Item {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.uri.hash(state);
    }
}

/// Blob object: the stored form of one item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    item: Item,
}

impl Blob {
    pub fn new(item: Item) -> Self {
        Blob { item }
    }

    pub fn item(&self) -> &Item {
        &self.item
    }

    pub fn into_item(self) -> Item {
        self.item
    }
}

impl Packable for Blob {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let payload = serde_json::to_vec(&self.item).context("unable to serialize item")?;
        Ok(pack_with_header(ObjectKind::Blob, &payload))
    }
}

impl Unpackable for Blob {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let item = serde_json::from_reader(reader).context("unable to parse item blob")?;
        Ok(Blob { item })
    }
}

impl Object for Blob {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Blob
    }

    fn display(&self) -> String {
        format!(
            "{} - {} [{}] ({})",
            self.item.name,
            self.item.artist,
            self.item.album,
            self.item.duration_display()
        )
    }
}
