//! Tree objects: ordered playlist snapshots
//!
//! A tree is an ordered sequence of `(position, uri, blob oid, display name)`.
//! The canonical payload is one line per entry,
//! `<position>\t<uri>\t<oid>\t<name>\n`, sorted by ascending position, so
//! ordering is part of the digest: the same items in a different order hash
//! differently.

use crate::artifacts::objects::object::{pack_with_header, Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_kind::ObjectKind;
use anyhow::Context;
use bytes::Bytes;
use derive_new::new;
use std::io::BufRead;

/// One tree entry
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct TreeEntry {
    pub position: u32,
    pub uri: String,
    pub oid: ObjectId,
    pub name: String,
}

/// Tree object: an ordered snapshot of the list
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tree {
    entries: Vec<TreeEntry>,
}

impl Tree {
    /// Build a tree from entries, renumbering positions from zero
    ///
    /// The input order is the tree order.
    pub fn from_ordered(entries: impl IntoIterator<Item = TreeEntry>) -> Self {
        let entries = entries
            .into_iter()
            .enumerate()
            .map(|(position, mut entry)| {
                entry.position = position as u32;
                entry
            })
            .collect();

        Tree { entries }
    }

    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }

    /// Identifiers in tree order
    pub fn uris(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.uri.clone()).collect()
    }

    pub fn entry(&self, uri: &str) -> Option<&TreeEntry> {
        self.entries.iter().find(|entry| entry.uri == uri)
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.entry(uri).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // Tabs and newlines are the format's delimiters; display names carrying
    // them would corrupt the canonical bytes.
    fn sanitize(name: &str) -> String {
        name.replace(['\t', '\n', '\r'], " ")
    }
}

impl Packable for Tree {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut entries = self.entries.clone();
        entries.sort_by_key(|entry| entry.position);

        let mut payload = String::new();
        for entry in &entries {
            payload.push_str(&format!(
                "{}\t{}\t{}\t{}\n",
                entry.position,
                entry.uri,
                entry.oid,
                Self::sanitize(&entry.name)
            ));
        }

        Ok(pack_with_header(ObjectKind::Tree, payload.as_bytes()))
    }
}

impl Unpackable for Tree {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let mut entries = Vec::new();

        for line in reader.lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }

            let mut fields = line.splitn(4, '\t');
            let position = fields
                .next()
                .context("tree entry is missing its position")?
                .parse::<u32>()
                .context("tree entry position is not a number")?;
            let uri = fields
                .next()
                .context("tree entry is missing its identifier")?
                .to_string();
            let oid = ObjectId::try_parse(
                fields
                    .next()
                    .context("tree entry is missing its object id")?
                    .to_string(),
            )?;
            let name = fields.next().unwrap_or_default().to_string();

            entries.push(TreeEntry::new(position, uri, oid, name));
        }

        entries.sort_by_key(|entry| entry.position);
        Ok(Tree { entries })
    }
}

impl Object for Tree {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Tree
    }

    fn display(&self) -> String {
        self.entries
            .iter()
            .map(|entry| format!("{:>4}  {}  {}", entry.position, entry.oid.to_short_oid(), entry.name))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
