//! Staging area
//!
//! The index is the single mutable snapshot of the intended next commit: an
//! ordered list of `(identifier, blob oid)` pairs plus a dirty flag marking
//! it as modified since it last mirrored a commit's tree. It persists as a
//! checksummed binary file (see `artifacts::index`) written atomically via
//! temp-file-plus-rename.

use crate::areas::database::Database;
use crate::artifacts::diff::ListDiff;
use crate::artifacts::index::checksum::{ChecksumReader, ChecksumWriter};
use crate::artifacts::index::index_entry::{IndexEntry, ENTRY_BLOCK, ENTRY_MIN_SIZE};
use crate::artifacts::index::index_header::IndexHeader;
use crate::artifacts::index::{HEADER_SIZE, SIGNATURE, VERSION};
use crate::artifacts::objects::blob::{Blob, Item};
use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::{Tree, TreeEntry};
use anyhow::anyhow;
use bytes::Bytes;
use rand;
use std::io::Cursor;
use std::path::Path;

/// The staging area
#[derive(Debug, Clone)]
pub struct Index {
    /// Path to the index file (`.spgit/index`)
    path: Box<Path>,
    /// Staged entries in list order
    entries: Vec<IndexEntry>,
    /// Modified since the index last mirrored a commit tree
    dirty: bool,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            entries: Vec::new(),
            dirty: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Identifiers in staged order
    pub fn uris(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.uri.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.dirty = false;
    }

    /// Load the index from disk, verifying its checksum
    ///
    /// A missing or empty file loads as an empty, clean index.
    pub fn rehydrate(&mut self) -> anyhow::Result<()> {
        self.clear();

        if !self.path.exists() {
            return Ok(());
        }

        let content = std::fs::read(&self.path)?;
        if content.is_empty() {
            return Ok(());
        }

        let mut reader = ChecksumReader::new(Cursor::new(content));

        let header_bytes = reader.read(HEADER_SIZE)?;
        let header = IndexHeader::deserialize(Cursor::new(header_bytes))?;
        if header.marker != SIGNATURE {
            return Err(anyhow!("invalid index file signature: {:?}", header.marker));
        }
        if header.version != VERSION {
            return Err(anyhow!("unsupported index file version: {}", header.version));
        }

        for _ in 0..header.entries_count {
            let mut entry_bytes = reader.read(ENTRY_MIN_SIZE)?.to_vec();
            while entry_bytes[entry_bytes.len() - 1] != 0 {
                entry_bytes.extend_from_slice(&reader.read(ENTRY_BLOCK)?);
            }

            let entry = IndexEntry::deserialize(Cursor::new(Bytes::from(entry_bytes)))?;
            self.entries.push(entry);
        }

        self.entries.sort_by_key(|entry| entry.position);
        self.dirty = header.is_dirty();

        reader.verify()
    }

    /// Persist the index atomically
    pub fn write_updates(&self) -> anyhow::Result<()> {
        let mut header = IndexHeader::new(
            SIGNATURE.to_string(),
            VERSION,
            self.entries.len() as u32,
            0,
        );
        header.set_dirty(self.dirty);

        let mut writer = ChecksumWriter::new(Vec::new());
        writer.write(&header.serialize()?)?;
        for entry in &self.entries {
            writer.write(&entry.serialize()?)?;
        }
        let content = writer.finalize()?;

        let parent = self
            .path
            .parent()
            .ok_or_else(|| anyhow!("index file {:?} has no parent directory", self.path))?;
        let temp_path = parent.join(format!("tmp-index-{}", rand::random::<u32>()));
        std::fs::write(&temp_path, content)?;
        std::fs::rename(&temp_path, &self.path)?;

        Ok(())
    }

    /// Replace the index with the given items, writing missing blobs
    pub fn stage_from(&mut self, items: &[Item], database: &Database) -> anyhow::Result<()> {
        self.entries = items
            .iter()
            .enumerate()
            .map(|(position, item)| {
                let oid = database.store(&Blob::new(item.clone()))?;
                Ok(IndexEntry::new(oid, position as u32, item.uri.clone()))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        self.dirty = true;

        Ok(())
    }

    /// Stage only the named identifiers
    ///
    /// An identifier present in the snapshot is staged (appended when new,
    /// refreshed in place when already staged); one absent from the snapshot
    /// is removed from the index.
    pub fn stage_selected(
        &mut self,
        uris: &[String],
        snapshot: &[Item],
        database: &Database,
    ) -> anyhow::Result<()> {
        for uri in uris {
            match snapshot.iter().find(|item| &item.uri == uri) {
                Some(item) => {
                    let oid = database.store(&Blob::new(item.clone()))?;
                    match self.entries.iter_mut().find(|entry| &entry.uri == uri) {
                        Some(entry) => entry.oid = oid,
                        None => {
                            self.entries
                                .push(IndexEntry::new(oid, self.entries.len() as u32, uri.clone()))
                        }
                    }
                }
                None => self.entries.retain(|entry| &entry.uri != uri),
            }
        }

        self.renumber();
        self.dirty = true;

        Ok(())
    }

    /// Rebuild the index from a committed tree, clearing the dirty flag
    pub fn reset_to_tree(&mut self, tree: &Tree) {
        self.entries = tree
            .entries()
            .iter()
            .map(|entry| IndexEntry::new(entry.oid.clone(), entry.position, entry.uri.clone()))
            .collect();
        self.dirty = false;
    }

    /// Write a tree object for the current contents, preserving order
    pub fn to_tree(&self, database: &Database) -> anyhow::Result<ObjectId> {
        let tree = self.as_tree(database)?;
        database.store(&tree)
    }

    /// Materialize the staged list as a tree value
    ///
    /// Display names come from the staged blobs.
    pub fn as_tree(&self, database: &Database) -> anyhow::Result<Tree> {
        let entries = self
            .entries
            .iter()
            .map(|entry| {
                let name = database
                    .parse_blob(&entry.oid)?
                    .map(|blob| blob.item().name.clone())
                    .ok_or_else(|| anyhow!("staged blob {} is not a blob", entry.oid))?;
                Ok(TreeEntry::new(
                    entry.position,
                    entry.uri.clone(),
                    entry.oid.clone(),
                    name,
                ))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(Tree::from_ordered(entries))
    }

    /// Positional diff of the staged list against a committed tree
    pub fn diff_against(&self, tree: &Tree) -> ListDiff {
        ListDiff::between(&tree.uris(), &self.uris())
    }

    fn renumber(&mut self) {
        for (position, entry) in self.entries.iter_mut().enumerate() {
            entry.position = position as u32;
        }
    }
}
