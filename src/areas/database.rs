//! Content-addressed object database
//!
//! Stores blobs, trees, commits and tags under their SHA-1 digest. Objects
//! are identified by the hash of their uncompressed canonical bytes and live
//! zlib-compressed at `objects/<first 2 hex>/<remaining 38 hex>`.
//!
//! Writers create a temp file in the objects directory and rename it into
//! place, so readers never observe a partially written object. Storing an
//! object that already exists is a no-op: content addressing deduplicates.

use crate::artifacts::core::EngineError;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::{Commit, SlimCommit};
use crate::artifacts::objects::object::{Object, ObjectBox, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_kind::ObjectKind;
use crate::artifacts::objects::tag::Tag;
use crate::artifacts::objects::tree::Tree;
use anyhow::Context;
use bytes::Bytes;
use rand;
use std::collections::HashMap;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

/// Object database rooted at the `objects/` directory
#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    /// Store an object, returning its id
    ///
    /// No-op when the object is already present.
    pub fn store(&self, object: &impl Object) -> anyhow::Result<ObjectId> {
        let oid = object.object_id()?;
        let object_path = self.path.join(oid.to_path());

        if !object_path.exists() {
            std::fs::create_dir_all(
                object_path
                    .parent()
                    .context(format!("invalid object path {}", object_path.display()))?,
            )
            .context(format!(
                "unable to create object directory {}",
                object_path.display()
            ))?;

            self.write_object(object_path, object.serialize()?)?;
        }

        Ok(oid)
    }

    pub fn exists(&self, oid: &ObjectId) -> bool {
        self.path.join(oid.to_path()).exists()
    }

    /// Read, inflate and validate an object, returning kind and payload
    ///
    /// The declared header length must match the inflated payload; anything
    /// else is a corrupt object.
    pub fn load(&self, oid: &ObjectId) -> anyhow::Result<(ObjectKind, Bytes)> {
        let object_path = self.path.join(oid.to_path());
        let compressed = std::fs::read(&object_path)
            .with_context(|| format!("unable to read object file {}", object_path.display()))?;

        let content = Self::decompress(compressed.into()).map_err(|source| {
            anyhow::Error::from(EngineError::CorruptObject {
                oid: oid.to_string(),
                reason: format!("truncated zlib stream: {source}"),
            })
        })?;

        let mut reader = Cursor::new(content);
        let (kind, declared_length) = ObjectKind::parse_header(&mut reader)?;

        let payload_start = reader.position() as usize;
        let payload = reader.into_inner().slice(payload_start..);

        if payload.len() != declared_length {
            return Err(EngineError::CorruptObject {
                oid: oid.to_string(),
                reason: format!(
                    "declared length {}, payload {}",
                    declared_length,
                    payload.len()
                ),
            }
            .into());
        }

        Ok((kind, payload))
    }

    pub fn kind_of(&self, oid: &ObjectId) -> anyhow::Result<ObjectKind> {
        Ok(self.load(oid)?.0)
    }

    /// Parse an object into the matching type
    pub fn parse_object(&self, oid: &ObjectId) -> anyhow::Result<ObjectBox> {
        let (kind, payload) = self.load(oid)?;
        let reader = Cursor::new(payload);

        Ok(match kind {
            ObjectKind::Blob => ObjectBox::Blob(Box::new(Blob::deserialize(reader)?)),
            ObjectKind::Tree => ObjectBox::Tree(Box::new(Tree::deserialize(reader)?)),
            ObjectKind::Commit => ObjectBox::Commit(Box::new(Commit::deserialize(reader)?)),
            ObjectKind::Tag => ObjectBox::Tag(Box::new(Tag::deserialize(reader)?)),
        })
    }

    pub fn parse_blob(&self, oid: &ObjectId) -> anyhow::Result<Option<Blob>> {
        match self.parse_object(oid)? {
            ObjectBox::Blob(blob) => Ok(Some(*blob)),
            _ => Ok(None),
        }
    }

    pub fn parse_tree(&self, oid: &ObjectId) -> anyhow::Result<Option<Tree>> {
        match self.parse_object(oid)? {
            ObjectBox::Tree(tree) => Ok(Some(*tree)),
            _ => Ok(None),
        }
    }

    pub fn parse_commit(&self, oid: &ObjectId) -> anyhow::Result<Option<Commit>> {
        match self.parse_object(oid)? {
            ObjectBox::Commit(commit) => Ok(Some(*commit)),
            _ => Ok(None),
        }
    }

    pub fn parse_tag(&self, oid: &ObjectId) -> anyhow::Result<Option<Tag>> {
        match self.parse_object(oid)? {
            ObjectBox::Tag(tag) => Ok(Some(*tag)),
            _ => Ok(None),
        }
    }

    /// Enumerate every stored object id
    ///
    /// Walks the fan-out directories; used for integrity checks.
    pub fn iter(&self) -> anyhow::Result<Vec<ObjectId>> {
        let mut oids = Vec::new();

        if !self.path.exists() {
            return Ok(oids);
        }

        for fan_out in std::fs::read_dir(&self.path)? {
            let fan_out = fan_out?;
            if !fan_out.path().is_dir() {
                continue;
            }

            let prefix = fan_out.file_name().to_string_lossy().to_string();
            for entry in std::fs::read_dir(fan_out.path())? {
                let entry = entry?;
                let suffix = entry.file_name().to_string_lossy().to_string();
                if let Ok(oid) = ObjectId::try_parse(format!("{prefix}{suffix}")) {
                    oids.push(oid);
                }
            }
        }

        oids.sort();
        Ok(oids)
    }

    /// Find all objects whose id starts with the given hex prefix
    ///
    /// Prefixes of 2+ characters only touch one fan-out directory.
    pub fn find_by_prefix(&self, prefix: &str) -> anyhow::Result<Vec<ObjectId>> {
        let mut matches = Vec::new();

        if prefix.len() >= 2 {
            let dir_name = &prefix[..2];
            let file_prefix = &prefix[2..];
            let dir_path = self.path.join(dir_name);

            if dir_path.is_dir() {
                for entry in std::fs::read_dir(&dir_path)? {
                    let entry = entry?;
                    let file_name = entry.file_name();
                    let file_name = file_name.to_string_lossy();

                    if file_name.starts_with(file_prefix) {
                        if let Ok(oid) = ObjectId::try_parse(format!("{dir_name}{file_name}")) {
                            matches.push(oid);
                        }
                    }
                }
            }
        } else {
            matches = self
                .iter()?
                .into_iter()
                .filter(|oid| oid.as_ref().starts_with(prefix))
                .collect();
        }

        Ok(matches)
    }

    fn write_object(&self, object_path: PathBuf, content: Bytes) -> anyhow::Result<()> {
        let object_dir = object_path
            .parent()
            .context(format!("invalid object path {}", object_path.display()))?;
        let temp_object_path = object_dir.join(Self::generate_temp_name());

        let compressed = Self::compress(content)?;

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_object_path)
            .context(format!(
                "unable to open object file {}",
                temp_object_path.display()
            ))?;

        file.write_all(&compressed).context(format!(
            "unable to write object file {}",
            temp_object_path.display()
        ))?;

        // rename makes the object visible atomically
        std::fs::rename(&temp_object_path, &object_path).context(format!(
            "unable to rename object file to {}",
            object_path.display()
        ))?;

        Ok(())
    }

    fn compress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder
            .write_all(&data)
            .context("unable to compress object content")?;

        encoder
            .finish()
            .map(|compressed| compressed.into())
            .context("unable to finish compressing object content")
    }

    fn decompress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(&*data);
        let mut content = Vec::new();
        decoder
            .read_to_end(&mut content)
            .context("unable to decompress object content")?;

        Ok(content.into())
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }
}

/// Commit cache for graph traversal
///
/// Algorithms such as merge-base search touch the same commits repeatedly;
/// this cache parses each one once and hands out slim copies.
#[derive(Debug, Default)]
pub struct CommitCache {
    commits: HashMap<ObjectId, SlimCommit>,
}

impl CommitCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load(
        &mut self,
        database: &Database,
        oid: &ObjectId,
    ) -> anyhow::Result<SlimCommit> {
        if let Some(slim) = self.commits.get(oid) {
            return Ok(slim.clone());
        }

        let commit = database
            .parse_commit(oid)?
            .ok_or_else(|| anyhow::anyhow!("object {} is not a commit", oid))?;
        let slim = SlimCommit {
            oid: oid.clone(),
            parents: commit.parents().to_vec(),
            timestamp: commit.timestamp(),
        };

        self.commits.insert(oid.clone(), slim.clone());
        Ok(slim)
    }
}
