//! Index entries
//!
//! Each entry stages one item: its blob oid, its position, and the catalog
//! identifier. Entries are padded with NULs to 8-byte alignment so a reader
//! can scan block-wise; the identifier itself never contains a NUL.
//!
//! ```text
//! +----------------------+------------+---------+-------------+---------+
//! | packed oid (20)      | pos (u32)  | len u16 | uri (len)   | NUL pad |
//! +----------------------+------------+---------+-------------+---------+
//! ```

use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;
use std::io::{BufRead, Read, Write};

/// Block size for entry alignment
pub const ENTRY_BLOCK: usize = 8;

/// Minimum size of a serialized entry in bytes
pub const ENTRY_MIN_SIZE: usize = 32;

/// Fixed-size prefix before the identifier bytes
const ENTRY_FIXED_SIZE: usize = 20 + 4 + 2;

/// One staged item
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct IndexEntry {
    pub oid: ObjectId,
    pub position: u32,
    pub uri: String,
}

impl Packable for IndexEntry {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let uri = self.uri.as_bytes();
        if uri.contains(&0) {
            anyhow::bail!("identifier contains a NUL byte: {:?}", self.uri);
        }
        if uri.len() > u16::MAX as usize {
            anyhow::bail!("identifier is too long: {} bytes", uri.len());
        }

        let mut bytes = Vec::with_capacity(ENTRY_MIN_SIZE);
        self.oid.write_packed_to(&mut bytes)?;
        bytes.write_u32::<BigEndian>(self.position)?;
        bytes.write_u16::<BigEndian>(uri.len() as u16)?;
        bytes.write_all(uri)?;

        // At least one NUL terminator, padded up to the block size
        bytes.push(0);
        while bytes.len() % ENTRY_BLOCK != 0 {
            bytes.push(0);
        }

        Ok(Bytes::from(bytes))
    }
}

impl Unpackable for IndexEntry {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let oid = ObjectId::read_packed_from(&mut reader)?;
        let position = reader.read_u32::<BigEndian>()?;
        let uri_len = reader.read_u16::<BigEndian>()? as usize;

        let mut uri = vec![0u8; uri_len];
        reader.read_exact(&mut uri)?;

        Ok(IndexEntry {
            oid,
            position,
            uri: String::from_utf8(uri)?,
        })
    }
}

impl IndexEntry {
    /// Total on-disk size of an entry with the given identifier length
    pub fn padded_size(uri_len: usize) -> usize {
        let unpadded = ENTRY_FIXED_SIZE + uri_len + 1;
        unpadded.div_ceil(ENTRY_BLOCK) * ENTRY_BLOCK
    }
}
