//! Index file header

use crate::artifacts::index::{FLAG_DIRTY, SIGNATURE, VERSION};
use crate::artifacts::objects::object::{Packable, Unpackable};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;
use std::io::{BufRead, Read, Write};

/// Fixed-size header at the front of the index file
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct IndexHeader {
    pub marker: String,
    pub version: u32,
    pub entries_count: u32,
    pub flags: u32,
}

impl IndexHeader {
    pub fn empty() -> Self {
        Self::new(SIGNATURE.to_string(), VERSION, 0, 0)
    }

    pub fn is_dirty(&self) -> bool {
        self.flags & FLAG_DIRTY != 0
    }

    pub fn set_dirty(&mut self, dirty: bool) {
        if dirty {
            self.flags |= FLAG_DIRTY;
        } else {
            self.flags &= !FLAG_DIRTY;
        }
    }
}

impl Packable for IndexHeader {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut bytes = Vec::with_capacity(16);
        bytes.write_all(self.marker.as_bytes())?;
        bytes.write_u32::<BigEndian>(self.version)?;
        bytes.write_u32::<BigEndian>(self.entries_count)?;
        bytes.write_u32::<BigEndian>(self.flags)?;
        Ok(Bytes::from(bytes))
    }
}

impl Unpackable for IndexHeader {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let mut marker = [0u8; 4];
        reader.read_exact(&mut marker)?;

        let version = reader.read_u32::<BigEndian>()?;
        let entries_count = reader.read_u32::<BigEndian>()?;
        let flags = reader.read_u32::<BigEndian>()?;

        Ok(IndexHeader {
            marker: String::from_utf8(marker.to_vec())?,
            version,
            entries_count,
            flags,
        })
    }
}
