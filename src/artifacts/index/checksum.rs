//! Checksummed index I/O
//!
//! Readers and writers that feed every byte through SHA-1 so the index file
//! can carry (and verify) a 20-byte integrity trailer.

use crate::artifacts::index::CHECKSUM_SIZE;
use bytes::Bytes;
use sha1::{Digest, Sha1};
use std::io::{Read, Write};

/// Reader that hashes everything it hands out
pub struct ChecksumReader<R: Read> {
    inner: R,
    hasher: Sha1,
}

impl<R: Read> ChecksumReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            hasher: Sha1::new(),
        }
    }

    /// Read exactly `size` bytes, folding them into the running hash
    pub fn read(&mut self, size: usize) -> anyhow::Result<Bytes> {
        let mut buffer = vec![0u8; size];
        self.inner.read_exact(&mut buffer)?;
        self.hasher.update(&buffer);
        Ok(Bytes::from(buffer))
    }

    /// Consume the 20-byte trailer and compare it with the running hash
    pub fn verify(mut self) -> anyhow::Result<()> {
        let mut stored = [0u8; CHECKSUM_SIZE];
        self.inner.read_exact(&mut stored)?;

        let computed = self.hasher.finalize();
        if stored != computed.as_slice() {
            anyhow::bail!("index checksum mismatch");
        }

        Ok(())
    }
}

/// Writer that appends the hash of everything written as a trailer
pub struct ChecksumWriter<W: Write> {
    inner: W,
    hasher: Sha1,
}

impl<W: Write> ChecksumWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            hasher: Sha1::new(),
        }
    }

    pub fn write(&mut self, bytes: &[u8]) -> anyhow::Result<()> {
        self.inner.write_all(bytes)?;
        self.hasher.update(bytes);
        Ok(())
    }

    /// Write the 20-byte trailer and hand the inner writer back
    pub fn finalize(mut self) -> anyhow::Result<W> {
        let digest = self.hasher.finalize();
        self.inner.write_all(&digest)?;
        Ok(self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn write_then_read_verifies() {
        let mut writer = ChecksumWriter::new(Vec::new());
        writer.write(b"hello index").unwrap();
        let bytes = writer.finalize().unwrap();

        let mut reader = ChecksumReader::new(Cursor::new(bytes));
        assert_eq!(&reader.read(11).unwrap()[..], b"hello index");
        reader.verify().unwrap();
    }

    #[test]
    fn a_flipped_byte_fails_verification() {
        let mut writer = ChecksumWriter::new(Vec::new());
        writer.write(b"hello index").unwrap();
        let mut bytes = writer.finalize().unwrap();
        bytes[3] ^= 0xff;

        let mut reader = ChecksumReader::new(Cursor::new(bytes));
        reader.read(11).unwrap();
        assert!(reader.verify().is_err());
    }

    #[test]
    fn a_truncated_trailer_fails_verification() {
        let mut writer = ChecksumWriter::new(Vec::new());
        writer.write(b"payload").unwrap();
        let mut bytes = writer.finalize().unwrap();
        bytes.truncate(bytes.len() - 1);

        let mut reader = ChecksumReader::new(Cursor::new(bytes));
        reader.read(7).unwrap();
        assert!(reader.verify().is_err());
    }
}
