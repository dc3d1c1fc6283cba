//! Object identifier (SHA-1 hash)
//!
//! Object ids are 40-character hexadecimal strings. The all-zero id never
//! names a stored object; reflogs use it for "ref did not exist yet".
//!
//! Objects live under `objects/<first-2-chars>/<remaining-38-chars>`.

use crate::artifacts::objects::{OBJECT_ID_LENGTH, OBJECT_ID_PACKED_LENGTH};
use std::io;
use std::path::PathBuf;

/// Validated 40-hex object identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ObjectId(String);

impl ObjectId {
    /// Parse and validate an object id from a string
    pub fn try_parse(id: String) -> anyhow::Result<Self> {
        if id.len() != OBJECT_ID_LENGTH {
            return Err(anyhow::anyhow!("invalid object id length: {}", id.len()));
        }
        if !id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(anyhow::anyhow!("invalid object id characters: {}", id));
        }
        Ok(Self(id.to_ascii_lowercase()))
    }

    /// The all-zero id used by reflogs for "no previous value"
    pub fn zero() -> Self {
        Self("0".repeat(OBJECT_ID_LENGTH))
    }

    pub fn is_zero(&self) -> bool {
        self.0.bytes().all(|b| b == b'0')
    }

    /// Write the id as 20 packed bytes
    ///
    /// Used by the binary index codec.
    pub fn write_packed_to<W: io::Write>(&self, writer: &mut W) -> anyhow::Result<()> {
        for i in (0..OBJECT_ID_LENGTH).step_by(2) {
            let byte = u8::from_str_radix(&self.0[i..i + 2], 16)
                .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "invalid hex digit"))?;
            writer.write_all(&[byte])?;
        }

        Ok(())
    }

    /// Read an id from 20 packed bytes
    pub fn read_packed_from<R: io::Read + ?Sized>(reader: &mut R) -> anyhow::Result<Self> {
        let mut buffer = [0u8; OBJECT_ID_PACKED_LENGTH];
        reader.read_exact(&mut buffer)?;

        let mut hex = String::with_capacity(OBJECT_ID_LENGTH);
        for byte in buffer {
            hex.push_str(&format!("{:02x}", byte));
        }

        Self::try_parse(hex)
    }

    /// Fan-out path for on-disk storage: `ab/cdef...`
    pub fn to_path(&self) -> PathBuf {
        let (dir, file) = self.0.split_at(2);
        PathBuf::from(dir).join(file)
    }

    /// First 7 characters, the standard abbreviation
    pub fn to_short_oid(&self) -> String {
        self.0.split_at(7).0.to_string()
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_normalizes_case() {
        let oid = ObjectId::try_parse("AB".repeat(20)).unwrap();
        assert_eq!(oid.as_ref(), "ab".repeat(20));
    }

    #[test]
    fn rejects_bad_lengths_and_characters() {
        assert!(ObjectId::try_parse("abc".into()).is_err());
        assert!(ObjectId::try_parse("zz".repeat(20)).is_err());
    }

    #[test]
    fn zero_id_roundtrips_and_is_flagged() {
        let zero = ObjectId::zero();
        assert!(zero.is_zero());
        assert!(!ObjectId::try_parse("1".repeat(40)).unwrap().is_zero());
    }

    #[test]
    fn packed_roundtrip() {
        let oid = ObjectId::try_parse("0123456789abcdef0123456789abcdef01234567".into()).unwrap();
        let mut packed = Vec::new();
        oid.write_packed_to(&mut packed).unwrap();
        assert_eq!(packed.len(), OBJECT_ID_PACKED_LENGTH);

        let back = ObjectId::read_packed_from(&mut packed.as_slice()).unwrap();
        assert_eq!(back, oid);
    }

    #[test]
    fn fan_out_path_splits_after_two_chars() {
        let oid = ObjectId::try_parse("ab".repeat(20)).unwrap();
        assert_eq!(oid.to_path(), PathBuf::from("ab").join("ab".repeat(19)));
    }
}
