//! Object kinds and the shared storage header
//!
//! Every stored object starts with the header `<kind> <byte-length>\0`. The
//! kind dispatches deserialization; the declared length is verified against
//! the actual payload when reading back from disk.

use crate::artifacts::core::EngineError;
use std::io::BufRead;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Blob,
    Tree,
    Commit,
    Tag,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Blob => "blob",
            ObjectKind::Tree => "tree",
            ObjectKind::Commit => "commit",
            ObjectKind::Tag => "tag",
        }
    }

    pub fn try_parse(kind: &str) -> anyhow::Result<Self> {
        match kind {
            "blob" => Ok(ObjectKind::Blob),
            "tree" => Ok(ObjectKind::Tree),
            "commit" => Ok(ObjectKind::Commit),
            "tag" => Ok(ObjectKind::Tag),
            other => Err(EngineError::UnknownKind(other.to_string()).into()),
        }
    }

    /// Consume the `<kind> <byte-length>\0` header from a reader
    ///
    /// Returns the kind and the declared payload length. The caller is
    /// responsible for checking the declared length against what it reads.
    pub fn parse_header(reader: &mut impl BufRead) -> anyhow::Result<(Self, usize)> {
        let mut header = Vec::new();
        reader.read_until(b'\0', &mut header)?;

        if header.pop() != Some(b'\0') {
            return Err(anyhow::anyhow!("object header is missing its terminator"));
        }

        let header = String::from_utf8(header)?;
        let (kind, length) = header
            .split_once(' ')
            .ok_or_else(|| anyhow::anyhow!("malformed object header: {:?}", header))?;

        let kind = Self::try_parse(kind)?;
        let length = length
            .parse::<usize>()
            .map_err(|_| anyhow::anyhow!("malformed object length: {:?}", length))?;

        Ok((kind, length))
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_all_four_kinds() {
        for (text, kind) in [
            ("blob", ObjectKind::Blob),
            ("tree", ObjectKind::Tree),
            ("commit", ObjectKind::Commit),
            ("tag", ObjectKind::Tag),
        ] {
            assert_eq!(ObjectKind::try_parse(text).unwrap(), kind);
        }
    }

    #[test]
    fn unknown_kind_is_a_typed_error() {
        let err = ObjectKind::try_parse("banana").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EngineError>(),
            Some(EngineError::UnknownKind(k)) if k == "banana"
        ));
    }

    #[test]
    fn header_parse_returns_kind_and_length() {
        let mut reader = Cursor::new(b"commit 123\0tree ...".to_vec());
        let (kind, length) = ObjectKind::parse_header(&mut reader).unwrap();
        assert_eq!(kind, ObjectKind::Commit);
        assert_eq!(length, 123);
    }

    #[test]
    fn header_without_terminator_is_rejected() {
        let mut reader = Cursor::new(b"blob 5".to_vec());
        assert!(ObjectKind::parse_header(&mut reader).is_err());
    }
}
