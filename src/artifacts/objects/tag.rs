//! Annotated tag objects
//!
//! Lightweight tags are plain refs and never reach this module. An annotated
//! tag is its own stored object carrying the tagged object id, its kind, the
//! tag name, the tagger identity and a message:
//!
//! ```text
//! object <oid>
//! type commit
//! tag v1.0
//! tagger <name> <<email>> <unix-ts> <tz>
//!
//! <message>
//! ```

use crate::artifacts::objects::commit::Author;
use crate::artifacts::objects::object::{pack_with_header, Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_kind::ObjectKind;
use anyhow::Context;
use bytes::Bytes;
use std::io::BufRead;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Tag {
    object: ObjectId,
    target_kind: ObjectKind,
    name: String,
    tagger: Author,
    message: String,
}

impl Tag {
    pub fn new(
        object: ObjectId,
        target_kind: ObjectKind,
        name: String,
        tagger: Author,
        message: String,
    ) -> Self {
        Tag {
            object,
            target_kind,
            name,
            tagger,
            message,
        }
    }

    pub fn object(&self) -> &ObjectId {
        &self.object
    }

    pub fn target_kind(&self) -> ObjectKind {
        self.target_kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tagger(&self) -> &Author {
        &self.tagger
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    fn payload_lines(&self) -> Vec<String> {
        vec![
            format!("object {}", self.object),
            format!("type {}", self.target_kind.as_str()),
            format!("tag {}", self.name),
            format!("tagger {}", self.tagger.display()),
            String::new(),
            self.message.to_string(),
        ]
    }
}

impl Packable for Tag {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let payload = self.payload_lines().join("\n");
        Ok(pack_with_header(ObjectKind::Tag, payload.as_bytes()))
    }
}

impl Unpackable for Tag {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let content = reader.bytes().collect::<Result<Vec<u8>, std::io::Error>>()?;
        let content = String::from_utf8(content)?;
        let mut lines = content.lines();

        let object = ObjectId::try_parse(
            lines
                .next()
                .and_then(|line| line.strip_prefix("object "))
                .context("tag is missing its object line")?
                .to_string(),
        )?;
        let target_kind = ObjectKind::try_parse(
            lines
                .next()
                .and_then(|line| line.strip_prefix("type "))
                .context("tag is missing its type line")?,
        )?;
        let name = lines
            .next()
            .and_then(|line| line.strip_prefix("tag "))
            .context("tag is missing its name line")?
            .to_string();
        let tagger = Author::try_from(
            lines
                .next()
                .and_then(|line| line.strip_prefix("tagger "))
                .context("tag is missing its tagger line")?,
        )?;

        // blank separator
        lines.next();

        let message = lines.collect::<Vec<&str>>().join("\n");
        Ok(Tag {
            object,
            target_kind,
            name,
            tagger,
            message,
        })
    }
}

impl Object for Tag {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Tag
    }

    fn display(&self) -> String {
        self.payload_lines().join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn serialize_deserialize_roundtrip() {
        let timestamp = chrono::DateTime::parse_from_rfc3339("2024-03-01T10:00:00+00:00").unwrap();
        let tagger =
            Author::new_with_timestamp("Ada Lovelace".into(), "ada@example.com".into(), timestamp);
        let tag = Tag::new(
            ObjectId::try_parse("ab".repeat(20)).unwrap(),
            ObjectKind::Commit,
            "v1.0".into(),
            tagger,
            "first release".into(),
        );

        let bytes = tag.serialize().unwrap();
        let mut reader = Cursor::new(bytes);
        let (kind, _) = ObjectKind::parse_header(&mut reader).unwrap();
        assert_eq!(kind, ObjectKind::Tag);

        let parsed = Tag::deserialize(reader).unwrap();
        assert_eq!(parsed.name(), "v1.0");
        assert_eq!(parsed.target_kind(), ObjectKind::Commit);
        assert_eq!(parsed.message(), "first release");
        assert_eq!(parsed.object_id().unwrap(), tag.object_id().unwrap());
    }
}
