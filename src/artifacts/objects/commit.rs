//! Commit objects
//!
//! A commit records a tree, its parents (zero for roots, one for ordinary
//! commits, two for merges), author/committer identities with timestamps, and
//! a message. The payload is git-shaped text:
//!
//! ```text
//! tree <oid>
//! parent <oid>
//! author <name> <<email>> <unix-ts> <tz>
//! committer <name> <<email>> <unix-ts> <tz>
//!
//! <message>
//! ```
//!
//! Parents must already exist when a commit is written, which keeps the graph
//! acyclic by construction.

use crate::artifacts::objects::object::{pack_with_header, Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_kind::ObjectKind;
use anyhow::Context;
use bytes::Bytes;
use std::io::BufRead;

/// Author or committer identity with timestamp
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Author {
    name: String,
    email: String,
    timestamp: chrono::DateTime<chrono::FixedOffset>,
}

impl Author {
    /// Identity stamped with the current local time
    pub fn new(name: String, email: String) -> Self {
        Author {
            name,
            email,
            timestamp: chrono::Local::now().fixed_offset(),
        }
    }

    pub fn new_with_timestamp(
        name: String,
        email: String,
        timestamp: chrono::DateTime<chrono::FixedOffset>,
    ) -> Self {
        Author {
            name,
            email,
            timestamp,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// "Name <email@example.com>"
    pub fn display_name(&self) -> String {
        format!("{} <{}>", self.name, self.email)
    }

    /// "Name <email> <unix-ts> <tz>", the header/reflog form
    pub fn display(&self) -> String {
        format!(
            "{} <{}> {} {}",
            self.name,
            self.email,
            self.timestamp.timestamp(),
            self.timestamp.format("%z")
        )
    }

    /// "Mon Jan 1 12:34:56 2024 +0000"
    pub fn readable_timestamp(&self) -> String {
        self.timestamp
            .format("%a %b %-d %H:%M:%S %Y %z")
            .to_string()
    }

    pub fn timestamp(&self) -> chrono::DateTime<chrono::FixedOffset> {
        self.timestamp
    }
}

impl TryFrom<&str> for Author {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        // "name <email> timestamp timezone" — split from the right so names
        // with spaces survive
        let parts: Vec<&str> = value.rsplitn(3, ' ').collect();
        if parts.len() < 3 {
            return Err(anyhow::anyhow!("invalid identity line: {:?}", value));
        }

        let timezone = parts[0];
        let timestamp = parts[1]
            .parse::<i64>()
            .map_err(|_| anyhow::anyhow!("invalid identity timestamp: {:?}", parts[1]))?;
        let name_email = parts[2];

        let email_start = name_email
            .find('<')
            .ok_or_else(|| anyhow::anyhow!("identity line is missing '<'"))?;
        let email_end = name_email
            .find('>')
            .ok_or_else(|| anyhow::anyhow!("identity line is missing '>'"))?;

        let name = name_email[..email_start].trim().to_string();
        let email = name_email[email_start + 1..email_end].to_string();

        let timestamp =
            chrono::DateTime::parse_from_str(&format!("{} {}", timestamp, timezone), "%s %z")
                .map_err(|_| anyhow::anyhow!("invalid identity timezone: {:?}", timezone))?;

        Ok(Author {
            name,
            email,
            timestamp,
        })
    }
}

/// Parents, tree and timestamp of a commit, without the rest
///
/// Graph algorithms only need this much; the commit cache hands these out so
/// repeated traversals stay cheap.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SlimCommit {
    pub oid: ObjectId,
    pub parents: Vec<ObjectId>,
    pub timestamp: chrono::DateTime<chrono::FixedOffset>,
}

impl PartialOrd for SlimCommit {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SlimCommit {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.timestamp
            .cmp(&other.timestamp)
            .then_with(|| self.oid.cmp(&other.oid))
    }
}

/// Commit object
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    parents: Vec<ObjectId>,
    tree_oid: ObjectId,
    author: Author,
    committer: Author,
    message: String,
}

impl Commit {
    pub fn new(parents: Vec<ObjectId>, tree_oid: ObjectId, author: Author, message: String) -> Self {
        Commit {
            parents,
            tree_oid,
            author: author.clone(),
            committer: author,
            message,
        }
    }

    pub fn new_with_committer(
        parents: Vec<ObjectId>,
        tree_oid: ObjectId,
        author: Author,
        committer: Author,
        message: String,
    ) -> Self {
        Commit {
            parents,
            tree_oid,
            author,
            committer,
            message,
        }
    }

    /// First line of the message
    pub fn short_message(&self) -> String {
        self.message.lines().next().unwrap_or("").to_string()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn tree_oid(&self) -> &ObjectId {
        &self.tree_oid
    }

    pub fn parent(&self) -> Option<&ObjectId> {
        self.parents.first()
    }

    pub fn parents(&self) -> &[ObjectId] {
        &self.parents
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    pub fn author(&self) -> &Author {
        &self.author
    }

    pub fn committer(&self) -> &Author {
        &self.committer
    }

    pub fn timestamp(&self) -> chrono::DateTime<chrono::FixedOffset> {
        self.author.timestamp()
    }

    pub fn slim(&self) -> anyhow::Result<SlimCommit> {
        Ok(SlimCommit {
            oid: self.object_id()?,
            parents: self.parents.clone(),
            timestamp: self.timestamp(),
        })
    }

    fn payload_lines(&self) -> Vec<String> {
        let mut lines = vec![format!("tree {}", self.tree_oid)];
        for parent in &self.parents {
            lines.push(format!("parent {}", parent));
        }
        lines.push(format!("author {}", self.author.display()));
        lines.push(format!("committer {}", self.committer.display()));
        lines.push(String::new());
        lines.push(self.message.to_string());
        lines
    }
}

impl Packable for Commit {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let payload = self.payload_lines().join("\n");
        Ok(pack_with_header(ObjectKind::Commit, payload.as_bytes()))
    }
}

impl Unpackable for Commit {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let content = reader.bytes().collect::<Result<Vec<u8>, std::io::Error>>()?;
        let content = String::from_utf8(content)?;
        let mut lines = content.lines();

        let tree_line = lines.next().context("commit is missing its tree line")?;
        let tree_oid = ObjectId::try_parse(
            tree_line
                .strip_prefix("tree ")
                .context("malformed commit tree line")?
                .to_string(),
        )?;

        let mut parents = Vec::new();
        let mut next_line = lines.next().context("commit is missing its author line")?;
        while let Some(parent) = next_line.strip_prefix("parent ") {
            parents.push(ObjectId::try_parse(parent.to_string())?);
            next_line = lines.next().context("commit is missing its author line")?;
        }

        let author = Author::try_from(
            next_line
                .strip_prefix("author ")
                .context("malformed commit author line")?,
        )?;

        let committer_line = lines.next().context("commit is missing its committer line")?;
        let committer = Author::try_from(
            committer_line
                .strip_prefix("committer ")
                .context("malformed commit committer line")?,
        )?;

        // blank separator
        lines.next();

        let message = lines.collect::<Vec<&str>>().join("\n");
        Ok(Commit {
            parents,
            tree_oid,
            author,
            committer,
            message,
        })
    }
}

impl Object for Commit {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Commit
    }

    fn display(&self) -> String {
        self.payload_lines().join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn fixed_author() -> Author {
        let timestamp = chrono::DateTime::parse_from_rfc3339("2024-03-01T10:00:00+02:00").unwrap();
        Author::new_with_timestamp("Ada Lovelace".into(), "ada@example.com".into(), timestamp)
    }

    fn oid(seed: u8) -> ObjectId {
        ObjectId::try_parse(format!("{:02x}", seed).repeat(20)).unwrap()
    }

    #[test]
    fn author_display_roundtrip() {
        let author = fixed_author();
        let parsed = Author::try_from(author.display().as_str()).unwrap();
        assert_eq!(parsed.name(), "Ada Lovelace");
        assert_eq!(parsed.timestamp().timestamp(), author.timestamp().timestamp());
    }

    #[test]
    fn root_commit_roundtrip() {
        let commit = Commit::new(vec![], oid(1), fixed_author(), "first".into());
        let bytes = commit.serialize().unwrap();

        let mut reader = Cursor::new(bytes);
        let (kind, _) = ObjectKind::parse_header(&mut reader).unwrap();
        assert_eq!(kind, ObjectKind::Commit);

        let parsed = Commit::deserialize(reader).unwrap();
        assert!(parsed.parents().is_empty());
        assert_eq!(parsed.tree_oid(), &oid(1));
        assert_eq!(parsed.message(), "first");
        assert_eq!(parsed.object_id().unwrap(), commit.object_id().unwrap());
    }

    #[test]
    fn merge_commit_keeps_both_parents_in_order() {
        let commit = Commit::new(
            vec![oid(2), oid(3)],
            oid(1),
            fixed_author(),
            "Merge branch 'feature'".into(),
        );
        let bytes = commit.serialize().unwrap();

        let mut reader = Cursor::new(bytes);
        ObjectKind::parse_header(&mut reader).unwrap();
        let parsed = Commit::deserialize(reader).unwrap();

        assert!(parsed.is_merge());
        assert_eq!(parsed.parents(), &[oid(2), oid(3)]);
    }

    #[test]
    fn multi_line_messages_survive() {
        let commit = Commit::new(
            vec![oid(2)],
            oid(1),
            fixed_author(),
            "subject\n\nbody line one\nbody line two".into(),
        );
        let bytes = commit.serialize().unwrap();

        let mut reader = Cursor::new(bytes);
        ObjectKind::parse_header(&mut reader).unwrap();
        let parsed = Commit::deserialize(reader).unwrap();

        assert_eq!(parsed.short_message(), "subject");
        assert_eq!(parsed.message(), "subject\n\nbody line one\nbody line two");
    }

    #[test]
    fn slim_commits_order_by_timestamp_then_digest() {
        let early = SlimCommit {
            oid: oid(9),
            parents: vec![],
            timestamp: chrono::DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z").unwrap(),
        };
        let late = SlimCommit {
            oid: oid(1),
            parents: vec![],
            timestamp: chrono::DateTime::parse_from_rfc3339("2024-06-01T00:00:00Z").unwrap(),
        };
        assert!(early < late);
    }
}
