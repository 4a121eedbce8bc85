//! Commit object
//!
//! Commits are immutable snapshots of the tracked files. They contain:
//! - Parent commit ID(s) (none for the root, two for merges)
//! - A timestamp with timezone
//! - The tracked map from file path to blob ID
//! - Commit message
//!
//! ## Format
//!
//! On disk:
//! ```text
//! commit <size>\0
//! parent <parent-sha>
//! timestamp <unix-seconds> <timezone>
//! file <blob-sha> <path>
//!
//! <commit message>
//! ```
//!
//! Every field takes part in the hash, so two commits with the same parents,
//! files, message and timestamp share one ID.

use crate::artifacts::objects::object::{Object, Packable, Unpackable, with_header};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::OBJECT_ID_LENGTH;
use crate::errors::TwigError;
use anyhow::Context;
use bytes::Bytes;
use chrono::{DateTime, FixedOffset, Utc};
use std::collections::BTreeMap;
use std::io::{BufRead, Read};
use std::path::{Path, PathBuf};

/// Environment variable pinning the timestamp of new commits
pub const COMMIT_DATE_ENV_VAR: &str = "TWIG_COMMIT_DATE";

/// Message of the root commit every repository starts with
pub const INITIAL_COMMIT_MESSAGE: &str = "initial commit";

/// Tracked map of a snapshot: file path -> blob ID, ordered by path
pub type TrackedFiles = BTreeMap<PathBuf, ObjectId>;

/// Timestamp for a new commit
///
/// Reads `TWIG_COMMIT_DATE` (RFC 2822 or `%Y-%m-%d %H:%M:%S %z`) and falls
/// back to the local clock when it is unset or unparsable.
pub fn commit_timestamp() -> DateTime<FixedOffset> {
    std::env::var(COMMIT_DATE_ENV_VAR)
        .ok()
        .and_then(|date_str| {
            DateTime::parse_from_rfc2822(&date_str)
                .or_else(|_| DateTime::parse_from_str(&date_str, "%Y-%m-%d %H:%M:%S %z"))
                .ok()
        })
        .unwrap_or_else(|| chrono::Local::now().fixed_offset())
}

/// Slim representation of a commit
///
/// Contains only essential information for lightweight operations like merge base finding.
/// This struct owns its data to allow for lazy loading from a cache with interior mutability.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SlimCommit {
    /// The commit's object ID
    pub oid: ObjectId,
    /// The commit's parent object IDs
    pub parents: Vec<ObjectId>,
    /// Commit timestamp (needed for comparison)
    pub timestamp: DateTime<FixedOffset>,
}

impl PartialOrd for SlimCommit {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SlimCommit {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.timestamp.cmp(&other.timestamp)
    }
}

/// Commit object
///
/// Represents a snapshot of the tracked files with its metadata.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    /// Parent commit IDs (empty for the root commit, two for merge commits)
    parents: Vec<ObjectId>,
    timestamp: DateTime<FixedOffset>,
    /// Tracked files of the snapshot
    files: TrackedFiles,
    message: String,
}

impl Commit {
    pub fn new(
        parents: Vec<ObjectId>,
        timestamp: DateTime<FixedOffset>,
        files: TrackedFiles,
        message: String,
    ) -> Self {
        Commit {
            parents,
            timestamp,
            files,
            message,
        }
    }

    /// The root commit: no parents, no files, dated at the Unix epoch
    pub fn initial() -> Self {
        let epoch = DateTime::<Utc>::UNIX_EPOCH.fixed_offset();
        Commit::new(
            Vec::new(),
            epoch,
            TrackedFiles::new(),
            INITIAL_COMMIT_MESSAGE.to_string(),
        )
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn parents(&self) -> &[ObjectId] {
        &self.parents
    }

    /// First parent, the one history follows
    pub fn parent(&self) -> Option<&ObjectId> {
        self.parents.first()
    }

    /// Second parent, set on merge commits only
    pub fn second_parent(&self) -> Option<&ObjectId> {
        self.parents.get(1)
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    pub fn files(&self) -> &TrackedFiles {
        &self.files
    }

    pub fn blob_for(&self, path: &Path) -> Option<&ObjectId> {
        self.files.get(path)
    }

    pub fn tracks(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }

    /// Format timestamp in human-readable form
    ///
    /// # Returns
    ///
    /// String like "Thu Jan 1 00:00:00 1970 +0000"
    pub fn readable_timestamp(&self) -> String {
        self.timestamp.format("%a %b %-d %H:%M:%S %Y %z").to_string()
    }

    pub fn slim(&self, oid: ObjectId) -> SlimCommit {
        SlimCommit {
            oid,
            parents: self.parents.clone(),
            timestamp: self.timestamp,
        }
    }

    fn content_lines(&self) -> Vec<String> {
        let mut lines = vec![];

        for parent in &self.parents {
            lines.push(format!("parent {}", parent.as_ref()));
        }
        lines.push(format!(
            "timestamp {} {}",
            self.timestamp.timestamp(),
            self.timestamp.format("%z")
        ));
        for (path, oid) in &self.files {
            lines.push(format!("file {} {}", oid.as_ref(), path.display()));
        }
        lines.push(String::new());
        lines.push(self.message.to_string());

        lines
    }
}

fn parse_timestamp(value: &str) -> anyhow::Result<DateTime<FixedOffset>> {
    let (seconds, timezone) = value
        .split_once(' ')
        .context("Invalid commit object: invalid timestamp line")?;
    let seconds = seconds
        .parse::<i64>()
        .map_err(|_| anyhow::anyhow!("Invalid timestamp"))?;
    let offset = parse_offset(timezone).ok_or_else(|| anyhow::anyhow!("Invalid timezone"))?;

    Ok(DateTime::from_timestamp(seconds, 0)
        .ok_or_else(|| anyhow::anyhow!("Invalid timestamp"))?
        .with_timezone(&offset))
}

// `+hhmm` / `-hhmm`
fn parse_offset(timezone: &str) -> Option<FixedOffset> {
    if timezone.len() != 5 || !timezone.is_ascii() {
        return None;
    }
    let sign = match &timezone[..1] {
        "+" => 1,
        "-" => -1,
        _ => return None,
    };
    let hours = timezone[1..3].parse::<i32>().ok()?;
    let minutes = timezone[3..5].parse::<i32>().ok()?;

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

fn parse_file_line(value: &str) -> anyhow::Result<(PathBuf, ObjectId)> {
    let (oid, path) = value
        .split_once(' ')
        .context("Invalid commit object: invalid file line")?;
    if oid.len() != OBJECT_ID_LENGTH || path.is_empty() {
        anyhow::bail!("Invalid commit object: invalid file line");
    }

    Ok((PathBuf::from(path), ObjectId::try_parse(oid.to_string())?))
}

impl Packable for Commit {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        if let Some(path) = self
            .files
            .keys()
            .find(|path| path.to_string_lossy().contains(['\n', '\r']))
        {
            return Err(TwigError::UnsupportedPath { path: path.clone() }.into());
        }

        let object_content = self.content_lines().join("\n");
        with_header(&self.object_type(), object_content.as_bytes())
    }
}

impl Unpackable for Commit {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let content = reader
            .bytes()
            .collect::<Result<Vec<u8>, std::io::Error>>()?;
        let content = String::from_utf8(content)?;

        let (headers, message) = content
            .split_once("\n\n")
            .context("Invalid commit object: missing message separator")?;

        let mut parents = Vec::new();
        let mut timestamp = None;
        let mut files = TrackedFiles::new();

        for line in headers.lines() {
            if let Some(parent) = line.strip_prefix("parent ") {
                parents.push(ObjectId::try_parse(parent.to_string())?);
            } else if let Some(value) = line.strip_prefix("timestamp ") {
                timestamp = Some(parse_timestamp(value)?);
            } else if let Some(value) = line.strip_prefix("file ") {
                let (path, oid) = parse_file_line(value)?;
                files.insert(path, oid);
            } else {
                anyhow::bail!("Invalid commit object: unexpected line '{line}'");
            }
        }

        let timestamp = timestamp.context("Invalid commit object: missing timestamp line")?;
        Ok(Self::new(parents, timestamp, files, message.to_string()))
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }

    fn display(&self) -> String {
        self.content_lines().join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};
    use std::io::Cursor;

    fn oid(seed: char) -> ObjectId {
        ObjectId::try_parse(seed.to_string().repeat(40)).unwrap()
    }

    #[fixture]
    fn timestamp() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc2822("Tue, 14 Oct 2025 09:30:00 +0200").unwrap()
    }

    #[fixture]
    fn commit(timestamp: DateTime<FixedOffset>) -> Commit {
        let mut files = TrackedFiles::new();
        files.insert(PathBuf::from("a.txt"), oid('a'));
        files.insert(PathBuf::from("dir/with space.txt"), oid('b'));

        Commit::new(vec![oid('c')], timestamp, files, "second\n\nbody".to_string())
    }

    fn reparse(commit: &Commit) -> Commit {
        let mut reader = Cursor::new(commit.serialize().unwrap());
        ObjectType::read_header(&mut reader).unwrap();
        Commit::deserialize(reader).unwrap()
    }

    #[test]
    fn every_repository_shares_the_root_commit() {
        let first = Commit::initial();
        let second = Commit::initial();

        assert_eq!(first.object_id().unwrap(), second.object_id().unwrap());
        assert_eq!(first.message(), "initial commit");
        assert_eq!(first.timestamp().timestamp(), 0);
        assert!(first.files().is_empty());
    }

    #[rstest]
    fn parsing_preserves_every_field(commit: Commit) {
        let parsed = reparse(&commit);

        assert_eq!(parsed, commit);
        assert_eq!(parsed.object_id().unwrap(), commit.object_id().unwrap());
        assert_eq!(parsed.timestamp().offset().local_minus_utc(), 2 * 3600);
    }

    #[rstest]
    fn any_field_changes_the_id(commit: Commit, timestamp: DateTime<FixedOffset>) {
        let id = commit.object_id().unwrap();

        let reworded = Commit::new(
            commit.parents().to_vec(),
            timestamp,
            commit.files().clone(),
            "other".to_string(),
        );
        let reparented = Commit::new(
            vec![oid('d')],
            timestamp,
            commit.files().clone(),
            commit.message().to_string(),
        );
        let merged = Commit::new(
            vec![oid('c'), oid('d')],
            timestamp,
            commit.files().clone(),
            commit.message().to_string(),
        );
        let later = Commit::new(
            commit.parents().to_vec(),
            timestamp + chrono::Duration::seconds(1),
            commit.files().clone(),
            commit.message().to_string(),
        );

        for changed in [reworded, reparented, merged, later] {
            assert_ne!(changed.object_id().unwrap(), id);
        }
    }

    #[rstest]
    #[case("tab\there.txt")]
    #[case(" leading space")]
    #[case("trailing space ")]
    #[case("ünïcødé/ファイル.txt")]
    #[case("file 0123 not-an-id")]
    #[case("parent")]
    fn unusual_paths_survive_parsing(timestamp: DateTime<FixedOffset>, #[case] path: &str) {
        let mut files = TrackedFiles::new();
        files.insert(PathBuf::from(path), oid('a'));
        let commit = Commit::new(vec![oid('c')], timestamp, files, "unusual".to_string());

        assert_eq!(reparse(&commit), commit);
    }

    #[rstest]
    #[case("line\nbreak.txt")]
    #[case("carriage\rreturn.txt")]
    fn paths_with_line_breaks_are_never_serialized(
        timestamp: DateTime<FixedOffset>,
        #[case] path: &str,
    ) {
        let mut files = TrackedFiles::new();
        files.insert(PathBuf::from(path), oid('a'));
        let commit = Commit::new(vec![oid('c')], timestamp, files, "broken".to_string());

        let error = commit.serialize().unwrap_err();

        assert!(matches!(
            error.downcast_ref::<TwigError>(),
            Some(TwigError::UnsupportedPath { .. })
        ));
    }

    #[test]
    fn merge_commits_expose_both_parents() {
        let merge = Commit::new(
            vec![oid('1'), oid('2')],
            DateTime::<Utc>::UNIX_EPOCH.fixed_offset(),
            TrackedFiles::new(),
            "Merged b into a.".to_string(),
        );
        let parsed = reparse(&merge);

        assert!(parsed.is_merge());
        assert_eq!(parsed.parent(), Some(&oid('1')));
        assert_eq!(parsed.second_parent(), Some(&oid('2')));
    }

    #[test]
    fn readable_timestamp_uses_log_format() {
        assert_eq!(
            Commit::initial().readable_timestamp(),
            "Thu Jan 1 00:00:00 1970 +0000"
        );
    }
}
