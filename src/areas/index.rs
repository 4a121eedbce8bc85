//! Staging area
//!
//! The index holds the changes the next commit applies on top of the current
//! branch tip: pending additions (path -> blob ID) and pending removals. A path
//! is never in both at once.
//!
//! ## Index File Format
//!
//! The index file contains:
//! - Header: Signature, version, and entry count
//! - Entries: additions then removals, each sorted by path
//! - Checksum: SHA-1 hash of the entire index for integrity verification

use crate::artifacts::index::checksum::Checksum;
use crate::artifacts::index::index_header::IndexHeader;
use crate::artifacts::index::staged_entry::{ENTRY_FIXED_SIZE, StagedEntry};
use crate::artifacts::index::{HEADER_SIZE, SIGNATURE, VERSION};
use crate::artifacts::objects::commit::TrackedFiles;
use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::TwigError;
use anyhow::anyhow;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::DerefMut;
use std::path::{Path, PathBuf};

/// Staging area
///
/// Loaded from disk with [`Index::rehydrate`] and persisted with
/// [`Index::write_updates`].
#[derive(Debug, Clone)]
pub struct Index {
    /// Path to the index file (typically `.twig/index`)
    path: Box<Path>,
    additions: BTreeMap<PathBuf, ObjectId>,
    removals: BTreeSet<PathBuf>,
    /// Flag indicating if the index has been modified since loading
    changed: bool,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            additions: BTreeMap::new(),
            removals: BTreeSet::new(),
            changed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn additions(&self) -> &BTreeMap<PathBuf, ObjectId> {
        &self.additions
    }

    pub fn removals(&self) -> &BTreeSet<PathBuf> {
        &self.removals
    }

    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.removals.is_empty()
    }

    pub fn staged_addition(&self, path: &Path) -> Option<&ObjectId> {
        self.additions.get(path)
    }

    pub fn is_staged_for_removal(&self, path: &Path) -> bool {
        self.removals.contains(path)
    }

    /// Drop every pending change
    pub fn clear(&mut self) {
        if !self.is_empty() {
            self.changed = true;
        }
        self.additions.clear();
        self.removals.clear();
    }

    /// Stage `path` with content `oid`
    ///
    /// Clears a pending removal of the path. When `oid` equals the blob the
    /// current tip records for the path there is nothing to commit, so any
    /// pending addition is dropped instead of recorded.
    pub fn stage(&mut self, path: PathBuf, oid: ObjectId, tip_oid: Option<&ObjectId>) {
        self.removals.remove(&path);

        if tip_oid == Some(&oid) {
            self.additions.remove(&path);
        } else {
            self.additions.insert(path, oid);
        }
        self.changed = true;
    }

    /// Unstage `path`, scheduling its removal when the tip tracks it
    ///
    /// Returns whether the path is tracked by the tip, in which case the
    /// caller must also delete the working-tree file.
    pub fn unstage(&mut self, path: &Path, tracked_by_tip: bool) -> crate::errors::Result<bool> {
        let was_staged = self.additions.remove(path).is_some();

        if !was_staged && !tracked_by_tip {
            return Err(TwigError::NothingToRemove {
                path: path.to_path_buf(),
            });
        }

        if tracked_by_tip {
            self.removals.insert(path.to_path_buf());
        }
        self.changed = true;

        Ok(tracked_by_tip)
    }

    /// Files of the next commit: the tip's files with the pending changes applied
    pub fn build_next_snapshot(&self, tip_files: &TrackedFiles) -> crate::errors::Result<TrackedFiles> {
        if self.is_empty() {
            return Err(TwigError::NoChanges);
        }

        let mut files = tip_files.clone();
        for (path, oid) in &self.additions {
            files.insert(path.clone(), oid.clone());
        }
        for path in &self.removals {
            files.remove(path);
        }

        Ok(files)
    }

    /// Load the index from disk
    ///
    /// Reads the index file, parses the header and entries, and verifies
    /// the checksum. If the file doesn't exist or is empty, the staging area
    /// is empty.
    ///
    /// # Locking
    ///
    /// Acquires a shared lock on the index file during reading.
    pub fn rehydrate(&mut self) -> anyhow::Result<()> {
        self.additions.clear();
        self.removals.clear();
        self.changed = false;

        if !self.path().exists() {
            return Ok(());
        }

        let mut index_file = std::fs::OpenOptions::new().read(true).open(self.path())?;
        let mut lock = file_guard::lock(&mut index_file, file_guard::Lock::Shared, 0, 1)?;

        // if the index file is empty, return early
        if lock.deref_mut().metadata()?.len() == 0 {
            return Ok(());
        }

        let mut reader = Checksum::new(lock);
        let parsed = self
            .parse_header(&mut reader)
            .and_then(|entries_count| self.parse_entries(entries_count, &mut reader))
            .and_then(|_| reader.verify());

        parsed.map_err(|error| TwigError::invariant(format!("corrupt index: {error}")).into())
    }

    fn parse_header(&self, reader: &mut Checksum) -> anyhow::Result<u32> {
        let header_bytes = reader.read(HEADER_SIZE)?;
        let header = IndexHeader::deserialize(std::io::Cursor::new(header_bytes))?;

        if header.marker != SIGNATURE {
            return Err(anyhow!("Invalid index file signature"));
        }

        if header.version != VERSION {
            return Err(anyhow!(
                "Unsupported index file version: {}",
                header.version
            ));
        }

        Ok(header.entries_count)
    }

    fn parse_entries(&mut self, entries_count: u32, reader: &mut Checksum) -> anyhow::Result<()> {
        for _ in 0..entries_count {
            let fixed = reader.read(ENTRY_FIXED_SIZE)?;
            let path_length = StagedEntry::path_length(&fixed)?;
            let path = reader.read(path_length)?;

            let entry_bytes = [fixed.to_vec(), path.to_vec()].concat();
            match StagedEntry::deserialize(std::io::Cursor::new(entry_bytes))? {
                StagedEntry::Addition { path, oid } => {
                    self.additions.insert(path, oid);
                }
                StagedEntry::Removal { path } => {
                    self.removals.insert(path);
                }
            }
        }

        Ok(())
    }

    fn entries(&self) -> impl Iterator<Item = StagedEntry> + '_ {
        let additions = self
            .additions
            .iter()
            .map(|(path, oid)| StagedEntry::Addition {
                path: path.clone(),
                oid: oid.clone(),
            });
        let removals = self
            .removals
            .iter()
            .map(|path| StagedEntry::Removal { path: path.clone() });

        additions.chain(removals)
    }

    /// Persist the staging area
    ///
    /// # Locking
    ///
    /// Acquires an exclusive lock on the index file during writing.
    pub fn write_updates(&mut self) -> anyhow::Result<()> {
        if !self.changed && self.path().exists() {
            return Ok(());
        }

        let mut index_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(self.path())?;
        let lock = file_guard::lock(&mut index_file, file_guard::Lock::Exclusive, 0, 1)?;

        let mut writer = Checksum::new(lock);

        let entries_count = (self.additions.len() + self.removals.len()) as u32;
        let header = IndexHeader {
            entries_count,
            ..IndexHeader::empty()
        };
        writer.write(&header.serialize()?)?;

        for entry in self.entries() {
            writer.write(&entry.serialize()?)?;
        }

        writer.write_checksum()?;
        self.changed = false;

        Ok(())
    }
}
