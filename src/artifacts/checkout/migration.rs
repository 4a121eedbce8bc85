//! Working-tree migration between two snapshots
//!
//! ## Safety
//!
//! All operations are planned before execution: every path that would be
//! written is checked against the untracked files of the working tree, and
//! the complete list of obstructions is reported before anything changes.

use crate::areas::repository::Repository;
use crate::artifacts::checkout::conflict::{ObstructionPolicy, UntrackedPath};
use crate::artifacts::diff::snapshot_diff::{self, SnapshotChange};
use crate::artifacts::objects::commit::TrackedFiles;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::TwigError;
use bytes::Bytes;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Type of file system action required for a migration
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActionType {
    /// Create new file
    Add,
    /// Delete file
    Delete,
    /// Modify existing file
    Modify,
}

/// Set of planned actions grouped by type
pub type ActionsSet = HashMap<ActionType, Vec<(PathBuf, Option<ObjectId>)>>;

/// Migration planner and executor
///
/// Moves the working tree from the `current` snapshot (whose files are the
/// tracked ones) to the `target` snapshot.
pub struct Migration<'r> {
    repository: &'r Repository,
    current: &'r TrackedFiles,
    changes: BTreeMap<PathBuf, SnapshotChange>,
    policy: ObstructionPolicy,
    /// Planned file system actions
    actions: ActionsSet,
    /// Untracked paths in the way
    obstructions: BTreeSet<PathBuf>,
}

impl<'r> Migration<'r> {
    pub fn new(
        repository: &'r Repository,
        current: &'r TrackedFiles,
        target: &TrackedFiles,
        policy: ObstructionPolicy,
    ) -> Self {
        let actions = HashMap::from([
            (ActionType::Add, Vec::new()),
            (ActionType::Delete, Vec::new()),
            (ActionType::Modify, Vec::new()),
        ]);

        Self {
            repository,
            current,
            changes: snapshot_diff::compare(current, target),
            policy,
            actions,
            obstructions: BTreeSet::new(),
        }
    }

    pub fn actions(&self) -> &ActionsSet {
        &self.actions
    }

    /// Plan, check and apply the migration
    ///
    /// Fails with `UntrackedObstruction` listing every obstructed path
    /// before the working tree is touched.
    pub fn apply_changes(&mut self) -> anyhow::Result<()> {
        self.plan_changes()?;

        debug!(
            added = self.actions[&ActionType::Add].len(),
            modified = self.actions[&ActionType::Modify].len(),
            deleted = self.actions[&ActionType::Delete].len(),
            "applying migration"
        );
        self.repository.workspace().apply_migration(self)
    }

    fn plan_changes(&mut self) -> anyhow::Result<()> {
        let changes = self
            .changes
            .iter()
            .map(|(path, change)| (path.clone(), change.clone()))
            .collect::<Vec<_>>();

        for (path, change) in &changes {
            self.check_for_obstruction(path, change)?;
            self.record_change(path, change);
        }

        if !self.obstructions.is_empty() {
            return Err(TwigError::UntrackedObstruction {
                paths: self.obstructions.iter().cloned().collect(),
            }
            .into());
        }

        Ok(())
    }

    fn check_for_obstruction(&mut self, path: &Path, change: &SnapshotChange) -> anyhow::Result<()> {
        let SnapshotChange::Added(target) = change else {
            // deleted and modified paths are tracked by the current snapshot
            return Ok(());
        };

        if let Some(parent) = self.untracked_parent(path) {
            self.obstructions.insert(parent);
            return Ok(());
        }

        let untracked = self.inspect_untracked(path)?;
        if self.policy.obstructs(&untracked, target)? {
            self.obstructions.insert(path.to_path_buf());
        }

        Ok(())
    }

    fn inspect_untracked(&self, path: &Path) -> anyhow::Result<UntrackedPath> {
        let workspace = self.repository.workspace();

        if workspace.is_file(path) {
            Ok(UntrackedPath::File(workspace.read_file(path)?))
        } else if workspace.exists(path) {
            Ok(UntrackedPath::Blocking)
        } else {
            Ok(UntrackedPath::Missing)
        }
    }

    /// Untracked file sitting where one of `path`'s parent directories must go
    fn untracked_parent(&self, path: &Path) -> Option<PathBuf> {
        path.parent()?
            .ancestors()
            .filter(|parent| !parent.as_os_str().is_empty())
            .find(|parent| {
                self.repository.workspace().is_file(parent) && !self.current.contains_key(*parent)
            })
            .map(Path::to_path_buf)
    }

    fn record_change(&mut self, path: &Path, change: &SnapshotChange) {
        let action = match change {
            SnapshotChange::Added(_) => ActionType::Add,
            SnapshotChange::Deleted(_) => ActionType::Delete,
            SnapshotChange::Modified { .. } => ActionType::Modify,
        };

        self.actions
            .entry(action)
            .or_default()
            .push((path.to_path_buf(), change.new_oid().cloned()));
    }

    pub fn load_blob_data(&self, object_id: &ObjectId) -> anyhow::Result<Bytes> {
        Ok(self
            .repository
            .database()
            .load_blob(object_id)?
            .into_content())
    }
}
