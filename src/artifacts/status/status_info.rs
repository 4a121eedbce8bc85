use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use derive_new::new;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

pub type FileSet = BTreeSet<PathBuf>;

/// Change of a tracked or staged file that has not been staged
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WorkspaceChange {
    Modified,
    Deleted,
}

impl fmt::Display for WorkspaceChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkspaceChange::Modified => write!(f, "modified"),
            WorkspaceChange::Deleted => write!(f, "deleted"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusInfo {
    pub branches: Vec<BranchName>,
    pub current_branch: BranchName,
    pub staged_files: FileSet,
    pub removed_files: FileSet,
    pub workspace_changes: BTreeMap<PathBuf, WorkspaceChange>,
    pub untracked_files: FileSet,
}

#[derive(new)]
pub struct Status<'r> {
    repository: &'r Repository,
}

impl<'r> Status<'r> {
    pub fn initialize(&self, head: &Commit) -> anyhow::Result<StatusInfo> {
        let refs = self.repository.refs();
        let index = self.repository.index();
        let workspace_files = self
            .repository
            .workspace()
            .list_files()?
            .into_iter()
            .collect::<FileSet>();

        let mut workspace_changes = BTreeMap::new();

        for (path, staged_oid) in index.additions() {
            if let Some(change) = self.compare_with_workspace(path, staged_oid, &workspace_files)? {
                workspace_changes.insert(path.clone(), change);
            }
        }

        for (path, tracked_oid) in head.files() {
            if index.staged_addition(path).is_some() || index.is_staged_for_removal(path) {
                continue;
            }
            if let Some(change) = self.compare_with_workspace(path, tracked_oid, &workspace_files)? {
                workspace_changes.insert(path.clone(), change);
            }
        }

        // a file staged for removal and then recreated is untracked again
        let untracked_files = workspace_files
            .iter()
            .filter(|path| {
                index.is_staged_for_removal(path)
                    || (!head.tracks(path) && index.staged_addition(path).is_none())
            })
            .cloned()
            .collect();

        Ok(StatusInfo {
            branches: refs.list_branches()?,
            current_branch: refs.current_branch()?,
            staged_files: index.additions().keys().cloned().collect(),
            removed_files: index.removals().clone(),
            workspace_changes,
            untracked_files,
        })
    }

    fn compare_with_workspace(
        &self,
        path: &Path,
        expected: &ObjectId,
        workspace_files: &FileSet,
    ) -> anyhow::Result<Option<WorkspaceChange>> {
        if !workspace_files.contains(path) {
            return Ok(Some(WorkspaceChange::Deleted));
        }

        let blob = self.repository.workspace().parse_blob(path)?;
        if &blob.object_id()? != expected {
            Ok(Some(WorkspaceChange::Modified))
        } else {
            Ok(None)
        }
    }
}
