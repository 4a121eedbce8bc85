use crate::artifacts::objects::commit::TrackedFiles;
use crate::artifacts::objects::object_id::ObjectId;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// How a path differs between two snapshots
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotChange {
    Added(ObjectId),
    Deleted(ObjectId),
    Modified { old: ObjectId, new: ObjectId },
}

impl SnapshotChange {
    /// Blob the path holds after the change, if any
    pub fn new_oid(&self) -> Option<&ObjectId> {
        match self {
            SnapshotChange::Added(new) | SnapshotChange::Modified { new, .. } => Some(new),
            SnapshotChange::Deleted(_) => None,
        }
    }
}

/// Changes turning `old` into `new`, ordered by path
pub fn compare(old: &TrackedFiles, new: &TrackedFiles) -> BTreeMap<PathBuf, SnapshotChange> {
    let mut changes = BTreeMap::new();

    for (path, old_oid) in old {
        match new.get(path) {
            None => {
                changes.insert(path.clone(), SnapshotChange::Deleted(old_oid.clone()));
            }
            Some(new_oid) if new_oid != old_oid => {
                changes.insert(
                    path.clone(),
                    SnapshotChange::Modified {
                        old: old_oid.clone(),
                        new: new_oid.clone(),
                    },
                );
            }
            Some(_) => {}
        }
    }

    for (path, new_oid) in new {
        if !old.contains_key(path) {
            changes.insert(path.clone(), SnapshotChange::Added(new_oid.clone()));
        }
    }

    changes
}
