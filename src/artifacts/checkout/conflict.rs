use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use bytes::Bytes;

/// What an untracked working-tree path looks like to a migration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UntrackedPath {
    Missing,
    File(Bytes),
    /// A directory, or a file sitting where a parent directory must go
    Blocking,
}

/// When an untracked path stands in the way of a migration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstructionPolicy {
    /// Only when the untracked file's bytes differ from what would be written
    ContentSensitive,
    /// Whenever anything exists at the path
    Strict,
}

impl ObstructionPolicy {
    pub fn obstructs(&self, untracked: &UntrackedPath, target: &ObjectId) -> anyhow::Result<bool> {
        match (self, untracked) {
            (_, UntrackedPath::Missing) => Ok(false),
            (_, UntrackedPath::Blocking) => Ok(true),
            (ObstructionPolicy::Strict, UntrackedPath::File(_)) => Ok(true),
            (ObstructionPolicy::ContentSensitive, UntrackedPath::File(content)) => {
                Ok(&Blob::new(content.clone()).object_id()? != target)
            }
        }
    }
}
