use crate::artifacts::objects::object_id::ObjectId;
use bytes::{BufMut, Bytes, BytesMut};

pub const CONFLICT_HEAD_MARKER: &str = "<<<<<<< HEAD\n";
pub const CONFLICT_SEPARATOR: &str = "=======\n";
pub const CONFLICT_END_MARKER: &str = ">>>>>>>\n";

/// What a merge does with one path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeAction {
    /// The current branch's version (or absence) stands
    Keep,
    /// Stage the given branch's blob
    TakeOther(ObjectId),
    /// Stage the removal of the path
    Remove,
    /// Both sides changed the path differently
    Conflict {
        head: Option<ObjectId>,
        other: Option<ObjectId>,
    },
}

/// Classify a path by its blob in the split point, the current tip and the
/// given tip
pub fn classify(
    split: Option<&ObjectId>,
    head: Option<&ObjectId>,
    other: Option<&ObjectId>,
) -> MergeAction {
    if head == other {
        return MergeAction::Keep;
    }
    if split == head {
        return match other {
            Some(oid) => MergeAction::TakeOther(oid.clone()),
            None => MergeAction::Remove,
        };
    }
    if split == other {
        return MergeAction::Keep;
    }

    MergeAction::Conflict {
        head: head.cloned(),
        other: other.cloned(),
    }
}

/// Working-tree content of a conflicted path; an absent side is empty
pub fn conflict_content(head: &[u8], other: &[u8]) -> Bytes {
    let mut content = BytesMut::with_capacity(
        CONFLICT_HEAD_MARKER.len()
            + head.len()
            + CONFLICT_SEPARATOR.len()
            + other.len()
            + CONFLICT_END_MARKER.len(),
    );
    content.put(CONFLICT_HEAD_MARKER.as_bytes());
    content.put(head);
    content.put(CONFLICT_SEPARATOR.as_bytes());
    content.put(other);
    content.put(CONFLICT_END_MARKER.as_bytes());

    content.freeze()
}
