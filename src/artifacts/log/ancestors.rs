use crate::areas::database::Database;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use std::collections::{HashSet, VecDeque};

/// Commit reached by an [`Ancestors`] walk
#[derive(Debug, Clone)]
pub struct Ancestor {
    pub oid: ObjectId,
    pub commit: Commit,
    /// Number of parent edges from the starting commit
    pub distance: usize,
}

/// Breadth-first walk over a commit and all of its ancestors
///
/// First parents are queued before second parents and no commit is yielded
/// twice.
pub struct Ancestors<'r> {
    database: &'r Database,
    queue: VecDeque<(ObjectId, usize)>,
    seen: HashSet<ObjectId>,
}

impl<'r> Ancestors<'r> {
    pub fn new(database: &'r Database, start: ObjectId) -> Self {
        let seen = HashSet::from([start.clone()]);

        Self {
            database,
            queue: VecDeque::from([(start, 0)]),
            seen,
        }
    }
}

impl Iterator for Ancestors<'_> {
    type Item = anyhow::Result<Ancestor>;

    fn next(&mut self) -> Option<Self::Item> {
        let (oid, distance) = self.queue.pop_front()?;

        let commit = match self.database.load_commit(&oid) {
            Ok(commit) => commit,
            Err(error) => {
                self.queue.clear();
                return Some(Err(error));
            }
        };

        for parent in commit.parents() {
            if self.seen.insert(parent.clone()) {
                self.queue.push_back((parent.clone(), distance + 1));
            }
        }

        Some(Ok(Ancestor {
            oid,
            commit,
            distance,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::commit::TrackedFiles;
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;

    fn store(database: &Database, parents: Vec<ObjectId>, message: &str) -> ObjectId {
        let commit = Commit::new(
            parents,
            Commit::initial().timestamp(),
            TrackedFiles::new(),
            message.to_string(),
        );
        database.store(&commit).unwrap()
    }

    #[test]
    fn walks_first_parents_before_second_parents_once_each() {
        let dir = TempDir::new().unwrap();
        let database = Database::new(dir.path().join("objects").into_boxed_path());

        // root <- a <- b, root <- c, merge(b, c)
        let root = database.store(&Commit::initial()).unwrap();
        let a = store(&database, vec![root.clone()], "a");
        let b = store(&database, vec![a.clone()], "b");
        let c = store(&database, vec![root.clone()], "c");
        let merge = store(&database, vec![b.clone(), c.clone()], "merge");

        let visited = Ancestors::new(&database, merge.clone())
            .map(|ancestor| ancestor.map(|a| (a.oid, a.distance)))
            .collect::<anyhow::Result<Vec<_>>>()
            .unwrap();

        assert_eq!(
            visited,
            vec![(merge, 0), (b, 1), (c, 1), (a, 2), (root, 2)]
        );
    }
}
