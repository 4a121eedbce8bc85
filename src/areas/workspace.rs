use crate::artifacts::checkout::migration::{ActionType, Migration};
use crate::artifacts::objects::blob::Blob;
use crate::errors::TwigError;
use crate::REPOSITORY_DIR;
use anyhow::Context;
use bytes::Bytes;
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const IGNORED_PATHS: [&str; 1] = [REPOSITORY_DIR];

#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `path` relative to the working tree root; relative input is kept as is
    pub fn relative_path(&self, path: &Path) -> PathBuf {
        path.strip_prefix(self.path.as_ref())
            .unwrap_or(path)
            .components()
            .filter(|component| !matches!(component, std::path::Component::CurDir))
            .collect()
    }

    pub fn parse_blob(&self, path: &Path) -> anyhow::Result<Blob> {
        Ok(Blob::new(self.read_file(path)?))
    }

    pub fn exists(&self, path: &Path) -> bool {
        self.path.join(path).exists()
    }

    pub fn is_file(&self, path: &Path) -> bool {
        self.path.join(path).is_file()
    }

    /// Every file of the working tree relative to its root, sorted by path
    pub fn list_files(&self) -> anyhow::Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        let walker = WalkDir::new(&self.path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !Self::is_ignored(entry.file_name().to_string_lossy().as_ref()));

        for entry in walker {
            let entry = entry.context("Unable to list the working tree")?;
            if entry.file_type().is_file()
                && let Ok(relative) = entry.path().strip_prefix(self.path.as_ref())
            {
                files.push(relative.to_path_buf());
            }
        }

        files.sort();
        Ok(files)
    }

    fn is_ignored(name: &str) -> bool {
        IGNORED_PATHS.contains(&name)
    }

    pub fn read_file(&self, file_path: &Path) -> anyhow::Result<Bytes> {
        let content = std::fs::read(self.path.join(file_path))
            .with_context(|| format!("Failed to read file: {:?}", file_path))?;

        Ok(Bytes::from(content))
    }

    /// Write `data` to `file_path`, creating parent directories as needed
    pub fn write_file(&self, file_path: &Path, data: &[u8]) -> anyhow::Result<()> {
        let path = self.path.join(file_path);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create parent directories for: {:?}", file_path)
            })?;
        }
        if path.is_dir() {
            return Err(TwigError::UntrackedObstruction {
                paths: vec![file_path.to_path_buf()],
            }
            .into());
        }

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .with_context(|| format!("Failed to open file: {:?}", file_path))?;

        file.write_all(data)
            .with_context(|| format!("Failed to write to file: {:?}", file_path))
    }

    /// Delete `file_path` if present and prune the directories it leaves empty
    pub fn remove_file(&self, file_path: &Path) -> anyhow::Result<()> {
        let path = self.path.join(file_path);

        if path.is_file() {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to remove file: {:?}", file_path))?;
        }

        self.prune_empty_parent_dirs(&path)
    }

    fn prune_empty_parent_dirs(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent()
            && parent != self.path.as_ref()
            && parent.is_dir()
            && parent.read_dir()?.next().is_none()
        {
            std::fs::remove_dir(parent)
                .with_context(|| format!("Failed to remove empty directory: {:?}", parent))?;
            self.prune_empty_parent_dirs(parent)?;
        }

        Ok(())
    }

    // Deletions go first so that a deleted file may give way to a directory
    // of the same name.
    pub fn apply_migration(&self, migration: &Migration) -> anyhow::Result<()> {
        for action in [ActionType::Delete, ActionType::Modify, ActionType::Add] {
            self.apply_migration_action_set(migration, action)?;
        }

        Ok(())
    }

    fn apply_migration_action_set(
        &self,
        migration: &Migration,
        action: ActionType,
    ) -> anyhow::Result<()> {
        let entries = migration
            .actions()
            .get(&action)
            .ok_or_else(|| anyhow::anyhow!("Invalid action type"))?;

        for (file_path, oid) in entries {
            match (&action, oid) {
                (ActionType::Delete, None) => self.remove_file(file_path)?,
                (ActionType::Add | ActionType::Modify, Some(oid)) => {
                    let data = migration.load_blob_data(oid)?;
                    self.remove_blocking_file_parents(file_path)?;
                    self.write_file(file_path, &data)?;
                }
                _ => anyhow::bail!("Invalid action and entry combination"),
            }
        }

        Ok(())
    }

    // a tracked file left in place of a directory the target needs
    fn remove_blocking_file_parents(&self, file_path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = file_path.parent() {
            for ancestor in parent.ancestors().filter(|a| !a.as_os_str().is_empty()) {
                let path = self.path.join(ancestor);
                if path.is_file() {
                    std::fs::remove_file(&path)
                        .with_context(|| format!("Failed to remove file: {:?}", ancestor))?;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;

    #[test]
    fn listing_skips_the_repository_directory() {
        let dir = TempDir::new().unwrap();
        dir.child("b.txt").write_str("b").unwrap();
        dir.child("a/c.txt").write_str("c").unwrap();
        dir.child(".twig/HEAD").write_str("ref: refs/heads/master").unwrap();
        let workspace = Workspace::new(dir.path().to_path_buf().into_boxed_path());

        assert_eq!(
            workspace.list_files().unwrap(),
            vec![PathBuf::from("a/c.txt"), PathBuf::from("b.txt")]
        );
    }

    #[test]
    fn removing_the_last_file_prunes_its_directories() {
        let dir = TempDir::new().unwrap();
        dir.child("keep.txt").write_str("k").unwrap();
        dir.child("x/y/z.txt").write_str("z").unwrap();
        let workspace = Workspace::new(dir.path().to_path_buf().into_boxed_path());

        workspace.remove_file(Path::new("x/y/z.txt")).unwrap();

        dir.child("x").assert(predicates::path::missing());
        dir.child("keep.txt").assert("k");
    }

    #[test]
    fn paths_are_made_relative_to_the_root() {
        let dir = TempDir::new().unwrap();
        let workspace = Workspace::new(dir.path().to_path_buf().into_boxed_path());

        assert_eq!(
            workspace.relative_path(&dir.path().join("a/b.txt")),
            PathBuf::from("a/b.txt")
        );
        assert_eq!(
            workspace.relative_path(Path::new("./c.txt")),
            PathBuf::from("c.txt")
        );
    }

    #[test]
    fn writing_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let workspace = Workspace::new(dir.path().to_path_buf().into_boxed_path());

        workspace
            .write_file(Path::new("deep/er/file.bin"), &[0, 1, 2])
            .unwrap();

        assert_eq!(
            workspace.read_file(Path::new("deep/er/file.bin")).unwrap(),
            Bytes::from_static(&[0, 1, 2])
        );
    }

    #[test]
    fn writing_over_a_directory_is_an_obstruction() {
        let dir = TempDir::new().unwrap();
        dir.child("notes/precious.txt").write_str("keep me").unwrap();
        let workspace = Workspace::new(dir.path().to_path_buf().into_boxed_path());

        let error = workspace
            .write_file(Path::new("notes"), b"file content")
            .unwrap_err();

        assert!(matches!(
            error.downcast_ref::<TwigError>(),
            Some(TwigError::UntrackedObstruction { .. })
        ));
        dir.child("notes/precious.txt").assert("keep me");
    }
}
