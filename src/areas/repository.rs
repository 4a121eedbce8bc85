use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::refs::Refs;
use crate::areas::workspace::Workspace;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::TwigError;
use crate::REPOSITORY_DIR;
use std::cell::{RefCell, RefMut};
use std::path::Path;

/// A working tree together with its `.twig` directory
///
/// Commands are implemented as methods on this type, one file per command
/// under `commands`. Reports are written to `writer`.
pub struct Repository {
    path: Box<Path>,
    writer: RefCell<Box<dyn std::io::Write>>,
    index: RefCell<Index>,
    database: Database,
    workspace: Workspace,
    refs: Refs,
}

impl Repository {
    pub fn new(path: &str, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let path = Path::new(path);
        if !path.exists() {
            std::fs::create_dir_all(path)?;
        }
        let path = path.canonicalize()?;
        let twig_path = path.join(REPOSITORY_DIR);

        let index = Index::new(twig_path.join("index").into_boxed_path());
        let database = Database::new(twig_path.join("objects").into_boxed_path());
        let workspace = Workspace::new(path.clone().into_boxed_path());
        let refs = Refs::new(twig_path.into_boxed_path());

        Ok(Repository {
            path: path.into_boxed_path(),
            writer: RefCell::new(writer),
            index: RefCell::new(index),
            database,
            workspace,
            refs,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn twig_path(&self) -> Box<Path> {
        self.path.join(REPOSITORY_DIR).into_boxed_path()
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn index(&'_ self) -> RefMut<'_, Index> {
        self.index.borrow_mut()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    pub fn is_initialized(&self) -> bool {
        self.twig_path().is_dir()
    }

    /// Fail with `NotARepository` unless `init` ran here, then load the index
    pub fn ensure_initialized(&self) -> anyhow::Result<()> {
        if !self.is_initialized() {
            return Err(TwigError::NotARepository.into());
        }

        self.index().rehydrate()
    }

    /// Tip of the current branch
    pub fn head_commit(&self) -> anyhow::Result<(ObjectId, Commit)> {
        let head_oid = self.refs().head_oid()?;
        let commit = self.database().load_commit(&head_oid).map_err(|_| {
            TwigError::invariant(format!("branch tip {head_oid} is not a stored commit"))
        })?;

        Ok((head_oid, commit))
    }

    /// Resolve a commit ID abbreviation and load the commit
    pub fn resolve_commit(&self, prefix: &str) -> anyhow::Result<(ObjectId, Commit)> {
        let oid = self.refs().resolve_abbreviation(prefix)?;
        let commit = self.database().load_commit(&oid)?;

        Ok((oid, commit))
    }
}
