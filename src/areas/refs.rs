//! Reference directory
//!
//! This module manages the human-readable names pointing to commits and the
//! bookkeeping kept next to them:
//!
//! - `HEAD`: symbolic reference to the current branch (`ref: refs/heads/<name>`)
//! - `refs/heads/*`: branch tips, one commit ID per file
//! - `commits`: every commit ID ever created, for abbreviation lookups
//! - `children`: branches that passed through each commit
//! - `equivalences`: branch names folded into other branches
//!
//! Every file is rewritten whole under an exclusive `file-guard` lock.

use crate::artifacts::branch::branch_name::{BranchName, SymRefName};
use crate::artifacts::branch::children::ChildrenIndex;
use crate::artifacts::branch::equivalence::BranchEquivalence;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::TwigError;
use anyhow::Context;
use derive_new::new;
use file_guard::Lock;
use std::collections::BTreeSet;
use std::io::{Read, Write};
use std::ops::DerefMut;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;
use walkdir::WalkDir;

/// References manager
///
/// Handles reading and writing references and the branch bookkeeping files.
#[derive(Debug, new)]
pub struct Refs {
    /// Path to the repository directory (typically `.twig`)
    path: Box<Path>,
}

/// Regex pattern for parsing symbolic references
const SYMREF_REGEX: &str = r"^ref: (.+)$";

static SYMREF: LazyLock<Option<regex::Regex>> =
    LazyLock::new(|| regex::Regex::new(SYMREF_REGEX).ok());

/// Name of the HEAD reference
pub const HEAD_REF_NAME: &str = "HEAD";

const COMMITS_FILE: &str = "commits";
const CHILDREN_FILE: &str = "children";
const EQUIVALENCES_FILE: &str = "equivalences";

impl Refs {
    /// Point `HEAD` at the default branch
    pub fn init(&self) -> anyhow::Result<()> {
        std::fs::create_dir_all(self.heads_path())?;
        self.set_current_branch(&BranchName::default_branch())
    }

    /// Branch `HEAD` points to
    pub fn current_branch(&self) -> anyhow::Result<BranchName> {
        let content = self.read_ref_file(&self.head_path())?.ok_or_else(|| {
            TwigError::invariant("HEAD is missing or empty")
        })?;

        let symref = SYMREF
            .as_ref()
            .context(format!("invalid symref regex: {SYMREF_REGEX}"))?;
        let captures = symref
            .captures(&content)
            .ok_or_else(|| TwigError::invariant(format!("HEAD is not a symbolic ref: {content}")))?;

        Ok(BranchName::try_parse_sym_ref_name(&SymRefName::new(
            captures[1].to_string(),
        ))?)
    }

    pub fn set_current_branch(&self, name: &BranchName) -> anyhow::Result<()> {
        self.update_ref_file(
            &self.head_path(),
            format!("ref: {}", name.to_sym_ref_name().as_ref_path()),
        )
    }

    /// Tip of the current branch
    pub fn head_oid(&self) -> anyhow::Result<ObjectId> {
        let current = self.current_branch()?;
        self.read_branch(&current)?.ok_or_else(|| {
            TwigError::invariant(format!("current branch {current} has no tip")).into()
        })
    }

    pub fn branch_exists(&self, name: &BranchName) -> bool {
        self.branch_path(name).is_file()
    }

    pub fn read_branch(&self, name: &BranchName) -> anyhow::Result<Option<ObjectId>> {
        match self.read_ref_file(&self.branch_path(name))? {
            Some(content) => Ok(Some(ObjectId::try_parse(content).map_err(|_| {
                TwigError::invariant(format!("branch {name} holds an invalid commit id"))
            })?)),
            None => Ok(None),
        }
    }

    /// Tip of a branch that must exist
    pub fn branch_tip(&self, name: &BranchName) -> anyhow::Result<ObjectId> {
        self.read_branch(name)?
            .ok_or_else(|| TwigError::unknown_branch(name.as_ref()).into())
    }

    pub fn update_branch(&self, name: &BranchName, oid: &ObjectId) -> anyhow::Result<()> {
        debug!(branch = %name, oid = %oid, "moving branch");
        self.update_ref_file(&self.branch_path(name), oid.to_string())
    }

    pub fn create_branch(&self, name: &BranchName, source_oid: &ObjectId) -> anyhow::Result<()> {
        if self.branch_exists(name) {
            return Err(TwigError::DuplicateBranch {
                name: name.to_string(),
            }
            .into());
        }

        self.update_branch(name, source_oid)?;
        self.record_child(source_oid, name)?;

        let mut equivalence = self.load_equivalence()?;
        equivalence.reset(name);
        self.store_equivalence(&equivalence)
    }

    /// Delete a branch pointer, folding its name into the current branch
    ///
    /// The commits the branch pointed to stay in the store.
    pub fn delete_branch(&self, name: &BranchName) -> anyhow::Result<ObjectId> {
        let oid = self.branch_tip(name)?;
        let current = self.current_branch()?;
        if &current == name {
            return Err(TwigError::CannotRemoveCurrent.into());
        }

        let branch_path = self.branch_path(name);
        std::fs::remove_file(&branch_path)
            .with_context(|| format!("failed to delete branch file at {:?}", branch_path))?;
        self.prune_branch_empty_parent_dirs(&branch_path)?;

        let mut equivalence = self.load_equivalence()?;
        equivalence.union(name, &current);
        self.store_equivalence(&equivalence)?;

        Ok(oid)
    }

    /// Every branch, sorted by name
    pub fn list_branches(&self) -> anyhow::Result<Vec<BranchName>> {
        let heads_path = self.heads_path();

        let mut branches = WalkDir::new(&heads_path)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| {
                let relative_path = entry.path().strip_prefix(&heads_path).ok()?;
                BranchName::try_parse(relative_path.to_string_lossy().to_string()).ok()
            })
            .collect::<Vec<_>>();
        branches.sort();

        Ok(branches)
    }

    /// Register a new commit made on `branch`
    pub fn record_commit(&self, oid: &ObjectId, branch: &BranchName) -> anyhow::Result<()> {
        let mut commits = self.all_commit_ids()?;
        if commits.insert(oid.clone()) {
            let content = commits
                .iter()
                .map(|oid| format!("{oid}\n"))
                .collect::<String>();
            self.update_ref_file(&self.path.join(COMMITS_FILE), content)?;
        }

        self.record_child(oid, branch)
    }

    /// Note that `branch` passed through commit `oid`
    pub fn record_child(&self, oid: &ObjectId, branch: &BranchName) -> anyhow::Result<()> {
        let mut children = self.load_children()?;
        children.record(oid.clone(), branch.clone());
        self.update_ref_file(&self.path.join(CHILDREN_FILE), children.serialize())
    }

    /// Branches that passed through `oid`, each resolved to the branch its
    /// name has been folded into
    pub fn children_of(&self, oid: &ObjectId) -> anyhow::Result<BTreeSet<BranchName>> {
        let children = self.load_children()?;
        let mut equivalence = self.load_equivalence()?;

        Ok(children
            .names(oid)
            .map(|name| equivalence.find(name))
            .collect())
    }

    pub fn all_commit_ids(&self) -> anyhow::Result<BTreeSet<ObjectId>> {
        let content = self
            .read_ref_file(&self.path.join(COMMITS_FILE))?
            .unwrap_or_default();

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| ObjectId::try_parse(line.trim().to_string()))
            .collect()
    }

    /// Expand a commit ID prefix of any length
    ///
    /// Fails with `AmbiguousOrUnknownId` unless exactly one commit matches.
    pub fn resolve_abbreviation(&self, prefix: &str) -> anyhow::Result<ObjectId> {
        let is_hex = !prefix.is_empty() && prefix.chars().all(|c| c.is_ascii_hexdigit());
        let mut matches = if is_hex {
            self.all_commit_ids()?
                .into_iter()
                .filter(|oid| oid.starts_with(prefix))
                .collect::<Vec<_>>()
        } else {
            Vec::new()
        };

        match matches.len() {
            1 => Ok(matches.remove(0)),
            count => Err(TwigError::AmbiguousOrUnknownId {
                prefix: prefix.to_string(),
                matches: count,
            }
            .into()),
        }
    }

    fn load_children(&self) -> anyhow::Result<ChildrenIndex> {
        let content = self
            .read_ref_file(&self.path.join(CHILDREN_FILE))?
            .unwrap_or_default();
        ChildrenIndex::parse(&content)
    }

    fn load_equivalence(&self) -> anyhow::Result<BranchEquivalence> {
        let content = self
            .read_ref_file(&self.path.join(EQUIVALENCES_FILE))?
            .unwrap_or_default();
        BranchEquivalence::parse(&content)
    }

    fn store_equivalence(&self, equivalence: &BranchEquivalence) -> anyhow::Result<()> {
        self.update_ref_file(&self.path.join(EQUIVALENCES_FILE), equivalence.serialize())
    }

    fn read_ref_file(&self, path: &Path) -> anyhow::Result<Option<String>> {
        if !path.exists() {
            return Ok(None);
        }

        let mut ref_file = std::fs::OpenOptions::new()
            .read(true)
            .open(path)
            .with_context(|| format!("failed to open ref file at {:?}", path))?;
        let mut lock = file_guard::lock(&mut ref_file, Lock::Shared, 0, 1)?;

        let mut content = String::new();
        lock.deref_mut()
            .read_to_string(&mut content)
            .with_context(|| format!("failed to read ref file at {:?}", path))?;
        let content = content.trim();

        if content.is_empty() {
            Ok(None)
        } else {
            Ok(Some(content.to_string()))
        }
    }

    fn update_ref_file(&self, path: &Path, raw_ref: String) -> anyhow::Result<()> {
        // create all the parent directories if they don't exist
        std::fs::create_dir_all(path.parent().with_context(|| {
            format!(
                "failed to create parent directories for ref file at {:?}",
                path
            )
        })?)?;

        let mut ref_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .with_context(|| format!("failed to open ref file at {:?}", path))?;
        let mut lock = file_guard::lock(&mut ref_file, Lock::Exclusive, 0, 1)?;
        lock.deref_mut().write_all(raw_ref.as_bytes())?;

        Ok(())
    }

    fn prune_branch_empty_parent_dirs(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent()
            && parent != self.heads_path().as_ref()
            && parent.read_dir()?.next().is_none()
        {
            std::fs::remove_dir(parent).with_context(|| {
                format!("failed to remove empty branch directory at {:?}", parent)
            })?;
            self.prune_branch_empty_parent_dirs(parent)?;
        }

        Ok(())
    }

    fn branch_path(&self, name: &BranchName) -> Box<Path> {
        self.heads_path().join(name.as_ref()).into_boxed_path()
    }

    pub fn head_path(&self) -> Box<Path> {
        self.path.join(HEAD_REF_NAME).into_boxed_path()
    }

    pub fn refs_path(&self) -> Box<Path> {
        self.path.join("refs").into_boxed_path()
    }

    pub fn heads_path(&self) -> Box<Path> {
        self.refs_path().join("heads").into_boxed_path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    struct Fixture {
        _dir: TempDir,
        refs: Refs,
    }

    fn branch(name: &str) -> BranchName {
        BranchName::try_parse(name.to_string()).unwrap()
    }

    fn oid(seed: char) -> ObjectId {
        ObjectId::try_parse(seed.to_string().repeat(40)).unwrap()
    }

    #[fixture]
    fn refs() -> Fixture {
        let dir = TempDir::new().unwrap();
        let refs = Refs::new(dir.path().join(".twig").into_boxed_path());
        refs.init().unwrap();
        refs.update_branch(&BranchName::default_branch(), &oid('0'))
            .unwrap();

        Fixture { _dir: dir, refs }
    }

    fn twig_error(error: anyhow::Error) -> TwigError {
        error.downcast::<TwigError>().unwrap()
    }

    #[rstest]
    fn head_starts_on_master(refs: Fixture) {
        assert_eq!(refs.refs.current_branch().unwrap(), branch("master"));
        assert_eq!(refs.refs.head_oid().unwrap(), oid('0'));
    }

    #[rstest]
    fn duplicate_branches_are_rejected(refs: Fixture) {
        refs.refs.create_branch(&branch("dev"), &oid('0')).unwrap();

        let error = refs.refs.create_branch(&branch("dev"), &oid('1')).unwrap_err();

        assert_eq!(
            twig_error(error),
            TwigError::DuplicateBranch {
                name: "dev".to_string()
            }
        );
        assert_eq!(refs.refs.read_branch(&branch("dev")).unwrap(), Some(oid('0')));
    }

    #[rstest]
    fn current_branch_cannot_be_deleted(refs: Fixture) {
        let error = refs.refs.delete_branch(&branch("master")).unwrap_err();

        assert_eq!(twig_error(error), TwigError::CannotRemoveCurrent);
    }

    #[rstest]
    fn deleting_unknown_branch_fails(refs: Fixture) {
        let error = refs.refs.delete_branch(&branch("nope")).unwrap_err();

        assert_eq!(twig_error(error), TwigError::unknown_branch("nope"));
    }

    #[rstest]
    fn deleted_branch_history_counts_for_the_current_branch(refs: Fixture) {
        refs.refs.create_branch(&branch("topic/x"), &oid('0')).unwrap();
        refs.refs.record_commit(&oid('1'), &branch("topic/x")).unwrap();

        refs.refs.delete_branch(&branch("topic/x")).unwrap();

        assert!(!refs.refs.branch_exists(&branch("topic/x")));
        assert!(!refs.refs.heads_path().join("topic").exists());
        assert_eq!(
            refs.refs.children_of(&oid('1')).unwrap(),
            BTreeSet::from([branch("master")])
        );
        assert_eq!(refs.refs.list_branches().unwrap(), vec![branch("master")]);
    }

    #[rstest]
    fn abbreviations_resolve_unique_prefixes_only(refs: Fixture) {
        let first = ObjectId::try_parse(format!("abc1{}", "0".repeat(36))).unwrap();
        let second = ObjectId::try_parse(format!("abc2{}", "0".repeat(36))).unwrap();
        refs.refs.record_commit(&first, &branch("master")).unwrap();
        refs.refs.record_commit(&second, &branch("master")).unwrap();

        assert_eq!(refs.refs.resolve_abbreviation("abc1").unwrap(), first);
        assert_eq!(refs.refs.resolve_abbreviation(second.as_ref()).unwrap(), second);
        assert_eq!(
            twig_error(refs.refs.resolve_abbreviation("abc").unwrap_err()),
            TwigError::AmbiguousOrUnknownId {
                prefix: "abc".to_string(),
                matches: 2
            }
        );
        assert_eq!(
            twig_error(refs.refs.resolve_abbreviation("zz").unwrap_err()),
            TwigError::AmbiguousOrUnknownId {
                prefix: "zz".to_string(),
                matches: 0
            }
        );
    }

    #[rstest]
    fn branches_are_listed_in_name_order(refs: Fixture) {
        refs.refs.create_branch(&branch("zeta"), &oid('0')).unwrap();
        refs.refs.create_branch(&branch("alpha"), &oid('0')).unwrap();

        assert_eq!(
            refs.refs.list_branches().unwrap(),
            vec![branch("alpha"), branch("master"), branch("zeta")]
        );
    }
}
