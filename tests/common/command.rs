use crate::common::COMMIT_DATE;
use crate::common::file::{FileSpec, write_file};
use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

#[fixture]
pub fn repository_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

#[fixture]
pub fn init_repository_dir(repository_dir: TempDir) -> TempDir {
    run_twig_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    repository_dir
}

/// Repository whose master branch tracks `1.txt`, `a/2.txt` and `a/b/3.txt`
#[fixture]
pub fn committed_repository_dir(init_repository_dir: TempDir) -> TempDir {
    commit_files(
        init_repository_dir.path(),
        &[("1.txt", "one\n"), ("a/2.txt", "two\n"), ("a/b/3.txt", "three\n")],
        "Initial files",
    );

    init_repository_dir
}

pub fn run_twig_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("twig").expect("Failed to find twig binary");
    cmd.envs(vec![("NO_PAGER", "1"), ("TWIG_COMMIT_DATE", COMMIT_DATE)]);
    cmd.env_remove("TWIG_LOG");
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

pub fn twig_commit(dir: &Path, message: &str) -> Command {
    run_twig_command(dir, &["commit", "-m", message])
}

pub fn twig_merge(dir: &Path, branch: &str) -> Command {
    run_twig_command(dir, &["merge", branch])
}

/// Write the files, stage them and commit them on the current branch
pub fn commit_files(dir: &Path, files: &[(&str, &str)], message: &str) {
    for (path, content) in files {
        write_file(FileSpec::new(dir.join(path), content.to_string()));
        run_twig_command(dir, &["add", path]).assert().success();
    }

    twig_commit(dir, message).assert().success();
}

/// Stage the removal of tracked files and commit it
pub fn commit_removals(dir: &Path, files: &[&str], message: &str) {
    for path in files {
        run_twig_command(dir, &["rm", path]).assert().success();
    }

    twig_commit(dir, message).assert().success();
}

/// Commit ID a branch points to
pub fn branch_tip(dir: &Path, branch: &str) -> String {
    let ref_path = dir.join(".twig").join("refs").join("heads").join(branch);
    std::fs::read_to_string(ref_path)
        .expect("Failed to read branch ref")
        .trim()
        .to_string()
}

/// Name of the current branch
pub fn current_branch(dir: &Path) -> String {
    let head = std::fs::read_to_string(dir.join(".twig").join("HEAD"))
        .expect("Failed to read HEAD");

    head.trim()
        .strip_prefix("ref: refs/heads/")
        .expect("HEAD is not a symbolic ref")
        .to_string()
}

/// Commit ID at the tip of the current branch
pub fn head_commit_id(dir: &Path) -> String {
    branch_tip(dir, &current_branch(dir))
}

/// Standard output of a successful command
pub fn stdout_of(dir: &Path, args: &[&str]) -> String {
    let output = run_twig_command(dir, args)
        .output()
        .expect("Failed to run twig");
    assert!(
        output.status.success(),
        "twig {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    String::from_utf8(output.stdout).expect("Output is not UTF-8")
}
