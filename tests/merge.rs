use crate::common::command::{
    branch_tip, commit_files, commit_removals, committed_repository_dir, run_twig_command,
    stdout_of, twig_merge,
};
use crate::common::file::{FileSpec, read_file, write_file};
use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::predicate;
use rstest::{fixture, rstest};
use std::path::Path;

mod common;

fn checkout(dir: &Path, branch: &str) {
    run_twig_command(dir, &["checkout", branch])
        .assert()
        .success();
}

fn branch(dir: &Path, name: &str) {
    run_twig_command(dir, &["branch", name]).assert().success();
}

/// History:
///       A (base)
///      / \
///     B   C
///     |   |
///   master  other
#[fixture]
fn diverged_repository(committed_repository_dir: TempDir) -> TempDir {
    let dir = committed_repository_dir.path();
    commit_files(
        dir,
        &[("left.txt", "initial\n"), ("right.txt", "initial\n"), ("gone.txt", "gone\n")],
        "Commit A - base",
    );
    branch(dir, "other");

    commit_files(dir, &[("left.txt", "initial\nmaster change\n")], "Commit B - master changes");

    checkout(dir, "other");
    commit_files(
        dir,
        &[("right.txt", "initial\nother change\n"), ("new.txt", "new on other\n")],
        "Commit C - other changes",
    );
    commit_removals(dir, &["gone.txt"], "Commit C' - other removes gone.txt");
    checkout(dir, "master");

    committed_repository_dir
}

#[rstest]
fn merging_the_current_branch_fails(committed_repository_dir: TempDir) {
    twig_merge(committed_repository_dir.path(), "master")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot merge a branch with itself."));
}

#[rstest]
fn merging_an_unknown_branch_fails(committed_repository_dir: TempDir) {
    twig_merge(committed_repository_dir.path(), "ghost")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "A branch with that name does not exist.",
        ));
}

#[rstest]
fn merging_with_staged_changes_fails(diverged_repository: TempDir) {
    let dir = diverged_repository.path();
    write_file(FileSpec::new(dir.join("pending.txt"), "pending\n".to_string()));
    run_twig_command(dir, &["add", "pending.txt"])
        .assert()
        .success();

    twig_merge(dir, "other")
        .assert()
        .failure()
        .stderr(predicate::str::contains("You have uncommitted changes."));
}

#[rstest]
fn merging_an_ancestor_changes_nothing(committed_repository_dir: TempDir) {
    let dir = committed_repository_dir.path();
    branch(dir, "old");
    commit_files(dir, &[("1.txt", "newer\n")], "Move on");
    let tip = branch_tip(dir, "master");

    twig_merge(dir, "old")
        .assert()
        .success()
        .stdout("Given branch is an ancestor of the current branch.\n");

    assert_eq!(branch_tip(dir, "master"), tip);
    committed_repository_dir.child("1.txt").assert("newer\n");
}

#[rstest]
fn merging_a_descendant_fast_forwards(committed_repository_dir: TempDir) {
    let dir = committed_repository_dir.path();
    branch(dir, "ahead");
    checkout(dir, "ahead");
    commit_files(dir, &[("ahead.txt", "ahead\n")], "Ahead work");
    let ahead_tip = branch_tip(dir, "ahead");
    checkout(dir, "master");

    twig_merge(dir, "ahead")
        .assert()
        .success()
        .stdout("Current branch fast-forwarded.\n");

    assert_eq!(branch_tip(dir, "master"), ahead_tip);
    committed_repository_dir.child("ahead.txt").assert("ahead\n");
    let log = stdout_of(dir, &["log"]);
    assert!(!log.contains("Merge:"));
}

#[rstest]
fn clean_three_way_merge_combines_both_sides(diverged_repository: TempDir) {
    let dir = diverged_repository.path();
    let master_tip = branch_tip(dir, "master");
    let other_tip = branch_tip(dir, "other");

    twig_merge(dir, "other").assert().success().stdout("");

    assert_eq!(read_file(&dir.join("left.txt")), "initial\nmaster change\n");
    assert_eq!(read_file(&dir.join("right.txt")), "initial\nother change\n");
    assert_eq!(read_file(&dir.join("new.txt")), "new on other\n");
    diverged_repository
        .child("gone.txt")
        .assert(predicate::path::missing());

    let log = stdout_of(dir, &["log"]);
    assert!(log.contains(&format!(
        "Merge: {} {}\n",
        &master_tip[..7],
        &other_tip[..7]
    )));
    assert!(log.contains("Merged other into master.\n"));

    let status = stdout_of(dir, &["status"]);
    assert!(status.contains("=== Staged Files ===\n\n"));
    assert!(status.contains("=== Modifications Not Staged For Commit ===\n\n"));
    assert!(status.contains("=== Untracked Files ===\n\n"));
}

#[rstest]
fn divergent_changes_produce_conflict_markers(diverged_repository: TempDir) {
    let dir = diverged_repository.path();
    commit_files(dir, &[("right.txt", "master version\n")], "Master edits right");
    commit_files(dir, &[("gone.txt", "kept on master\n")], "Master edits gone");

    twig_merge(dir, "other")
        .assert()
        .success()
        .stdout("Encountered a merge conflict.\n");

    assert_eq!(
        read_file(&dir.join("right.txt")),
        "<<<<<<< HEAD\nmaster version\n=======\ninitial\nother change\n>>>>>>>\n"
    );
    assert_eq!(
        read_file(&dir.join("gone.txt")),
        "<<<<<<< HEAD\nkept on master\n=======\n>>>>>>>\n"
    );

    // the conflicted contents are committed as they are
    let log = stdout_of(dir, &["log"]);
    assert!(log.contains("Merged other into master.\n"));
    let status = stdout_of(dir, &["status"]);
    assert!(status.contains("=== Modifications Not Staged For Commit ===\n\n"));
}

#[rstest]
fn conflicting_additions_are_wrapped_too(committed_repository_dir: TempDir) {
    let dir = committed_repository_dir.path();
    branch(dir, "other");
    commit_files(dir, &[("both.txt", "master\n")], "Master adds both");
    checkout(dir, "other");
    commit_files(dir, &[("both.txt", "other\n")], "Other adds both");
    checkout(dir, "master");

    twig_merge(dir, "other")
        .assert()
        .success()
        .stdout("Encountered a merge conflict.\n");

    assert_eq!(
        read_file(&dir.join("both.txt")),
        "<<<<<<< HEAD\nmaster\n=======\nother\n>>>>>>>\n"
    );
}

#[rstest]
fn untracked_file_in_the_way_blocks_the_merge(diverged_repository: TempDir) {
    let dir = diverged_repository.path();
    let master_tip = branch_tip(dir, "master");
    // same bytes as the incoming file still block a merge
    write_file(FileSpec::new(dir.join("new.txt"), "new on other\n".to_string()));

    twig_merge(dir, "other")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "There is an untracked file in the way; delete it, or add and commit it first.",
        ))
        .stderr(predicate::str::contains("\tnew.txt"));

    assert_eq!(branch_tip(dir, "master"), master_tip);
    assert_eq!(read_file(&dir.join("right.txt")), "initial\n");
    diverged_repository
        .child("gone.txt")
        .assert("gone\n");
}

#[rstest]
fn merge_of_a_deleted_branch_name_fails(diverged_repository: TempDir) {
    let dir = diverged_repository.path();
    run_twig_command(dir, &["rm-branch", "other"])
        .assert()
        .success();

    twig_merge(dir, "other")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "A branch with that name does not exist.",
        ));
}

/// History:
///        A
///       / \
///      B   C
///      |\ /|
///      | X |
///      |/ \|
///      D   E
///      |   |
///      F   G
///   master  other
///
/// B and C are both best common ancestors of F and G; either one resolves
/// the final merge cleanly.
#[rstest]
fn criss_cross_merge_resolves_cleanly(committed_repository_dir: TempDir) {
    let dir = committed_repository_dir.path();
    commit_files(
        dir,
        &[("x.txt", "a\n"), ("y.txt", "a\n"), ("z.txt", "a\n")],
        "A",
    );
    branch(dir, "other");

    commit_files(dir, &[("m.txt", "m\n")], "B");
    branch(dir, "b-marker");

    checkout(dir, "other");
    commit_files(dir, &[("o.txt", "o\n")], "C");

    checkout(dir, "master");
    twig_merge(dir, "other").assert().success().stdout("");

    checkout(dir, "other");
    twig_merge(dir, "b-marker").assert().success().stdout("");

    commit_files(dir, &[("z.txt", "o2\n")], "G");
    checkout(dir, "master");
    commit_files(dir, &[("y.txt", "m2\n")], "F");

    twig_merge(dir, "other").assert().success().stdout("");

    assert_eq!(read_file(&dir.join("x.txt")), "a\n");
    assert_eq!(read_file(&dir.join("y.txt")), "m2\n");
    assert_eq!(read_file(&dir.join("z.txt")), "o2\n");
    assert_eq!(read_file(&dir.join("m.txt")), "m\n");
    assert_eq!(read_file(&dir.join("o.txt")), "o\n");
}
