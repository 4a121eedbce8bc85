use crate::common::command::{
    branch_tip, commit_files, committed_repository_dir, current_branch, run_twig_command,
    stdout_of,
};
use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::predicate;
use rstest::rstest;

mod common;

#[rstest]
fn branch_points_at_the_current_tip(committed_repository_dir: TempDir) {
    let dir = committed_repository_dir.path();

    run_twig_command(dir, &["branch", "feature"]).assert().success();

    assert_eq!(branch_tip(dir, "feature"), branch_tip(dir, "master"));
    assert_eq!(current_branch(dir), "master");
}

#[rstest]
fn nested_branch_names_are_supported(committed_repository_dir: TempDir) {
    let dir = committed_repository_dir.path();

    run_twig_command(dir, &["branch", "topic/one"])
        .assert()
        .success();

    let status = stdout_of(dir, &["status"]);
    assert!(status.starts_with("=== Branches ===\n*master\ntopic/one\n\n"));
}

#[rstest]
fn duplicate_branch_fails(committed_repository_dir: TempDir) {
    let dir = committed_repository_dir.path();
    run_twig_command(dir, &["branch", "feature"]).assert().success();

    run_twig_command(dir, &["branch", "feature"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "A branch with that name already exists.",
        ));
}

#[rstest]
#[case("bad..name")]
#[case(".hidden")]
#[case("ends.lock")]
#[case("with space")]
#[case("star*")]
fn invalid_branch_names_are_rejected(committed_repository_dir: TempDir, #[case] name: &str) {
    run_twig_command(committed_repository_dir.path(), &["branch", name])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid branch name"));
}

#[rstest]
fn removing_the_current_branch_fails(committed_repository_dir: TempDir) {
    run_twig_command(committed_repository_dir.path(), &["rm-branch", "master"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot remove the current branch."));
}

#[rstest]
fn removing_an_unknown_branch_fails(committed_repository_dir: TempDir) {
    run_twig_command(committed_repository_dir.path(), &["rm-branch", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "A branch with that name does not exist.",
        ));
}

#[rstest]
fn removing_a_branch_keeps_its_commits(committed_repository_dir: TempDir) {
    let dir = committed_repository_dir.path();
    run_twig_command(dir, &["branch", "feature"]).assert().success();
    run_twig_command(dir, &["checkout", "feature"])
        .assert()
        .success();
    commit_files(dir, &[("feature.txt", "feature\n")], "Feature work");
    let feature_tip = branch_tip(dir, "feature");
    run_twig_command(dir, &["checkout", "master"])
        .assert()
        .success();

    run_twig_command(dir, &["rm-branch", "feature"])
        .assert()
        .success();

    committed_repository_dir
        .child(".twig/refs/heads/feature")
        .assert(predicate::path::missing());
    let status = stdout_of(dir, &["status"]);
    assert!(status.starts_with("=== Branches ===\n*master\n\n"));

    run_twig_command(dir, &["checkout", &feature_tip, "--", "feature.txt"])
        .assert()
        .success();
    committed_repository_dir
        .child("feature.txt")
        .assert("feature\n");
}
