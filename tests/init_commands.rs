mod common;

use assert_fs::TempDir;
use common::command::{read_repo_file, repository_dir, run_spgit_command};
use predicates::prelude::*;
use rstest::rstest;

#[rstest]
fn init_creates_the_repository_skeleton(repository_dir: TempDir) {
    let dir = repository_dir;

    run_spgit_command(dir.path(), &["init", "--name", "X"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized empty spgit repository"));

    assert_eq!(
        read_repo_file(dir.path(), ".spgit/HEAD"),
        "ref: refs/heads/main\n"
    );
    assert!(
        !dir.path().join(".spgit/refs/heads/main").exists(),
        "main is unborn until the first commit"
    );
    assert!(dir.path().join(".spgit/index").exists());
    assert!(dir.path().join(".spgit/objects").is_dir());

    let config = read_repo_file(dir.path(), ".spgit/config");
    assert!(config.contains("\"name\": \"X\""));
}

#[rstest]
fn init_twice_is_a_user_error(repository_dir: TempDir) {
    let dir = repository_dir;

    run_spgit_command(dir.path(), &["init"]).assert().success();
    run_spgit_command(dir.path(), &["init"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("already exists"));
}

#[rstest]
fn commands_outside_a_repository_fail_with_exit_one(repository_dir: TempDir) {
    let dir = repository_dir;

    run_spgit_command(dir.path(), &["status"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("not a spgit repository"));
}

#[rstest]
fn status_in_a_fresh_repository_reports_no_commits(repository_dir: TempDir) {
    let dir = repository_dir;

    run_spgit_command(dir.path(), &["init"]).assert().success();
    run_spgit_command(dir.path(), &["status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("On branch main"))
        .stdout(predicate::str::contains("No commits yet"));
}
