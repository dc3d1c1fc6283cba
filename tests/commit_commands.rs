mod common;

use assert_fs::TempDir;
use common::catalog::{catalog_path, track, write_catalog};
use common::command::{
    branch_oid, read_repo_file, repository_dir, run_spgit_command, spgit_commit_at, stdout_of,
};
use predicates::prelude::*;
use rstest::rstest;

#[rstest]
fn first_commit_creates_main_and_logs_from_zero(repository_dir: TempDir) {
    let dir = repository_dir;
    let catalog = catalog_path(dir.path());
    write_catalog(&catalog, &[track("I1"), track("I2")]);

    run_spgit_command(dir.path(), &["init"]).assert().success();
    run_spgit_command(dir.path(), &["remote", "--add", "origin", &catalog.to_string_lossy()])
        .assert()
        .success();

    run_spgit_command(dir.path(), &["add", "."])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added 2 item(s)"));

    spgit_commit_at(dir.path(), "first", "2024-01-01T10:00:00+00:00")
        .assert()
        .success()
        .stdout(predicate::str::contains("[main"))
        .stdout(predicate::str::contains("first"))
        .stdout(predicate::str::contains("2 items"));

    let main_oid = branch_oid(dir.path(), "main");
    assert_eq!(main_oid.len(), 40);

    // one reflog entry, starting from the zero digest
    let head_log = read_repo_file(dir.path(), ".spgit/logs/HEAD");
    let lines: Vec<&str> = head_log.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with(&"0".repeat(40)));
    assert!(lines[0].contains(&main_oid));
    assert!(lines[0].contains("commit (initial): first"));

    // the commit's tree holds both items in staged order
    let show = stdout_of(run_spgit_command(dir.path(), &["show"]));
    assert!(show.contains("Items (2):"));
    let song1 = show.find("Song I1").expect("item one shown");
    let song2 = show.find("Song I2").expect("item two shown");
    assert!(song1 < song2, "tree order follows the staged order");
}

#[rstest]
fn committing_without_changes_is_a_user_error(repository_dir: TempDir) {
    let dir = repository_dir;
    let catalog = catalog_path(dir.path());
    write_catalog(&catalog, &[track("A")]);

    run_spgit_command(dir.path(), &["init"]).assert().success();
    run_spgit_command(dir.path(), &["remote", "--add", "origin", &catalog.to_string_lossy()])
        .assert()
        .success();

    run_spgit_command(dir.path(), &["commit", "-m", "empty"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("nothing to commit"));

    run_spgit_command(dir.path(), &["add", "."]).assert().success();
    spgit_commit_at(dir.path(), "first", "2024-01-01T10:00:00+00:00")
        .assert()
        .success();

    // the index now mirrors HEAD, so a second commit has nothing to record
    run_spgit_command(dir.path(), &["commit", "-m", "again"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("nothing to commit"));
}

#[rstest]
fn selective_add_stages_and_removes_named_identifiers(repository_dir: TempDir) {
    let dir = repository_dir;
    let catalog = catalog_path(dir.path());
    write_catalog(&catalog, &[track("A"), track("B"), track("C")]);

    run_spgit_command(dir.path(), &["init"]).assert().success();
    run_spgit_command(dir.path(), &["remote", "--add", "origin", &catalog.to_string_lossy()])
        .assert()
        .success();

    run_spgit_command(dir.path(), &["add", "uri:A", "uri:B"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added 2 item(s)"));

    // gone from the snapshot means removed from the index
    write_catalog(&catalog, &[track("A"), track("C")]);
    run_spgit_command(dir.path(), &["add", "uri:B"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 1 item(s)"));

    let status = stdout_of(run_spgit_command(dir.path(), &["status"]));
    assert!(status.contains("added: Song A"));
    assert!(!status.contains("added: Song B"));
}

#[rstest]
fn status_and_diff_report_staged_changes(repository_dir: TempDir) {
    let dir = repository_dir;
    let catalog = catalog_path(dir.path());
    write_catalog(&catalog, &[track("A"), track("B")]);

    run_spgit_command(dir.path(), &["init"]).assert().success();
    run_spgit_command(dir.path(), &["remote", "--add", "origin", &catalog.to_string_lossy()])
        .assert()
        .success();
    run_spgit_command(dir.path(), &["add", "."]).assert().success();
    spgit_commit_at(dir.path(), "base", "2024-01-01T10:00:00+00:00")
        .assert()
        .success();

    // reorder and extend the remote, then restage
    write_catalog(&catalog, &[track("B"), track("A"), track("C")]);
    run_spgit_command(dir.path(), &["add", "."]).assert().success();

    let status = stdout_of(run_spgit_command(dir.path(), &["status"]));
    assert!(status.contains("added: Song C"));
    assert!(status.contains("moved: Song B (1 -> 0)"));

    let diff = stdout_of(run_spgit_command(dir.path(), &["diff"]));
    assert!(diff.contains("+ Song C"));
    assert!(diff.contains("~ Song B (1 -> 0)"));
}
