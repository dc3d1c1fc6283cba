mod common;

use assert_fs::TempDir;
use common::catalog::{catalog_path, track, write_catalog};
use common::command::{
    branch_oid, read_repo_file, repository_dir, run_spgit_command, spgit_commit_at, stdout_of,
};
use predicates::prelude::*;
use rstest::rstest;
use std::path::Path;

/// init + origin remote + first commit from the given tracks
fn seed_repository(dir: &Path, ids: &[&str], date: &str) {
    let catalog = catalog_path(dir);
    write_catalog(&catalog, &ids.iter().map(|id| track(id)).collect::<Vec<_>>());

    run_spgit_command(dir, &["init"]).assert().success();
    run_spgit_command(dir, &["remote", "--add", "origin", &catalog.to_string_lossy()])
        .assert()
        .success();
    run_spgit_command(dir, &["add", "."]).assert().success();
    spgit_commit_at(dir, "base", date).assert().success();
}

/// restage from the catalog and commit
fn stage_and_commit(dir: &Path, ids: &[&str], message: &str, date: &str) {
    let catalog = catalog_path(dir);
    write_catalog(&catalog, &ids.iter().map(|id| track(id)).collect::<Vec<_>>());
    run_spgit_command(dir, &["add", "."]).assert().success();
    spgit_commit_at(dir, message, date).assert().success();
}

/// item display order in `show` output
fn shown_order(dir: &Path) -> Vec<String> {
    let show = stdout_of(run_spgit_command(dir, &["show"]));
    show.lines()
        .filter_map(|line| line.strip_prefix("  Song "))
        .map(|rest| rest.split(' ').next().unwrap().to_string())
        .collect()
}

#[rstest]
fn fast_forward_merge_advances_without_a_merge_commit(repository_dir: TempDir) {
    let dir = repository_dir;
    seed_repository(dir.path(), &["A", "B"], "2024-01-01T10:00:00+00:00");

    run_spgit_command(dir.path(), &["branch", "f"]).assert().success();
    run_spgit_command(dir.path(), &["checkout", "f"]).assert().success();
    stage_and_commit(dir.path(), &["A", "B", "C"], "add C", "2024-01-01T11:00:00+00:00");

    run_spgit_command(dir.path(), &["checkout", "main"]).assert().success();
    run_spgit_command(dir.path(), &["merge", "f"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Fast-forward"));

    assert_eq!(branch_oid(dir.path(), "main"), branch_oid(dir.path(), "f"));

    // two commits, no merge commit
    let log = stdout_of(run_spgit_command(dir.path(), &["log", "--oneline"]));
    assert_eq!(log.lines().count(), 2);

    let main_log = read_repo_file(dir.path(), ".spgit/logs/refs/heads/main");
    assert!(main_log.lines().last().unwrap().contains("merge f: fast-forward"));
}

#[rstest]
fn union_merge_combines_diverged_branches(repository_dir: TempDir) {
    let dir = repository_dir;
    seed_repository(dir.path(), &["A", "B"], "2024-01-01T10:00:00+00:00");

    run_spgit_command(dir.path(), &["branch", "feature"]).assert().success();
    stage_and_commit(dir.path(), &["A", "B", "C"], "main adds C", "2024-01-01T11:00:00+00:00");

    run_spgit_command(dir.path(), &["checkout", "feature"]).assert().success();
    stage_and_commit(dir.path(), &["A", "B", "D"], "feature adds D", "2024-01-01T12:00:00+00:00");

    run_spgit_command(dir.path(), &["checkout", "main"]).assert().success();
    let feature_oid = branch_oid(dir.path(), "feature");
    let main_oid = branch_oid(dir.path(), "main");

    run_spgit_command(dir.path(), &["merge", "feature"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Merge made by the 'union' strategy."));

    assert_eq!(shown_order(dir.path()), vec!["A", "B", "C", "D"]);

    // the merge commit carries both parents, current side first
    let show = stdout_of(run_spgit_command(dir.path(), &["show"]));
    assert!(show.contains(&format!("Merge: {} {}", &main_oid[..7], &feature_oid[..7])));
}

#[rstest]
fn intersection_merge_keeps_the_shared_items_in_current_order(repository_dir: TempDir) {
    let dir = repository_dir;
    seed_repository(dir.path(), &["A", "B"], "2024-01-01T10:00:00+00:00");

    run_spgit_command(dir.path(), &["branch", "feature"]).assert().success();
    stage_and_commit(dir.path(), &["A", "B", "C"], "main grows", "2024-01-01T11:00:00+00:00");

    run_spgit_command(dir.path(), &["checkout", "feature"]).assert().success();
    stage_and_commit(dir.path(), &["B", "C", "D"], "rework", "2024-01-01T12:00:00+00:00");

    run_spgit_command(dir.path(), &["checkout", "main"]).assert().success();
    run_spgit_command(
        dir.path(),
        &["merge", "feature", "--strategy", "intersection"],
    )
    .assert()
    .success()
    .stdout(predicate::str::contains("Merge made by the 'intersection' strategy."));

    assert_eq!(shown_order(dir.path()), vec!["B", "C"]);
}

#[rstest]
fn merging_an_ancestor_is_a_no_op(repository_dir: TempDir) {
    let dir = repository_dir;
    seed_repository(dir.path(), &["A"], "2024-01-01T10:00:00+00:00");

    run_spgit_command(dir.path(), &["branch", "old"]).assert().success();
    stage_and_commit(dir.path(), &["A", "B"], "advance", "2024-01-01T11:00:00+00:00");

    run_spgit_command(dir.path(), &["merge", "old"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Already up to date."));

    let log = stdout_of(run_spgit_command(dir.path(), &["log", "--oneline"]));
    assert_eq!(log.lines().count(), 2);
}

#[rstest]
fn merging_an_unknown_revision_is_a_user_error(repository_dir: TempDir) {
    let dir = repository_dir;
    seed_repository(dir.path(), &["A"], "2024-01-01T10:00:00+00:00");

    run_spgit_command(dir.path(), &["merge", "nope"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("unknown revision"));
}
