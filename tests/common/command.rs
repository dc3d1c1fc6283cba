use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

/// Fresh directory for one repository scenario
#[fixture]
pub fn repository_dir() -> TempDir {
    TempDir::new().expect("failed to create temp directory")
}

/// Run `spgit` with a deterministic author identity
pub fn run_spgit_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("spgit").expect("failed to find spgit binary");
    cmd.current_dir(dir);
    cmd.env("SPGIT_AUTHOR_NAME", "Test Author");
    cmd.env("SPGIT_AUTHOR_EMAIL", "test@example.com");
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

/// Commit with an explicit timestamp so history ordering is reproducible
pub fn spgit_commit_at(dir: &Path, message: &str, date: &str) -> Command {
    let mut cmd = run_spgit_command(dir, &["commit", "-m", message]);
    cmd.env("SPGIT_AUTHOR_DATE", date);
    cmd
}

/// Capture stdout of a command expected to succeed
pub fn stdout_of(mut cmd: Command) -> String {
    let output = cmd.output().expect("failed to run spgit");
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Read a repository-relative file as text
pub fn read_repo_file(dir: &Path, relative: &str) -> String {
    std::fs::read_to_string(dir.join(relative))
        .unwrap_or_else(|_| panic!("missing file {relative}"))
}

/// The commit digest a branch points at
pub fn branch_oid(dir: &Path, branch: &str) -> String {
    read_repo_file(dir, &format!(".spgit/refs/heads/{branch}"))
        .trim()
        .to_string()
}
