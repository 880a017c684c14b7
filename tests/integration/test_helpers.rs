use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Run a git command in `repo_path`, panicking with git's stderr on failure
pub fn git(repo_path: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo_path)
        .output()
        .expect("Git command should run");

    if !output.status.success() {
        panic!(
            "Git command failed: git {}\nStderr: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

/// Create a source repository shaped like a typical flow repository:
///
/// ```text
/// README.md
/// flows/etl.py
/// flows/nested/helper.py
/// ```
///
/// The first commit is tagged `v1.0`; a second commit adds `CHANGELOG.md`.
pub fn create_source_repo() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let repo_path = temp_dir.path().to_path_buf();

    // Initialize git with CI-compatible config
    let git_commands = [
        vec!["init"],
        vec!["config", "user.name", "Test User"],
        vec!["config", "user.email", "test@example.com"],
        vec!["config", "core.autocrlf", "false"], // Prevent line ending issues
        vec!["config", "commit.gpgsign", "false"],
    ];
    for args in &git_commands {
        git(&repo_path, args);
    }

    std::fs::create_dir_all(repo_path.join("flows/nested")).unwrap();
    std::fs::write(repo_path.join("README.md"), "# Test Repository").unwrap();
    std::fs::write(repo_path.join("flows/etl.py"), "def etl():\n    pass\n").unwrap();
    std::fs::write(repo_path.join("flows/nested/helper.py"), "HELPER = 1\n").unwrap();
    git(&repo_path, &["add", "."]);
    git(&repo_path, &["commit", "-m", "Initial commit"]);
    git(&repo_path, &["tag", "v1.0"]);

    std::fs::write(repo_path.join("CHANGELOG.md"), "## Unreleased\n").unwrap();
    git(&repo_path, &["add", "."]);
    git(&repo_path, &["commit", "-m", "Add changelog"]);

    (temp_dir, repo_path)
}

/// `file://` URL for a local repository, so `--depth` is honoured
pub fn file_url(repo_path: &Path) -> String {
    format!("file://{}", repo_path.display())
}

/// Run the `bbfetch` binary with an isolated configuration directory
pub fn run_cli(args: &[&str], config_dir: &Path, working_dir: &Path) -> Output {
    run_cli_with_env(args, config_dir, working_dir, &[])
}

/// Like [`run_cli`], with extra environment variables set for the child
pub fn run_cli_with_env(
    args: &[&str],
    config_dir: &Path,
    working_dir: &Path,
    envs: &[(&str, &str)],
) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_bbfetch"));
    cmd.args(args)
        .current_dir(working_dir)
        .env("BITBUCKET_FETCH_CONFIG_DIR", config_dir)
        .env("NO_COLOR", "1")
        .env_remove("BITBUCKET_TOKEN")
        .env_remove("BITBUCKET_USERNAME")
        .env_remove("BITBUCKET_PASSWORD")
        .env_remove("BITBUCKET_URL");
    for (key, value) in envs {
        cmd.env(key, value);
    }
    cmd.output().expect("bbfetch binary should run")
}

/// Assert CLI command succeeds with helpful error messages
pub fn assert_cli_success(output: &Output, operation: &str) {
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        panic!(
            "{operation} failed:\nExit code: {}\nStderr: {stderr}\nStdout: {stdout}",
            output.status.code().unwrap_or(-1)
        );
    }
}

/// Assert CLI command fails with specific error pattern
pub fn assert_cli_error_contains(output: &Output, operation: &str, expected_error: &str) {
    if output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        panic!("{operation} unexpectedly succeeded. Stdout: {stdout}");
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(
        stderr.contains(expected_error) || stdout.contains(expected_error),
        "{operation} failed but didn't contain expected error '{expected_error}'.\nStderr: {stderr}\nStdout: {stdout}"
    );
}

/// Check if CLI command output contains expected content
pub fn assert_output_contains(output: &Output, expected_content: &str, context: &str) {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(
        stderr.contains(expected_content) || stdout.contains(expected_content),
        "{context}: Expected to find '{expected_content}' in output.\nStderr: {stderr}\nStdout: {stdout}"
    );
}
