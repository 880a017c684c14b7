pub mod repository;

pub use repository::BitbucketRepository;

use crate::errors::{FetchError, Result};
use std::path::PathBuf;

/// Locate the git executable on `PATH` (or verify an explicit path)
pub fn find_git(executable: &str) -> Result<PathBuf> {
    which::which(executable).map_err(|e| {
        FetchError::missing_dependency(format!(
            "git executable '{executable}' not found ({e}). \
             An accessible installation of git is required to fetch repositories"
        ))
    })
}

/// Report the installed git version, e.g. `git version 2.43.0`
pub async fn git_version(executable: &str) -> Result<String> {
    let git = find_git(executable)?;
    let output = tokio::process::Command::new(git)
        .arg("--version")
        .output()
        .await?;

    if !output.status.success() {
        return Err(FetchError::missing_dependency(format!(
            "'{executable} --version' failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
