//! Fetch the contents of a Bitbucket repository with the `git` CLI.
//!
//! The repository is shallow-cloned into a scratch directory, and the
//! requested sub-directory (or the whole checkout) is then copied into the
//! destination. The scratch clone is removed on every path out of
//! [`BitbucketRepository::get_directory`].

use crate::bitbucket::BitbucketCredentials;
use crate::config::GitConfig;
use crate::errors::{FetchError, Result};
use crate::git::find_git;
use crate::utils::{async_ops, fs_ops, path_validation, redact_secrets};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};
use url::Url;

/// A Bitbucket repository, optionally pinned to a branch or tag and
/// optionally authenticated.
#[derive(Debug)]
pub struct BitbucketRepository {
    repository: String,
    reference: Option<String>,
    credentials: Option<BitbucketCredentials>,
    git: GitConfig,
}

impl BitbucketRepository {
    /// Create a repository reference.
    ///
    /// Credentials can only be attached to `https` repository URLs; SSH URLs
    /// carry their own authentication.
    pub fn new(
        repository: impl Into<String>,
        reference: Option<String>,
        credentials: Option<BitbucketCredentials>,
    ) -> Result<Self> {
        let repository = repository.into();
        if repository.trim().is_empty() {
            return Err(FetchError::validation("Repository URL cannot be empty"));
        }

        if credentials.is_some() && !Self::accepts_credentials(&repository) {
            return Err(FetchError::invalid_repository_url(
                "Credentials can only be used with BitBucket repositories using the 'HTTPS' \
                 format. You must either remove the credential if you wish to use the 'SSH' \
                 format and are not using a private repository, or you must change the \
                 repository URL to the 'HTTPS' format.",
            ));
        }

        Ok(Self {
            repository,
            reference: reference.filter(|r| !r.trim().is_empty()),
            credentials,
            git: GitConfig::default(),
        })
    }

    /// Whether credentials can be embedded in this repository URL (`https` only)
    pub fn accepts_credentials(repository: &str) -> bool {
        Url::parse(repository)
            .map(|url| url.scheme() == "https")
            .unwrap_or(false)
    }

    /// Override the git executable, clone depth and timeout
    pub fn with_git_config(mut self, git: GitConfig) -> Self {
        self.git = git;
        self
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    pub fn credentials(&self) -> Option<&BitbucketCredentials> {
        self.credentials.as_ref()
    }

    /// Format the URL handed to `git clone`.
    ///
    /// For private HTTPS repositories the credentials are embedded, e.g.
    /// `https://x-token-auth:<token>@bitbucket.org/<user>/<repo>.git`. All
    /// other repositories are returned unchanged.
    pub fn create_repo_url(&self) -> Result<String> {
        let Some(credentials) = &self.credentials else {
            return Ok(self.repository.clone());
        };
        if !Self::accepts_credentials(&self.repository) {
            return Ok(self.repository.clone());
        }

        let Some((user, secret)) = credentials.git_userinfo() else {
            warn!("Credentials carry neither a token nor a password; cloning anonymously");
            return Ok(self.repository.clone());
        };

        let mut url = Url::parse(&self.repository)?;
        url.set_username(&user)
            .and_then(|_| url.set_password(Some(&secret)))
            .map_err(|_| {
                FetchError::invalid_repository_url(format!(
                    "Cannot embed credentials in repository URL '{}'",
                    self.repository
                ))
            })?;

        Ok(url.to_string())
    }

    /// Return the fully formed `(content_source, content_destination)` paths.
    ///
    /// The destination defaults to the current directory. A sub-directory is
    /// joined onto both sides.
    pub fn get_paths(
        dst_dir: Option<&Path>,
        src_dir: &Path,
        sub_directory: Option<&str>,
    ) -> Result<(PathBuf, PathBuf)> {
        let mut content_destination = match dst_dir {
            Some(dir) => dir.to_path_buf(),
            None => std::env::current_dir()?,
        };
        let mut content_source = src_dir.to_path_buf();

        if let Some(sub_directory) = sub_directory.filter(|s| !s.is_empty()) {
            content_destination = content_destination.join(sub_directory);
            content_source = content_source.join(sub_directory);
        }

        Ok((content_source, content_destination))
    }

    /// Clone the repository and copy its contents to `local_path`.
    ///
    /// `from_path`, when given, is a sub-directory of the repository; only it
    /// is copied, to the same relative location under `local_path`.
    /// `local_path` defaults to the current directory. Returns the directory
    /// the contents were copied to.
    pub async fn get_directory(
        &self,
        from_path: Option<&str>,
        local_path: Option<&Path>,
    ) -> Result<PathBuf> {
        if let Some(sub_directory) = from_path {
            path_validation::validate_relative_subpath(sub_directory)?;
        }

        let git = find_git(&self.git.executable)?;
        let clone_url = self.create_repo_url()?;

        let tmp_dir = tempfile::Builder::new().suffix("bbfetch").tempdir()?;

        let mut cmd = Command::new(&git);
        cmd.arg("clone").arg(&clone_url);
        if let Some(reference) = &self.reference {
            cmd.arg("-b").arg(reference);
        }
        // Limit git history
        if self.git.clone_depth > 0 {
            cmd.arg("--depth").arg(self.git.clone_depth.to_string());
        }
        cmd.arg(tmp_dir.path())
            .env("GIT_TERMINAL_PROMPT", "0")
            .kill_on_drop(true);

        info!(
            "Cloning {}{}",
            self.repository,
            self.reference
                .as_deref()
                .map(|r| format!(" at '{r}'"))
                .unwrap_or_default()
        );
        debug!("Scratch clone directory: {}", tmp_dir.path().display());

        let output = match self.git.clone_timeout_secs {
            Some(secs) => tokio::time::timeout(Duration::from_secs(secs), cmd.output())
                .await
                .map_err(|_| FetchError::Clone(format!("git clone timed out after {secs}s")))??,
            None => cmd.output().await?,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FetchError::Clone(self.redact(&clone_url, &stderr)));
        }

        let (content_source, content_destination) =
            Self::get_paths(local_path, tmp_dir.path(), from_path)?;

        if !content_source.is_dir() {
            return Err(FetchError::validation(format!(
                "Sub-directory '{}' does not exist in {}",
                from_path.unwrap_or_default(),
                self.repository
            )));
        }

        let destination = content_destination.clone();
        let copied = async_ops::run_file_operation(move || {
            fs_ops::copy_tree(&content_source, &content_destination)
        })
        .await?;

        info!("Copied {} files to {}", copied, destination.display());
        Ok(destination)
    }

    fn redact(&self, clone_url: &str, text: &str) -> String {
        let text = text.replace(clone_url, &self.repository);
        let secrets = self
            .credentials
            .as_ref()
            .map(|c| c.secrets())
            .unwrap_or_default();
        redact_secrets(&text, &secrets)
    }
}
