use crate::errors::{FetchError, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Terminal spinner used while long-running commands execute
pub mod spinner;

/// Atomic file operations to prevent corruption during writes
pub mod atomic_file {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Write JSON data to a file atomically using a temporary file + rename strategy
    pub fn write_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
        let content = serde_json::to_string_pretty(data)
            .map_err(|e| FetchError::config(format!("Failed to serialize data: {e}")))?;

        write_string(path, &content)
    }

    /// Write string content to a file atomically using a temporary file + rename strategy.
    ///
    /// The temporary file is created readable by its owner only (0600 on
    /// Unix) and keeps that mode through the rename.
    pub fn write_string(path: &Path, content: &str) -> Result<()> {
        // Create temporary file in the same directory as the target
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut temp = NamedTempFile::new_in(parent)
            .map_err(|e| FetchError::config(format!("Failed to create temporary file: {e}")))?;
        temp.write_all(content.as_bytes())
            .and_then(|_| temp.as_file().sync_all())
            .map_err(|e| FetchError::config(format!("Failed to write temporary file: {e}")))?;

        persist(temp, path)
    }

    /// Platform-specific atomic rename operation
    #[cfg(windows)]
    fn persist(mut temp: NamedTempFile, final_path: &Path) -> Result<()> {
        const MAX_RETRIES: u32 = 3;
        const RETRY_DELAY: std::time::Duration = std::time::Duration::from_millis(100);

        let mut attempt = 1;
        loop {
            match temp.persist(final_path) {
                Ok(_) => return Ok(()),
                Err(e) if attempt == MAX_RETRIES => {
                    return Err(FetchError::config(format!(
                        "Failed to finalize file write after {MAX_RETRIES} attempts on Windows: {}",
                        e.error
                    )));
                }
                // Transient sharing violations are common on Windows
                Err(e) => {
                    temp = e.file;
                    std::thread::sleep(RETRY_DELAY);
                    attempt += 1;
                }
            }
        }
    }

    #[cfg(not(windows))]
    fn persist(temp: NamedTempFile, final_path: &Path) -> Result<()> {
        temp.persist(final_path).map_err(|e| {
            FetchError::config(format!("Failed to finalize file write: {}", e.error))
        })?;
        Ok(())
    }
}

/// Path validation utilities to prevent path traversal
pub mod path_validation {
    use super::*;
    use std::path::Component;

    /// Ensure a repository sub-directory is relative and cannot climb out of
    /// the directory it is joined onto.
    pub fn validate_relative_subpath(sub_directory: &str) -> Result<()> {
        let path = Path::new(sub_directory);

        for component in path.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                Component::ParentDir => {
                    return Err(FetchError::validation(format!(
                        "Sub-directory '{sub_directory}' must not contain '..'"
                    )))
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(FetchError::validation(format!(
                        "Sub-directory '{sub_directory}' must be a relative path"
                    )))
                }
            }
        }

        Ok(())
    }
}

/// Filesystem helpers
pub mod fs_ops {
    use super::*;
    use tracing::warn;

    /// Recursively copy the contents of `src` into `dst`.
    ///
    /// `dst` is created if needed and merged with whatever it already holds;
    /// files of the same name are overwritten. Symlinks are recreated as
    /// symlinks when they resolve inside `src` and skipped otherwise, so a
    /// link can neither loop nor pull in files from outside the tree.
    pub fn copy_tree(src: &Path, dst: &Path) -> Result<u64> {
        if !src.is_dir() {
            return Err(FetchError::validation(format!(
                "Cannot copy tree '{}': not a directory",
                src.display()
            )));
        }

        let root = src.canonicalize()?;
        copy_dir(&root, src, dst)
    }

    fn copy_dir(root: &Path, src: &Path, dst: &Path) -> Result<u64> {
        fs::create_dir_all(dst)?;

        let mut copied = 0;
        for entry in fs::read_dir(src)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let source = entry.path();
            let target = dst.join(entry.file_name());

            if file_type.is_symlink() {
                if copy_symlink(root, &source, &target)? {
                    copied += 1;
                }
            } else if file_type.is_dir() {
                copied += copy_dir(root, &source, &target)?;
            } else {
                // git marks object files read-only, so replace rather than truncate
                remove_existing_file(&target)?;
                fs::copy(&source, &target).map_err(|e| {
                    FetchError::Io(std::io::Error::new(
                        e.kind(),
                        format!("Failed to copy {}: {e}", source.display()),
                    ))
                })?;
                copied += 1;
            }
        }

        Ok(copied)
    }

    /// Recreate `source` at `target`, returning whether the link was kept
    fn copy_symlink(root: &Path, source: &Path, target: &Path) -> Result<bool> {
        let inside_root = source
            .canonicalize()
            .map(|resolved| resolved.starts_with(root))
            .unwrap_or(false);
        if !inside_root {
            warn!(
                "Skipping symlink {} that points outside the copied tree",
                source.display()
            );
            return Ok(false);
        }

        if fs::symlink_metadata(target).is_ok_and(|meta| meta.is_dir()) {
            warn!(
                "Skipping symlink {}: a directory already exists at {}",
                source.display(),
                target.display()
            );
            return Ok(false);
        }
        remove_existing_file(target)?;

        let link = fs::read_link(source)?;
        create_symlink(&link, source, target)?;
        Ok(true)
    }

    fn remove_existing_file(target: &Path) -> Result<()> {
        match fs::symlink_metadata(target) {
            Ok(meta) if !meta.is_dir() => Ok(fs::remove_file(target)?),
            _ => Ok(()),
        }
    }

    #[cfg(unix)]
    fn create_symlink(link: &Path, _source: &Path, target: &Path) -> Result<()> {
        std::os::unix::fs::symlink(link, target)?;
        Ok(())
    }

    #[cfg(windows)]
    fn create_symlink(link: &Path, source: &Path, target: &Path) -> Result<()> {
        if source.is_dir() {
            std::os::windows::fs::symlink_dir(link, target)?;
        } else {
            std::os::windows::fs::symlink_file(link, target)?;
        }
        Ok(())
    }
}

/// Async utilities to prevent blocking operations
pub mod async_ops {
    use super::*;
    use tokio::task;

    /// Run a potentially blocking file operation in a background thread
    pub async fn run_file_operation<F, R>(operation: F) -> Result<R>
    where
        F: FnOnce() -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        task::spawn_blocking(operation)
            .await
            .map_err(|e| FetchError::config(format!("File operation failed: {e}")))?
    }
}

/// Replace every occurrence of the given secrets with `***`
pub fn redact_secrets(text: &str, secrets: &[&str]) -> String {
    let mut redacted = text.to_string();
    // Longest first so a secret containing another is masked whole
    let mut secrets: Vec<&str> = secrets.iter().copied().filter(|s| !s.is_empty()).collect();
    secrets.sort_by_key(|s| std::cmp::Reverse(s.len()));

    for secret in secrets {
        redacted = redacted.replace(secret, "***");
    }
    redacted
}
