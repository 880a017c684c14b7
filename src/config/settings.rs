use crate::bitbucket::BitbucketCredentials;
use crate::errors::{FetchError, Result};
use crate::utils::atomic_file;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Named credential profiles
    #[serde(default)]
    pub credentials: BTreeMap<String, CredentialsConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_credentials: Option<String>,
    #[serde(default)]
    pub git: GitConfig,
}

/// Stored, unvalidated form of [`BitbucketCredentials`]
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let masked = |value: &Option<String>| value.as_ref().map(|_| "***");
        f.debug_struct("CredentialsConfig")
            .field("token", &masked(&self.token))
            .field("username", &self.username)
            .field("password", &masked(&self.password))
            .field("url", &self.url)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    /// Name or path of the git executable
    pub executable: String,
    /// History depth passed to `git clone --depth`; 0 clones full history
    pub clone_depth: u32,
    /// Abort a clone that runs longer than this many seconds
    pub clone_timeout_secs: Option<u64>,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            executable: "git".to_string(),
            clone_depth: 1,
            clone_timeout_secs: None,
        }
    }
}

impl Settings {
    /// Load settings from a file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| FetchError::config(format!("Failed to read config file: {e}")))?;

        let settings: Settings = serde_json::from_str(&content)
            .map_err(|e| FetchError::config(format!("Failed to parse config file: {e}")))?;

        Ok(settings)
    }

    /// Save settings to a file, readable by the owner only
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                FetchError::config(format!("Failed to create config directory: {e}"))
            })?;
        }

        atomic_file::write_json(path, self)
    }

    /// Store a credential profile after validating it
    pub fn set_credentials(&mut self, name: &str, config: CredentialsConfig) -> Result<()> {
        validate_profile_name(name)?;
        BitbucketCredentials::from_config(&config)?;

        self.credentials.insert(name.to_string(), config);
        tracing::debug!("Stored credentials profile '{}'", name);
        Ok(())
    }

    /// Remove a credential profile, returning whether it existed
    pub fn remove_credentials(&mut self, name: &str) -> bool {
        let removed = self.credentials.remove(name).is_some();
        if removed && self.default_credentials.as_deref() == Some(name) {
            self.default_credentials = None;
        }
        removed
    }

    /// Set the profile used when no other credentials are given
    pub fn set_default_credentials(&mut self, name: &str) -> Result<()> {
        if !self.credentials.contains_key(name) {
            return Err(FetchError::config(format!(
                "No credentials profile named '{name}'"
            )));
        }

        self.default_credentials = Some(name.to_string());
        Ok(())
    }

    /// Build validated credentials from a named profile
    pub fn credentials(&self, name: &str) -> Result<BitbucketCredentials> {
        let config = self.credentials.get(name).ok_or_else(|| {
            FetchError::config(format!("No credentials profile named '{name}'"))
        })?;
        BitbucketCredentials::from_config(config)
    }

    /// Build validated credentials from the default profile, if any
    pub fn default_credentials(&self) -> Result<Option<BitbucketCredentials>> {
        self.default_credentials
            .as_deref()
            .map(|name| self.credentials(name))
            .transpose()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        for (name, config) in &self.credentials {
            BitbucketCredentials::from_config(config).map_err(|e| {
                FetchError::config(format!("Invalid credentials profile '{name}': {e}"))
            })?;
        }

        if let Some(default) = &self.default_credentials {
            if !self.credentials.contains_key(default) {
                return Err(FetchError::config(format!(
                    "Default credentials profile '{default}' does not exist"
                )));
            }
        }

        if self.git.executable.trim().is_empty() {
            return Err(FetchError::config("git.executable cannot be empty"));
        }

        if self.git.clone_timeout_secs == Some(0) {
            return Err(FetchError::config(
                "git.clone_timeout_secs must be greater than zero",
            ));
        }

        Ok(())
    }
}

fn validate_profile_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

    if !valid {
        return Err(FetchError::validation(format!(
            "Invalid profile name '{name}': use letters, digits, '-', '_' or '.'"
        )));
    }
    Ok(())
}
