pub mod settings;

pub use settings::{CredentialsConfig, GitConfig, Settings};

use crate::errors::{FetchError, Result};
use std::path::PathBuf;

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "BITBUCKET_FETCH_CONFIG_DIR";

/// Get the configuration directory (`$BITBUCKET_FETCH_CONFIG_DIR` or `~/.bitbucket-fetch/`)
pub fn get_config_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }

    let home_dir =
        dirs::home_dir().ok_or_else(|| FetchError::config("Could not find home directory"))?;
    Ok(home_dir.join(".bitbucket-fetch"))
}

/// Path of the settings file inside the configuration directory
pub fn get_config_file() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("config.json"))
}

/// Load settings from the default location
pub fn load_settings() -> Result<Settings> {
    let path = get_config_file()?;
    tracing::debug!("Loading settings from {}", path.display());
    Settings::load_from_file(&path)
}

/// Save settings to the default location
pub fn save_settings(settings: &Settings) -> Result<()> {
    let path = get_config_file()?;
    settings.save_to_file(&path)?;
    tracing::debug!("Saved settings to {}", path.display());
    Ok(())
}
