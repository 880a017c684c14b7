use crate::bitbucket::DEFAULT_URL;
use crate::cli::output::{mask_secret, Output};
use crate::cli::CredentialsAction;
use crate::config::{get_config_file, CredentialsConfig, Settings};
use crate::errors::{FetchError, Result};
use std::path::Path;

/// Handle credential profile commands
pub async fn run(action: CredentialsAction) -> Result<()> {
    let config_file = get_config_file()?;

    match action {
        CredentialsAction::Set {
            name,
            token,
            username,
            password,
            url,
            default,
        } => {
            let profile = CredentialsConfig {
                token,
                username,
                password,
                url,
            };
            set_profile(&config_file, &name, profile, default)
        }
        CredentialsAction::Show { name } => show_profile(&config_file, &name),
        CredentialsAction::List => list_profiles(&config_file),
        CredentialsAction::Remove { name } => remove_profile(&config_file, &name),
        CredentialsAction::Default { name } => set_default_profile(&config_file, &name),
    }
}

fn set_profile(
    config_file: &Path,
    name: &str,
    profile: CredentialsConfig,
    make_default: bool,
) -> Result<()> {
    let mut settings = Settings::load_from_file(config_file)?;
    settings.set_credentials(name, profile)?;
    if make_default || settings.default_credentials.is_none() {
        settings.set_default_credentials(name)?;
    }
    settings.save_to_file(config_file)?;

    Output::success(format!("Stored credentials profile '{name}'"));
    if settings.default_credentials.as_deref() == Some(name) {
        Output::sub_item("Default profile");
    }
    Output::tip("Repository access tokens are used as 'x-token-auth:<token>'");
    Ok(())
}

fn show_profile(config_file: &Path, name: &str) -> Result<()> {
    let settings = Settings::load_from_file(config_file)?;
    let profile = settings
        .credentials
        .get(name)
        .ok_or_else(|| FetchError::config(format!("No credentials profile named '{name}'")))?;

    Output::section(format!("Credentials '{name}'"));
    print_profile(profile);
    Ok(())
}

fn print_profile(profile: &CredentialsConfig) {
    let or_unset = |value: Option<&str>| value.unwrap_or("(not set)").to_string();

    Output::sub_item(format!(
        "url = {}",
        profile.url.as_deref().unwrap_or(DEFAULT_URL)
    ));
    Output::sub_item(format!("username = {}", or_unset(profile.username.as_deref())));
    Output::sub_item(format!("token = {}", mask_secret(profile.token.as_deref())));
    Output::sub_item(format!(
        "password = {}",
        mask_secret(profile.password.as_deref())
    ));
}

fn list_profiles(config_file: &Path) -> Result<()> {
    let settings = Settings::load_from_file(config_file)?;

    if settings.credentials.is_empty() {
        Output::info("No credentials profiles configured");
        Output::tip("Create one with: bbfetch credentials set <name> --token x-token-auth:<token>");
        return Ok(());
    }

    Output::section("Credentials profiles");
    for name in settings.credentials.keys() {
        if settings.default_credentials.as_deref() == Some(name.as_str()) {
            Output::sub_item(format!("{name} (default)"));
        } else {
            Output::sub_item(name);
        }
    }
    Ok(())
}

fn remove_profile(config_file: &Path, name: &str) -> Result<()> {
    let mut settings = Settings::load_from_file(config_file)?;

    if settings.remove_credentials(name) {
        settings.save_to_file(config_file)?;
        Output::success(format!("Removed credentials profile '{name}'"));
    } else {
        Output::warning(format!("No credentials profile named '{name}'"));
    }
    Ok(())
}

fn set_default_profile(config_file: &Path, name: &str) -> Result<()> {
    let mut settings = Settings::load_from_file(config_file)?;
    settings.set_default_credentials(name)?;
    settings.save_to_file(config_file)?;

    Output::success(format!("Default credentials profile set to '{name}'"));
    Ok(())
}
