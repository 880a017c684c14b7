use crate::bitbucket::BitbucketCredentials;
use crate::cli::output::Output;
use crate::config::{get_config_file, Settings};
use crate::errors::Result;
use crate::git::{find_git, git_version};

/// Check git availability and stored configuration
pub async fn run() -> Result<()> {
    println!("🩺 bbfetch doctor");
    println!("━━━━━━━━━━━━━━━━━");

    let mut issues_found = 0;
    let mut warnings_found = 0;

    let settings = match check_configuration() {
        Ok((settings, warnings)) => {
            warnings_found += warnings;
            settings
        }
        Err(issues) => {
            issues_found += issues;
            Settings::default()
        }
    };

    issues_found += check_git(&settings.git.executable).await;
    warnings_found += check_environment();

    print_summary(issues_found, warnings_found);
    Ok(())
}

async fn check_git(executable: &str) -> u32 {
    Output::section("Git");

    let path = match find_git(executable) {
        Ok(path) => path,
        Err(e) => {
            Output::error(e);
            Output::solution("Install git or set git.executable in the settings file");
            return 1;
        }
    };
    Output::success(format!("Found git at {}", path.display()));

    match git_version(executable).await {
        Ok(version) => {
            Output::sub_item(version);
            0
        }
        Err(e) => {
            Output::error(e);
            1
        }
    }
}

/// Returns the loaded settings and a warning count, or the issue count
fn check_configuration() -> std::result::Result<(Settings, u32), u32> {
    Output::section("Configuration");

    let config_file = match get_config_file() {
        Ok(path) => path,
        Err(e) => {
            Output::error(e);
            return Err(1);
        }
    };

    if !config_file.exists() {
        Output::info(format!(
            "No settings file at {} (defaults in use)",
            config_file.display()
        ));
        return Ok((Settings::default(), 0));
    }

    let settings = match Settings::load_from_file(&config_file) {
        Ok(settings) => settings,
        Err(e) => {
            Output::error(e);
            Output::solution(format!("Fix or delete {}", config_file.display()));
            return Err(1);
        }
    };
    Output::success(format!("Settings file: {}", config_file.display()));

    let mut warnings = 0;
    for (name, profile) in &settings.credentials {
        match BitbucketCredentials::from_config(profile) {
            Ok(_) => Output::sub_item(format!("Profile '{name}' is valid")),
            Err(e) => {
                Output::warning(format!("Profile '{name}': {e}"));
                warnings += 1;
            }
        }
    }

    // Profile problems were reported above
    if warnings == 0 {
        if let Err(e) = settings.validate() {
            Output::warning(e);
            warnings += 1;
        }
    }

    Ok((settings, warnings))
}

fn check_environment() -> u32 {
    Output::section("Environment");

    match BitbucketCredentials::from_env() {
        Ok(Some(_)) => {
            Output::success("BITBUCKET_* credentials found in the environment");
            0
        }
        Ok(None) => {
            Output::info("No BITBUCKET_* credentials in the environment");
            0
        }
        Err(e) => {
            Output::warning(format!("Environment credentials are invalid: {e}"));
            1
        }
    }
}

fn print_summary(issues: u32, warnings: u32) {
    Output::section("Summary");
    match (issues, warnings) {
        (0, 0) => Output::success("Everything looks good"),
        (0, w) => Output::warning(format!("{w} warning(s) found")),
        (i, w) => Output::error(format!("{i} issue(s) and {w} warning(s) found")),
    }
}
