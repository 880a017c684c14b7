use crate::bitbucket::{BitbucketClient, ClientOptions, ClientType};
use crate::cli::commands::resolve_credentials;
use crate::cli::output::Output;
use crate::cli::CredentialArgs;
use crate::config::load_settings;
use crate::errors::{FetchError, Result};
use crate::utils::spinner::Spinner;
use std::time::Duration;

/// Verify that the resolved credentials are accepted by Bitbucket
pub async fn run(
    client_type: ClientType,
    timeout_secs: u64,
    credential_args: CredentialArgs,
) -> Result<()> {
    let client = authenticated_client(client_type, timeout_secs, credential_args)?;

    let spinner = Spinner::new(format!("Contacting Bitbucket ({client_type})"));
    let result = client.test_connection().await;
    spinner.stop();

    match result {
        Ok(()) => {
            Output::success(format!("Authenticated against Bitbucket ({client_type})"));
            Ok(())
        }
        Err(e) => {
            Output::error(format!("Bitbucket rejected the connection: {e}"));
            if matches!(e, FetchError::Bitbucket { status: 401 | 403, .. }) {
                Output::solution("Check the token/password and its repository permissions");
            }
            Err(e)
        }
    }
}

/// Show repository details and the advertised clone links
pub async fn repository_info(
    owner: &str,
    slug: &str,
    client_type: ClientType,
    timeout_secs: u64,
    credential_args: CredentialArgs,
) -> Result<()> {
    let client = authenticated_client(client_type, timeout_secs, credential_args)?;

    let spinner = Spinner::new(format!("Fetching {owner}/{slug}"));
    let result = client.get_repository(owner, slug).await;
    spinner.stop();
    let info = result?;

    Output::section(&info.name);
    Output::sub_item(format!("Slug: {}", info.slug));
    if let Some(description) = info.description.as_deref().filter(|d| !d.is_empty()) {
        Output::sub_item(format!("Description: {description}"));
    }
    for link in &info.links.clone {
        Output::sub_item(format!("Clone ({}): {}", link.name, link.href));
    }
    if let Some(https) = info.https_clone_url() {
        Output::tip(format!("bbfetch clone {https}"));
    }

    Ok(())
}

fn authenticated_client(
    client_type: ClientType,
    timeout_secs: u64,
    credential_args: CredentialArgs,
) -> Result<BitbucketClient> {
    let settings = load_settings()?;
    let credentials = resolve_credentials(credential_args, &settings)?.ok_or_else(|| {
        FetchError::auth(
            "No credentials found. Pass --token/--username/--password, --credentials <profile>, \
             or set BITBUCKET_TOKEN",
        )
    })?;

    if timeout_secs == 0 {
        return Err(FetchError::validation("--timeout must be greater than zero"));
    }
    let options = ClientOptions {
        timeout: Duration::from_secs(timeout_secs),
    };
    credentials.get_client_with(client_type, options)
}
