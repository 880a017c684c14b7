use crate::cli::commands::resolve_credentials;
use crate::cli::output::Output;
use crate::cli::CredentialArgs;
use crate::config::load_settings;
use crate::errors::Result;
use crate::git::BitbucketRepository;
use crate::utils::spinner::Spinner;
use std::path::PathBuf;
use tracing::debug;

/// Clone a repository and copy its contents into the destination
pub async fn run(
    repository: String,
    reference: Option<String>,
    from_path: Option<String>,
    local_path: Option<PathBuf>,
    credential_args: CredentialArgs,
) -> Result<()> {
    let settings = load_settings()?;
    settings.validate()?;

    let explicit = credential_args.is_explicit();
    let mut credentials = resolve_credentials(credential_args, &settings)?;
    // SSH and local URLs carry their own auth; only an explicit request is an error
    if credentials.is_some()
        && !explicit
        && !BitbucketRepository::accepts_credentials(&repository)
    {
        debug!(
            "Not attaching environment/default credentials to non-HTTPS repository {}",
            repository
        );
        credentials = None;
    }

    let repo = BitbucketRepository::new(repository, reference, credentials)?
        .with_git_config(settings.git.clone());

    let spinner = Spinner::new(format!("Cloning {}", repo.repository()));
    let result = repo
        .get_directory(from_path.as_deref(), local_path.as_deref())
        .await;
    spinner.stop();

    let destination = result?;
    Output::success(format!("Fetched {}", repo.repository()));
    if let Some(reference) = repo.reference() {
        Output::sub_item(format!("Reference: {reference}"));
    }
    if let Some(from_path) = &from_path {
        Output::sub_item(format!("Sub-directory: {from_path}"));
    }
    Output::sub_item(format!("Destination: {}", destination.display()));

    Ok(())
}
