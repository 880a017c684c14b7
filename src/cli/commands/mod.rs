pub mod check;
pub mod clone;
pub mod credentials;
pub mod doctor;
pub mod version;

use crate::bitbucket::BitbucketCredentials;
use crate::cli::CredentialArgs;
use crate::config::Settings;
use crate::errors::Result;

/// Resolve the credentials a command should use.
///
/// Explicit flags, then `--credentials <profile>`, then the `BITBUCKET_*`
/// environment, then the default profile. `Ok(None)` means anonymous.
pub(crate) fn resolve_credentials(
    args: CredentialArgs,
    settings: &Settings,
) -> Result<Option<BitbucketCredentials>> {
    if args.token.is_some() || args.username.is_some() || args.password.is_some() {
        tracing::debug!("Using credentials from command-line flags");
        return BitbucketCredentials::new(args.token, args.username, args.password, args.url)
            .map(Some);
    }

    if let Some(profile) = &args.profile {
        tracing::debug!("Using credentials profile '{}'", profile);
        return settings.credentials(profile).map(Some);
    }

    if let Some(credentials) = BitbucketCredentials::from_env()? {
        return Ok(Some(credentials));
    }

    let default = settings.default_credentials()?;
    if let Some(name) = &settings.default_credentials {
        tracing::debug!("Using default credentials profile '{}'", name);
    }
    Ok(default)
}
