pub mod commands;
pub mod output;

use crate::bitbucket::ClientType;
use crate::errors::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bbfetch")]
#[command(about = "Fetch BitBucket repository contents with validated credentials")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Clone a repository (or one of its sub-directories) into a local path
    Clone {
        /// Repository URL in HTTPS or SSH format
        repository: String,

        /// Branch or tag to pin to
        #[arg(long, short)]
        reference: Option<String>,

        /// Sub-directory of the repository to copy
        #[arg(long)]
        from_path: Option<String>,

        /// Destination directory (defaults to the current directory)
        #[arg(long)]
        local_path: Option<PathBuf>,

        #[command(flatten)]
        credentials: CredentialArgs,
    },

    /// Manage stored credential profiles
    Credentials {
        #[command(subcommand)]
        action: CredentialsAction,
    },

    /// Verify credentials against the Bitbucket API
    Check {
        /// Bitbucket flavour: cloud or local (Server/Data Center)
        #[arg(long, default_value = "cloud", value_parser = parse_client_type)]
        client_type: ClientType,

        /// HTTP request timeout in seconds
        #[arg(long, default_value_t = 30, value_name = "SECONDS")]
        timeout: u64,

        #[command(flatten)]
        credentials: CredentialArgs,
    },

    /// Show repository details and clone links
    Info {
        /// Workspace (Cloud) or project key (Server)
        owner: String,

        /// Repository slug
        slug: String,

        /// Bitbucket flavour: cloud or local (Server/Data Center)
        #[arg(long, default_value = "cloud", value_parser = parse_client_type)]
        client_type: ClientType,

        /// HTTP request timeout in seconds
        #[arg(long, default_value_t = 30, value_name = "SECONDS")]
        timeout: u64,

        #[command(flatten)]
        credentials: CredentialArgs,
    },

    /// Check git availability and stored configuration
    Doctor,

    /// Show version information
    Version,
}

/// Credential selection shared by commands that talk to Bitbucket.
///
/// Explicit flags win over `--credentials`, which wins over the
/// `BITBUCKET_*` environment variables and then the default profile.
#[derive(Default, Args)]
pub struct CredentialArgs {
    /// Use a stored credentials profile
    #[arg(long = "credentials", value_name = "PROFILE")]
    pub profile: Option<String>,

    /// Access token (prefix with 'x-token-auth:' unless a username is given)
    #[arg(long)]
    pub token: Option<String>,

    /// Bitbucket username
    #[arg(long)]
    pub username: Option<String>,

    /// Password or app password
    #[arg(long)]
    pub password: Option<String>,

    /// Base URL of the Bitbucket instance
    #[arg(long)]
    pub url: Option<String>,
}

impl CredentialArgs {
    /// Whether the user selected credentials on the command line
    pub fn is_explicit(&self) -> bool {
        self.profile.is_some()
            || self.token.is_some()
            || self.username.is_some()
            || self.password.is_some()
    }
}

#[derive(Subcommand)]
pub enum CredentialsAction {
    /// Create or replace a credentials profile
    Set {
        /// Profile name
        name: String,

        #[arg(long)]
        token: Option<String>,

        #[arg(long)]
        username: Option<String>,

        #[arg(long)]
        password: Option<String>,

        #[arg(long)]
        url: Option<String>,

        /// Also make this the default profile
        #[arg(long)]
        default: bool,
    },

    /// Show a profile with secrets masked
    Show {
        /// Profile name
        name: String,
    },

    /// List stored profiles
    List,

    /// Remove a profile
    Remove {
        /// Profile name
        name: String,
    },

    /// Set the profile used when no credentials are given
    Default {
        /// Profile name
        name: String,
    },
}

fn parse_client_type(value: &str) -> std::result::Result<ClientType, String> {
    value.parse().map_err(|e: crate::errors::FetchError| e.to_string())
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        // Set up logging based on verbosity
        self.setup_logging();

        match self.command {
            Commands::Clone {
                repository,
                reference,
                from_path,
                local_path,
                credentials,
            } => {
                commands::clone::run(repository, reference, from_path, local_path, credentials)
                    .await
            }
            Commands::Credentials { action } => commands::credentials::run(action).await,
            Commands::Check {
                client_type,
                timeout,
                credentials,
            } => commands::check::run(client_type, timeout, credentials).await,
            Commands::Info {
                owner,
                slug,
                client_type,
                timeout,
                credentials,
            } => {
                commands::check::repository_info(&owner, &slug, client_type, timeout, credentials)
                    .await
            }
            Commands::Doctor => commands::doctor::run().await,
            Commands::Version => commands::version::run().await,
        }
    }

    fn setup_logging(&self) {
        let level = if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        };

        let subscriber = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(false)
            .with_writer(std::io::stderr)
            .without_time();

        if self.no_color {
            subscriber.with_ansi(false).init();
        } else {
            subscriber.init();
        }
    }
}
