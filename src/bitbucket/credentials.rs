use crate::bitbucket::client::{BitbucketClient, ClientOptions};
use crate::config::CredentialsConfig;
use crate::errors::{FetchError, Result};
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Base URL used when none is configured
pub const DEFAULT_URL: &str = "https://api.bitbucket.org/";

/// User part BitBucket expects for token-authenticated git over HTTPS
pub const TOKEN_AUTH_USER: &str = "x-token-auth";

const TOKEN_AUTH_PREFIX: &str = "x-token-auth:";
const USERNAME_MAX_LEN: usize = 30;

/// Which flavour of BitBucket the client talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientType {
    /// BitBucket Server / Data Center
    Local,
    /// bitbucket.org
    Cloud,
}

impl ClientType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientType::Local => "local",
            ClientType::Cloud => "cloud",
        }
    }
}

impl fmt::Display for ClientType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClientType {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(ClientType::Local),
            "cloud" => Ok(ClientType::Cloud),
            other => Err(FetchError::validation(format!(
                "Invalid client type '{other}'. Valid options: local, cloud"
            ))),
        }
    }
}

/// Validated BitBucket credentials.
///
/// Token and password are held as secrets and never show up in `Debug`
/// output. Once constructed the value is immutable; it parameterizes either
/// a [`BitbucketClient`] or an authenticated clone URL.
#[derive(Debug)]
pub struct BitbucketCredentials {
    token: Option<SecretString>,
    username: Option<String>,
    password: Option<SecretString>,
    url: String,
}

impl BitbucketCredentials {
    /// Create credentials, validating the username and the token format.
    pub fn new(
        token: Option<String>,
        username: Option<String>,
        password: Option<String>,
        url: Option<String>,
    ) -> Result<Self> {
        let token = non_empty(token);
        let username = username.filter(|u| !u.is_empty());
        let password = non_empty(password);

        if let Some(username) = &username {
            validate_username(username)?;
        }

        if let Some(token) = &token {
            if username.is_none() && !token.starts_with(TOKEN_AUTH_PREFIX) {
                return Err(FetchError::validation(format!(
                    "For use in git operations, Bitbucket credentials token must be prefixed \
                     with '{TOKEN_AUTH_PREFIX}' or a username must be provided"
                )));
            }
        }

        Ok(Self {
            token: token.map(SecretString::from),
            username,
            password: password.map(SecretString::from),
            url: non_empty(url).unwrap_or_else(|| DEFAULT_URL.to_string()),
        })
    }

    /// Build credentials from a stored profile
    pub fn from_config(config: &CredentialsConfig) -> Result<Self> {
        Self::new(
            config.token.clone(),
            config.username.clone(),
            config.password.clone(),
            config.url.clone(),
        )
    }

    /// Build credentials from `BITBUCKET_TOKEN`, `BITBUCKET_USERNAME`,
    /// `BITBUCKET_PASSWORD` and `BITBUCKET_URL`.
    ///
    /// Returns `Ok(None)` when none of the secret-bearing variables are set.
    pub fn from_env() -> Result<Option<Self>> {
        let token = std::env::var("BITBUCKET_TOKEN").ok();
        let username = std::env::var("BITBUCKET_USERNAME").ok();
        let password = std::env::var("BITBUCKET_PASSWORD").ok();
        let url = std::env::var("BITBUCKET_URL").ok();

        if non_empty(token.clone()).is_none() && non_empty(password.clone()).is_none() {
            return Ok(None);
        }

        tracing::debug!("Loading Bitbucket credentials from environment");
        Self::new(token, username, password, url).map(Some)
    }

    pub fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn password(&self) -> Option<&SecretString> {
        self.password.as_ref()
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get an authenticated client for the given BitBucket flavour
    pub fn get_client(&self, client_type: ClientType) -> Result<BitbucketClient> {
        self.get_client_with(client_type, ClientOptions::default())
    }

    /// Get an authenticated client, overriding the default client options
    pub fn get_client_with(
        &self,
        client_type: ClientType,
        options: ClientOptions,
    ) -> Result<BitbucketClient> {
        BitbucketClient::new(self, client_type, options)
    }

    /// The user/password pair to embed in an HTTPS clone URL.
    pub(crate) fn git_userinfo(&self) -> Option<(String, String)> {
        match (&self.token, &self.username, &self.password) {
            (Some(token), Some(username), _) => {
                Some((username.clone(), token.expose_secret().to_string()))
            }
            (Some(token), None, _) => {
                let token = token.expose_secret();
                let secret = token.strip_prefix(TOKEN_AUTH_PREFIX).unwrap_or(token);
                Some((TOKEN_AUTH_USER.to_string(), secret.to_string()))
            }
            (None, Some(username), Some(password)) => {
                Some((username.clone(), password.expose_secret().to_string()))
            }
            _ => None,
        }
    }

    /// Secret values that must be masked in any surfaced output
    pub(crate) fn secrets(&self) -> Vec<&str> {
        let mut secrets = Vec::new();
        if let Some(token) = &self.token {
            let token = token.expose_secret();
            secrets.push(token);
            if let Some(stripped) = token.strip_prefix(TOKEN_AUTH_PREFIX) {
                secrets.push(stripped);
            }
        }
        if let Some(password) = &self.password {
            secrets.push(password.expose_secret());
        }
        secrets
    }
}

/// Validate a BitBucket username: alphanumerics, dash and underscore, at
/// most 30 characters.
pub fn validate_username(username: &str) -> Result<()> {
    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = USERNAME_REGEX.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_-]*$").expect("username pattern is a valid regex")
    });

    if !regex.is_match(username) {
        return Err(FetchError::validation(
            "Username must be alpha, num, dash and/or underscore only.",
        ));
    }

    if username.chars().count() > USERNAME_MAX_LEN {
        return Err(FetchError::validation(format!(
            "Username cannot be longer than {USERNAME_MAX_LEN} chars."
        )));
    }

    Ok(())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
