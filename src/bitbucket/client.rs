use crate::bitbucket::credentials::{BitbucketCredentials, ClientType};
use crate::errors::{FetchError, Result};
use base64::Engine;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION},
    Client,
};
use secrecy::ExposeSecret;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, trace};

/// Options forwarded to the underlying HTTP client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

/// Authenticated Bitbucket REST API client
#[derive(Debug)]
pub struct BitbucketClient {
    client: Client,
    base_url: String,
    client_type: ClientType,
}

impl BitbucketClient {
    /// Create a new Bitbucket client
    pub fn new(
        credentials: &BitbucketCredentials,
        client_type: ClientType,
        options: ClientOptions,
    ) -> Result<Self> {
        let base_url = url::Url::parse(credentials.url())?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(FetchError::config(format!(
                "Bitbucket URL must start with http:// or https://, got '{}'",
                credentials.url()
            )));
        }

        let mut headers = HeaderMap::new();

        let auth_header = authorization_header(credentials)?;
        let mut auth_value = HeaderValue::from_str(&auth_header)
            .map_err(|e| FetchError::config(format!("Invalid auth header: {e}")))?;
        auth_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_value);

        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(options.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| FetchError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: credentials.url().to_string(),
            client_type,
        })
    }

    pub fn client_type(&self) -> ClientType {
        self.client_type
    }

    /// Get the full API URL for a path relative to the API root
    pub fn api_url(&self, path: &str) -> String {
        let api_root = match self.client_type {
            ClientType::Cloud => "2.0",
            ClientType::Local => "rest/api/1.0",
        };

        format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            api_root,
            path.trim_start_matches('/')
        )
    }

    /// Make a GET request to the Bitbucket API
    pub async fn get<T>(&self, path: &str) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let url = self.api_url(path);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Network(format!("GET request failed: {e}")))?;

        self.handle_response(response).await
    }

    /// Handle HTTP response and deserialize JSON
    async fn handle_response<T>(&self, response: reqwest::Response) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let status = response.status();

        if status.is_success() {
            let text = response.text().await?;

            trace!("Response body: {}", text);

            Ok(serde_json::from_str(&text)?)
        } else {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(FetchError::bitbucket_api(status.as_u16(), text))
        }
    }

    /// Test the connection and the credentials against Bitbucket
    pub async fn test_connection(&self) -> Result<()> {
        let path = match self.client_type {
            ClientType::Cloud => "user",
            ClientType::Local => "application-properties",
        };

        debug!("Testing connection to {}", self.api_url(path));
        let _: serde_json::Value = self.get(path).await?;
        debug!("Connection test successful");
        Ok(())
    }

    /// Get repository information.
    ///
    /// `owner` is the workspace on Bitbucket Cloud and the project key on
    /// Bitbucket Server.
    pub async fn get_repository(&self, owner: &str, slug: &str) -> Result<RepositoryInfo> {
        let path = match self.client_type {
            ClientType::Cloud => format!("repositories/{owner}/{slug}"),
            ClientType::Local => format!("projects/{owner}/repos/{slug}"),
        };
        self.get(&path).await
    }
}

fn authorization_header(credentials: &BitbucketCredentials) -> Result<String> {
    let basic = |user: &str, secret: &str| {
        let encoded = base64::engine::general_purpose::STANDARD.encode(format!("{user}:{secret}"));
        format!("Basic {encoded}")
    };

    match (
        credentials.username(),
        credentials.password(),
        credentials.token(),
    ) {
        (Some(username), Some(password), _) => Ok(basic(username, password.expose_secret())),
        (Some(username), None, Some(token)) => Ok(basic(username, token.expose_secret())),
        (None, _, Some(token)) => {
            let token = token.expose_secret();
            let token = token.strip_prefix("x-token-auth:").unwrap_or(token);
            Ok(format!("Bearer {token}"))
        }
        _ => Err(FetchError::auth(
            "Bitbucket authentication credentials not configured",
        )),
    }
}

/// Repository information shared by Bitbucket Cloud and Server responses
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryInfo {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub links: RepositoryLinks,
}

/// Repository links
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepositoryLinks {
    #[serde(default)]
    pub clone: Vec<CloneLink>,
}

/// Clone link information
#[derive(Debug, Clone, Deserialize)]
pub struct CloneLink {
    pub href: String,
    pub name: String,
}

impl RepositoryInfo {
    /// The HTTP(S) clone link, if the server advertises one
    pub fn https_clone_url(&self) -> Option<&str> {
        self.links
            .clone
            .iter()
            .find(|link| link.name == "https" || link.name == "http")
            .map(|link| link.href.as_str())
    }

    /// The SSH clone link, if the server advertises one
    pub fn ssh_clone_url(&self) -> Option<&str> {
        self.links
            .clone
            .iter()
            .find(|link| link.name == "ssh")
            .map(|link| link.href.as_str())
    }
}
