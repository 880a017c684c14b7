/// Bitbucket Fetch Error Types
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Authentication errors
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Network errors
    #[error("Network error: {0}")]
    Network(String),

    /// Credential and argument validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Repository URL does not fit the attached credentials
    #[error("Invalid repository URL: {0}")]
    InvalidRepositoryUrl(String),

    /// `git clone` exited unsuccessfully
    #[error("Failed to pull from remote:\n {0}")]
    Clone(String),

    /// Missing dependency errors
    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    /// Non-success responses from the Bitbucket REST API
    #[error("Bitbucket API error: {status} - {message}")]
    Bitbucket { status: u16, message: String },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

impl FetchError {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        FetchError::Config(msg.into())
    }

    pub fn auth<S: Into<String>>(msg: S) -> Self {
        FetchError::Auth(msg.into())
    }

    pub fn validation<S: Into<String>>(msg: S) -> Self {
        FetchError::Validation(msg.into())
    }

    pub fn invalid_repository_url<S: Into<String>>(msg: S) -> Self {
        FetchError::InvalidRepositoryUrl(msg.into())
    }

    pub fn missing_dependency<S: Into<String>>(msg: S) -> Self {
        FetchError::MissingDependency(msg.into())
    }

    pub fn bitbucket_api(status: u16, message: String) -> Self {
        FetchError::Bitbucket { status, message }
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
