use thiserror::Error;

/// Main error type for pr-recap
#[derive(Error, Debug)]
pub enum PrRecapError {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Missing configuration
    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    /// TOML parsing errors
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// GitHub answered with a non-success status
    #[error("GitHub API error ({status}): {message}")]
    GitHubApi {
        status: reqwest::StatusCode,
        message: String,
    },

    /// No usable GitHub token
    #[error("Authentication error: {0}")]
    Auth(String),

    /// External summarizer failures
    #[error("Summarizer error: {0}")]
    Summarizer(String),

    /// Repository not in `owner/name` form
    #[error("Invalid repository '{repo}': {reason}")]
    InvalidRepo { repo: String, reason: String },

    /// Date not in `YYYY-MM-DD` form
    #[error("Invalid date '{value}': {source}")]
    InvalidDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Result type alias for pr-recap operations
pub type Result<T> = std::result::Result<T, PrRecapError>;

impl PrRecapError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new authentication error
    pub fn auth<S: Into<String>>(msg: S) -> Self {
        Self::Auth(msg.into())
    }

    /// Create a new summarizer error
    pub fn summarizer<S: Into<String>>(msg: S) -> Self {
        Self::Summarizer(msg.into())
    }

    /// Create a new repository format error
    pub fn invalid_repo<R: Into<String>, S: Into<String>>(repo: R, reason: S) -> Self {
        Self::InvalidRepo {
            repo: repo.into(),
            reason: reason.into(),
        }
    }

    /// Create a new generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }
}
