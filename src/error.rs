// Error types shared by the facade, the API client and the setup flow.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GistError {
    /// A username was needed (unauthenticated listing) but none was configured.
    #[error("no username defined")]
    NoUsernameDefined,

    /// A token was needed (authenticated call) but none was configured.
    #[error("authentication is not configured: no token defined")]
    AuthenticationError,

    #[error("GitHub rejected the credentials (401 Unauthorized)")]
    Unauthorized,

    /// The token can't be sent at all (not a valid header value).
    #[error("token contains characters that are not allowed in a header")]
    InvalidToken,

    #[error("invalid API URL: {0}")]
    InvalidUrl(String),

    #[error("GitHub API error: {status} - {message}")]
    Api {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Token file error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, GistError>;
