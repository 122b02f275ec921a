use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found")]
    NotFound,

    #[error("Authentication required")]
    Unauthorized,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Server responded with {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl RepositoryError {
    /// Maps a non-success status and its error message to a repository error.
    pub fn from_status(status: StatusCode, message: Option<String>) -> Self {
        let message = message.unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        });
        match status {
            StatusCode::NOT_FOUND => RepositoryError::NotFound,
            StatusCode::UNAUTHORIZED => RepositoryError::Unauthorized,
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                RepositoryError::ValidationError(message)
            }
            _ => RepositoryError::Http {
                status: status.as_u16(),
                message,
            },
        }
    }
}

impl From<reqwest::Error> for RepositoryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RepositoryError::Decode(err.to_string())
        } else if err.is_connect() || err.is_timeout() || err.is_request() {
            RepositoryError::ConnectionError(err.to_string())
        } else if let Some(status) = err.status() {
            RepositoryError::from_status(status, Some(err.to_string()))
        } else {
            RepositoryError::Unexpected(err.to_string())
        }
    }
}
