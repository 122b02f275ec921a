use thiserror::Error;

use crate::repository::errors::RepositoryError;
use crate::state::storage::StorageError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Not found")]
    NotFound,

    #[error("Form error: {0}")]
    Form(String),

    #[error("Invalid value: {0}")]
    TypeConstraint(String),

    #[error("A save is already in progress")]
    SubmitInFlight,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Repository(RepositoryError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ServiceError::NotFound,
            RepositoryError::Unauthorized => ServiceError::Unauthorized,
            RepositoryError::ValidationError(message) => ServiceError::Form(message),
            other => ServiceError::Repository(other),
        }
    }
}

/// What the outermost boundary shows for an error that reached it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackView {
    NotFound,
    LoginRequired,
    Unexpected,
}

impl From<&ServiceError> for FallbackView {
    fn from(err: &ServiceError) -> Self {
        match err {
            ServiceError::NotFound => FallbackView::NotFound,
            ServiceError::Unauthorized => FallbackView::LoginRequired,
            _ => FallbackView::Unexpected,
        }
    }
}

impl FallbackView {
    pub fn message(self) -> &'static str {
        match self {
            FallbackView::NotFound => "The requested record does not exist.",
            FallbackView::LoginRequired => "Your session has ended. Please log in again.",
            FallbackView::Unexpected => "Something went wrong. Please try again.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_errors_map_to_service_errors() {
        assert!(matches!(
            ServiceError::from(RepositoryError::NotFound),
            ServiceError::NotFound
        ));
        assert!(matches!(
            ServiceError::from(RepositoryError::ValidationError("bad".into())),
            ServiceError::Form(msg) if msg == "bad"
        ));
        assert!(matches!(
            ServiceError::from(RepositoryError::ConnectionError("down".into())),
            ServiceError::Repository(RepositoryError::ConnectionError(_))
        ));
    }

    #[test]
    fn fallback_distinguishes_not_found_from_unexpected() {
        assert_eq!(
            FallbackView::from(&ServiceError::NotFound),
            FallbackView::NotFound
        );
        assert_eq!(
            FallbackView::from(&ServiceError::Repository(RepositoryError::Decode(
                "x".into()
            ))),
            FallbackView::Unexpected
        );
        assert_eq!(
            FallbackView::from(&ServiceError::Unauthorized),
            FallbackView::LoginRequired
        );
    }
}
