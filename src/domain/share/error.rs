use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum ShareServiceError {
    #[error("dependency error: {0}")]
    Dependency(String),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("{0}")]
    NotFound(String),
    #[error("This scene is no longer being shared. Please contact the scene owner.")]
    NotSharable,
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<ShareServiceError> for AppError {
    fn from(err: ShareServiceError) -> Self {
        match err {
            ShareServiceError::Invalid(msg) => AppError::BadRequest(msg),
            ShareServiceError::NotFound(msg) => AppError::NotFound(msg),
            ShareServiceError::NotSharable => AppError::NotSharable(
                "This scene is no longer being shared. Please contact the scene owner.".to_string(),
            ),
            ShareServiceError::Conflict(msg) => AppError::Conflict(msg),
            ShareServiceError::Dependency(msg) => AppError::Internal(msg),
            ShareServiceError::Other(e) => AppError::Internal(e.to_string()),
        }
    }
}
