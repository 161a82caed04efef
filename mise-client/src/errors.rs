use reqwest::StatusCode;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Banner text shown when the recipe list cannot be loaded.
pub const FETCH_FAILED_MESSAGE: &str = "Unable to load recipes";

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("You do not have sufficient permissions for this recipe")]
    PermissionDenied,
    #[error("The recipe does not exist")]
    NotFound,
    #[error("Backend responded with {status}: {message}")]
    Backend { status: StatusCode, message: String },
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Upload rejected: {0}")]
    Upload(#[from] mise::upload::UploadError),
}

impl StoreError {
    /// Classify a non-success status. `message` is the backend's own explanation, if any.
    pub fn from_status(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::FORBIDDEN => StoreError::PermissionDenied,
            StatusCode::NOT_FOUND => StoreError::NotFound,
            _ => StoreError::Backend { status, message },
        }
    }

    /// The one line a view should display for this failure.
    pub fn user_message(&self) -> String {
        match self {
            StoreError::PermissionDenied | StoreError::NotFound | StoreError::Upload(_) => {
                self.to_string()
            }
            _ => "Something went wrong while talking to the recipe backend".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_are_classified() {
        assert!(matches!(
            StoreError::from_status(StatusCode::FORBIDDEN, "Forbidden".into()),
            StoreError::PermissionDenied
        ));
        assert!(matches!(
            StoreError::from_status(StatusCode::NOT_FOUND, String::new()),
            StoreError::NotFound
        ));
        assert!(matches!(
            StoreError::from_status(StatusCode::BAD_GATEWAY, "upstream".into()),
            StoreError::Backend { status: StatusCode::BAD_GATEWAY, .. }
        ));
    }

    #[test]
    fn generic_failures_share_one_message() {
        let a = StoreError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "boom".into());
        let b = StoreError::from_status(StatusCode::BAD_REQUEST, "bad".into());
        assert_eq!(a.user_message(), b.user_message());
        assert_ne!(a.user_message(), StoreError::NotFound.user_message());
    }
}
