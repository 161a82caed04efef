use axum::{
    http,
    response::{IntoResponse, Response},
    Json,
};
use mise::upload::UploadError;
use mise::wire::{ErrorBody, ErrorEnvelope};

pub type WebResult<T> = std::result::Result<T, WebError>;

#[derive(thiserror::Error, Debug)]
pub enum WebError {
    #[error("Internal Server Error: {0}")]
    Internal(#[from] anyhow::Error),
    #[error("Forbidden")]
    Forbidden,
    #[error("Not Found")]
    NotFound,
    #[error("Malformed payload: {0}")]
    BadRequest(String),
    #[error("Malformed multipart payload: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),
    #[error("{0}")]
    PayloadTooLarge(String),
}

impl From<UploadError> for WebError {
    fn from(e: UploadError) -> Self {
        match e {
            UploadError::TooLarge { .. } => WebError::PayloadTooLarge(e.to_string()),
            UploadError::Io(e) => WebError::Internal(e.into()),
        }
    }
}

impl WebError {
    fn status_and_name(&self) -> (http::StatusCode, &'static str) {
        match self {
            WebError::Internal(_) => (http::StatusCode::INTERNAL_SERVER_ERROR, "ApplicationError"),
            WebError::Forbidden => (http::StatusCode::FORBIDDEN, "ForbiddenError"),
            WebError::NotFound => (http::StatusCode::NOT_FOUND, "NotFoundError"),
            WebError::BadRequest(_) | WebError::Multipart(_) => {
                (http::StatusCode::BAD_REQUEST, "ValidationError")
            }
            WebError::PayloadTooLarge(_) => (http::StatusCode::PAYLOAD_TOO_LARGE, "PayloadTooLargeError"),
        }
    }
}

impl IntoResponse for WebError {
    /// Errors go out in the backend's error envelope so clients can read `error.message`.
    fn into_response(self) -> Response {
        let (status, name) = self.status_and_name();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }
        let body = ErrorEnvelope {
            data: None,
            error: ErrorBody {
                status: status.as_u16(),
                name: name.to_string(),
                message: self.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}
