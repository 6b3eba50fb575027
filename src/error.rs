use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Failures a request handler can surface. Validation problems are not
/// errors here; they render inside the page.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("session cookie error: {0}")]
    Session(#[from] jsonwebtoken::errors::Error),

    #[error("authorization error: {0}")]
    Auth(#[from] crate::auth::AuthError),

    #[error("drive publish error: {0}")]
    Publish(#[from] crate::drive::PublishError),

    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("template error: {0}")]
    Template(#[from] tera::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!("Request failed: {}", self);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Something went wrong processing this request.",
        )
            .into_response()
    }
}
