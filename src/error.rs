use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Errors surfaced by the HTTP layer and the manifest fetch path.
///
/// Playback failures are not represented here: they are recorded as
/// [`crate::player::ErrorDescriptor`] values on the active session.
#[derive(Debug, Error)]
pub enum MediaLensError {
    #[error("Failed to fetch from origin: {0}")]
    OriginFetchError(#[from] reqwest::Error),

    #[error("Invalid origin URL: {0}")]
    InvalidOrigin(String),

    #[error("Invalid embed target: {0}")]
    InvalidEmbedTarget(String),

    #[error("Manifest unreadable: {0}")]
    ManifestUnreadable(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type Result<T> = std::result::Result<T, MediaLensError>;

impl MediaLensError {
    /// HTTP status used when the error reaches a handler boundary.
    pub fn status_code(&self) -> StatusCode {
        match self {
            MediaLensError::OriginFetchError(_) => StatusCode::BAD_GATEWAY,
            MediaLensError::InvalidOrigin(_)
            | MediaLensError::InvalidEmbedTarget(_)
            | MediaLensError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            MediaLensError::ManifestUnreadable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            MediaLensError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for MediaLensError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_400() {
        assert_eq!(
            MediaLensError::InvalidOrigin("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            MediaLensError::InvalidEmbedTarget("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            MediaLensError::InvalidRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn unreadable_manifest_is_unprocessable() {
        let err = MediaLensError::ManifestUnreadable("not utf-8".into());
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.to_string(), "Manifest unreadable: not utf-8");
    }

    #[test]
    fn internal_error_is_500() {
        let err = MediaLensError::InternalError("boom".into());
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
