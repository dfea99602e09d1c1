//! Unified error handling with Sentry capture.
//!
//! Route handlers return `Result<T, AppError>`. Internal-class errors are
//! captured to Sentry before the response is rendered; client-caused errors
//! (404/409/400) are not.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::services::CatalogError;

/// Application-level error type for the catalog server.
#[derive(Debug, Error)]
pub enum AppError {
    /// Error from the catalog services, already classified.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Failure outside the services (serialization, listener, ...).
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Catalog(CatalogError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Catalog(CatalogError::Conflict(_)) => StatusCode::CONFLICT,
            Self::Catalog(CatalogError::BadRequest(_)) => StatusCode::BAD_REQUEST,
            Self::Catalog(CatalogError::Internal(_)) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if matches!(
            self,
            Self::Catalog(CatalogError::Internal(_)) | Self::Internal(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "request error"
            );
        }

        let status = self.status();

        // Internal details stay out of the response body.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "Internal Server Error".to_owned()
        } else {
            self.to_string()
        };

        let body = json!({
            "statusCode": status.as_u16(),
            "message": message,
            "error": status.canonical_reason().unwrap_or("Unknown"),
        });

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn taxonomy_maps_to_status_codes() {
        assert_eq!(
            status_of(CatalogError::NotFound("x".to_owned()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(CatalogError::Conflict("x".to_owned()).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(CatalogError::BadRequest("x".to_owned()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(CatalogError::Internal("x".to_owned()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(AppError::Internal("x".to_owned())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn client_errors_surface_their_message() {
        let err: AppError = CatalogError::NotFound("Product not found".to_owned()).into();
        assert_eq!(err.to_string(), "Product not found");
    }
}
