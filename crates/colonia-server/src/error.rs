use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts, Path, Query,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use colonia_storage::StorageError;
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by HTTP handlers
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Invalid request: {0}")]
    BadRequest(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            Self::Storage(err) => match err {
                StorageError::NotFound { .. } => {
                    (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string())
                }
                StorageError::InvalidOrExpiredPass(_) => (
                    StatusCode::BAD_REQUEST,
                    "INVALID_OR_EXPIRED_PASS",
                    err.to_string(),
                ),
                StorageError::AuthenticationFailure(_) => (
                    StatusCode::BAD_REQUEST,
                    "AUTHENTICATION_FAILURE",
                    err.to_string(),
                ),
                StorageError::Validation(_) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string())
                }
                StorageError::ReferentialIntegrity(_) => {
                    (StatusCode::CONFLICT, "CONFLICT", err.to_string())
                }
                StorageError::ScanFailure(_) => {
                    tracing::error!("Scan failure: {}", err);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "SCAN_FAILURE",
                        err.to_string(),
                    )
                }
                StorageError::PersistenceFailure(_) => {
                    tracing::error!("Persistence failure: {}", err);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "PERSISTENCE_FAILURE",
                        "The record could not be saved".to_string(),
                    )
                }
                _ => {
                    tracing::error!("Storage error: {}", err);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "Internal server error".to_string(),
                    )
                }
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        let body = ErrorResponse {
            error: ErrorBody { code, message },
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// JSON body extractor whose rejections use the [`AppError`] envelope
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Path extractor; malformed ids become `BAD_REQUEST` envelopes
#[derive(Debug, FromRequestParts)]
#[from_request(via(Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);
