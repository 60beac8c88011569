use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use semdex::{EmbedError, PipelineError, StoreError};
use serde::{Deserialize, Serialize};

pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    Pipeline(#[from] PipelineError),

    #[error("Not found")]
    NotFound,
}

/// API error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl ServerError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ServerError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound => StatusCode::NOT_FOUND,
            ServerError::Pipeline(err) => match err {
                PipelineError::MissingText | PipelineError::MissingQuery => {
                    StatusCode::BAD_REQUEST
                }
                PipelineError::Store(StoreError::IndexNotFound { .. }) => StatusCode::NOT_FOUND,
                PipelineError::Store(StoreError::AccessDenied { .. }) => StatusCode::FORBIDDEN,
                PipelineError::Embed(_) | PipelineError::Store(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    /// Get error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            ServerError::Authentication(_) => "AUTH_FAILED",
            ServerError::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            ServerError::BadRequest(_) => "BAD_REQUEST",
            ServerError::NotFound => "NOT_FOUND",
            ServerError::Pipeline(err) => match err {
                PipelineError::MissingText | PipelineError::MissingQuery => "MISSING_FIELD",
                PipelineError::Embed(EmbedError::InvalidEmbedding(_)) => "INVALID_EMBEDDING",
                PipelineError::Embed(_) => "EMBEDDING_FAILED",
                PipelineError::Store(StoreError::IndexNotFound { .. }) => "INDEX_NOT_FOUND",
                PipelineError::Store(StoreError::AccessDenied { .. }) => "ACCESS_DENIED",
                PipelineError::Store(_) => "STORE_FAILED",
            },
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request_failed");
        }

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message: self.to_string(),
            },
        });

        (status, body).into_response()
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(err: PipelineError) -> (StatusCode, &'static str) {
        let err = ServerError::from(err);
        (err.status_code(), err.error_code())
    }

    #[test]
    fn pipeline_errors_map_to_distinct_statuses() {
        assert_eq!(
            status(PipelineError::MissingText),
            (StatusCode::BAD_REQUEST, "MISSING_FIELD")
        );
        assert_eq!(
            status(PipelineError::Store(StoreError::IndexNotFound {
                index: "i".into(),
                bucket: "b".into()
            })),
            (StatusCode::NOT_FOUND, "INDEX_NOT_FOUND")
        );
        assert_eq!(
            status(PipelineError::Store(StoreError::AccessDenied {
                index: "i".into(),
                bucket: "b".into(),
                message: "denied".into()
            })),
            (StatusCode::FORBIDDEN, "ACCESS_DENIED")
        );
        assert_eq!(
            status(PipelineError::Embed(EmbedError::InvalidEmbedding(
                "empty".into()
            ))),
            (StatusCode::INTERNAL_SERVER_ERROR, "INVALID_EMBEDDING")
        );
        assert_eq!(
            status(PipelineError::Store(StoreError::service("throttled"))),
            (StatusCode::INTERNAL_SERVER_ERROR, "STORE_FAILED")
        );
    }

    #[test]
    fn not_found_message_names_index_and_bucket() {
        let err = ServerError::from(PipelineError::Store(StoreError::IndexNotFound {
            index: "characters".into(),
            bucket: "despicable".into(),
        }));
        let message = err.to_string();
        assert!(message.contains("'characters'"));
        assert!(message.contains("'despicable'"));
    }
}
