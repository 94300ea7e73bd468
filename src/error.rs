use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// ApiError
///
/// The full error taxonomy of the service. Every failure that crosses the HTTP
/// boundary is one of these variants; the `IntoResponse` impl translates each
/// into a status code plus a structured JSON body so that clients can react to
/// the machine-readable kind while humans read the detail message.
#[derive(Debug, Error, PartialEq)]
pub enum ApiError {
    /// Missing, malformed, or expired credential.
    #[error("{0}")]
    Unauthorized(String),

    /// Valid credential, but insufficient role or an ownership violation.
    #[error("{0}")]
    Forbidden(String),

    /// Referenced entity id does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Duplicate unique field or duplicate relation.
    #[error("{0}")]
    Conflict(String),

    /// Malformed input shape or out-of-range value.
    #[error("{0}")]
    Validation(String),

    /// Unexpected failure, e.g. storage unavailable.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            // Both map to 400, matching the upstream service contract; the
            // `error` field in the body keeps them distinguishable.
            ApiError::Conflict(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::Validation(_) => "validation",
            ApiError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            // Internal detail is logged, never leaked to the client.
            tracing::error!("internal error: {detail}");
        }

        let status = self.status();
        let detail = match &self {
            ApiError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };
        let body = Json(json!({ "error": self.kind(), "detail": detail }));

        let mut response = (status, body).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                header::HeaderValue::from_static("Bearer"),
            );
        }
        response
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        // Unique-constraint violations (Postgres 23505) surface as Conflict so
        // that the schema-level guard on the keyword/topic pair and the unique
        // username/email columns produce the same contract as the explicit
        // existence checks.
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some("23505") {
                return ApiError::Conflict("Duplicate value violates a uniqueness rule".into());
            }
        }
        ApiError::Internal(err.to_string())
    }
}
