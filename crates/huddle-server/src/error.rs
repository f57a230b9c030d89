//! HTTP error type. Every crate error converges here and leaves the server as
//! a `{ "success": false, "error": "..." }` body.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use huddle_core::errors::CoreError;
use huddle_db::error::DatabaseError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed request body or query string.
    #[error("{0}")]
    BadRequest(String),

    /// Missing or unknown `x-member-id`.
    #[error("{0}")]
    Unauthorized(String),

    /// The caller's role does not reach the target document.
    #[error("{0}")]
    Forbidden(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl ApiError {
    pub fn forbidden(what: impl std::fmt::Display) -> Self {
        Self::Forbidden(format!("not allowed to {what}"))
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Database(err) => match err {
                DatabaseError::Validation(_) | DatabaseError::InvalidState(_) => {
                    StatusCode::BAD_REQUEST
                }
                DatabaseError::NotFound { .. } => StatusCode::NOT_FOUND,
                DatabaseError::Conflict(_) => StatusCode::CONFLICT,
                DatabaseError::Core(core) => match core {
                    CoreError::NotFound { .. } => StatusCode::NOT_FOUND,
                    CoreError::Validation(_)
                    | CoreError::NotLinkable(_)
                    | CoreError::UnknownVariant { .. } => StatusCode::BAD_REQUEST,
                    CoreError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
                },
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self::Database(err.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "request rejected");
        }
        let body = Json(json!({
            "success": false,
            "error": self.to_string(),
        }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use huddle_core::enums::EntityType;

    #[test]
    fn database_errors_map_to_statuses() {
        let cases = [
            (DatabaseError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (DatabaseError::InvalidState("x".into()), StatusCode::BAD_REQUEST),
            (DatabaseError::not_found(EntityType::Note, "not-1"), StatusCode::NOT_FOUND),
            (DatabaseError::Conflict("x".into()), StatusCode::CONFLICT),
            (DatabaseError::NoResult, StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn unlinkable_type_is_a_bad_request() {
        let err = ApiError::from(CoreError::NotLinkable("member".into()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
