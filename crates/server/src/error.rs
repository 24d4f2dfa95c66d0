//! API error body and status mapping.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use khub_core::AppError;
use khub_knowledge::SearchError;
use serde::Serialize;

/// JSON error body: `{"code": <status>, "error": <message>}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: u16,
    pub error: String,
}

/// Error returned by handlers.
///
/// Server-side failures never leak their message to the client.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
    }

    pub fn unavailable() -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, "Service Unavailable")
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        if err.is_client_error() {
            Self::bad_request(err.to_string())
        } else {
            tracing::error!(error = %err, "Request failed");
            Self::internal()
        }
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::Validation(reason) => Self::bad_request(reason.to_string()),
            SearchError::Cancelled => Self::unavailable(),
            _ => Self::internal(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(reason = %rejection.body_text(), "Rejected request body");
        Self::bad_request("invalid message body. please check documentation.")
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!(reason = %rejection.body_text(), "Rejected path parameters");
        Self::bad_request("invalid path parameters")
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        tracing::debug!(reason = %rejection.body_text(), "Rejected query string");
        Self::bad_request("invalid query parameters")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            code: self.status.as_u16(),
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use khub_knowledge::{ExtractionError, NotReady};

    #[test]
    fn test_validation_keeps_message() {
        let err = ApiError::from(AppError::Validation("invalid domain id".to_string()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "invalid domain id");
    }

    #[test]
    fn test_server_errors_are_opaque() {
        let err = ApiError::from(AppError::Database("connection refused".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Internal Server Error");

        let err = ApiError::from(SearchError::Extraction(ExtractionError::Empty));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Internal Server Error");
    }

    #[test]
    fn test_search_error_mapping() {
        let err = ApiError::from(SearchError::Validation(NotReady::NoResources {
            domain_id: "Empty_Domain".to_string(),
        }));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.message.contains("Empty_Domain"));

        assert_eq!(
            ApiError::from(SearchError::Cancelled).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
