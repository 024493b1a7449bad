use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::error::AppError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Serialize, Clone)]
pub enum ApiError {
    #[error("Internal server error")]
    InternalError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::EmptyQuery => Self::ValidationError("Query cannot be empty.".to_string()),
            AppError::Validation(msg) | AppError::InvalidConfiguration(msg) => {
                Self::ValidationError(msg)
            }
            AppError::IndexNotFound(_) => Self::NotFound(
                "Vector index not found. Please upload and process content first.".to_string(),
            ),
            // Domain failures keep their descriptive message; a submitted
            // document must never fail silently.
            AppError::Extraction(_)
            | AppError::EmbeddingUnavailable(_)
            | AppError::ModelUnavailable(_)
            | AppError::Model(_)
            | AppError::IndexCorrupt(_)
            | AppError::Processing(_) => Self::InternalError(err.to_string()),
            _ => {
                tracing::error!("Internal error: {:?}", err);
                Self::InternalError("Internal server error".to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_response) = match self {
            Self::InternalError(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    error: message,
                    status: "error".to_string(),
                },
            ),
            Self::ValidationError(message) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: message,
                    status: "error".to_string(),
                },
            ),
            Self::NotFound(message) => (
                StatusCode::NOT_FOUND,
                ErrorResponse {
                    error: message,
                    status: "error".to_string(),
                },
            ),
            Self::PayloadTooLarge(message) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                ErrorResponse {
                    error: message,
                    status: "error".to_string(),
                },
            ),
        };

        (status, Json(error_response)).into_response()
    }
}

#[derive(Serialize, Debug)]
struct ErrorResponse {
    error: String,
    status: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::error::AppError;
    use std::fmt::Debug;

    fn assert_status_code<T: IntoResponse + Debug>(response: T, expected_status: StatusCode) {
        let response = response.into_response();
        assert_eq!(response.status(), expected_status);
    }

    #[test]
    fn test_app_error_to_api_error_conversion() {
        let empty_query = AppError::EmptyQuery;
        let api_error = ApiError::from(empty_query);
        assert!(matches!(api_error, ApiError::ValidationError(_)));

        let not_found = AppError::IndexNotFound("no index at ./data".to_string());
        let api_error = ApiError::from(not_found);
        assert!(matches!(api_error, ApiError::NotFound(_)));

        let validation = AppError::Validation("invalid input".to_string());
        let api_error = ApiError::from(validation);
        assert!(matches!(api_error, ApiError::ValidationError(msg) if msg == "invalid input"));

        let invalid_config = AppError::InvalidConfiguration("overlap too large".to_string());
        let api_error = ApiError::from(invalid_config);
        assert!(matches!(api_error, ApiError::ValidationError(_)));

        let internal_error =
            AppError::Io(std::io::Error::new(std::io::ErrorKind::Other, "io error"));
        let api_error = ApiError::from(internal_error);
        assert!(matches!(api_error, ApiError::InternalError(_)));
    }

    #[test]
    fn domain_failures_keep_their_message() {
        let extraction = AppError::Extraction("OCR backend refused the image".to_string());
        let api_error = ApiError::from(extraction);
        assert!(
            matches!(api_error, ApiError::InternalError(msg) if msg.contains("OCR backend refused"))
        );

        let embedding = AppError::EmbeddingUnavailable("connection refused".to_string());
        let api_error = ApiError::from(embedding);
        assert!(
            matches!(api_error, ApiError::InternalError(msg) if msg.contains("connection refused"))
        );
    }

    #[test]
    fn test_api_error_response_status_codes() {
        let error = ApiError::InternalError("server error".to_string());
        assert_status_code(error, StatusCode::INTERNAL_SERVER_ERROR);

        let error = ApiError::NotFound("not found".to_string());
        assert_status_code(error, StatusCode::NOT_FOUND);

        let error = ApiError::ValidationError("invalid input".to_string());
        assert_status_code(error, StatusCode::BAD_REQUEST);

        let error = ApiError::PayloadTooLarge("too big".to_string());
        assert_status_code(error, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn internal_io_errors_are_sanitized() {
        let sensitive = AppError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "secret path /var/keys",
        ));
        let api_error = ApiError::from(sensitive);
        assert!(matches!(
            api_error,
            ApiError::InternalError(msg) if msg == "Internal server error"
        ));
    }
}
