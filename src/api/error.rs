use crate::relay::RelayError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl From<RelayError> for ApiError {
    fn from(e: RelayError) -> Self {
        if e.is_not_found() {
            ApiError::NotFound(e.to_string())
        } else if e.is_malformed_identifier() {
            ApiError::InvalidRequest(e.to_string())
        } else {
            ApiError::InternalError(e.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message, error_code) = match self {
            ApiError::InvalidRequest(e) => (StatusCode::BAD_REQUEST, e, "INVALID_REQUEST"),
            ApiError::NotFound(e) => (StatusCode::NOT_FOUND, e, "NOT_FOUND"),
            ApiError::InternalError(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, e, "INTERNAL_ERROR")
            }
        };

        let body = Json(json!({
            "error": error_message,
            "code": error_code,
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::IdentityError;
    use crate::store::StoreError;
    use uuid::Uuid;

    #[test]
    fn test_relay_error_mapping() {
        let err = ApiError::from(RelayError::from(StoreError::NotFound(Uuid::nil())));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);

        let err = ApiError::from(RelayError::from(IdentityError::Malformed("x".into())));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
