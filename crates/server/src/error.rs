use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// HTTP-facing error: a status code plus a human-readable message,
/// serialized as `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError(pub StatusCode, pub String);

impl ApiError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self(StatusCode::NOT_FOUND, msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(StatusCode::BAD_REQUEST, msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self(StatusCode::CONFLICT, msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self(StatusCode::INTERNAL_SERVER_ERROR, msg.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(json!({ "error": self.1 }))).into_response()
    }
}

impl From<crate::store::StoreError> for ApiError {
    fn from(err: crate::store::StoreError) -> Self {
        use crate::store::StoreError::*;
        match err {
            ScriptNotFound(_) | VersionNotFound(_) => ApiError::not_found(err.to_string()),
            CannotDeleteCurrent(_) => ApiError::conflict(err.to_string()),
            Database(_) => ApiError::internal(err.to_string()),
        }
    }
}

impl From<rating_core::Error> for ApiError {
    fn from(err: rating_core::Error) -> Self {
        use rating_core::Error::*;
        match err {
            EmptyScript | InvalidRating(_) | InvalidParams { .. } | UnknownStrategy(_) => {
                ApiError::bad_request(err.to_string())
            }
            SceneNotFound(_) => ApiError::not_found(err.to_string()),
            Serialization(_) | Pattern(_) | External(_) | MLTimeout(_) | MLUnavailable(_) | MLProtocolError(_) => {
                ApiError::internal(err.to_string())
            }
        }
    }
}
