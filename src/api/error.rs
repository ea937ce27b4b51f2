//! Error-to-response mapping for the HTTP surface.

use crate::error::Error;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Wrapper turning a crate [`Error`] into a JSON failure response with a
/// stable machine-readable kind.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0 {
            Error::Validation(_) | Error::InvalidSignature | Error::UnknownOrder(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::Auth(_) => StatusCode::UNAUTHORIZED,
            Error::AccountNotFound(_) => StatusCode::NOT_FOUND,
            Error::OrderCreation(_) => StatusCode::BAD_GATEWAY,
            Error::Persistence(_) | Error::Config(_) | Error::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "success": false,
            "kind": self.0.kind(),
            "message": self.0.to_string(),
        });
        (self.status(), Json(body)).into_response()
    }
}
