use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::warn;

use crate::application::error::RetrievalError;

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorMessage,
}

pub mod codes {
    pub const BAD_REQUEST: &str = "bad_request";
    pub const MISCONFIGURED: &str = "misconfigured";
    pub const RETRIEVAL_FAILED: &str = "retrieval_failed";
    pub const UNAVAILABLE: &str = "unavailable";
}

#[derive(Debug, Serialize)]
pub struct ApiErrorMessage {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: &'static str,
    hint: Option<String>,
}

impl ApiError {
    pub fn new(
        status: StatusCode,
        code: &'static str,
        message: &'static str,
        hint: Option<String>,
    ) -> Self {
        Self {
            status,
            code,
            message,
            hint,
        }
    }

    pub fn bad_request(message: &'static str, hint: Option<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, codes::BAD_REQUEST, message, hint)
    }

    pub fn unavailable() -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            codes::UNAVAILABLE,
            "Service temporarily unavailable",
            None,
        )
    }

    /// Collapse a retrieval failure into the caller-facing shape. Callers
    /// see whether the service was misconfigured; upstream and store
    /// failures are indistinguishable to them.
    pub fn from_retrieval(err: RetrievalError) -> Self {
        match err {
            RetrievalError::Configuration => {
                warn!(
                    target = "infra::http::api",
                    error = %err,
                    "lookup rejected: missing upstream credential"
                );
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    codes::MISCONFIGURED,
                    "Recipe service is misconfigured",
                    None,
                )
            }
            other => {
                warn!(
                    target = "infra::http::api",
                    error = %other,
                    "recipe retrieval failed"
                );
                Self::new(
                    StatusCode::BAD_GATEWAY,
                    codes::RETRIEVAL_FAILED,
                    "Failed to retrieve recipes",
                    None,
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: ApiErrorMessage {
                code: self.code.to_string(),
                message: self.message.to_string(),
                hint: self.hint,
            },
        };
        (self.status, Json(body)).into_response()
    }
}
