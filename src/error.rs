use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Caller-facing failure classifications. Every variant renders as a JSON
/// object with `ok: false`.
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Rejected { status: StatusCode, message: String },
    RelayFailed { error: String, detail: Option<String> },
    Internal(String),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad Request: {msg}"),
            AppError::Rejected { status, message } => write!(f, "Rejected ({status}): {message}"),
            AppError::RelayFailed { error, .. } => write!(f, "Relay Failed: {error}"),
            AppError::Internal(msg) => write!(f, "Internal Error: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, json!({ "ok": false, "error": msg }))
            }
            AppError::Rejected { status, message } => {
                (status, json!({ "ok": false, "error": message }))
            }
            AppError::RelayFailed { error, detail } => {
                let mut body = json!({ "ok": false, "error": error });
                if let Some(detail) = detail {
                    body["detail"] = json!(detail);
                }
                (StatusCode::BAD_GATEWAY, body)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "ok": false, "error": msg }),
                )
            }
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<axum::extract::rejection::BytesRejection> for AppError {
    fn from(rejection: axum::extract::rejection::BytesRejection) -> Self {
        AppError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}
