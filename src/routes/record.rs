use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::state::SharedState;
use crate::submission::{parser, validator};

/// Recorder endpoint: the upstream the intake relays to when this service
/// hosts its own sheet.
pub async fn record(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Value>, AppError> {
    let Some(recorder) = &state.recorder else {
        return Err(AppError::Rejected {
            status: StatusCode::NOT_FOUND,
            message: "Recorder not configured".to_string(),
        });
    };

    let body = body?;
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    let candidate = parser::parse_body(content_type, &body).map_err(AppError::Internal)?;

    let record = validator::validate(&candidate, Utc::now())
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let row = recorder
        .record(&record)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to append row: {e}")))?;

    Ok(Json(json!({ "ok": true, "sheetRow": row })))
}
