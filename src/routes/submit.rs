use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Map, Value};

use crate::error::AppError;
use crate::state::SharedState;
use crate::submission::pipeline::Accepted;
use crate::submission::{parser, pipeline};

/// Intake endpoint for delight submissions.
///
/// 400 on invalid fields, 202 when accepted but not delivered, 502 when the
/// upstream was reached and refused, 200 with the upstream's extra fields
/// on success. A body that cannot be parsed at all is a 500.
pub async fn submit(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, AppError> {
    let body = body?;
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    let candidate = parser::parse_body(content_type, &body).map_err(AppError::Internal)?;

    match pipeline::run(&state.relay, candidate).await? {
        Accepted::Queued { warning } => Ok((
            StatusCode::ACCEPTED,
            Json(json!({
                "ok": true,
                "queued": true,
                "warning": warning,
            })),
        )
            .into_response()),
        Accepted::Delivered(payload) => {
            let mut body = Map::new();
            body.insert("ok".to_string(), Value::Bool(true));
            body.extend(payload.into_iter().filter(|(key, _)| key != "ok"));
            Ok((StatusCode::OK, Json(Value::Object(body))).into_response())
        }
    }
}
