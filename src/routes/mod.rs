pub mod record;
pub mod submit;

use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;

use crate::error::AppError;
use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Intake
        .route("/api/submit", post(submit::submit).fallback(method_not_allowed))
        // Recorder
        .route("/api/record", post(record::record).fallback(method_not_allowed))
}

async fn method_not_allowed() -> AppError {
    AppError::Rejected {
        status: StatusCode::METHOD_NOT_ALLOWED,
        message: "Method not allowed".to_string(),
    }
}
