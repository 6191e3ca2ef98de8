use chrono::Utc;
use serde_json::{Map, Value};

use crate::error::AppError;
use crate::relay::{RelayClient, RelayOutcome};

use super::validator;

pub const WARNING_NOT_CONFIGURED: &str = "endpoint not configured";
pub const WARNING_UNREACHABLE: &str = "upstream unreachable";

/// How an accepted submission left the intake.
#[derive(Debug, Clone, PartialEq)]
pub enum Accepted {
    /// Accepted but not confirmed delivered. Callers must not read this as
    /// persisted.
    Queued { warning: &'static str },
    /// Upstream confirmed the write. Carries whatever extra fields it sent.
    Delivered(Map<String, Value>),
}

/// Validate a candidate, relay it, and classify the result.
///
/// Validation failures short-circuit before any network traffic. An upstream
/// that is missing or unreachable still yields `Accepted::Queued` so a network
/// blip never blocks the submitting agent.
pub async fn run(relay: &RelayClient, candidate: Value) -> Result<Accepted, AppError> {
    let record = validator::validate(&candidate, Utc::now()).map_err(|e| {
        tracing::debug!("Rejected submission: {e}");
        AppError::BadRequest(e.to_string())
    })?;

    match relay.relay(&record).await {
        RelayOutcome::Unconfigured => {
            tracing::warn!(
                "Relay endpoint not configured; submission not delivered: {}",
                serde_json::to_string(&record).unwrap_or_default()
            );
            Ok(Accepted::Queued {
                warning: WARNING_NOT_CONFIGURED,
            })
        }
        RelayOutcome::Unreachable(reason) => {
            tracing::warn!(
                "Relay upstream unreachable ({reason}); submission not delivered: {}",
                serde_json::to_string(&record).unwrap_or_default()
            );
            Ok(Accepted::Queued {
                warning: WARNING_UNREACHABLE,
            })
        }
        RelayOutcome::RejectedByUpstream { status, detail } => {
            tracing::warn!("Upstream rejected submission with status {status}");
            Err(AppError::RelayFailed {
                error: format!("Upstream responded with status {status}"),
                detail: Some(detail),
            })
        }
        RelayOutcome::MalformedUpstreamResponse(body) => {
            tracing::warn!("Upstream returned a body that is not a JSON object");
            Err(AppError::RelayFailed {
                error: "Upstream returned a malformed response".to_string(),
                detail: Some(body),
            })
        }
        RelayOutcome::UpstreamApplicationError(message) => {
            tracing::warn!("Upstream reported failure: {message}");
            Err(AppError::RelayFailed {
                error: message,
                detail: None,
            })
        }
        RelayOutcome::Success(payload) => {
            tracing::info!(
                "Delight from {} for {} delivered",
                record.agent_name,
                record.occasion
            );
            Ok(Accepted::Delivered(payload))
        }
    }
}
