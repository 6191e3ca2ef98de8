use serde_json::Value;

use super::{RelayOutcome, UpstreamResponse};

/// Longest body or message excerpt carried in a diagnostic, in characters.
pub const DETAIL_LIMIT: usize = 500;

const DEFAULT_APPLICATION_ERROR: &str = "Upstream reported failure";

/// Classify an upstream response.
///
/// Status is checked first, then body shape, then the `ok` flag, so each
/// failure is attributed to the earliest signal that tells it apart. The
/// body is parsed as JSON whatever the declared content type: the upstream
/// mislabels JSON and also serves HTML error pages with a 200.
pub fn classify(response: &UpstreamResponse) -> RelayOutcome {
    if !(200..300).contains(&response.status) {
        return RelayOutcome::RejectedByUpstream {
            status: response.status,
            detail: truncate(&response.body),
        };
    }

    let parsed = match serde_json::from_str::<Value>(&response.body) {
        Ok(Value::Object(map)) => map,
        _ => return RelayOutcome::MalformedUpstreamResponse(truncate(&response.body)),
    };

    // Logged only; the parsed body decides.
    if !response
        .content_type
        .as_deref()
        .is_some_and(|ct| ct.contains("json"))
    {
        tracing::debug!(
            "Upstream labelled a JSON body as {:?}",
            response.content_type
        );
    }

    if parsed.get("ok") != Some(&Value::Bool(true)) {
        let message = ["error", "message"]
            .iter()
            .find_map(|key| parsed.get(*key).and_then(|v| v.as_str()))
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_APPLICATION_ERROR);
        return RelayOutcome::UpstreamApplicationError(truncate(message));
    }

    RelayOutcome::Success(parsed)
}

pub fn truncate(text: &str) -> String {
    text.chars().take(DETAIL_LIMIT).collect()
}
