use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use url::Url;

use super::{SubmissionRecord, ValidationError};

/// Validate and normalize a candidate submission.
///
/// Checks run in a fixed order and stop at the first failure: presence of
/// `ticketLink`, `productLink`, `occasion`, `agentName`, then the two links.
/// Values are trimmed before they are checked or stored. A candidate that is
/// not a JSON object has no fields at all.
///
/// `received_at` fills in `timestamp` when the candidate has none, or when
/// the one it has is not RFC 3339.
pub fn validate(
    candidate: &Value,
    received_at: DateTime<Utc>,
) -> Result<SubmissionRecord, ValidationError> {
    let ticket_link = required(candidate, "ticketLink")?;
    let product_link = required(candidate, "productLink")?;
    let occasion = required(candidate, "occasion")?;
    let agent_name = required(candidate, "agentName")?;

    if !is_valid_url(ticket_link) {
        return Err(ValidationError::InvalidUrl("ticketLink"));
    }
    if !is_valid_url(product_link) {
        return Err(ValidationError::InvalidUrl("productLink"));
    }

    let timestamp = candidate
        .get("timestamp")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| DateTime::parse_from_rfc3339(s).is_ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| received_at.to_rfc3339_opts(SecondsFormat::Millis, true));

    Ok(SubmissionRecord {
        ticket_link: ticket_link.to_string(),
        product_link: product_link.to_string(),
        occasion: occasion.to_string(),
        agent_name: agent_name.to_string(),
        timestamp,
    })
}

/// Absolute URL with an `http` or `https` scheme.
pub fn is_valid_url(candidate: &str) -> bool {
    match Url::parse(candidate) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

/// Non-string values count as missing, same as whitespace-only strings.
fn required<'a>(candidate: &'a Value, field: &'static str) -> Result<&'a str, ValidationError> {
    candidate
        .get(field)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(ValidationError::MissingField(field))
}
