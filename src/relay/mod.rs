pub mod interpreter;

use std::time::Duration;

use serde_json::{Map, Value};
use url::Url;

use crate::submission::SubmissionRecord;

/// Upper bound on a single forwarding call, body read included.
pub const RELAY_TIMEOUT: Duration = Duration::from_secs(5);

/// What came back from the upstream, before any interpretation.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    /// Diagnostics only. Classification goes by the body.
    pub content_type: Option<String>,
    pub body: String,
}

/// Result of one forwarding attempt at the transport level.
#[derive(Debug)]
pub enum Dispatch {
    Unconfigured,
    Unreachable(String),
    Responded(UpstreamResponse),
}

/// Outcome of relaying one submission. Exactly one holds per attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayOutcome {
    /// No upstream endpoint is configured.
    Unconfigured,
    /// Transport failure or timeout. Carries the reason for logs only.
    Unreachable(String),
    RejectedByUpstream { status: u16, detail: String },
    MalformedUpstreamResponse(String),
    UpstreamApplicationError(String),
    Success(Map<String, Value>),
}

/// Forwards normalized submissions to the configured upstream. Makes exactly
/// one attempt per submission and never retries.
#[derive(Debug, Clone)]
pub struct RelayClient {
    client: reqwest::Client,
    endpoint: Option<Url>,
}

impl RelayClient {
    pub fn new(endpoint: Option<Url>) -> Result<Self, String> {
        Self::with_timeout(endpoint, RELAY_TIMEOUT)
    }

    pub fn with_timeout(endpoint: Option<Url>, timeout: Duration) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| format!("Failed to build relay client: {e}"))?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> Option<&Url> {
        self.endpoint.as_ref()
    }

    /// Forward the record and classify whatever the upstream said.
    pub async fn relay(&self, record: &SubmissionRecord) -> RelayOutcome {
        match self.dispatch(record).await {
            Dispatch::Unconfigured => RelayOutcome::Unconfigured,
            Dispatch::Unreachable(reason) => RelayOutcome::Unreachable(reason),
            Dispatch::Responded(response) => interpreter::classify(&response),
        }
    }

    /// Make the single outbound call. Any transport failure, including the
    /// timeout elapsing while the body is still being read, is `Unreachable`.
    pub async fn dispatch(&self, record: &SubmissionRecord) -> Dispatch {
        let Some(endpoint) = &self.endpoint else {
            return Dispatch::Unconfigured;
        };

        let resp = match self.client.post(endpoint.clone()).json(record).send().await {
            Ok(resp) => resp,
            Err(e) => return Dispatch::Unreachable(describe(&e)),
        };

        let status = resp.status().as_u16();
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        match resp.text().await {
            Ok(body) => Dispatch::Responded(UpstreamResponse {
                status,
                content_type,
                body,
            }),
            Err(e) => Dispatch::Unreachable(describe(&e)),
        }
    }
}

fn describe(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        err.to_string()
    }
}
