pub mod parser;
pub mod pipeline;
pub mod validator;

use serde::{Deserialize, Serialize};

/// A validated, trimmed delight submission ready to be relayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub ticket_link: String,
    pub product_link: String,
    pub occasion: String,
    pub agent_name: String,
    pub timestamp: String,
}

impl SubmissionRecord {
    /// Row layout used by the recorder's sheet.
    pub fn sheet_row(&self) -> [&str; 5] {
        [
            &self.timestamp,
            &self.agent_name,
            &self.occasion,
            &self.ticket_link,
            &self.product_link,
        ]
    }
}

/// First constraint a candidate failed. Validation short-circuits, so there
/// is never more than one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingField(&'static str),
    InvalidUrl(&'static str),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::MissingField(field) => write!(f, "Missing field: {field}"),
            ValidationError::InvalidUrl(field) => write!(f, "Invalid {field} URL"),
        }
    }
}

impl std::error::Error for ValidationError {}
