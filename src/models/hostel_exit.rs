use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitRequest {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<i64>,
    #[serde(default)]
    pub exit_type: String,
    #[serde(default)]
    pub leave_datetime: Option<String>,
    #[serde(default)]
    pub return_datetime: Option<String>,
    #[serde(default)]
    pub risk_level: String,
    #[serde(default)]
    pub calculated_fee: Option<f64>,
    pub status: String,
}

/// Free-text description; the backend extracts dates and exit type from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExitRequestDraft {
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExitDecision {
    Approve,
    Reject,
}

impl ExitDecision {
    pub fn as_path(&self) -> &'static str {
        match self {
            ExitDecision::Approve => "approve",
            ExitDecision::Reject => "reject",
        }
    }
}
