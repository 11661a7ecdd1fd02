use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{opt_string_or_number, string_or_number};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueStatus {
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Resolved,
    Completed,
    Cancelled,
    /// Any status label this client does not know yet, kept verbatim.
    #[serde(untagged)]
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub room_number: String,
    pub status: IssueStatus,
    #[serde(default, deserialize_with = "string_or_number")]
    pub created_by: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub upvotes: i64,
    #[serde(default)]
    pub voters: Vec<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub assignee: Option<String>,
    #[serde(default)]
    pub assignee_name: Option<String>,
    /// Fields the backend adds that the client does not model (category hints, assignment timestamps).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Issue {
    pub fn field(&self, key: &str) -> Option<Value> {
        match key {
            "title" => Some(Value::String(self.title.clone())),
            "description" => Some(Value::String(self.description.clone())),
            _ => self.extra.get(key).cloned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueDraft {
    pub title: String,
    pub description: String,
    pub room_number: String,
    #[serde(default)]
    pub created_by: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueEdit {
    pub title: String,
    pub description: String,
    pub room_number: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_status_is_kept_verbatim() {
        let status: IssueStatus = serde_json::from_value(json!("Escalated")).unwrap();
        assert_eq!(status, IssueStatus::Other("Escalated".to_string()));
        assert_eq!(serde_json::to_value(&status).unwrap(), json!("Escalated"));

        let status: IssueStatus = serde_json::from_value(json!("In Progress")).unwrap();
        assert_eq!(status, IssueStatus::InProgress);
        let status: IssueStatus = serde_json::from_value(json!("Completed")).unwrap();
        assert_eq!(status, IssueStatus::Completed);
    }
}
