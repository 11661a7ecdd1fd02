use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Student,
    Admin,
    Worker,
}

/// Authenticated identity. The role only gates what the views show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl User {
    /// Whether this user appears in an issue's voter set.
    ///
    /// The backend records voters by email while older payloads carry the numeric id,
    /// so either form counts.
    pub fn has_voted(&self, voters: &[String]) -> bool {
        let id = self.id.to_string();
        voters.iter().any(|v| *v == id || v.eq_ignore_ascii_case(&self.email))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupDraft {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<UserRole>,
    #[serde(default)]
    pub room_no: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub room_no: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWorker {
    pub full_name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub worker_type: String,
}
