use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub id: i64,
    pub name: String,
    pub available_today: bool,
    pub arrival_time: String,
    pub leave_time: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorDraft {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub available_today: Option<bool>,
    #[serde(default)]
    pub arrival_time: Option<String>,
    #[serde(default)]
    pub leave_time: Option<String>,
}

/// Admin-only prescription record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub id: i64,
    pub student_name: String,
    pub email: String,
    pub prescribed_medicine: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecordDraft {
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub prescribed_medicine: Option<String>,
}
