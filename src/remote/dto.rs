//! Wire shapes that differ from the client models. The backend speaks
//! snake_case for medical records and auth payloads; the views use camelCase.

use serde::{Deserialize, Serialize};

use crate::models::{Doctor, DoctorDraft, SignupDraft, StudentRecord, StudentRecordDraft, User, UserRole};

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub access: String,
}

#[derive(Debug, Serialize)]
pub struct SignupRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
    #[serde(rename = "roomNo")]
    pub room_no: Option<String>,
}

impl From<&SignupDraft> for SignupRequest {
    fn from(draft: &SignupDraft) -> Self {
        Self {
            full_name: draft.name.clone(),
            email: draft.email.clone(),
            password: draft.password.clone(),
            role: draft.role.unwrap_or(UserRole::Student),
            room_no: draft.room_no.clone(),
        }
    }
}

/// `/auth/me` payload. Older deployments send `full_name`/`room_no`/`avatar_url`.
#[derive(Debug, Deserialize)]
pub struct ProfileWire {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    pub email: String,
    pub role: UserRole,
    #[serde(default, rename = "roomNo")]
    pub room_no_camel: Option<String>,
    #[serde(default)]
    pub room_no: Option<String>,
    #[serde(default, rename = "avatarUrl")]
    pub avatar_url_camel: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl From<ProfileWire> for User {
    fn from(wire: ProfileWire) -> Self {
        User {
            id: wire.id,
            name: wire.name.or(wire.full_name).unwrap_or_default(),
            email: wire.email,
            role: wire.role,
            room_no: Some(wire.room_no_camel.or(wire.room_no).unwrap_or_default()),
            avatar_url: wire.avatar_url_camel.or(wire.avatar_url),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileUpdateRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    #[serde(rename = "roomNo")]
    pub room_no: &'a str,
}

#[derive(Debug, Serialize)]
pub struct IssueEditRequest<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub room_number: &'a str,
}

#[derive(Debug, Serialize)]
pub struct VoteRequest {
    #[serde(rename = "userId")]
    pub user_id: i64,
}

#[derive(Debug, Serialize)]
pub struct AssignRequest {
    pub worker_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct DoctorWire {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub available_today: bool,
    #[serde(default)]
    pub arrival_time: Option<String>,
    #[serde(default)]
    pub leave_time: Option<String>,
}

impl From<DoctorWire> for Doctor {
    fn from(wire: DoctorWire) -> Self {
        Doctor {
            id: wire.id,
            name: wire.name,
            available_today: wire.available_today,
            arrival_time: wire.arrival_time.unwrap_or_default(),
            leave_time: wire.leave_time.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DoctorPayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_today: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival_time: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leave_time: Option<&'a str>,
}

impl<'a> From<&'a DoctorDraft> for DoctorPayload<'a> {
    fn from(draft: &'a DoctorDraft) -> Self {
        Self {
            name: draft.name.as_deref(),
            available_today: draft.available_today,
            arrival_time: draft.arrival_time.as_deref(),
            leave_time: draft.leave_time.as_deref(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StudentRecordWire {
    pub id: i64,
    #[serde(default)]
    pub student_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub prescribed_medicine: String,
}

impl From<StudentRecordWire> for StudentRecord {
    fn from(wire: StudentRecordWire) -> Self {
        StudentRecord {
            id: wire.id,
            student_name: wire.student_name,
            email: wire.email,
            prescribed_medicine: wire.prescribed_medicine,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StudentRecordPayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prescribed_medicine: Option<&'a str>,
}

impl<'a> From<&'a StudentRecordDraft> for StudentRecordPayload<'a> {
    fn from(draft: &'a StudentRecordDraft) -> Self {
        Self {
            student_name: draft.student_name.as_deref(),
            email: draft.email.as_deref(),
            prescribed_medicine: draft.prescribed_medicine.as_deref(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TimetableUpdateRequest<'a> {
    pub route_name: &'a str,
    pub schedule: &'a str,
}

#[derive(Debug, Serialize)]
pub struct QueryRequest<'a> {
    pub query: &'a str,
}
