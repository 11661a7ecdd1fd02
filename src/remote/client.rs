use std::sync::Arc;

use serde_json::Value;

use super::dto::{
    AssignRequest, DoctorPayload, DoctorWire, IssueEditRequest, LoginRequest, LoginResponse,
    ProfileUpdateRequest, ProfileWire, QueryRequest, SignupRequest, StudentRecordPayload,
    StudentRecordWire, TimetableUpdateRequest, VoteRequest,
};
use super::{ApiError, ApiRequest, ApiResponse, HostelBackend};
use crate::models::*;

/// Typed endpoints of the hostel backend.
///
/// Every call sends exactly one request. Collection reads return the decoded
/// list; writes only report whether the server accepted them.
#[derive(Clone)]
pub struct HostelApi {
    backend: Arc<dyn HostelBackend>,
}

impl HostelApi {
    pub fn new(backend: Arc<dyn HostelBackend>) -> Self {
        Self { backend }
    }

    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        self.backend.send(request).await
    }

    async fn write(&self, request: ApiRequest) -> Result<Option<Value>, ApiError> {
        self.send(request).await?.into_result()
    }

    // --- auth ---

    pub async fn login(&self, email: &str, password: &str) -> Result<String, ApiError> {
        let request = ApiRequest::post("/auth/login").json(&LoginRequest { email, password })?;
        let response: LoginResponse = self.send(request).await?.decode()?;
        Ok(response.access)
    }

    pub async fn signup(&self, draft: &SignupDraft) -> Result<(), ApiError> {
        let request = ApiRequest::post("/auth/signup").json(&SignupRequest::from(draft))?;
        self.write(request).await.map(|_| ())
    }

    pub async fn me(&self, token: &str) -> Result<User, ApiError> {
        let request = ApiRequest::get("/auth/me").bearer(Some(token));
        let wire: ProfileWire = self.send(request).await?.decode()?;
        Ok(wire.into())
    }

    pub async fn update_profile(&self, token: &str, update: &ProfileUpdate) -> Result<(), ApiError> {
        let body = ProfileUpdateRequest {
            name: update.name.trim(),
            email: update.email.trim(),
            room_no: update.room_no.trim(),
        };
        let request = ApiRequest::put("/auth/update-profile").bearer(Some(token)).json(&body)?;
        self.write(request).await.map(|_| ())
    }

    pub async fn create_worker(&self, token: Option<&str>, worker: &NewWorker) -> Result<(), ApiError> {
        let request = ApiRequest::post("/auth/create-worker").bearer(token).json(worker)?;
        self.write(request).await.map(|_| ())
    }

    // --- collections ---

    pub async fn list_issues(&self, token: Option<&str>) -> Result<Vec<Issue>, ApiError> {
        self.send(ApiRequest::get("/api/issues").bearer(token)).await?.decode_rows()
    }

    pub async fn list_my_issues(&self, token: Option<&str>) -> Result<Vec<Issue>, ApiError> {
        self.send(ApiRequest::get("/api/my-issues").bearer(token)).await?.decode_rows()
    }

    pub async fn list_categories(&self, token: Option<&str>) -> Result<Vec<Category>, ApiError> {
        self.send(ApiRequest::get("/api/categories").bearer(token)).await?.decode_rows()
    }

    pub async fn list_notices(&self, token: Option<&str>) -> Result<Vec<Notice>, ApiError> {
        self.send(ApiRequest::get("/api/notices").bearer(token)).await?.decode_rows()
    }

    pub async fn list_workers(&self, token: Option<&str>) -> Result<Vec<Worker>, ApiError> {
        self.send(ApiRequest::get("/api/workers").bearer(token)).await?.decode_rows()
    }

    pub async fn list_mess(&self, token: Option<&str>) -> Result<Vec<MessItem>, ApiError> {
        self.send(ApiRequest::get("/api/mess").bearer(token)).await?.decode_rows()
    }

    pub async fn list_doctors(&self, token: Option<&str>) -> Result<Vec<Doctor>, ApiError> {
        let wire: Vec<DoctorWire> = self
            .send(ApiRequest::get("/api/medical/doctors").bearer(token))
            .await?
            .decode_rows()?;
        Ok(wire.into_iter().map(Doctor::from).collect())
    }

    pub async fn list_student_records(&self, token: Option<&str>) -> Result<Vec<StudentRecord>, ApiError> {
        let wire: Vec<StudentRecordWire> = self
            .send(ApiRequest::get("/api/medical/student-records").bearer(token))
            .await?
            .decode_rows()?;
        Ok(wire.into_iter().map(StudentRecord::from).collect())
    }

    // --- issues ---

    pub async fn create_issue(&self, token: Option<&str>, draft: &IssueDraft) -> Result<(), ApiError> {
        let request = ApiRequest::post("/api/issues").bearer(token).json(draft)?;
        self.write(request).await.map(|_| ())
    }

    pub async fn edit_issue(&self, token: Option<&str>, id: i64, edit: &IssueEdit) -> Result<(), ApiError> {
        let body = IssueEditRequest {
            title: &edit.title,
            description: &edit.description,
            room_number: &edit.room_number,
        };
        let request = ApiRequest::put(format!("/api/issues/{}", id)).bearer(token).json(&body)?;
        self.write(request).await.map(|_| ())
    }

    pub async fn delete_issue(&self, token: Option<&str>, id: i64) -> Result<(), ApiError> {
        let request = ApiRequest::delete(format!("/api/issues/{}", id)).bearer(token);
        self.write(request).await.map(|_| ())
    }

    pub async fn update_issue_status(
        &self,
        token: Option<&str>,
        id: i64,
        status: IssueStatus,
    ) -> Result<(), ApiError> {
        let request = ApiRequest::post(format!("/api/issues/{}/status", id))
            .bearer(token)
            .json(&serde_json::json!({ "status": status }))?;
        self.write(request).await.map(|_| ())
    }

    pub async fn upvote_issue(&self, token: Option<&str>, id: i64, user_id: i64) -> Result<(), ApiError> {
        let request = ApiRequest::post(format!("/api/issues/{}/upvote", id))
            .bearer(token)
            .json(&VoteRequest { user_id })?;
        self.write(request).await.map(|_| ())
    }

    pub async fn downvote_issue(&self, token: Option<&str>, id: i64, user_id: i64) -> Result<(), ApiError> {
        let request = ApiRequest::post(format!("/api/issues/{}/downvote", id))
            .bearer(token)
            .json(&VoteRequest { user_id })?;
        self.write(request).await.map(|_| ())
    }

    pub async fn assign_issue(&self, token: Option<&str>, id: i64, worker_id: i64) -> Result<(), ApiError> {
        let request = ApiRequest::post(format!("/api/issues/{}/assign", id))
            .bearer(token)
            .json(&AssignRequest { worker_id })?;
        self.write(request).await.map(|_| ())
    }

    pub async fn unassign_issue(&self, token: Option<&str>, id: i64) -> Result<(), ApiError> {
        let request = ApiRequest::post(format!("/api/issues/{}/unassign", id)).bearer(token);
        self.write(request).await.map(|_| ())
    }

    // --- notices ---

    pub async fn create_notice(&self, token: Option<&str>, draft: &NoticeDraft) -> Result<(), ApiError> {
        let request = ApiRequest::post("/api/notices").bearer(token).json(draft)?;
        self.write(request).await.map(|_| ())
    }

    pub async fn update_notice(&self, token: Option<&str>, id: i64, update: &NoticeUpdate) -> Result<(), ApiError> {
        let request = ApiRequest::put(format!("/api/notices/{}", id)).bearer(token).json(update)?;
        self.write(request).await.map(|_| ())
    }

    pub async fn delete_notice(&self, token: Option<&str>, id: i64) -> Result<(), ApiError> {
        let request = ApiRequest::delete(format!("/api/notices/{}", id)).bearer(token);
        self.write(request).await.map(|_| ())
    }

    // --- mess ---

    pub async fn create_mess_item(&self, token: Option<&str>, draft: &MessDraft) -> Result<(), ApiError> {
        let request = ApiRequest::post("/api/mess").bearer(token).json(draft)?;
        self.write(request).await.map(|_| ())
    }

    pub async fn update_mess_item(&self, token: Option<&str>, id: i64, update: &MessUpdate) -> Result<(), ApiError> {
        let request = ApiRequest::put(format!("/api/mess/{}", id)).bearer(token).json(update)?;
        self.write(request).await.map(|_| ())
    }

    pub async fn delete_mess_item(&self, token: Option<&str>, id: i64) -> Result<(), ApiError> {
        let request = ApiRequest::delete(format!("/api/mess/{}", id)).bearer(token);
        self.write(request).await.map(|_| ())
    }

    // --- medical ---

    pub async fn create_doctor(&self, token: Option<&str>, draft: &DoctorDraft) -> Result<(), ApiError> {
        let request = ApiRequest::post("/api/medical/doctors")
            .bearer(token)
            .json(&DoctorPayload::from(draft))?;
        self.write(request).await.map(|_| ())
    }

    pub async fn update_doctor(&self, token: Option<&str>, id: i64, draft: &DoctorDraft) -> Result<(), ApiError> {
        let request = ApiRequest::put(format!("/api/medical/doctors/{}", id))
            .bearer(token)
            .json(&DoctorPayload::from(draft))?;
        self.write(request).await.map(|_| ())
    }

    pub async fn delete_doctor(&self, token: Option<&str>, id: i64) -> Result<(), ApiError> {
        let request = ApiRequest::delete(format!("/api/medical/doctors/{}", id)).bearer(token);
        self.write(request).await.map(|_| ())
    }

    pub async fn create_student_record(
        &self,
        token: Option<&str>,
        draft: &StudentRecordDraft,
    ) -> Result<(), ApiError> {
        let request = ApiRequest::post("/api/medical/student-records")
            .bearer(token)
            .json(&StudentRecordPayload::from(draft))?;
        self.write(request).await.map(|_| ())
    }

    pub async fn update_student_record(
        &self,
        token: Option<&str>,
        id: i64,
        draft: &StudentRecordDraft,
    ) -> Result<(), ApiError> {
        let request = ApiRequest::put(format!("/api/medical/student-records/{}", id))
            .bearer(token)
            .json(&StudentRecordPayload::from(draft))?;
        self.write(request).await.map(|_| ())
    }

    pub async fn delete_student_record(&self, token: Option<&str>, id: i64) -> Result<(), ApiError> {
        let request = ApiRequest::delete(format!("/api/medical/student-records/{}", id)).bearer(token);
        self.write(request).await.map(|_| ())
    }

    // --- hostel exit ---

    pub async fn list_my_exit_requests(&self, token: Option<&str>) -> Result<Vec<ExitRequest>, ApiError> {
        self.send(ApiRequest::get("/api/hostel-exit/my").bearer(token)).await?.decode_rows()
    }

    pub async fn list_exit_requests(&self, token: Option<&str>) -> Result<Vec<ExitRequest>, ApiError> {
        self.send(ApiRequest::get("/api/hostel-exit").bearer(token)).await?.decode_rows()
    }

    pub async fn submit_exit_request(&self, token: Option<&str>, draft: &ExitRequestDraft) -> Result<(), ApiError> {
        let request = ApiRequest::post("/api/hostel-exit").bearer(token).json(draft)?;
        self.write(request).await.map(|_| ())
    }

    pub async fn decide_exit_request(
        &self,
        token: Option<&str>,
        id: i64,
        decision: ExitDecision,
    ) -> Result<(), ApiError> {
        let request = ApiRequest::post(format!("/api/hostel-exit/{}/{}", id, decision.as_path())).bearer(token);
        self.write(request).await.map(|_| ())
    }

    // --- timetable ---

    pub async fn list_timetables(&self) -> Result<Vec<RemoteTimetable>, ApiError> {
        self.send(ApiRequest::get("/api/timetable")).await?.decode_rows()
    }

    pub async fn update_timetable(&self, route_name: &str, schedule: &str) -> Result<(), ApiError> {
        let request = ApiRequest::post("/api/timetable").json(&TimetableUpdateRequest { route_name, schedule })?;
        self.write(request).await.map(|_| ())
    }

    // --- marketplace & analytics ---

    pub async fn list_marketplace(&self, token: Option<&str>) -> Result<Vec<MarketplaceItem>, ApiError> {
        self.send(ApiRequest::get("/api/marketplace").bearer(token)).await?.decode_rows()
    }

    pub async fn update_marketplace_status(
        &self,
        token: Option<&str>,
        id: i64,
        status: MarketplaceStatus,
    ) -> Result<(), ApiError> {
        let request = ApiRequest::patch(format!("/api/marketplace/{}/status", id))
            .bearer(token)
            .json(&serde_json::json!({ "status": status }))?;
        self.write(request).await.map(|_| ())
    }

    pub async fn search_marketplace(&self, token: Option<&str>, query: &str) -> Result<MarketplaceSearch, ApiError> {
        let request = ApiRequest::post("/api/marketplace/search")
            .bearer(token)
            .json(&QueryRequest { query })?;
        self.send(request).await?.decode()
    }

    pub async fn nearby_shops(&self, token: Option<&str>, query: &str) -> Result<NearbyShops, ApiError> {
        let request = ApiRequest::post("/api/student/nearby-shops")
            .bearer(token)
            .json(&QueryRequest { query })?;
        self.send(request).await?.decode()
    }

    pub async fn fetch_analytics(&self, token: Option<&str>) -> Result<Analytics, ApiError> {
        self.send(ApiRequest::get("/api/analytics").bearer(token)).await?.decode()
    }
}
