#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use hostel_desk::db::MemorySessionStorage;
use hostel_desk::remote::{ApiError, ApiRequest, ApiResponse, HostelApi, HostelBackend};
use hostel_desk::services::{EntityCache, RouteTracker, SessionStore, ToastLog};
use reqwest::Method;
use serde_json::{Value, json};

pub const TOKEN: &str = "token-abc";
pub const PASSWORD: &str = "hunter2";

/// In-memory hostel backend. Records every request and serves a small fixed
/// dataset; individual endpoints can be forced to fail.
pub struct FakeBackend {
    requests: Mutex<Vec<ApiRequest>>,
    forced: Mutex<HashMap<(Method, String), (u16, Value)>>,
    offline: Mutex<bool>,
    delay: Mutex<Option<Duration>>,
    issues: Mutex<Vec<Value>>,
    profile: Mutex<Value>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            forced: Mutex::new(HashMap::new()),
            offline: Mutex::new(false),
            delay: Mutex::new(None),
            issues: Mutex::new(vec![
                json!({
                    "id": 1,
                    "title": "Leaking tap",
                    "description": "Water dripping all night",
                    "roomNumber": "B-204",
                    "status": "Pending",
                    "createdBy": "Asha",
                    "createdAt": "2024-03-01T10:00:00Z",
                    "upvotes": 0,
                    "voters": [],
                    "category": "Plumbing"
                }),
                json!({
                    "id": 2,
                    "title": "Fan not working",
                    "description": "Ceiling fan stopped",
                    "roomNumber": "A-101",
                    "status": "In Progress",
                    "createdBy": 7,
                    "createdAt": "2024-03-02T09:30:00Z",
                    "upvotes": 3,
                    "voters": ["1", "2", "3"],
                    "assignee": 11
                }),
            ]),
            profile: Mutex::new(json!({
                "id": 42,
                "name": "Asha",
                "email": "asha@hostel.test",
                "role": "student",
                "roomNo": "B-204"
            })),
        }
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn set_role(&self, role: &str) {
        self.profile.lock().unwrap()["role"] = json!(role);
    }

    /// Every matching request gets this status and body until cleared.
    pub fn fail(&self, method: Method, path: &str, status: u16, body: Value) {
        self.forced
            .lock()
            .unwrap()
            .insert((method, path.to_string()), (status, body));
    }

    pub fn clear_failures(&self) {
        self.forced.lock().unwrap().clear();
    }

    pub fn set_offline(&self, offline: bool) {
        *self.offline.lock().unwrap() = offline;
    }

    /// Holds every response back for `delay`.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    /// Number of full cache refreshes, counted by the issue collection read.
    pub fn refreshes(&self) -> usize {
        self.count(Method::GET, "/api/issues")
    }

    /// Replaces the stored voter list of one issue.
    pub fn set_voters(&self, issue_id: i64, voters: &[&str]) {
        let mut issues = self.issues.lock().unwrap();
        if let Some(issue) = issues.iter_mut().find(|i| i["id"] == issue_id) {
            issue["upvotes"] = json!(voters.len());
            issue["voters"] = json!(voters);
        }
    }

    pub fn reset_log(&self) {
        self.requests.lock().unwrap().clear();
    }

    fn route(&self, request: &ApiRequest) -> ApiResponse {
        let path = request.path.as_str();
        let method = &request.method;

        if *method == Method::POST && path == "/auth/login" {
            let body = request.body.clone().unwrap_or(Value::Null);
            return if body["password"] == PASSWORD {
                ok(json!({ "access": TOKEN }))
            } else {
                ApiResponse::new(401, Some(json!({ "error": "Invalid credentials" })))
            };
        }
        if *method == Method::GET && path == "/auth/me" {
            return match request.token.as_deref() {
                Some(TOKEN) => ok(self.profile.lock().unwrap().clone()),
                _ => ApiResponse::new(401, Some(json!({ "msg": "Missing Authorization Header" }))),
            };
        }

        if *method == Method::GET {
            return match path {
                "/api/issues" | "/api/my-issues" => ok(Value::Array(self.issues.lock().unwrap().clone())),
                "/api/categories" => ok(json!([
                    { "id": 1, "name": "Plumbing" },
                    { "id": "2", "name": "Electrical" }
                ])),
                "/api/notices" => ok(json!([{
                    "id": 5,
                    "title": "Water shutdown",
                    "content": "No water on Sunday morning",
                    "author": "Warden",
                    "createdAt": "2024-03-03T08:00:00Z"
                }])),
                "/api/workers" => ok(json!([
                    { "id": 11, "name": "Ravi", "email": "ravi@hostel.test", "role": "worker", "worker_type": "Plumbing" },
                    { "id": 12, "name": "Meena", "email": "meena@hostel.test", "role": "worker", "worker_type": "Electrical" },
                    { "id": 1, "name": "Admin", "email": "admin@hostel.test", "role": "admin" }
                ])),
                "/api/mess" => ok(json!([{
                    "id": 1,
                    "day": "Monday",
                    "breakfast": "Idli, Sambar",
                    "lunch": "Rice, Dal",
                    "snacks": "Tea",
                    "dinner": "Chapati, Paneer"
                }])),
                "/api/medical/doctors" => ok(json!([{
                    "id": 3,
                    "name": "Dr. Rao",
                    "available_today": true,
                    "arrival_time": "09:00",
                    "leave_time": "13:00"
                }])),
                "/api/medical/student-records" => ok(json!([{
                    "id": 8,
                    "student_name": "Asha",
                    "email": "asha@hostel.test",
                    "prescribed_medicine": "Paracetamol"
                }])),
                "/api/hostel-exit/my" | "/api/hostel-exit" => ok(json!([{
                    "id": 21,
                    "student_id": 42,
                    "exit_type": "weekend",
                    "leave_datetime": "2024-03-08T18:00:00",
                    "return_datetime": "2024-03-10T20:00:00",
                    "risk_level": "low",
                    "calculated_fee": 0.0,
                    "status": "pending"
                }])),
                "/api/timetable" => ok(json!([])),
                _ => ApiResponse::new(404, Some(json!({ "error": "Not found" }))),
            };
        }

        if *method == Method::POST {
            if let Some(id) = vote_target(path, "/upvote") {
                self.toggle_voter(id, request, true);
                return ok(json!({ "message": "Upvoted" }));
            }
            if let Some(id) = vote_target(path, "/downvote") {
                self.toggle_voter(id, request, false);
                return ok(json!({ "message": "Vote removed" }));
            }
        }

        ok(json!({ "message": "ok" }))
    }

    /// The server records voters by email and keeps them unique, so repeated
    /// upvotes are idempotent. The vote body must still name the user.
    fn toggle_voter(&self, issue_id: i64, request: &ApiRequest, add: bool) {
        if request.body.as_ref().and_then(|b| b.get("userId")).is_none() {
            return;
        }
        let voter = self.profile.lock().unwrap()["email"]
            .as_str()
            .unwrap_or_default()
            .to_string();

        let mut issues = self.issues.lock().unwrap();
        let Some(issue) = issues.iter_mut().find(|i| i["id"] == issue_id) else {
            return;
        };
        let mut voters: Vec<String> = issue["voters"]
            .as_array()
            .map(|a| a.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
            .unwrap_or_default();

        if add && !voters.contains(&voter) {
            voters.push(voter);
        } else if !add {
            voters.retain(|v| !v.eq_ignore_ascii_case(&voter));
        }
        issue["upvotes"] = json!(voters.len());
        issue["voters"] = json!(voters);
    }
}

#[async_trait]
impl HostelBackend for FakeBackend {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        self.requests.lock().unwrap().push(request.clone());

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if *self.offline.lock().unwrap() {
            return Err(ApiError::Network("connection refused".to_string()));
        }
        let forced = self
            .forced
            .lock()
            .unwrap()
            .get(&(request.method.clone(), request.path.clone()))
            .cloned();
        if let Some((status, body)) = forced {
            return Ok(ApiResponse::new(status, Some(body)));
        }

        Ok(self.route(&request))
    }
}

fn ok(body: Value) -> ApiResponse {
    ApiResponse::new(200, Some(body))
}

fn vote_target(path: &str, suffix: &str) -> Option<i64> {
    path.strip_prefix("/api/issues/")?
        .strip_suffix(suffix)?
        .parse()
        .ok()
}

/// Services wired the way `main` wires them, over the fake backend.
pub struct Harness {
    pub backend: Arc<FakeBackend>,
    pub api: HostelApi,
    pub storage: Arc<MemorySessionStorage>,
    pub session: Arc<SessionStore>,
    pub toasts: Arc<ToastLog>,
    pub routes: Arc<RouteTracker>,
    pub cache: Arc<EntityCache>,
}

impl Harness {
    pub fn new() -> Self {
        let backend = FakeBackend::shared();
        let api = HostelApi::new(backend.clone());
        let storage = Arc::new(MemorySessionStorage::new());
        let session = Arc::new(SessionStore::new(api.clone(), storage.clone()));
        let toasts = Arc::new(ToastLog::new(20));
        let routes = Arc::new(RouteTracker::new("/dashboard"));
        let cache = Arc::new(EntityCache::new(
            api.clone(),
            session.clone(),
            toasts.clone(),
            routes.clone(),
        ));

        Self {
            backend,
            api,
            storage,
            session,
            toasts,
            routes,
            cache,
        }
    }

    pub async fn logged_in() -> Self {
        let harness = Self::new();
        assert!(harness.session.login("asha@hostel.test", PASSWORD).await);
        harness
    }

    pub fn last_toast(&self) -> Option<String> {
        self.toasts.recent().last().map(|t| t.message.clone())
    }
}
