use axum::Json;
use axum::extract::{Path, State};
use axum::routing::{delete, patch, post, put};
use axum::{Router, http::StatusCode, routing::get};
use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::*;
use crate::services::exit_poller::submit_exit_request;
use crate::services::timetable::{self, RouteView};
use crate::services::{CachePhase, Notifier, RefreshStats, Snapshot, Toast};
use crate::state::AppState;

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct StatusBody {
    status: IssueStatus,
}

#[derive(Deserialize)]
struct AssignBody {
    worker_id: i64,
}

#[derive(Deserialize)]
struct QueryBody {
    query: String,
}

#[derive(Deserialize)]
struct TimetableBody {
    route_name: String,
    schedule: String,
}

#[derive(Deserialize)]
struct MarketplaceStatusBody {
    status: MarketplaceStatus,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionView {
    authenticated: bool,
    identity: Option<User>,
    route: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CacheView {
    phase: CachePhase,
    #[serde(flatten)]
    snapshot: Snapshot,
}

#[derive(Serialize)]
struct HealthView {
    status: &'static str,
    authenticated: bool,
    cache: CachePhase,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/session", get(session))
        .route("/session/login", post(login))
        .route("/session/signup", post(signup))
        .route("/session/logout", post(logout))
        .route("/session/profile", put(update_profile))
        .route("/cache", get(cache))
        .route("/cache/refresh", post(refresh))
        .route("/issues", get(list_issues).post(add_issue))
        .route("/issues/{id}", put(edit_issue).delete(delete_issue))
        .route("/issues/{id}/status", post(update_issue_status))
        .route("/issues/{id}/vote", post(toggle_vote))
        .route("/issues/{id}/assign", post(assign_worker))
        .route("/issues/{id}/unassign", post(unassign_worker))
        .route("/issues/{id}/candidates", get(worker_candidates))
        .route("/my-issues", get(my_issues))
        .route("/notices", get(list_notices).post(add_notice))
        .route("/notices/{id}", put(update_notice).delete(delete_notice))
        .route("/mess", get(list_mess).post(add_mess_item))
        .route("/mess/{id}", put(update_mess_item).delete(delete_mess_item))
        .route("/categories", get(list_categories))
        .route("/workers", get(list_workers).post(create_worker))
        .route("/doctors", get(list_doctors).post(add_doctor))
        .route("/doctors/{id}", put(update_doctor).delete(delete_doctor))
        .route("/student-records", get(list_student_records).post(add_student_record))
        .route("/student-records/{id}", put(update_student_record).delete(delete_student_record))
        .route("/timetable", get(bus_timetable).post(update_timetable))
        .route("/toasts", get(list_toasts))
        .route("/toasts/{id}", delete(dismiss_toast))
        .route("/hostel-exit", get(list_exit_requests).post(submit_exit))
        .route("/hostel-exit/mine", get(my_exit_requests))
        .route("/hostel-exit/poll", post(start_exit_poll).delete(stop_exit_poll))
        .route("/hostel-exit/{id}/{decision}", post(decide_exit_request))
        .route("/analytics", get(analytics))
        .route("/marketplace", get(list_marketplace))
        .route("/marketplace/{id}/status", patch(update_marketplace_status))
        .route("/marketplace/search", post(search_marketplace))
        .route("/nearby-shops", post(nearby_shops))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<HealthView> {
    Json(HealthView {
        status: "ok",
        authenticated: state.session.is_authenticated(),
        cache: state.cache.phase(),
    })
}

// --- session ---

async fn session(State(state): State<AppState>) -> Json<SessionView> {
    Json(SessionView {
        authenticated: state.session.is_authenticated(),
        identity: state.session.identity(),
        route: state.routes.current(),
    })
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginBody>,
) -> Result<Json<SessionView>, AppError> {
    if !state.session.login(&req.email, &req.password).await {
        state.toasts.error("Login failed. Check your credentials.");
        return Err(AppError::Unauthorized("Invalid email or password".to_string()));
    }
    state.toasts.success("Login successful!");
    Ok(session(State(state)).await)
}

async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupDraft>,
) -> Result<StatusCode, AppError> {
    if state.session.signup(&req).await {
        state.toasts.success("Account created successfully! Please log in.");
        Ok(StatusCode::CREATED)
    } else {
        state.toasts.error("Signup failed");
        Err(AppError::BadRequest("Signup failed".to_string()))
    }
}

async fn logout(State(state): State<AppState>) -> StatusCode {
    state.session.logout().await;
    state.cache.clear().await;
    if let Some(handle) = state.exit_poll.lock().await.take() {
        handle.stop();
    }
    state.exit_board.write().await.clear();
    StatusCode::NO_CONTENT
}

async fn update_profile(
    State(state): State<AppState>,
    Json(req): Json<ProfileUpdate>,
) -> Result<Json<SessionView>, AppError> {
    match state.session.update_profile(&req).await {
        Ok(()) => state.toasts.success("Profile updated successfully!"),
        Err(e) => {
            state.toasts.error("Failed to update profile");
            return Err(e);
        }
    }
    Ok(session(State(state)).await)
}

// --- cache ---

async fn cache(State(state): State<AppState>) -> Json<CacheView> {
    let snapshot = state.cache.snapshot().await;
    Json(CacheView {
        phase: state.cache.phase(),
        snapshot: (*snapshot).clone(),
    })
}

async fn refresh(State(state): State<AppState>) -> Result<Json<RefreshStats>, AppError> {
    let stats = state.cache.fetch_all().await?;
    Ok(Json(stats))
}

// --- issues ---

async fn list_issues(State(state): State<AppState>) -> Json<Vec<Issue>> {
    Json(state.cache.snapshot().await.issues.clone())
}

async fn add_issue(
    State(state): State<AppState>,
    Json(req): Json<IssueDraft>,
) -> Result<StatusCode, AppError> {
    state.cache.add_issue(req).await?;
    Ok(StatusCode::CREATED)
}

async fn edit_issue(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<IssueEdit>,
) -> Result<StatusCode, AppError> {
    state.cache.edit_issue(id, req).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_issue(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode, AppError> {
    state.cache.delete_issue(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn update_issue_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<StatusBody>,
) -> Result<StatusCode, AppError> {
    state.cache.update_issue_status(id, req.status).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn toggle_vote(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode, AppError> {
    state.cache.toggle_vote(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn assign_worker(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<AssignBody>,
) -> Result<StatusCode, AppError> {
    state.cache.assign_worker(id, req.worker_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn unassign_worker(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode, AppError> {
    state.cache.unassign_worker(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn worker_candidates(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Worker>>, AppError> {
    let workers = state.cache.worker_candidates(id).await.ok_or(AppError::NotFound)?;
    Ok(Json(workers))
}

async fn my_issues(State(state): State<AppState>) -> Result<Json<Vec<Issue>>, AppError> {
    let token = state.session.token();
    let issues = state.api.list_my_issues(token.as_deref()).await?;
    Ok(Json(issues))
}

// --- notices ---

async fn list_notices(State(state): State<AppState>) -> Json<Vec<Notice>> {
    Json(state.cache.snapshot().await.notices.clone())
}

async fn add_notice(
    State(state): State<AppState>,
    Json(req): Json<NoticeDraft>,
) -> Result<StatusCode, AppError> {
    state.cache.add_notice(req).await?;
    Ok(StatusCode::CREATED)
}

async fn update_notice(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<NoticeUpdate>,
) -> Result<StatusCode, AppError> {
    state.cache.update_notice(id, req).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_notice(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode, AppError> {
    state.cache.delete_notice(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- mess ---

async fn list_mess(State(state): State<AppState>) -> Json<Vec<MessItem>> {
    Json(state.cache.snapshot().await.mess_items.clone())
}

async fn add_mess_item(
    State(state): State<AppState>,
    Json(req): Json<MessDraft>,
) -> Result<StatusCode, AppError> {
    state.cache.add_mess_item(req).await?;
    Ok(StatusCode::CREATED)
}

async fn update_mess_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<MessUpdate>,
) -> Result<StatusCode, AppError> {
    state.cache.update_mess_item(id, req).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_mess_item(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode, AppError> {
    state.cache.delete_mess_item(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- lookups ---

async fn list_categories(State(state): State<AppState>) -> Json<Vec<Category>> {
    Json(state.cache.snapshot().await.categories.clone())
}

async fn list_workers(State(state): State<AppState>) -> Json<Vec<Worker>> {
    Json(state.cache.snapshot().await.workers.clone())
}

async fn create_worker(
    State(state): State<AppState>,
    Json(req): Json<NewWorker>,
) -> Result<StatusCode, AppError> {
    let token = state.session.token();
    if let Err(e) = state.api.create_worker(token.as_deref(), &req).await {
        state.toasts.error(e.user_message().unwrap_or("Failed to create worker"));
        return Err(e.into());
    }
    state.toasts.success("Worker created successfully!");
    if let Err(e) = state.cache.fetch_all().await {
        warn!("refresh after worker creation failed: {}", e);
    }
    Ok(StatusCode::CREATED)
}

// --- medical ---

async fn list_doctors(State(state): State<AppState>) -> Json<Vec<Doctor>> {
    Json(state.cache.snapshot().await.doctors.clone())
}

async fn add_doctor(
    State(state): State<AppState>,
    Json(req): Json<DoctorDraft>,
) -> Result<StatusCode, AppError> {
    state.cache.add_doctor(req).await?;
    Ok(StatusCode::CREATED)
}

async fn update_doctor(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<DoctorDraft>,
) -> Result<StatusCode, AppError> {
    state.cache.update_doctor(id, req).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_doctor(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode, AppError> {
    state.cache.delete_doctor(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_student_records(State(state): State<AppState>) -> Json<Vec<StudentRecord>> {
    Json(state.cache.snapshot().await.student_records.clone())
}

async fn add_student_record(
    State(state): State<AppState>,
    Json(req): Json<StudentRecordDraft>,
) -> Result<StatusCode, AppError> {
    state.cache.add_student_record(req).await?;
    Ok(StatusCode::CREATED)
}

async fn update_student_record(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<StudentRecordDraft>,
) -> Result<StatusCode, AppError> {
    state.cache.update_student_record(id, req).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_student_record(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.cache.delete_student_record(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- timetable ---

/// Built-in routes when the backend has none; an unreachable backend is not an error here.
async fn bus_timetable(State(state): State<AppState>) -> Json<Vec<RouteView>> {
    let routes = match state.api.list_timetables().await {
        Ok(rows) if !rows.is_empty() => timetable::routes_from_remote(rows),
        Ok(_) => timetable::default_routes(),
        Err(e) => {
            warn!("timetable fetch failed, using built-in routes: {}", e);
            timetable::default_routes()
        }
    };
    Json(timetable::annotate(&routes, Local::now().naive_local()))
}

async fn update_timetable(
    State(state): State<AppState>,
    Json(req): Json<TimetableBody>,
) -> Result<StatusCode, AppError> {
    if let Err(e) = state.api.update_timetable(&req.route_name, &req.schedule).await {
        state.toasts.error(e.user_message().unwrap_or("Failed to update timetable"));
        return Err(e.into());
    }
    state.toasts.success("Timetable updated");
    Ok(StatusCode::NO_CONTENT)
}

// --- toasts ---

async fn list_toasts(State(state): State<AppState>) -> Json<Vec<Toast>> {
    Json(state.toasts.recent())
}

async fn dismiss_toast(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode, AppError> {
    if state.toasts.dismiss(id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

// --- hostel exit ---

async fn my_exit_requests(State(state): State<AppState>) -> Json<Vec<ExitRequest>> {
    Json(state.exit_board.read().await.clone())
}

async fn list_exit_requests(State(state): State<AppState>) -> Result<Json<Vec<ExitRequest>>, AppError> {
    let token = state.session.token();
    let rows = state.api.list_exit_requests(token.as_deref()).await?;
    Ok(Json(rows))
}

async fn submit_exit(
    State(state): State<AppState>,
    Json(req): Json<ExitRequestDraft>,
) -> Result<StatusCode, AppError> {
    submit_exit_request(
        &state.api,
        &state.session,
        &state.exit_board,
        state.toasts.as_ref(),
        &req.description,
    )
    .await?;
    Ok(StatusCode::CREATED)
}

async fn decide_exit_request(
    State(state): State<AppState>,
    Path((id, decision)): Path<(i64, ExitDecision)>,
) -> Result<StatusCode, AppError> {
    let token = state.session.token();
    if let Err(e) = state.api.decide_exit_request(token.as_deref(), id, decision).await {
        state.toasts.error(e.user_message().unwrap_or("Action failed"));
        return Err(e.into());
    }
    state.toasts.success(match decision {
        ExitDecision::Approve => "Exit request approved",
        ExitDecision::Reject => "Exit request rejected",
    });
    Ok(StatusCode::NO_CONTENT)
}

/// Mounting the exit view starts polling; a second start replaces the first.
async fn start_exit_poll(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    let handle = state
        .exit_poller()
        .spawn()
        .ok_or_else(|| AppError::Unauthorized("Only students can track exit requests".to_string()))?;
    *state.exit_poll.lock().await = Some(handle);
    Ok(StatusCode::ACCEPTED)
}

async fn stop_exit_poll(State(state): State<AppState>) -> StatusCode {
    match state.exit_poll.lock().await.take() {
        Some(handle) => {
            handle.stop();
            StatusCode::NO_CONTENT
        }
        None => StatusCode::NOT_FOUND,
    }
}

// --- analytics & marketplace ---

async fn analytics(State(state): State<AppState>) -> Result<Json<Analytics>, AppError> {
    let token = state.session.token();
    let analytics = state.api.fetch_analytics(token.as_deref()).await?;
    Ok(Json(analytics))
}

async fn list_marketplace(State(state): State<AppState>) -> Result<Json<Vec<MarketplaceItem>>, AppError> {
    let token = state.session.token();
    let items = state.api.list_marketplace(token.as_deref()).await?;
    Ok(Json(items))
}

async fn update_marketplace_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<MarketplaceStatusBody>,
) -> Result<StatusCode, AppError> {
    let token = state.session.token();
    if let Err(e) = state.api.update_marketplace_status(token.as_deref(), id, req.status).await {
        state.toasts.error(e.user_message().unwrap_or("Failed to update status"));
        return Err(e.into());
    }
    state.toasts.success("Listing updated");
    Ok(StatusCode::NO_CONTENT)
}

async fn search_marketplace(
    State(state): State<AppState>,
    Json(req): Json<QueryBody>,
) -> Result<Json<MarketplaceSearch>, AppError> {
    let token = state.session.token();
    let results = state.api.search_marketplace(token.as_deref(), req.query.trim()).await?;
    Ok(Json(results))
}

async fn nearby_shops(
    State(state): State<AppState>,
    Json(req): Json<QueryBody>,
) -> Result<Json<NearbyShops>, AppError> {
    let query = req.query.trim();
    if query.is_empty() {
        state.toasts.error("Please enter what you are looking for");
        return Err(AppError::BadRequest("Query must not be empty".to_string()));
    }
    let token = state.session.token();
    let shops = state.api.nearby_shops(token.as_deref(), query).await?;
    Ok(Json(shops))
}
