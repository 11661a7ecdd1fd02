use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::error::AppError;
use crate::models::*;
use crate::remote::{ApiError, HostelApi};
use crate::services::matching;
use crate::services::notify::{LOGIN_ROUTE, Navigator, Notifier};
use crate::services::session::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CachePhase {
    Empty,
    Loading,
    Populated,
}

/// One complete read of every collection. Replaced wholesale, never patched.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub issues: Vec<Issue>,
    pub notices: Vec<Notice>,
    pub mess_items: Vec<MessItem>,
    pub categories: Vec<Category>,
    pub workers: Vec<Worker>,
    pub doctors: Vec<Doctor>,
    pub student_records: Vec<StudentRecord>,
    pub refreshed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Serialize)]
pub struct RefreshStats {
    pub issues: usize,
    pub notices: usize,
    pub mess_items: usize,
    pub categories: usize,
    pub workers: usize,
    pub doctors: usize,
    pub student_records: usize,
    /// Collections that failed and were replaced by an empty list.
    pub degraded: Vec<String>,
}

/// Read-through mirror of the backend collections.
///
/// Every mutation performs one remote write and, on success, a full
/// [`EntityCache::fetch_all`] before returning. Failed writes leave the cache
/// as it was. Nothing is merged locally.
pub struct EntityCache {
    api: HostelApi,
    session: Arc<SessionStore>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    snapshot: RwLock<Arc<Snapshot>>,
    populated: AtomicBool,
    in_flight: AtomicUsize,
    generation: AtomicU64,
}

struct LoadingGuard<'a>(&'a AtomicUsize);

impl<'a> LoadingGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl EntityCache {
    pub fn new(
        api: HostelApi,
        session: Arc<SessionStore>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            api,
            session,
            notifier,
            navigator,
            snapshot: RwLock::new(Arc::new(Snapshot::default())),
            populated: AtomicBool::new(false),
            in_flight: AtomicUsize::new(0),
            generation: AtomicU64::new(0),
        }
    }

    pub async fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot.read().await.clone()
    }

    pub fn phase(&self) -> CachePhase {
        if self.in_flight.load(Ordering::SeqCst) > 0 {
            CachePhase::Loading
        } else if self.populated.load(Ordering::SeqCst) {
            CachePhase::Populated
        } else {
            CachePhase::Empty
        }
    }

    pub async fn clear(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        *self.snapshot.write().await = Arc::new(Snapshot::default());
        self.populated.store(false, Ordering::SeqCst);
    }

    /// Refetches every collection concurrently.
    ///
    /// A failing collection degrades to an empty list. An unauthorized status on
    /// any of them aborts the refresh, logs the session out and navigates to the
    /// login route, whatever the other responses were.
    pub async fn fetch_all(&self) -> Result<RefreshStats, AppError> {
        let _loading = LoadingGuard::enter(&self.in_flight);
        let generation = self.generation.load(Ordering::SeqCst);
        let token = self.session.token();
        let token = token.as_deref();

        let (issues, categories, notices, workers, mess_items, doctors, student_records) = tokio::join!(
            self.api.list_issues(token),
            self.api.list_categories(token),
            self.api.list_notices(token),
            self.api.list_workers(token),
            self.api.list_mess(token),
            self.api.list_doctors(token),
            self.api.list_student_records(token),
        );

        let failures = [
            issues.as_ref().err(),
            categories.as_ref().err(),
            notices.as_ref().err(),
            workers.as_ref().err(),
            mess_items.as_ref().err(),
            doctors.as_ref().err(),
            student_records.as_ref().err(),
        ];
        if failures.iter().flatten().any(|e| e.is_session_expired()) {
            self.expire_session().await;
            return Err(AppError::SessionExpired);
        }

        let mut degraded = Vec::new();
        let workers: Vec<Worker> = settle("workers", workers, &mut degraded)
            .into_iter()
            .filter(|w| w.role == "worker")
            .collect();
        let snapshot = Snapshot {
            issues: settle("issues", issues, &mut degraded),
            notices: settle("notices", notices, &mut degraded),
            mess_items: settle("mess", mess_items, &mut degraded),
            categories: settle("categories", categories, &mut degraded),
            workers,
            doctors: settle("doctors", doctors, &mut degraded),
            student_records: settle("student-records", student_records, &mut degraded),
            refreshed_at: Some(Utc::now()),
        };

        let stats = RefreshStats {
            issues: snapshot.issues.len(),
            notices: snapshot.notices.len(),
            mess_items: snapshot.mess_items.len(),
            categories: snapshot.categories.len(),
            workers: snapshot.workers.len(),
            doctors: snapshot.doctors.len(),
            student_records: snapshot.student_records.len(),
            degraded,
        };

        {
            let mut current = self.snapshot.write().await;
            if self.generation.load(Ordering::SeqCst) != generation {
                info!("cache cleared during refresh, discarding result");
                return Ok(stats);
            }
            *current = Arc::new(snapshot);
            self.populated.store(true, Ordering::SeqCst);
        }

        info!("Refresh completed: {:?}", stats);
        Ok(stats)
    }

    async fn expire_session(&self) {
        warn!("session rejected by backend, logging out");
        self.notifier.error("Session expired. Please log in again.");
        self.session.logout().await;
        self.clear().await;
        self.navigator.navigate(LOGIN_ROUTE);
    }

    /// Clears the cache on logout and refetches whenever a new token appears.
    pub fn spawn_session_listener(self: &Arc<Self>) -> JoinHandle<()> {
        let cache = Arc::clone(self);
        let mut session = self.session.subscribe();

        tokio::spawn(async move {
            let mut last_token = session.borrow_and_update().token.clone();
            if last_token.is_some() {
                if let Err(e) = cache.fetch_all().await {
                    warn!("initial refresh failed: {}", e);
                }
            }

            while session.changed().await.is_ok() {
                let token = session.borrow_and_update().token.clone();
                if token == last_token {
                    continue;
                }
                last_token = token.clone();

                match token {
                    None => cache.clear().await,
                    Some(_) => {
                        if let Err(e) = cache.fetch_all().await {
                            warn!("refresh after login failed: {}", e);
                        }
                    }
                }
            }
        })
    }

    async fn mutate<F>(&self, write: F, success: &str, failure: &str) -> Result<(), AppError>
    where
        F: Future<Output = Result<(), ApiError>>,
    {
        match write.await {
            Ok(()) => {
                match self.fetch_all().await {
                    // The expiry toast and the login redirect already went out.
                    Err(AppError::SessionExpired) => return Ok(()),
                    Err(e) => warn!("refresh after write failed: {}", e),
                    Ok(_) => {}
                }
                self.notifier.success(success);
                Ok(())
            }
            Err(e) => {
                error!("{}: {}", failure, e);
                self.notifier.error(e.user_message().unwrap_or(failure));
                Err(e.into())
            }
        }
    }

    // --- issues ---

    pub async fn add_issue(&self, mut draft: IssueDraft) -> Result<(), AppError> {
        if draft.created_by.is_empty() {
            if let Some(user) = self.session.identity() {
                draft.created_by = user.name;
            }
        }
        let token = self.session.token();
        self.mutate(
            self.api.create_issue(token.as_deref(), &draft),
            "Issue reported successfully!",
            "Failed to report issue",
        )
        .await
    }

    pub async fn edit_issue(&self, id: i64, edit: IssueEdit) -> Result<(), AppError> {
        let token = self.session.token();
        self.mutate(
            self.api.edit_issue(token.as_deref(), id, &edit),
            "Issue updated",
            "Failed to update issue",
        )
        .await
    }

    pub async fn update_issue_status(&self, id: i64, status: IssueStatus) -> Result<(), AppError> {
        let token = self.session.token();
        self.mutate(
            self.api.update_issue_status(token.as_deref(), id, status),
            "Issue updated",
            "Failed to update issue",
        )
        .await
    }

    pub async fn delete_issue(&self, id: i64) -> Result<(), AppError> {
        let token = self.session.token();
        self.mutate(
            self.api.delete_issue(token.as_deref(), id),
            "Issue deleted",
            "Failed to delete issue",
        )
        .await
    }

    /// Removes the vote if the current user already voted, adds it otherwise.
    /// The server owns the toggle; the voter list only picks the endpoint.
    pub async fn toggle_vote(&self, issue_id: i64) -> Result<(), AppError> {
        let Some(user) = self.session.identity() else {
            self.notifier.error("Please login to upvote");
            return Err(AppError::Unauthorized("Please login to upvote".to_string()));
        };

        let snapshot = self.snapshot().await;
        let Some(issue) = snapshot.issues.iter().find(|i| i.id == issue_id) else {
            self.notifier.error("Issue not found");
            return Err(AppError::NotFound);
        };

        if user.has_voted(&issue.voters) {
            self.downvote_issue(issue_id).await
        } else {
            self.upvote_issue(issue_id).await
        }
    }

    pub async fn upvote_issue(&self, issue_id: i64) -> Result<(), AppError> {
        let Some(user) = self.session.identity() else {
            self.notifier.error("Please login to upvote");
            return Err(AppError::Unauthorized("Please login to upvote".to_string()));
        };
        let token = self.session.token();
        self.mutate(
            self.api.upvote_issue(token.as_deref(), issue_id, user.id),
            "You have upvoted this issue",
            "Failed to upvote",
        )
        .await
    }

    pub async fn downvote_issue(&self, issue_id: i64) -> Result<(), AppError> {
        let Some(user) = self.session.identity() else {
            self.notifier.error("Please login to downvote");
            return Err(AppError::Unauthorized("Please login to downvote".to_string()));
        };
        let token = self.session.token();
        self.mutate(
            self.api.downvote_issue(token.as_deref(), issue_id, user.id),
            "Your vote has been removed",
            "Failed to downvote",
        )
        .await
    }

    pub async fn assign_worker(&self, issue_id: i64, worker_id: i64) -> Result<(), AppError> {
        let token = self.session.token();
        self.mutate(
            self.api.assign_issue(token.as_deref(), issue_id, worker_id),
            "Worker assigned to issue.",
            "Could not assign worker.",
        )
        .await
    }

    pub async fn unassign_worker(&self, issue_id: i64) -> Result<(), AppError> {
        let token = self.session.token();
        self.mutate(
            self.api.unassign_issue(token.as_deref(), issue_id),
            "Worker unassigned",
            "Failed to unassign worker.",
        )
        .await
    }

    /// Heuristic assignment candidates for one cached issue.
    pub async fn worker_candidates(&self, issue_id: i64) -> Option<Vec<Worker>> {
        let snapshot = self.snapshot().await;
        let issue = snapshot.issues.iter().find(|i| i.id == issue_id)?;
        Some(
            matching::candidate_workers(issue, &snapshot.workers)
                .into_iter()
                .cloned()
                .collect(),
        )
    }

    // --- notices ---

    pub async fn add_notice(&self, draft: NoticeDraft) -> Result<(), AppError> {
        let token = self.session.token();
        self.mutate(
            self.api.create_notice(token.as_deref(), &draft),
            "Notice created successfully!",
            "Failed to create notice",
        )
        .await
    }

    pub async fn update_notice(&self, id: i64, update: NoticeUpdate) -> Result<(), AppError> {
        let token = self.session.token();
        self.mutate(
            self.api.update_notice(token.as_deref(), id, &update),
            "Notice updated",
            "Failed to update notice",
        )
        .await
    }

    pub async fn delete_notice(&self, id: i64) -> Result<(), AppError> {
        let token = self.session.token();
        self.mutate(
            self.api.delete_notice(token.as_deref(), id),
            "Notice deleted",
            "Failed to delete notice",
        )
        .await
    }

    // --- mess ---

    pub async fn add_mess_item(&self, draft: MessDraft) -> Result<(), AppError> {
        if draft.day.trim().is_empty() {
            self.notifier.error("Day is required");
            return Err(AppError::BadRequest("Day is required".to_string()));
        }
        let token = self.session.token();
        self.mutate(
            self.api.create_mess_item(token.as_deref(), &draft),
            "Mess item created successfully!",
            "Failed to create mess item",
        )
        .await
    }

    pub async fn update_mess_item(&self, id: i64, update: MessUpdate) -> Result<(), AppError> {
        let token = self.session.token();
        self.mutate(
            self.api.update_mess_item(token.as_deref(), id, &update),
            "Mess item updated successfully!",
            "Failed to update mess item",
        )
        .await
    }

    pub async fn delete_mess_item(&self, id: i64) -> Result<(), AppError> {
        let token = self.session.token();
        self.mutate(
            self.api.delete_mess_item(token.as_deref(), id),
            "Mess item deleted",
            "Failed to delete mess item",
        )
        .await
    }

    // --- medical ---

    pub async fn add_doctor(&self, draft: DoctorDraft) -> Result<(), AppError> {
        let token = self.session.token();
        self.mutate(
            self.api.create_doctor(token.as_deref(), &draft),
            "Doctor added",
            "Failed to add doctor",
        )
        .await
    }

    pub async fn update_doctor(&self, id: i64, draft: DoctorDraft) -> Result<(), AppError> {
        let token = self.session.token();
        self.mutate(
            self.api.update_doctor(token.as_deref(), id, &draft),
            "Doctor updated",
            "Failed to update doctor",
        )
        .await
    }

    pub async fn delete_doctor(&self, id: i64) -> Result<(), AppError> {
        let token = self.session.token();
        self.mutate(
            self.api.delete_doctor(token.as_deref(), id),
            "Doctor deleted",
            "Failed to delete doctor",
        )
        .await
    }

    pub async fn add_student_record(&self, draft: StudentRecordDraft) -> Result<(), AppError> {
        let token = self.session.token();
        self.mutate(
            self.api.create_student_record(token.as_deref(), &draft),
            "Student record added",
            "Failed to add student record",
        )
        .await
    }

    pub async fn update_student_record(&self, id: i64, draft: StudentRecordDraft) -> Result<(), AppError> {
        let token = self.session.token();
        self.mutate(
            self.api.update_student_record(token.as_deref(), id, &draft),
            "Student record updated",
            "Failed to update student record",
        )
        .await
    }

    pub async fn delete_student_record(&self, id: i64) -> Result<(), AppError> {
        let token = self.session.token();
        self.mutate(
            self.api.delete_student_record(token.as_deref(), id),
            "Student record deleted",
            "Failed to delete student record",
        )
        .await
    }
}

fn settle<T>(collection: &str, result: Result<Vec<T>, ApiError>, degraded: &mut Vec<String>) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(e) if e.is_not_found() => {
            info!("{} endpoint returned 404, continuing with empty list", collection);
            degraded.push(collection.to_string());
            Vec::new()
        }
        Err(e) => {
            warn!("{} fetch issue: {}", collection, e);
            degraded.push(collection.to_string());
            Vec::new()
        }
    }
}
