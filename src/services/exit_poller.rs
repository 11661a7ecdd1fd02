use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::models::{ExitRequest, ExitRequestDraft, UserRole};
use crate::remote::HostelApi;
use crate::services::notify::Notifier;
use crate::services::session::SessionStore;

/// Shared list of the student's own exit requests, as last fetched.
pub type ExitBoard = Arc<RwLock<Vec<ExitRequest>>>;

/// Polls the current student's hostel-exit requests while a view is mounted.
///
/// Each tick fires an independent fetch: a slow response does not delay the
/// next one, and stopping the poller does not abort fetches already in flight.
pub struct ExitPoller {
    api: HostelApi,
    session: Arc<SessionStore>,
    board: ExitBoard,
    interval: Duration,
}

/// Stops scheduling new fetches when dropped.
pub struct PollHandle {
    task: JoinHandle<()>,
}

impl PollHandle {
    pub fn stop(self) {}

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl ExitPoller {
    pub fn with_interval(api: HostelApi, session: Arc<SessionStore>, board: ExitBoard, interval: Duration) -> Self {
        Self {
            api,
            session,
            board,
            interval,
        }
    }

    /// Only students have exit requests; for anyone else this returns `None`.
    pub fn spawn(self) -> Option<PollHandle> {
        let role = self.session.identity().map(|u| u.role);
        if role != Some(UserRole::Student) {
            debug!("exit poller not started for role {:?}", role);
            return None;
        }
        Some(PollHandle {
            task: tokio::spawn(self.start()),
        })
    }

    async fn start(self) {
        info!("Starting hostel-exit poller (interval: {:?})", self.interval);
        let poller = Arc::new(self);

        let mut ticker = tokio::time::interval(poller.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            // The first tick completes immediately.
            ticker.tick().await;
            if poller.session.token().is_none() {
                info!("session ended, stopping hostel-exit poller");
                break;
            }

            let poller = Arc::clone(&poller);
            tokio::spawn(async move {
                if let Err(e) = poller.fetch_mine().await {
                    warn!("hostel-exit poll failed: {}", e);
                }
            });
        }
    }

    /// Non-2xx responses leave the board untouched, and so does a response
    /// that arrives after the session it was fetched for has ended.
    pub async fn fetch_mine(&self) -> Result<usize, AppError> {
        let token = self.session.token();
        let rows = self.api.list_my_exit_requests(token.as_deref()).await?;
        if self.session.token() != token {
            debug!("session changed during hostel-exit poll, dropping {} rows", rows.len());
            return Ok(0);
        }
        let count = rows.len();
        *self.board.write().await = rows;
        Ok(count)
    }
}

/// Submits a new exit request and refreshes the board once.
pub async fn submit_exit_request(
    api: &HostelApi,
    session: &SessionStore,
    board: &ExitBoard,
    notifier: &dyn Notifier,
    description: &str,
) -> Result<(), AppError> {
    if description.trim().is_empty() {
        notifier.error("Please enter a description");
        return Err(AppError::BadRequest("Please enter a description".to_string()));
    }

    let token = session.token();
    let draft = ExitRequestDraft {
        description: description.to_string(),
    };
    if let Err(e) = api.submit_exit_request(token.as_deref(), &draft).await {
        notifier.error(e.user_message().unwrap_or("Unable to process request"));
        return Err(e.into());
    }

    notifier.success("Exit request submitted successfully");
    match api.list_my_exit_requests(token.as_deref()).await {
        Ok(rows) => *board.write().await = rows,
        Err(e) => warn!("failed to refresh exit requests: {}", e),
    }
    Ok(())
}
