use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::info;

use crate::db::SessionStorage;
use crate::remote::HostelApi;
use crate::services::{EntityCache, ExitBoard, ExitPoller, PollHandle, RouteTracker, SessionStore, ToastLog};

#[derive(Clone)]
pub struct AppState {
    pub api: HostelApi,
    pub session: Arc<SessionStore>,
    pub cache: Arc<EntityCache>,
    pub toasts: Arc<ToastLog>,
    pub routes: Arc<RouteTracker>,
    pub exit_board: ExitBoard,
    pub exit_poll: Arc<Mutex<Option<PollHandle>>>,
    pub exit_poll_interval: Duration,
}

impl AppState {
    pub fn new(
        api: HostelApi,
        storage: Arc<dyn SessionStorage>,
        toast_capacity: usize,
        exit_poll_interval: Duration,
    ) -> Self {
        let session = Arc::new(SessionStore::new(api.clone(), storage));
        let toasts = Arc::new(ToastLog::new(toast_capacity));
        let routes = Arc::new(RouteTracker::new("/"));
        let cache = Arc::new(EntityCache::new(
            api.clone(),
            Arc::clone(&session),
            toasts.clone(),
            routes.clone(),
        ));

        Self {
            api,
            session,
            cache,
            toasts,
            routes,
            exit_board: Arc::new(RwLock::new(Vec::new())),
            exit_poll: Arc::new(Mutex::new(None)),
            exit_poll_interval,
        }
    }

    /// Stops the exit poller and empties the exit board whenever the session
    /// token goes away, whether through logout or an expired session.
    pub fn spawn_exit_reset(&self) -> JoinHandle<()> {
        let mut session = self.session.subscribe();
        let board = Arc::clone(&self.exit_board);
        let poll = Arc::clone(&self.exit_poll);

        tokio::spawn(async move {
            while session.changed().await.is_ok() {
                let signed_out = session.borrow_and_update().token.is_none();
                if !signed_out {
                    continue;
                }
                if let Some(handle) = poll.lock().await.take() {
                    info!("session ended, stopping hostel-exit poller");
                    handle.stop();
                }
                board.write().await.clear();
            }
        })
    }

    pub fn exit_poller(&self) -> ExitPoller {
        ExitPoller::with_interval(
            self.api.clone(),
            Arc::clone(&self.session),
            Arc::clone(&self.exit_board),
            self.exit_poll_interval,
        )
    }
}
