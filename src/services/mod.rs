pub mod entity_cache;
pub mod exit_poller;
pub mod matching;
pub mod notify;
pub mod session;
pub mod timetable;

pub use entity_cache::{CachePhase, EntityCache, RefreshStats, Snapshot};
pub use exit_poller::{ExitBoard, ExitPoller, PollHandle};
pub use notify::{LOGIN_ROUTE, Navigator, Notifier, RouteTracker, Toast, ToastLevel, ToastLog};
pub use session::{SessionState, SessionStore};
