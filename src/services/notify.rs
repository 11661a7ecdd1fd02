use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

pub const LOGIN_ROUTE: &str = "/login";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    Success,
    Error,
}

/// Transient, user-facing notification.
#[derive(Debug, Clone, Serialize)]
pub struct Toast {
    pub id: Uuid,
    pub level: ToastLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

pub trait Notifier: Send + Sync {
    fn notify(&self, level: ToastLevel, message: &str);

    fn success(&self, message: &str) {
        self.notify(ToastLevel::Success, message);
    }

    fn error(&self, message: &str) {
        self.notify(ToastLevel::Error, message);
    }
}

/// Keeps the most recent toasts so a view can render and dismiss them.
pub struct ToastLog {
    capacity: usize,
    entries: Mutex<VecDeque<Toast>>,
}

impl ToastLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(VecDeque::new()),
        }
    }

    pub fn recent(&self) -> Vec<Toast> {
        self.lock().iter().cloned().collect()
    }

    pub fn dismiss(&self, id: Uuid) -> bool {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|t| t.id != id);
        entries.len() != before
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Toast>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Notifier for ToastLog {
    fn notify(&self, level: ToastLevel, message: &str) {
        match level {
            ToastLevel::Success => info!("toast: {}", message),
            ToastLevel::Error => warn!("toast: {}", message),
        }

        let mut entries = self.lock();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(Toast {
            id: Uuid::new_v4(),
            level,
            message: message.to_string(),
            created_at: Utc::now(),
        });
    }
}

/// Navigation side effect owned by whatever renders the views.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

pub struct RouteTracker {
    current: Mutex<String>,
}

impl RouteTracker {
    pub fn new(initial: &str) -> Self {
        Self {
            current: Mutex::new(initial.to_string()),
        }
    }

    pub fn current(&self) -> String {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Navigator for RouteTracker {
    fn navigate(&self, path: &str) {
        info!("navigating to {}", path);
        *self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = path.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toast_log_drops_oldest_beyond_capacity() {
        let log = ToastLog::new(2);
        log.success("one");
        log.error("two");
        log.success("three");

        let messages: Vec<_> = log.recent().into_iter().map(|t| t.message).collect();
        assert_eq!(messages, vec!["two", "three"]);
    }

    #[test]
    fn dismiss_removes_only_the_matching_toast() {
        let log = ToastLog::new(5);
        log.success("saved");
        log.error("failed");
        let first = log.recent()[0].id;

        assert!(log.dismiss(first));
        assert!(!log.dismiss(first));
        assert_eq!(log.recent().len(), 1);
        assert_eq!(log.recent()[0].level, ToastLevel::Error);
    }
}
