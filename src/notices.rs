//! Toast queue. Every user-visible success or failure goes through here.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Serialize;

pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub id: u64,
    pub kind: NoticeKind,
    pub message: String,
    pub dismissible: bool,
    /// `None` keeps the notice until dismissed.
    #[serde(skip)]
    pub duration: Option<Duration>,
    #[serde(skip)]
    pub raised_at: Instant,
}

impl Notice {
    fn expired(&self, now: Instant) -> bool {
        self.duration
            .map(|d| now.saturating_duration_since(self.raised_at) >= d)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone)]
pub enum NoticeAction {
    Push {
        kind: NoticeKind,
        message: String,
        dismissible: bool,
        duration: Option<Duration>,
        at: Instant,
    },
    Dismiss(u64),
    Expire(Instant),
    Clear,
}

#[derive(Debug, Default, Clone)]
pub struct NoticeQueue {
    next_id: u64,
    items: Vec<Notice>,
}

impl NoticeQueue {
    pub fn reduce(&mut self, action: NoticeAction) -> Option<u64> {
        match action {
            NoticeAction::Push {
                kind,
                message,
                dismissible,
                duration,
                at,
            } => {
                self.next_id += 1;
                let id = self.next_id;
                self.items.push(Notice {
                    id,
                    kind,
                    message,
                    dismissible,
                    duration,
                    raised_at: at,
                });
                return Some(id);
            }
            NoticeAction::Dismiss(id) => {
                self.items.retain(|n| !(n.id == id && n.dismissible));
            }
            NoticeAction::Expire(now) => {
                self.items.retain(|n| !n.expired(now));
            }
            NoticeAction::Clear => self.items.clear(),
        }
        None
    }

    pub fn items(&self) -> &[Notice] {
        &self.items
    }
}

/// Shared handle so services and views can raise toasts.
#[derive(Debug, Clone, Default)]
pub struct Notices {
    queue: Arc<Mutex<NoticeQueue>>,
}

impl Notices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch(&self, action: NoticeAction) -> Option<u64> {
        self.queue.lock().reduce(action)
    }

    fn toast(&self, kind: NoticeKind, message: impl Into<String>) -> u64 {
        let message = message.into();
        match kind {
            NoticeKind::Error => tracing::warn!(%message, "toast"),
            _ => tracing::debug!(?kind, %message, "toast"),
        }
        self.dispatch(NoticeAction::Push {
            kind,
            message,
            dismissible: true,
            duration: Some(DEFAULT_TOAST_DURATION),
            at: Instant::now(),
        })
        .unwrap_or_default()
    }

    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.toast(NoticeKind::Success, message)
    }

    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.toast(NoticeKind::Error, message)
    }

    pub fn warning(&self, message: impl Into<String>) -> u64 {
        self.toast(NoticeKind::Warning, message)
    }

    pub fn info(&self, message: impl Into<String>) -> u64 {
        self.toast(NoticeKind::Info, message)
    }

    pub fn dismiss(&self, id: u64) {
        self.dispatch(NoticeAction::Dismiss(id));
    }

    pub fn expire(&self, now: Instant) {
        self.dispatch(NoticeAction::Expire(now));
    }

    pub fn snapshot(&self) -> Vec<Notice> {
        self.queue.lock().items().to_vec()
    }

    pub fn count(&self, kind: NoticeKind) -> usize {
        self.queue
            .lock()
            .items()
            .iter()
            .filter(|n| n.kind == kind)
            .count()
    }
}
