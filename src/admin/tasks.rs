use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{error, info, instrument};

use crate::api::ApiClient;
use crate::notices::Notices;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaskStatus {
    pub running: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_run: Option<OffsetDateTime>,
}

/// Clears `running` however the trigger ends, including when its future
/// is dropped mid-request.
struct RunningGuard(Arc<Mutex<TaskStatus>>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.lock().running = false;
    }
}

/// Manual trigger for the backend job that deactivates expired events.
#[derive(Clone)]
pub struct ExpiredEventsTask {
    api: ApiClient,
    notices: Notices,
    status: Arc<Mutex<TaskStatus>>,
}

impl ExpiredEventsTask {
    pub fn new(api: ApiClient, notices: Notices) -> Self {
        Self {
            api,
            notices,
            status: Arc::default(),
        }
    }

    pub fn status(&self) -> TaskStatus {
        self.status.lock().clone()
    }

    /// Returns whether the backend reported success. A trigger while one is
    /// already running is ignored.
    #[instrument(skip(self))]
    pub async fn trigger(&self) -> bool {
        {
            let mut status = self.status.lock();
            if status.running {
                return false;
            }
            status.running = true;
        }
        let _guard = RunningGuard(self.status.clone());

        let ok = match self.api.deactivate_expired_events().await {
            Ok(outcome) if outcome.success => {
                info!(message = ?outcome.message, "expired events deactivated");
                self.notices.success("Task triggered successfully");
                true
            }
            Ok(outcome) => {
                let message = outcome.message.unwrap_or_default();
                error!(%message, "deactivation task refused");
                self.notices
                    .error(format!("Failed to trigger task: {message}"));
                false
            }
            Err(e) => {
                error!(error = %e, "deactivation task request failed");
                self.notices.error("Error: Failed to trigger task");
                false
            }
        };

        if ok {
            self.status.lock().last_run = Some(OffsetDateTime::now_utc());
        }
        ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notices::NoticeKind;
    use crate::test_util::{Reply, ScriptedTransport};
    use crate::transport::Method;
    use serde_json::json;

    const PATH: &str = "/api/scheduled-tasks/deactivate-expired-events";

    #[tokio::test]
    async fn success_records_last_run() {
        let t = ScriptedTransport::new();
        t.on(
            Method::Post,
            PATH,
            Reply::Json(json!({"success": true, "message": "done"})),
        );
        let notices = Notices::new();
        let task = ExpiredEventsTask::new(t.client(), notices.clone());
        assert!(task.trigger().await);

        let status = task.status();
        assert!(!status.running);
        assert!(status.last_run.is_some());
        assert_eq!(notices.count(NoticeKind::Success), 1);
    }

    #[tokio::test]
    async fn refusal_carries_backend_message() {
        let t = ScriptedTransport::new();
        t.on(
            Method::Post,
            PATH,
            Reply::Json(json!({"success": false, "message": "scheduler busy"})),
        );
        let notices = Notices::new();
        let task = ExpiredEventsTask::new(t.client(), notices.clone());
        assert!(!task.trigger().await);
        assert_eq!(task.status(), TaskStatus::default());
        assert_eq!(
            notices.snapshot()[0].message,
            "Failed to trigger task: scheduler busy"
        );
    }

    #[tokio::test]
    async fn concurrent_trigger_is_ignored() {
        let t = ScriptedTransport::new();
        t.on(Method::Post, PATH, Reply::Json(json!({"success": true})));
        let gate = t.gate(Method::Post, PATH);
        let task = ExpiredEventsTask::new(t.client(), Notices::new());

        let first = {
            let task = task.clone();
            tokio::spawn(async move { task.trigger().await })
        };
        while t.calls().is_empty() {
            tokio::task::yield_now().await;
        }
        assert!(task.status().running);
        assert!(!task.trigger().await);

        gate.notify_one();
        assert!(first.await.unwrap());
        assert_eq!(t.calls().len(), 1);
    }

    #[tokio::test]
    async fn abandoned_trigger_does_not_stay_running() {
        let t = ScriptedTransport::new();
        t.on(Method::Post, PATH, Reply::Json(json!({"success": true})));
        let gate = t.gate(Method::Post, PATH);
        let task = ExpiredEventsTask::new(t.client(), Notices::new());

        let timed_out =
            tokio::time::timeout(std::time::Duration::from_millis(20), task.trigger()).await;
        assert!(timed_out.is_err());
        assert_eq!(task.status(), TaskStatus::default());

        gate.notify_one();
        assert!(task.trigger().await);
        assert_eq!(t.calls().len(), 2);
    }
}
