//! In-memory backend used by the unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::Notify;

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::transport::{ApiRequest, ApiResponse, Method, Transport};

#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    Status(u16),
}

#[derive(Default)]
struct Route {
    replies: VecDeque<Reply>,
    fallback: Option<Reply>,
    gate: Option<Arc<Notify>>,
}

/// Routes are keyed by method and path; query strings are ignored for
/// matching but kept in the call log.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<(Method, String), Route>>,
    calls: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Reply used for every call once queued replies run out.
    pub fn on(&self, method: Method, path: &str, reply: Reply) -> &Self {
        self.routes
            .lock()
            .entry((method, path.to_string()))
            .or_default()
            .fallback = Some(reply);
        self
    }

    /// One-shot reply, consumed in order before the fallback.
    pub fn once(&self, method: Method, path: &str, reply: Reply) -> &Self {
        self.routes
            .lock()
            .entry((method, path.to_string()))
            .or_default()
            .replies
            .push_back(reply);
        self
    }

    /// Holds every reply on this route until the returned handle is notified.
    pub fn gate(&self, method: Method, path: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.routes
            .lock()
            .entry((method, path.to_string()))
            .or_default()
            .gate = Some(gate.clone());
        gate
    }

    pub fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().clone()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|r| r.method == method && r.path() == path)
            .count()
    }

    pub fn client(self: &Arc<Self>) -> ApiClient {
        ApiClient::new(self.clone())
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, req: ApiRequest) -> Result<ApiResponse, ApiError> {
        let path = req.path();
        self.calls.lock().push(req.clone());

        let (reply, gate) = {
            let mut routes = self.routes.lock();
            match routes.get_mut(&(req.method, path.clone())) {
                Some(route) => {
                    let reply = route.replies.pop_front().or_else(|| route.fallback.clone());
                    (reply, route.gate.clone())
                }
                None => (None, None),
            }
        };

        if let Some(gate) = gate {
            gate.notified().await;
        }

        match reply {
            Some(Reply::Json(body)) => Ok(ApiResponse { status: 200, body }),
            Some(Reply::Status(404)) | None => Err(ApiError::NotFound { path }),
            Some(Reply::Status(status)) if (200..300).contains(&status) => Ok(ApiResponse {
                status,
                body: Value::Null,
            }),
            Some(Reply::Status(status)) => Err(ApiError::Status { path, status }),
        }
    }
}
