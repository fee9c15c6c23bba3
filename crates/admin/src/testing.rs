//! In-memory transport for tests.
//!
//! [`MockTransport`] answers requests from scripted replies keyed by method
//! and path, records every request it sees, and can hold a route's replies
//! until the test releases them. Holding is how tests reproduce out-of-order
//! completions: issue two fetches, then release them in the opposite order.
//!
//! Available in unit tests and, for other crates, behind the `test-support`
//! feature.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use reqwest::header::AUTHORIZATION;
use reqwest::{Method, StatusCode};
use tokio::sync::Semaphore;

use crate::api::{ApiRequest, ApiResponse, Transport, TransportError};

type RouteKey = (Method, String);

/// A request as seen by the mock.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<serde_json::Value>,
    /// The `Authorization` header, if one was sent.
    pub authorization: Option<String>,
}

/// Scripted reply for a route.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Respond with a status and JSON body.
    Json(StatusCode, serde_json::Value),
    /// Respond with a status and raw body text.
    Text(StatusCode, String),
    /// Fail the exchange.
    Fail(TransportError),
}

#[derive(Default)]
struct MockState {
    replies: HashMap<RouteKey, VecDeque<MockReply>>,
    gates: HashMap<RouteKey, Arc<Semaphore>>,
    requests: Vec<RecordedRequest>,
}

/// Scripted in-memory [`Transport`].
///
/// Replies queued for a route are consumed in order; the last one is reused
/// for any further requests. Unscripted routes answer `404`.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

/// Releases held replies for one route.
#[derive(Clone)]
pub struct MockGate {
    permits: Arc<Semaphore>,
}

impl MockGate {
    /// Let one held request complete.
    pub fn release(&self) {
        self.permits.add_permits(1);
    }
}

impl MockTransport {
    /// Create a mock with no routes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue a reply for `method path`.
    pub fn reply(&self, method: Method, path: &str, reply: MockReply) -> &Self {
        self.lock()
            .replies
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
        self
    }

    /// Queue a JSON reply.
    pub fn respond(
        &self,
        method: Method,
        path: &str,
        status: StatusCode,
        body: serde_json::Value,
    ) -> &Self {
        self.reply(method, path, MockReply::Json(status, body))
    }

    /// Queue a `200 OK` JSON reply.
    pub fn ok(&self, method: Method, path: &str, body: serde_json::Value) -> &Self {
        self.respond(method, path, StatusCode::OK, body)
    }

    /// Hold every reply on `method path` until the returned gate releases it.
    pub fn hold(&self, method: Method, path: &str) -> MockGate {
        let permits = Arc::new(Semaphore::new(0));
        self.lock()
            .gates
            .insert((method, path.to_string()), Arc::clone(&permits));
        MockGate { permits }
    }

    /// Every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    /// Number of requests received for `method path`.
    #[must_use]
    pub fn count(&self, method: &Method, path: &str) -> usize {
        self.lock()
            .requests
            .iter()
            .filter(|r| r.method == *method && r.path == path)
            .count()
    }

    /// The most recent request, if any.
    #[must_use]
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.lock().requests.last().cloned()
    }
}

impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let key = (request.method.clone(), request.path.clone());

        let (reply, gate) = {
            let mut state = self.lock();
            state.requests.push(RecordedRequest {
                method: request.method.clone(),
                path: request.path.clone(),
                body: request.body.clone(),
                authorization: request
                    .headers
                    .get(AUTHORIZATION)
                    .and_then(|v| v.to_str().ok())
                    .map(String::from),
            });

            let reply = state.replies.get_mut(&key).and_then(|queue| {
                if queue.len() > 1 {
                    queue.pop_front()
                } else {
                    queue.front().cloned()
                }
            });
            (reply, state.gates.get(&key).cloned())
        };

        if let Some(gate) = gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|e| TransportError::Request(e.to_string()))?;
            permit.forget();
        }

        match reply {
            Some(MockReply::Json(status, body)) => Ok(ApiResponse {
                status,
                body: body.to_string(),
            }),
            Some(MockReply::Text(status, body)) => Ok(ApiResponse { status, body }),
            Some(MockReply::Fail(err)) => Err(err),
            None => Ok(ApiResponse {
                status: StatusCode::NOT_FOUND,
                body: serde_json::json!({"error": format!("no route for {} {}", key.0, key.1)})
                    .to_string(),
            }),
        }
    }
}
