//! Mock transport for testing
//!
//! Serves canned responses per `METHOD path` and records every request so
//! tests can assert on what went over the wire, and how often.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use super::transport::{Method, Transport, TransportRequest, TransportResponse};
use crate::error::{ApiError, Result};

#[derive(Debug, Clone)]
enum MockReply {
    Response(TransportResponse),
    NetworkError(String),
}

/// Mock transport for unit tests.
///
/// # Example
/// ```ignore
/// let mock = MockTransport::new()
///     .with_envelope(Method::Post, "/apiV2/auth/token", ok_envelope(json!({"token": "t"})));
/// ```
#[derive(Clone, Default)]
pub struct MockTransport {
    /// Queued replies keyed by `METHOD path`; the last reply is sticky
    replies: Arc<Mutex<HashMap<String, VecDeque<MockReply>>>>,
    /// Captured requests for test assertions
    captured_requests: Arc<Mutex<Vec<TransportRequest>>>,
}

fn route(method: Method, path: &str) -> String {
    format!("{:?} {}", method, path)
}

/// Body of a successful envelope
pub fn ok_envelope(data: Value) -> String {
    json!({"success": true, "message": "Query executed successfully", "data": data}).to_string()
}

/// Body of a failed envelope
pub fn err_envelope(message: &str) -> String {
    json!({"success": false, "message": message, "data": null}).to_string()
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(self, method: Method, path: &str, reply: MockReply) -> Self {
        self.replies
            .lock()
            .unwrap()
            .entry(route(method, path))
            .or_default()
            .push_back(reply);
        self
    }

    /// Queue a raw response
    pub fn with_response(self, method: Method, path: &str, status: u16, body: impl Into<String>) -> Self {
        let response = TransportResponse {
            status,
            body: body.into(),
        };
        self.push(method, path, MockReply::Response(response))
    }

    /// Queue a 200 response carrying the given envelope body
    pub fn with_envelope(self, method: Method, path: &str, body: impl Into<String>) -> Self {
        self.with_response(method, path, 200, body)
    }

    /// Queue a connection failure
    pub fn with_network_error(self, method: Method, path: &str, message: &str) -> Self {
        self.push(method, path, MockReply::NetworkError(message.to_string()))
    }

    /// Successful login returning `token`
    pub fn with_login(self, token: &str) -> Self {
        self.with_envelope(
            Method::Post,
            "/apiV2/auth/token",
            ok_envelope(json!({"token": token})),
        )
    }

    /// Successful webservice call returning `rows` as data
    pub fn with_query(self, webservice: &str, rows: Value) -> Self {
        let path = format!("/apiV2/query/execute/{}", webservice);
        self.with_envelope(Method::Post, &path, ok_envelope(rows))
    }

    /// All requests seen so far
    pub fn requests(&self) -> Vec<TransportRequest> {
        self.captured_requests.lock().unwrap().clone()
    }

    /// Total number of requests
    pub fn call_count(&self) -> usize {
        self.captured_requests.lock().unwrap().len()
    }

    /// Number of requests sent to `path`
    pub fn calls_to(&self, path: &str) -> usize {
        self.captured_requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path == path)
            .count()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        let key = route(request.method, &request.path);
        self.captured_requests.lock().unwrap().push(request);

        let reply = {
            let mut replies = self.replies.lock().unwrap();
            match replies.get_mut(&key) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        match reply {
            Some(MockReply::Response(response)) => Ok(response),
            Some(MockReply::NetworkError(message)) => Err(ApiError::Network(message).into()),
            None => Ok(TransportResponse {
                status: 404,
                body: format!("no mock for {}", key),
            }),
        }
    }
}
