//! Shared fixtures for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use serde_json::{Map, Value, json};

use crate::client::Gateway;
use crate::envelope::{Method, ResponseEnvelope};
use crate::error::ApiError;

type Reply = (Result<Value, String>, Duration);

/// One call observed by [`MockGateway`].
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    pub action: String,
    pub payload: Map<String, Value>,
    pub method: Method,
}

/// Scripted gateway: canned outcomes per action, plus an optional delay.
///
/// Outcomes queued for one action are used in order; the last one repeats.
#[derive(Default)]
pub struct MockGateway {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<MockCall>>,
    completed: Mutex<Vec<String>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply to `action` with `{success: true, data}`.
    pub fn ok(self, action: &str, data: Value) -> Self {
        self.ok_after(action, data, Duration::ZERO)
    }

    pub fn ok_after(self, action: &str, data: Value, delay: Duration) -> Self {
        self.push(action, (Ok(data), delay))
    }

    /// Reply to `action` with `{success: false, message}`.
    pub fn fail(self, action: &str, message: &str) -> Self {
        self.fail_after(action, message, Duration::ZERO)
    }

    pub fn fail_after(self, action: &str, message: &str, delay: Duration) -> Self {
        self.push(action, (Err(message.to_owned()), delay))
    }

    fn push(self, action: &str, reply: Reply) -> Self {
        self.replies
            .lock()
            .unwrap()
            .entry(action.to_owned())
            .or_default()
            .push_back(reply);
        self
    }

    fn next_reply(&self, action: &str) -> Reply {
        let mut replies = self.replies.lock().unwrap();
        let Some(queue) = replies.get_mut(action) else {
            return (Ok(json!(null)), Duration::ZERO);
        };
        if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue.front().cloned().unwrap_or((Ok(json!(null)), Duration::ZERO))
        }
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn actions(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.action).collect()
    }

    /// Actions whose reply was produced, in completion order.
    pub fn completed(&self) -> Vec<String> {
        self.completed.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Gateway for MockGateway {
    async fn call(
        &self,
        action: &str,
        payload: Map<String, Value>,
        method: Method,
    ) -> Result<ResponseEnvelope, ApiError> {
        self.calls
            .lock()
            .unwrap()
            .push(MockCall { action: action.to_owned(), payload, method });
        let (outcome, delay) = self.next_reply(action);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.completed.lock().unwrap().push(action.to_owned());
        match outcome {
            Ok(data) => Ok(ResponseEnvelope { success: true, message: None, data: Some(data) }),
            Err(message) => Err(ApiError::domain(Some(message))),
        }
    }
}
