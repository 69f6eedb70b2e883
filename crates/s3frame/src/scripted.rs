//! In-memory [`SelectService`] that replays fixed event scripts per object key.
//!
//! Lets callers exercise executors and loaders without AWS credentials.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::SelectError;
use crate::event::{EventStream, SelectEvent, SelectService};
use crate::request::SelectRequest;

/// Error raised by scripted failures; stands in for an SDK error.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct ScriptedError(pub String);

/// One step of a scripted stream.
#[derive(Debug, Clone)]
pub enum ScriptStep {
    Event(SelectEvent),
    /// The receive fails with this message (connection reset, throttling, ...).
    Fail(String),
}

/// Replays the same script for every request against a key.
#[derive(Debug, Default)]
pub struct ScriptedService {
    scripts: HashMap<String, Vec<ScriptStep>>,
    reject: Option<String>,
    requests: Mutex<Vec<SelectRequest>>,
}

impl ScriptedService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the events returned for `key`.
    pub fn with_events(self, key: impl Into<String>, events: Vec<SelectEvent>) -> Self {
        self.with_steps(key, events.into_iter().map(ScriptStep::Event).collect())
    }

    /// Script the raw steps for `key`, including receive failures.
    pub fn with_steps(mut self, key: impl Into<String>, steps: Vec<ScriptStep>) -> Self {
        self.scripts.insert(key.into(), steps);
        self
    }

    /// Fail every submission with `message`, as the service does for bad SQL.
    pub fn rejecting(mut self, message: impl Into<String>) -> Self {
        self.reject = Some(message.into());
        self
    }

    /// Requests received so far, in submission order.
    pub fn requests(&self) -> Vec<SelectRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl SelectService for ScriptedService {
    async fn select(&self, request: &SelectRequest) -> Result<Box<dyn EventStream>, SelectError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        if let Some(ref message) = self.reject {
            return Err(SelectError::service(ScriptedError(message.clone())));
        }

        let steps = self.scripts.get(request.key()).ok_or_else(|| {
            SelectError::service(ScriptedError(format!(
                "NoSuchKey: {}/{}",
                request.bucket(),
                request.key()
            )))
        })?;

        Ok(Box::new(ScriptedStream {
            steps: steps.iter().cloned().collect(),
        }))
    }
}

struct ScriptedStream {
    steps: VecDeque<ScriptStep>,
}

#[async_trait]
impl EventStream for ScriptedStream {
    async fn next_event(&mut self) -> Result<Option<SelectEvent>, SelectError> {
        match self.steps.pop_front() {
            Some(ScriptStep::Event(event)) => Ok(Some(event)),
            Some(ScriptStep::Fail(message)) => Err(SelectError::service(ScriptedError(message))),
            None => Ok(None),
        }
    }
}
