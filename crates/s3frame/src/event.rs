//! Event model for S3 Select result streams and the service seam.
//!
//! [`SelectService`] is the substitution point: [`crate::client::S3SelectClient`]
//! talks to S3, [`crate::scripted::ScriptedService`] replays a fixed script.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::SelectError;
use crate::request::SelectRequest;

/// Byte counters reported by a `Stats` event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    pub bytes_scanned: u64,
    pub bytes_processed: u64,
    pub bytes_returned: u64,
}

/// One event from a select result stream.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectEvent {
    /// A fragment of output text; fragments may split rows and characters.
    Records(Bytes),
    /// Scan statistics for the request so far.
    Stats(ScanStats),
    /// The request completed; only a stream that carried this is valid.
    End,
    /// Progress, continuation or any kind added later. Ignored by consumers.
    Other(String),
}

impl SelectEvent {
    /// Convenience for building record events from text.
    pub fn records(text: impl Into<String>) -> Self {
        SelectEvent::Records(Bytes::from(text.into()))
    }
}

/// An ordered stream of select events.
#[async_trait]
pub trait EventStream: Send {
    /// Next event in arrival order, or `None` once the connection ends.
    async fn next_event(&mut self) -> Result<Option<SelectEvent>, SelectError>;
}

/// Something that can start a select query and hand back its event stream.
#[async_trait]
pub trait SelectService: Send + Sync {
    async fn select(&self, request: &SelectRequest) -> Result<Box<dyn EventStream>, SelectError>;
}

#[async_trait]
impl<S: SelectService + ?Sized> SelectService for std::sync::Arc<S> {
    async fn select(&self, request: &SelectRequest) -> Result<Box<dyn EventStream>, SelectError> {
        (**self).select(request).await
    }
}
