//! Query execution: submit one select request and drain its event stream.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::DEFAULT_PROGRESS_INTERVAL;
use crate::error::SelectError;
use crate::event::{EventStream, ScanStats, SelectEvent, SelectService};
use crate::request::SelectRequest;

/// Text and counters produced by one completed select.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOutput {
    /// Concatenated record payloads with trailing whitespace removed.
    pub text: String,
    /// Line breaks in the untrimmed text. A final line without a trailing
    /// newline is not counted.
    pub row_count: usize,
    /// Events received, of every kind.
    pub events: u64,
    /// Last statistics event, when the service sent one.
    pub stats: Option<ScanStats>,
}

/// Runs select requests against a [`SelectService`].
pub struct QueryExecutor<S> {
    service: S,
    progress_interval: u64,
}

impl<S: SelectService> QueryExecutor<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    /// Log a progress line every `interval` events (0 disables it).
    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval;
        self
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Submit `request` and read its stream to the end.
    ///
    /// Service errors are returned as they arrive; a stream that closes
    /// without an `End` event is [`SelectError::IncompleteStream`].
    pub async fn execute(&self, request: &SelectRequest) -> Result<SelectOutput, SelectError> {
        info!(
            bucket = %request.bucket(),
            key = %request.key(),
            compression = request.compression().as_str(),
            "Starting S3 Select query"
        );

        let mut stream = self.service.select(request).await?;
        drain_events(stream.as_mut(), self.progress_interval).await
    }
}

/// Consume `stream` in arrival order and assemble the result text.
pub async fn drain_events(
    stream: &mut dyn EventStream,
    progress_interval: u64,
) -> Result<SelectOutput, SelectError> {
    let mut payload: Vec<u8> = Vec::new();
    let mut events: u64 = 0;
    let mut stats = None;
    let mut end_received = false;

    info!("Appending rows...");

    while let Some(event) = stream.next_event().await? {
        events += 1;

        match event {
            SelectEvent::Records(bytes) => {
                if progress_interval > 0 && events % progress_interval == 0 {
                    info!(events, bytes = payload.len(), "...read {} blocks", events);
                }
                payload.extend_from_slice(&bytes);
            }
            SelectEvent::Stats(s) => {
                debug!(
                    bytes_scanned = s.bytes_scanned,
                    bytes_processed = s.bytes_processed,
                    bytes_returned = s.bytes_returned,
                    "Select stats"
                );
                stats = Some(s);
            }
            SelectEvent::End => end_received = true,
            SelectEvent::Other(kind) => debug!(kind = %kind, "Ignoring select event"),
        }
    }

    if !end_received {
        warn!(events, "Select stream closed without an End event");
        return Err(SelectError::IncompleteStream { events });
    }

    let mut text = String::from_utf8(payload)?;
    let row_count = text.matches('\n').count();
    text.truncate(text.trim_end().len());

    Ok(SelectOutput {
        text,
        row_count,
        events,
        stats,
    })
}
