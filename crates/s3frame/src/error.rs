use arrow::error::ArrowError;
use thiserror::Error;

/// Boxed error carried unmodified from the remote service.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while selecting from S3 and building tables.
#[derive(Error, Debug)]
pub enum SelectError {
    /// The event stream ended without an `End` event; partial data must not be used.
    #[error("End event not received, request incomplete ({events} events read)")]
    IncompleteStream { events: u64 },

    /// The remote call (submission or stream receive) failed.
    #[error("S3 Select request failed: {0}")]
    Service(#[source] BoxError),

    /// Record payloads did not decode as UTF-8.
    #[error("record payload is not valid UTF-8: {0}")]
    Decode(#[from] std::string::FromUtf8Error),

    /// The selected text could not be parsed as delimited text.
    #[error("CSV parse error: {0}")]
    Parse(#[source] ArrowError),

    /// Concatenating or sorting tables failed.
    #[error("merge error: {0}")]
    Merge(#[source] ArrowError),

    /// Writing a table out as CSV failed.
    #[error("CSV export error: {0}")]
    Export(#[source] ArrowError),

    /// A separator or quote character that is not exactly one byte.
    #[error("invalid dialect: {0}")]
    InvalidDialect(String),
}

impl SelectError {
    /// Wrap a remote-service error without altering it.
    pub fn service<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Service(Box::new(err))
    }

    /// Returns `true` for the locally synthesized incomplete-stream condition.
    pub fn is_incomplete(&self) -> bool {
        matches!(self, Self::IncompleteStream { .. })
    }
}
