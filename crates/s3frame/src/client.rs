//! S3 Select client.
//!
//! Provides [`S3SelectClient`], the [`SelectService`] that submits
//! `SelectObjectContent` requests through the AWS SDK and exposes the
//! response payload as an [`EventStream`].

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::operation::select_object_content::SelectObjectContentOutput;
use aws_sdk_s3::types::{
    CompressionType, CsvInput, CsvOutput, ExpressionType, FileHeaderInfo, InputSerialization,
    OutputSerialization, SelectObjectContentEventStream,
};
use bytes::Bytes;
use tracing::{debug, info};

use crate::config::SelectConfig;
use crate::error::SelectError;
use crate::event::{EventStream, ScanStats, SelectEvent, SelectService};
use crate::request::{CompressionHint, SelectRequest};

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// [`SelectService`] backed by an `aws_sdk_s3::Client`.
///
/// The caller builds it once and passes it to a
/// [`QueryExecutor`](crate::executor::QueryExecutor); credentials come from the
/// standard AWS provider chain.
#[derive(Clone)]
pub struct S3SelectClient {
    s3: aws_sdk_s3::Client,
}

impl S3SelectClient {
    /// Create a client for the region and endpoint in `config`.
    pub async fn new(config: &SelectConfig) -> Self {
        let region = aws_sdk_s3::config::Region::new(config.region.clone());
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(region)
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.force_path_style);

        if let Some(ref endpoint) = config.endpoint_url {
            builder = builder.endpoint_url(endpoint);
        }

        info!(
            region = %config.region,
            endpoint = config.endpoint_url.as_deref().unwrap_or("(aws)"),
            force_path_style = config.force_path_style,
            "S3SelectClient initialised"
        );

        Self::from_client(aws_sdk_s3::Client::from_conf(builder.build()))
    }

    /// Wrap an SDK client that was configured elsewhere.
    pub fn from_client(s3: aws_sdk_s3::Client) -> Self {
        Self { s3 }
    }
}

#[async_trait]
impl SelectService for S3SelectClient {
    async fn select(&self, request: &SelectRequest) -> Result<Box<dyn EventStream>, SelectError> {
        debug!(
            bucket = %request.bucket(),
            key = %request.key(),
            compression = request.compression().as_str(),
            "Submitting S3 Select request"
        );

        let output = self
            .s3
            .select_object_content()
            .bucket(request.bucket())
            .key(request.key())
            .expression(request.expression())
            .expression_type(ExpressionType::Sql)
            .input_serialization(input_serialization(request))
            .output_serialization(
                OutputSerialization::builder()
                    .csv(CsvOutput::builder().build())
                    .build(),
            )
            .send()
            .await
            .map_err(SelectError::service)?;

        Ok(Box::new(S3EventStream { output }))
    }
}

fn input_serialization(request: &SelectRequest) -> InputSerialization {
    let csv = CsvInput::builder()
        .file_header_info(FileHeaderInfo::Use)
        .allow_quoted_record_delimiter(true)
        .quote_character(request.quote_character())
        .build();

    InputSerialization::builder()
        .csv(csv)
        .compression_type(compression_type(request.compression()))
        .build()
}

fn compression_type(hint: CompressionHint) -> CompressionType {
    match hint {
        CompressionHint::Gzip => CompressionType::Gzip,
        CompressionHint::None => CompressionType::None,
    }
}

// ---------------------------------------------------------------------------
// Event stream
// ---------------------------------------------------------------------------

/// Holds the SDK output so the payload receiver lives as long as the stream.
struct S3EventStream {
    output: SelectObjectContentOutput,
}

#[async_trait]
impl EventStream for S3EventStream {
    async fn next_event(&mut self) -> Result<Option<SelectEvent>, SelectError> {
        let event = self.output.payload.recv().await.map_err(SelectError::service)?;
        Ok(event.map(translate_event))
    }
}

/// Map an SDK event onto [`SelectEvent`]. Unknown variants become `Other`.
fn translate_event(event: SelectObjectContentEventStream) -> SelectEvent {
    match event {
        SelectObjectContentEventStream::Records(records) => SelectEvent::Records(
            records
                .payload()
                .map(|blob| Bytes::copy_from_slice(blob.as_ref()))
                .unwrap_or_default(),
        ),
        SelectObjectContentEventStream::Stats(stats) => {
            let details = stats.details();
            SelectEvent::Stats(ScanStats {
                bytes_scanned: non_negative(details.and_then(|d| d.bytes_scanned())),
                bytes_processed: non_negative(details.and_then(|d| d.bytes_processed())),
                bytes_returned: non_negative(details.and_then(|d| d.bytes_returned())),
            })
        }
        SelectObjectContentEventStream::End(_) => SelectEvent::End,
        SelectObjectContentEventStream::Progress(_) => SelectEvent::Other("Progress".into()),
        SelectObjectContentEventStream::Cont(_) => SelectEvent::Other("Cont".into()),
        other => SelectEvent::Other(format!("{other:?}")),
    }
}

fn non_negative(value: Option<i64>) -> u64 {
    value.unwrap_or(0).max(0) as u64
}

// ---------------------------------------------------------------------------
// Tests: request/event mapping only, no AWS calls
// ---------------------------------------------------------------------------
