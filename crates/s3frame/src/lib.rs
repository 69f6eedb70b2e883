pub mod config;
pub mod client;
pub mod error;
pub mod event;
pub mod executor;
pub mod merge;
pub mod request;
pub mod scripted;
pub mod table;

pub use config::SelectConfig;
pub use client::S3SelectClient;
pub use error::SelectError;
pub use event::{EventStream, ScanStats, SelectEvent, SelectService};
pub use executor::{drain_events, QueryExecutor, SelectOutput};
pub use merge::{merge_sorted, DEFAULT_SORT_COLUMN};
pub use request::{CompressionHint, CsvDialect, SelectRequest, SELECT_ALL};
pub use scripted::{ScriptStep, ScriptedService};
pub use table::{parse_csv_table, SelectTable, TableLoader, DEFAULT_SEPARATOR};
