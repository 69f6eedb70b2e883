//! Materialized tables built from selected CSV text.

use std::fmt;
use std::io::{Cursor, Write};
use std::sync::Arc;
use std::time::Instant;

use arrow::array::{Array, AsArray};
use arrow::compute::concat_batches;
use arrow::csv::reader::Format;
use arrow::csv::{ReaderBuilder, WriterBuilder};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use tracing::info;

use crate::error::SelectError;
use crate::event::SelectService;
use crate::executor::QueryExecutor;
use crate::merge::merge_sorted;
use crate::request::{single_byte, SelectRequest};

/// Separator used when the caller does not pick one.
pub const DEFAULT_SEPARATOR: &str = ",";

// ---------------------------------------------------------------------------
// SelectTable
// ---------------------------------------------------------------------------

/// Rows × named columns. Every column is nullable UTF-8; row indices run
/// contiguously from zero.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectTable {
    batch: RecordBatch,
}

impl SelectTable {
    /// Wrap a batch whose columns are all `Utf8`.
    pub fn from_record_batch(batch: RecordBatch) -> Result<Self, SelectError> {
        if let Some(field) = batch
            .schema()
            .fields()
            .iter()
            .find(|f| f.data_type() != &DataType::Utf8)
        {
            return Err(SelectError::Parse(arrow::error::ArrowError::SchemaError(format!(
                "column {} has type {}, expected Utf8",
                field.name(),
                field.data_type()
            ))));
        }
        Ok(Self { batch })
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn num_columns(&self) -> usize {
        self.batch.num_columns()
    }

    pub fn is_empty(&self) -> bool {
        self.batch.num_rows() == 0
    }

    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    /// Position of a column by name (case-sensitive).
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.batch.schema().index_of(name).ok()
    }

    /// Cell at `row` in column `column`; `None` for nulls, unknown columns and
    /// out-of-range rows.
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        let array = self.batch.column(idx).as_string::<i32>();
        if row >= array.len() || array.is_null(row) {
            return None;
        }
        Some(array.value(row))
    }

    /// All values of a row in column order.
    pub fn row(&self, row: usize) -> Option<Vec<Option<&str>>> {
        if row >= self.num_rows() {
            return None;
        }
        Some(
            self.batch
                .columns()
                .iter()
                .map(|col| {
                    let array = col.as_string::<i32>();
                    (!array.is_null(row)).then(|| array.value(row))
                })
                .collect(),
        )
    }

    pub fn record_batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn into_record_batch(self) -> RecordBatch {
        self.batch
    }

    /// Write the table as comma-separated text with a header line.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), SelectError> {
        let mut csv = WriterBuilder::new().with_header(true).build(writer);
        csv.write(&self.batch).map_err(SelectError::Export)
    }
}

impl fmt::Display for SelectTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self.column_names();
        if names.is_empty() {
            return write!(f, "(empty table)");
        }

        let rows: Vec<Vec<Option<&str>>> =
            (0..self.num_rows()).filter_map(|i| self.row(i)).collect();

        let mut widths: Vec<usize> = names.iter().map(|n| n.len()).collect();
        for row in &rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.unwrap_or("NULL").len());
            }
        }

        for (i, name) in names.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{:<width$}", name, width = widths[i])?;
        }
        writeln!(f)?;

        for (i, w) in widths.iter().enumerate() {
            if i > 0 {
                write!(f, "-+-")?;
            }
            write!(f, "{}", "-".repeat(*w))?;
        }
        writeln!(f)?;

        for row in &rows {
            for (i, cell) in row.iter().enumerate() {
                if i > 0 {
                    write!(f, " | ")?;
                }
                write!(f, "{:<width$}", cell.unwrap_or("NULL"), width = widths[i])?;
            }
            writeln!(f)?;
        }

        writeln!(f)?;
        write!(f, "{} rows x {} columns", self.num_rows(), self.num_columns())
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse `text` as delimited rows under the column names in `header`.
///
/// Columns are not typed: every cell stays text and empty cells are null.
/// Quoting follows the service's CSV output (`"`).
pub fn parse_csv_table(header: &str, text: &str, separator: u8) -> Result<SelectTable, SelectError> {
    let schema = header_schema(header, separator)?;

    let mut combined = String::with_capacity(header.len() + 1 + text.len());
    combined.push_str(header);
    combined.push('\n');
    combined.push_str(text);

    let reader = ReaderBuilder::new(schema.clone())
        .with_header(true)
        .with_delimiter(separator)
        .build(Cursor::new(combined.into_bytes()))
        .map_err(SelectError::Parse)?;

    let batches = reader
        .collect::<Result<Vec<_>, _>>()
        .map_err(SelectError::Parse)?;

    let batch = concat_batches(&schema, &batches).map_err(SelectError::Parse)?;
    Ok(SelectTable { batch })
}

/// Column names from the header line, each typed as nullable `Utf8`.
fn header_schema(header: &str, separator: u8) -> Result<SchemaRef, SelectError> {
    let (names, _) = Format::default()
        .with_header(true)
        .with_delimiter(separator)
        .infer_schema(Cursor::new(header.as_bytes()), Some(0))
        .map_err(SelectError::Parse)?;

    let fields: Vec<Field> = names
        .fields()
        .iter()
        .map(|f| Field::new(f.name(), DataType::Utf8, true))
        .collect();

    Ok(Arc::new(Schema::new(fields)))
}

// ---------------------------------------------------------------------------
// Loader
// ---------------------------------------------------------------------------

/// Runs a select and materializes the result as a [`SelectTable`].
pub struct TableLoader<S> {
    executor: QueryExecutor<S>,
}

impl<S: SelectService> TableLoader<S> {
    pub fn new(executor: QueryExecutor<S>) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &QueryExecutor<S> {
        &self.executor
    }

    /// Select from one object and parse the result under `header`.
    ///
    /// Elapsed time and the executor's row count are logged, not returned.
    pub async fn load(
        &self,
        request: &SelectRequest,
        header: &str,
        separator: &str,
    ) -> Result<SelectTable, SelectError> {
        let separator = single_byte(separator, "separator")?;

        info!("Quote delimiter set to: [{}]", request.quote_character());
        let start = Instant::now();
        let output = self.executor.execute(request).await?;
        let elapsed = start.elapsed();

        info!(
            key = %request.key(),
            rows = output.row_count,
            events = output.events,
            "Read {} rows in {:.2} seconds",
            output.row_count,
            elapsed.as_secs_f64()
        );

        parse_csv_table(header, &output.text, separator)
    }

    /// Load `first`, then the same query against `second_key`, and merge the
    /// two sorted ascending by `sort_column`.
    ///
    /// The second select starts only after the first has completed.
    pub async fn load_merged(
        &self,
        first: &SelectRequest,
        second_key: &str,
        header: &str,
        separator: &str,
        sort_column: &str,
    ) -> Result<SelectTable, SelectError> {
        let second = first.with_key(second_key);

        let first_table = self.load(first, header, separator).await?;
        let second_table = self.load(&second, header, separator).await?;

        merge_sorted(&[first_table, second_table], sort_column)
    }
}
