use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, UInt64Array};
use arrow::compute::{
    cast, concat_batches, lexsort_to_indices, take_record_batch, SortColumn, SortOptions,
};
use arrow::datatypes::DataType;
use arrow::error::ArrowError;
use tracing::debug;

use crate::error::SelectError;
use crate::table::SelectTable;

/// Column the alarm exports are ordered by.
pub const DEFAULT_SORT_COLUMN: &str = "TIMESTAMP_IN";

/// Concatenate `tables` in order, then sort ascending by `sort_column`.
///
/// A sort column whose values are all numbers is ordered numerically, any
/// other column as text. Ties keep their concatenated order and nulls sort
/// last. Rows of the result are renumbered from zero. Tables must share a schema.
pub fn merge_sorted(tables: &[SelectTable], sort_column: &str) -> Result<SelectTable, SelectError> {
    let first = tables.first().ok_or_else(|| {
        SelectError::Merge(ArrowError::InvalidArgumentError("no tables to merge".into()))
    })?;
    let schema = first.schema();

    if let Some(other) = tables.iter().find(|t| t.schema() != schema) {
        return Err(SelectError::Merge(ArrowError::SchemaError(format!(
            "cannot merge tables with columns {:?} and {:?}",
            first.column_names(),
            other.column_names()
        ))));
    }

    let combined = concat_batches(&schema, tables.iter().map(|t| t.record_batch()))
        .map_err(SelectError::Merge)?;
    let sort_idx = schema.index_of(sort_column).map_err(SelectError::Merge)?;

    let sort_values = sort_key(combined.column(sort_idx)).map_err(SelectError::Merge)?;

    // Row position as a secondary key makes the sort stable.
    let position: ArrayRef =
        Arc::new(UInt64Array::from_iter_values(0..combined.num_rows() as u64));
    let indices = lexsort_to_indices(
        &[
            SortColumn {
                values: sort_values,
                options: Some(SortOptions {
                    descending: false,
                    nulls_first: false,
                }),
            },
            SortColumn {
                values: position,
                options: None,
            },
        ],
        None,
    )
    .map_err(SelectError::Merge)?;

    let sorted = take_record_batch(&combined, &indices).map_err(SelectError::Merge)?;

    debug!(
        tables = tables.len(),
        rows = sorted.num_rows(),
        sort_column,
        "Merged tables"
    );

    SelectTable::from_record_batch(sorted)
}

/// Numeric view of a text column when every non-null value parses as a
/// number; otherwise the column unchanged.
fn sort_key(column: &ArrayRef) -> Result<ArrayRef, ArrowError> {
    let Some(strings) = column.as_string_opt::<i32>() else {
        return Ok(column.clone());
    };
    if strings.null_count() == strings.len() {
        return Ok(column.clone());
    }

    let values = || strings.iter().flatten();
    if values().all(|v| v.parse::<i64>().is_ok()) {
        cast(column, &DataType::Int64)
    } else if values().all(|v| v.parse::<f64>().is_ok()) {
        cast(column, &DataType::Float64)
    } else {
        Ok(column.clone())
    }
}
