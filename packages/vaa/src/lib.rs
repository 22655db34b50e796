#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! NHDPlus value-added attribute table trimming.
//!
//! Reads the national VAA Parquet file through an in-memory `DuckDB`
//! connection, keeps the handful of columns the frontend needs, coerces the
//! identifier columns to exact integer strings, and writes both a flat CSV
//! and a JSON object keyed by `comid` for per-flowline lookups.

pub mod output;
pub mod source;
pub mod trim;

use std::path::Path;
use std::sync::Arc;

use river_runner_progress::ProgressCallback;
use thiserror::Error;

/// Errors that can occur while trimming the VAA table.
#[derive(Debug, Error)]
pub enum VaaError {
    /// Reading or writing a file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Querying the Parquet file failed.
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    /// A value could not be coerced to an integer.
    #[error("Cannot coerce {column} value {value} in row {row} to an integer")]
    Coercion {
        /// Source column name.
        column: &'static str,
        /// Zero-based row position in the source table.
        row: usize,
        /// The offending value.
        value: String,
    },

    /// Two rows share a `comid`, so they cannot be keyed by it.
    #[error("Duplicate comid {comid}")]
    DuplicateComid {
        /// The repeated identifier.
        comid: String,
    },
}

/// Row counts produced by [`trim_vaa_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrimSummary {
    /// Rows read from the source table.
    pub rows_read: usize,
    /// Rows written to each output.
    pub rows_written: usize,
}

/// Reads the VAA Parquet file at `input`, trims it, and writes the CSV and
/// comid-keyed JSON outputs.
///
/// # Errors
///
/// Returns [`VaaError`] if the Parquet file cannot be queried, any row
/// fails integer coercion, a `comid` repeats, or an output cannot be
/// written. Nothing is written unless every row coerces.
pub fn trim_vaa_table(
    input: &Path,
    csv_output: &Path,
    json_output: &Path,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<TrimSummary, VaaError> {
    let conn = duckdb::Connection::open_in_memory()?;
    let raw = source::load_raw_rows(&conn, input)?;
    drop(conn);

    let rows_read = raw.len();
    let rows = trim::trim_rows(raw, progress)?;
    let index = output::index_by_comid(&rows)?;

    output::write_csv(csv_output, &rows)?;
    output::write_json_index(json_output, &index)?;

    Ok(TrimSummary {
        rows_read,
        rows_written: rows.len(),
    })
}
