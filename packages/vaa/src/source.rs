//! Loading the VAA Parquet file through `DuckDB`.

use std::path::Path;

use river_runner_vaa_models::{RawVaaRow, SOURCE_COLUMNS};

use crate::VaaError;

/// Builds the `read_parquet` query for the columns in [`SOURCE_COLUMNS`].
///
/// Numeric columns are cast to `DOUBLE` and the name to `VARCHAR` so rows
/// decode the same way whatever physical types the file uses.
fn select_query(path: &Path) -> String {
    let escaped = path.display().to_string().replace('\'', "''");

    let columns: Vec<String> = SOURCE_COLUMNS
        .iter()
        .map(|&column| {
            let sql_type = if column == "gnis_name" {
                "VARCHAR"
            } else {
                "DOUBLE"
            };
            format!("CAST({column} AS {sql_type}) AS {column}")
        })
        .collect();

    format!(
        "SELECT {} FROM read_parquet('{escaped}')",
        columns.join(", ")
    )
}

/// Reads every row of the VAA Parquet file, keeping only the trimmed
/// columns, in file order.
///
/// # Errors
///
/// Returns [`VaaError::DuckDb`] if the file is missing, lacks a required
/// column, or holds a value that cannot be cast.
pub fn load_raw_rows(
    conn: &duckdb::Connection,
    path: &Path,
) -> Result<Vec<RawVaaRow>, VaaError> {
    log::info!("Reading VAA table from {}", path.display());

    let mut stmt = conn.prepare(&select_query(path))?;
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();

    while let Some(row) = rows.next()? {
        out.push(RawVaaRow {
            comid: row.get(0)?,
            streamleve: row.get(1)?,
            levelpathi: row.get(2)?,
            pathlength: row.get(3)?,
            terminalfl: row.get(4)?,
            lengthkm: row.get(5)?,
            gnis_name: row.get(6)?,
        });
    }

    log::info!("Loaded {} VAA rows", out.len());

    Ok(out)
}
