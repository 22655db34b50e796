//! Writers for the trimmed VAA table.

use std::fs::File;
use std::io::{BufWriter, Write as _};
use std::path::Path;

use river_runner_vaa_models::VaaRow;
use serde_json::{Map, Value};

use crate::VaaError;

/// Column header of the trimmed CSV, in field order.
pub const OUTPUT_COLUMNS: &[&str] = &[
    "comid",
    "streamlvl",
    "levelpathid",
    "pathlength",
    "terminalfl",
    "lengthkm",
    "gnis_name",
];

fn create_parent_dir(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            std::fs::create_dir_all(parent)
        }
        _ => Ok(()),
    }
}

/// Builds the `comid -> row` lookup object, in row order.
///
/// # Errors
///
/// Returns [`VaaError::DuplicateComid`] if two rows share a `comid`.
pub fn index_by_comid(rows: &[VaaRow]) -> Result<Map<String, Value>, VaaError> {
    let mut index = Map::new();

    for row in rows {
        let value = serde_json::to_value(row)?;
        if index.insert(row.comid.clone(), value).is_some() {
            return Err(VaaError::DuplicateComid {
                comid: row.comid.clone(),
            });
        }
    }

    Ok(index)
}

/// Writes the trimmed rows as CSV with a header.
///
/// # Errors
///
/// Returns [`VaaError`] if the file cannot be created or written.
pub fn write_csv(path: &Path, rows: &[VaaRow]) -> Result<(), VaaError> {
    create_parent_dir(path)?;

    let mut writer = csv::Writer::from_path(path)?;
    if rows.is_empty() {
        writer.write_record(OUTPUT_COLUMNS)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    log::info!("Wrote {} VAA rows to {}", rows.len(), path.display());

    Ok(())
}

/// Writes the `comid`-keyed lookup object as compact JSON.
///
/// # Errors
///
/// Returns [`VaaError`] if the file cannot be created or written.
pub fn write_json_index(path: &Path, index: &Map<String, Value>) -> Result<(), VaaError> {
    create_parent_dir(path)?;

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, index)?;
    writer.flush()?;

    log::info!("Wrote {} comid entries to {}", index.len(), path.display());

    Ok(())
}
