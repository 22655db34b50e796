//! Flattens simplified river line geometries into a point table.
//!
//! Every vertex of every river `LineString` becomes one CSV row of
//! `lat,lng,feature_id`, rounded to five decimal places (about one metre),
//! so the frontend can snap a clicked point to the nearest river.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use river_runner_progress::ProgressCallback;
use serde::Serialize;
use serde_json::Value;

use crate::FeatureError;
use crate::io::create_parent_dir;

/// Property holding the river feature identifier.
pub const FEATURE_ID_PROPERTY: &str = "OBJECTID";

/// Decimal places kept for every coordinate.
pub const COORDINATE_PRECISION: usize = 5;

/// One vertex of a river line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoordinateRow {
    /// Latitude, rounded to [`COORDINATE_PRECISION`] places.
    pub lat: f64,
    /// Longitude, rounded to [`COORDINATE_PRECISION`] places.
    pub lng: f64,
    /// Identifier of the river feature this vertex belongs to.
    pub feature_id: String,
}

/// Rounds a coordinate to [`COORDINATE_PRECISION`] decimal places.
///
/// Rounds the exact binary value, with exact ties going to the even digit.
/// `56.955605` is stored just below the tie and becomes `56.9556`.
#[must_use]
pub fn round_coordinate(value: f64) -> f64 {
    format!("{value:.prec$}", prec = COORDINATE_PRECISION)
        .parse()
        .unwrap_or(value)
}

/// Renders a feature id property as CSV text. Numbers keep their JSON
/// spelling so integer ids stay integers.
fn feature_id_text(value: &Value, index: usize) -> Result<String, FeatureError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(FeatureError::InvalidProperty {
            property: FEATURE_ID_PROPERTY,
            index,
            message: format!("expected a string or number, got {other}"),
        }),
    }
}

/// Converts every vertex of every non-null geometry into a
/// [`CoordinateRow`], in feature order then vertex order.
///
/// Features with a null geometry are skipped.
///
/// # Errors
///
/// Returns [`FeatureError`] if a geometry is not a `LineString`, a position
/// has fewer than two values, or a feature with geometry has no
/// [`FEATURE_ID_PROPERTY`].
pub fn extract_coordinates(
    features: &[geojson::Feature],
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Vec<CoordinateRow>, FeatureError> {
    progress.set_total(features.len() as u64);

    let mut rows = Vec::new();
    let mut skipped = 0usize;

    for (index, feature) in features.iter().enumerate() {
        progress.inc(1);

        let Some(geometry) = &feature.geometry else {
            skipped += 1;
            continue;
        };

        let geojson::Value::LineString(positions) = &geometry.value else {
            return Err(FeatureError::InvalidCoordinates {
                index,
                message: format!(
                    "expected a LineString, got {}",
                    geometry.value.type_name()
                ),
            });
        };

        let id = feature
            .property(FEATURE_ID_PROPERTY)
            .ok_or(FeatureError::MissingProperty {
                property: FEATURE_ID_PROPERTY,
                index,
            })?;
        let feature_id = feature_id_text(id, index)?;

        for position in positions {
            let [lng, lat, ..] = position.as_slice() else {
                return Err(FeatureError::InvalidCoordinates {
                    index,
                    message: format!("position has {} values", position.len()),
                });
            };

            rows.push(CoordinateRow {
                lat: round_coordinate(*lat),
                lng: round_coordinate(*lng),
                feature_id: feature_id.clone(),
            });
        }
    }

    if skipped > 0 {
        log::debug!("Skipped {skipped} river features with null geometry");
    }

    progress.finish(format!("Extracted {} coordinates", rows.len()));

    Ok(rows)
}

/// Writes coordinate rows as CSV with a `lat,lng,feature_id` header.
///
/// # Errors
///
/// Returns [`FeatureError`] if the file cannot be created or written.
pub fn write_coordinate_csv(path: &Path, rows: &[CoordinateRow]) -> Result<(), FeatureError> {
    create_parent_dir(path)?;

    let mut writer = csv::Writer::from_path(path)?;
    if rows.is_empty() {
        writer.write_record(["lat", "lng", "feature_id"])?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    log::info!("Wrote {} coordinates to {}", rows.len(), path.display());

    Ok(())
}

/// Reads the simplified rivers collection, extracts every vertex, and
/// writes the coordinate CSV. Returns the number of rows written.
///
/// # Errors
///
/// Returns [`FeatureError`] if the input cannot be parsed as `GeoJSON`,
/// any feature is malformed, or the output cannot be written.
pub fn build_coordinate_set(
    input: &Path,
    output: &Path,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<usize, FeatureError> {
    log::info!("Reading rivers from {}", input.display());

    let reader = BufReader::new(File::open(input)?);
    let collection: geojson::FeatureCollection = serde_json::from_reader(reader)?;

    let rows = extract_coordinates(&collection.features, progress)?;
    write_coordinate_csv(output, &rows)?;

    Ok(rows.len())
}
