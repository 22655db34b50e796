//! Global stop feature collection built from Natural Earth polygons.
//!
//! Marine polygons and lakes are merged into one collection in which every
//! feature is either an `ocean` or an `inland lake`, decided by its
//! `featurecla` category.

use std::path::Path;

use geojson::JsonObject;
use river_runner_feature_models::{
    Feature, FeatureCollection, STOP_FEATURE_NAME, STOP_FEATURE_TYPE, STOP_FEATURE_TYPE_SPECIFIC,
    StopFeatureType,
};
use serde_json::Value;

use crate::FeatureError;
use crate::io::{read_features, write_collection};

/// Property holding the Natural Earth feature category.
pub const CATEGORY_PROPERTY: &str = "featurecla";

/// Property holding the Natural Earth feature name.
pub const NAME_PROPERTY: &str = "name";

/// Lower-cased `featurecla` values that classify as [`StopFeatureType::Ocean`].
pub const OCEAN_CATEGORIES: &[&str] = &[
    "strait", "gulf", "river", "inlet", "sound", "lagoon", "ocean", "sea", "bay", "fjord",
    "generic", "channel", "reef",
];

/// Classifies a lower-cased `featurecla` value.
#[must_use]
pub fn classify(category: &str) -> StopFeatureType {
    if OCEAN_CATEGORIES.contains(&category) {
        StopFeatureType::Ocean
    } else {
        StopFeatureType::InlandLake
    }
}

/// Relabels a `Polygon` whose coordinates are nested like a
/// `MultiPolygon` (`coordinates[0][0][0]` is itself an array).
///
/// Only the type is changed; the coordinates are left as they are.
///
/// # Errors
///
/// Returns [`FeatureError`] if the geometry is null or its coordinates are
/// not nested three levels deep.
fn normalize_polygon_type(feature: &mut Feature, index: usize) -> Result<(), FeatureError> {
    let geometry = feature
        .geometry
        .as_mut()
        .ok_or(FeatureError::MissingGeometry { index })?;

    let first = geometry
        .first_third_level_element()
        .ok_or_else(|| FeatureError::InvalidCoordinates {
            index,
            message: "coordinates are not nested three levels deep".to_string(),
        })?;

    if first.is_array() {
        geometry.kind = "MultiPolygon".to_string();
    }

    Ok(())
}

/// Converts a Natural Earth feature into a global stop feature whose
/// properties are exactly type, specific category and name.
///
/// # Errors
///
/// Returns [`FeatureError`] if `featurecla` or `name` is missing, or the
/// geometry cannot be normalized.
pub fn to_global_stop_feature(mut feature: Feature, index: usize) -> Result<Feature, FeatureError> {
    let category = feature
        .property(CATEGORY_PROPERTY)
        .ok_or(FeatureError::MissingProperty {
            property: CATEGORY_PROPERTY,
            index,
        })?
        .as_str()
        .ok_or_else(|| FeatureError::InvalidProperty {
            property: CATEGORY_PROPERTY,
            index,
            message: "expected a string".to_string(),
        })?
        .to_lowercase();

    let name = feature
        .property(NAME_PROPERTY)
        .cloned()
        .ok_or(FeatureError::MissingProperty {
            property: NAME_PROPERTY,
            index,
        })?;

    normalize_polygon_type(&mut feature, index)?;

    let mut properties = JsonObject::new();
    properties.insert(
        STOP_FEATURE_TYPE.to_string(),
        Value::String(classify(&category).to_string()),
    );
    properties.insert(
        STOP_FEATURE_TYPE_SPECIFIC.to_string(),
        Value::String(category),
    );
    properties.insert(STOP_FEATURE_NAME.to_string(), name);

    Ok(Feature::new(feature.geometry, properties))
}

/// Converts seas then lakes into one global stop feature collection,
/// preserving input order.
///
/// # Errors
///
/// Returns [`FeatureError`] for the first feature that cannot be converted.
/// Indexes in errors count across both inputs.
pub fn build_global_stop_features(
    seas: Vec<Feature>,
    lakes: Vec<Feature>,
) -> Result<FeatureCollection, FeatureError> {
    let features = seas
        .into_iter()
        .chain(lakes)
        .enumerate()
        .map(|(index, feature)| to_global_stop_feature(feature, index))
        .collect::<Result<Vec<_>, _>>()?;

    let oceans = features
        .iter()
        .filter(|f| {
            f.property(STOP_FEATURE_TYPE).and_then(Value::as_str)
                == Some(StopFeatureType::Ocean.as_ref())
        })
        .count();
    log::info!(
        "Classified {oceans} ocean and {} inland lake features",
        features.len() - oceans
    );

    Ok(FeatureCollection::new(features))
}

/// Reads the marine polygon and lake files, builds the global stop
/// feature collection, and writes it. Returns the number of features.
///
/// # Errors
///
/// Returns [`FeatureError`] if an input cannot be read, a feature is
/// malformed, or the output cannot be written.
pub fn write_global_stop_features(
    marine_path: &Path,
    lakes_path: &Path,
    output: &Path,
) -> Result<usize, FeatureError> {
    let seas = read_features(marine_path)?;
    let lakes = read_features(lakes_path)?;
    log::info!("Loaded {} marine and {} lake features", seas.len(), lakes.len());

    let collection = build_global_stop_features(seas, lakes)?;
    write_collection(output, &collection)?;

    Ok(collection.len())
}
