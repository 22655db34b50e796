//! Filtered stop feature collection for the contiguous United States.
//!
//! Combines the largest named NHD water bodies with a pre-simplified set
//! of smaller ones, the Canada and Mexico boundaries, the ocean polygon and
//! (in the full variant) hand-drawn bay polygons.
//!
//! Only the [`MAX_RANKED_LAKES`] largest lakes are kept. Some small lakes
//! that really are stopping features get dropped; that keeps the output
//! file small enough to ship to the browser.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use river_runner_feature_models::{Feature, FeatureCollection, StopFeatureType};
use river_runner_progress::ProgressCallback;
use serde_json::Value;
use strum_macros::{AsRefStr, Display, EnumString};

use crate::FeatureError;
use crate::io::{read_features, write_collection};

/// Maximum number of area-ranked lakes in the output.
pub const MAX_RANKED_LAKES: usize = 4000;

/// Property holding a water body's area in square kilometres.
pub const AREA_PROPERTY: &str = "SQKM";

/// Property holding a water body's name.
pub const NAME_PROPERTY: &str = "NAME";

/// Property holding a water body's NHD feature type.
pub const FEATURE_TYPE_PROPERTY: &str = "FTYPE";

/// Bulky NHD attributes removed from every lake before output.
pub const STRIPPED_PROPERTIES: &[&str] = &["FCODE_DESC", "FCODE", "SQMI"];

/// Which flavour of the filtered stop feature file to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum StopFeatureVariant {
    /// Canals, lakes and reservoirs, plus the curated bays.
    #[default]
    Full,
    /// Lakes and ponds only, without bays.
    LakesOnly,
}

impl StopFeatureVariant {
    /// NHD `FTYPE` values eligible for ranking.
    #[must_use]
    pub const fn allowed_feature_types(self) -> &'static [&'static str] {
        match self {
            Self::Full => &["Canal/Ditch", "Lake/Pond", "Reservoir"],
            Self::LakesOnly => &["Lake/Pond"],
        }
    }

    /// Whether the curated bay polygons are part of the output.
    #[must_use]
    pub const fn includes_bays(self) -> bool {
        matches!(self, Self::Full)
    }
}

/// A single-feature source file and the stop feature name it receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedSource {
    /// Path to the `GeoJSON` file. Only its first feature is used.
    pub path: PathBuf,
    /// Value written to `stop_feature_name`.
    pub name: String,
}

impl NamedSource {
    /// Creates a named source.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, name: &str) -> Self {
        Self {
            path: path.into(),
            name: name.to_string(),
        }
    }
}

/// Input files for [`build_stop_features`].
#[derive(Debug, Clone)]
pub struct StopFeatureSources {
    /// Full NHD water body collection to rank by area.
    pub lakes: PathBuf,
    /// Pre-filtered, simplified smaller water bodies appended unranked.
    pub small_lakes: PathBuf,
    /// Country boundaries, in output order.
    pub countries: Vec<NamedSource>,
    /// Ocean area collection; the first multi-part polygon is used.
    pub ocean: PathBuf,
    /// Curated bay polygons, in output order.
    pub bays: Vec<NamedSource>,
}

fn area_of(feature: &Feature, index: usize) -> Result<f64, FeatureError> {
    feature
        .property(AREA_PROPERTY)
        .ok_or(FeatureError::MissingProperty {
            property: AREA_PROPERTY,
            index,
        })?
        .as_f64()
        .ok_or_else(|| FeatureError::InvalidProperty {
            property: AREA_PROPERTY,
            index,
            message: "expected a number".to_string(),
        })
}

fn required_property<'a>(
    feature: &'a Feature,
    property: &'static str,
    index: usize,
) -> Result<&'a Value, FeatureError> {
    feature
        .property(property)
        .ok_or(FeatureError::MissingProperty { property, index })
}

/// Ranks lakes by area and keeps the [`MAX_RANKED_LAKES`] largest that have
/// a non-empty name, an allowed feature type and a geometry.
///
/// The sort is stable, so lakes of equal area keep their input order. The
/// filters run after sorting and the cap after filtering.
///
/// # Errors
///
/// Returns [`FeatureError`] if any lake lacks a numeric area, or a lake
/// reached by the filters lacks a name or feature type.
pub fn rank_lakes(
    lakes: Vec<Feature>,
    allowed_feature_types: &[&str],
) -> Result<Vec<Feature>, FeatureError> {
    let mut ranked = lakes
        .into_iter()
        .enumerate()
        .map(|(index, feature)| Ok((index, area_of(&feature, index)?, feature)))
        .collect::<Result<Vec<_>, FeatureError>>()?;

    ranked.sort_by(|(_, a, _), (_, b, _)| b.total_cmp(a));

    let mut kept = Vec::new();
    for (index, _, feature) in ranked {
        let name = required_property(&feature, NAME_PROPERTY, index)?;
        if name.as_str() == Some("") {
            continue;
        }

        let feature_type = required_property(&feature, FEATURE_TYPE_PROPERTY, index)?;
        let allowed = feature_type
            .as_str()
            .is_some_and(|t| allowed_feature_types.contains(&t));
        if !allowed || !feature.has_geometry() {
            continue;
        }

        kept.push(feature);
    }

    kept.truncate(MAX_RANKED_LAKES);
    Ok(kept)
}

/// Strips [`STRIPPED_PROPERTIES`] and tags the lake as an inland lake
/// named after its `NAME`.
///
/// # Errors
///
/// Returns [`FeatureError`] if a stripped property or the name is missing.
pub fn relabel_lake(feature: &mut Feature, index: usize) -> Result<(), FeatureError> {
    for &property in STRIPPED_PROPERTIES {
        feature
            .properties
            .shift_remove(property)
            .ok_or(FeatureError::MissingProperty { property, index })?;
    }

    let name = required_property(feature, NAME_PROPERTY, index)?.clone();
    feature.label_stop_feature(StopFeatureType::InlandLake, name);

    Ok(())
}

/// Returns the first feature whose coordinate array has more than two
/// top-level elements.
///
/// # Errors
///
/// Returns [`FeatureError`] if a feature before the match has a null
/// geometry, or no feature matches.
pub fn select_ocean_feature(features: Vec<Feature>) -> Result<Feature, FeatureError> {
    for (index, feature) in features.into_iter().enumerate() {
        let geometry = feature
            .geometry
            .as_ref()
            .ok_or(FeatureError::MissingGeometry { index })?;

        if geometry.top_level_len() > 2 {
            return Ok(feature);
        }
    }

    Err(FeatureError::NoOceanFeature)
}

fn first_feature(path: &Path) -> Result<Feature, FeatureError> {
    read_features(path)?
        .into_iter()
        .next()
        .ok_or_else(|| FeatureError::EmptyCollection {
            label: path.display().to_string(),
        })
}

fn load_named(
    sources: &[NamedSource],
    stop_type: StopFeatureType,
) -> Result<Vec<Feature>, FeatureError> {
    sources
        .iter()
        .map(|source| {
            let mut feature = first_feature(&source.path)?;
            feature.label_stop_feature(stop_type, Value::String(source.name.clone()));
            Ok(feature)
        })
        .collect()
}

/// Concatenates the parts of the stop feature file in output order:
/// countries, ocean, bays, lakes.
#[must_use]
pub fn assemble_stop_features(
    countries: Vec<Feature>,
    ocean: Feature,
    bays: Vec<Feature>,
    lakes: Vec<Feature>,
) -> FeatureCollection {
    let mut features = Vec::with_capacity(countries.len() + 1 + bays.len() + lakes.len());
    features.extend(countries);
    features.push(ocean);
    features.extend(bays);
    features.extend(lakes);
    FeatureCollection::new(features)
}

/// Loads every source and builds the filtered stop feature collection.
///
/// # Errors
///
/// Returns [`FeatureError`] if a source cannot be read, a single-feature
/// source is empty, no ocean polygon is found, or a lake is malformed.
pub fn build_stop_features(
    sources: &StopFeatureSources,
    variant: StopFeatureVariant,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<FeatureCollection, FeatureError> {
    let all_lakes = read_features(&sources.lakes)?;
    let total_lakes = all_lakes.len();
    let mut lakes = rank_lakes(all_lakes, variant.allowed_feature_types())?;
    log::info!(
        "Kept {} of {total_lakes} water bodies after ranking ({variant} variant)",
        lakes.len()
    );

    let ranked_count = lakes.len();
    lakes.extend(
        read_features(&sources.small_lakes)?
            .into_iter()
            .filter(Feature::has_geometry),
    );
    log::info!("Appended {} smaller water bodies", lakes.len() - ranked_count);

    progress.set_total(lakes.len() as u64);
    for (index, lake) in lakes.iter_mut().enumerate() {
        relabel_lake(lake, index)?;
        progress.inc(1);
    }
    progress.finish(format!("Relabeled {} lakes", lakes.len()));

    let countries = load_named(&sources.countries, StopFeatureType::Country)?;

    let mut ocean = select_ocean_feature(read_features(&sources.ocean)?)?;
    ocean.label_stop_feature(StopFeatureType::Ocean, Value::String("Ocean".to_string()));

    let bays = if variant.includes_bays() {
        load_named(&sources.bays, StopFeatureType::Ocean)?
    } else {
        Vec::new()
    };
    log::debug!("Loaded {} countries and {} bays", countries.len(), bays.len());

    Ok(assemble_stop_features(countries, ocean, bays, lakes))
}

/// Builds the filtered stop feature collection and writes it to `output`.
/// Returns the number of features written.
///
/// # Errors
///
/// Returns [`FeatureError`] if building fails or the output cannot be
/// written.
pub fn write_stop_features(
    sources: &StopFeatureSources,
    variant: StopFeatureVariant,
    output: &Path,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<usize, FeatureError> {
    let collection = build_stop_features(sources, variant, progress)?;
    write_collection(output, &collection)?;
    Ok(collection.len())
}

#[cfg(test)]
mod tests {
    use river_runner_feature_models::{STOP_FEATURE_NAME, STOP_FEATURE_TYPE};
    use river_runner_progress::null_progress;
    use serde_json::json;

    use super::*;

    fn lake(name: &str, ftype: &str, area: f64) -> Feature {
        serde_json::from_value(json!({
            "type": "Feature",
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]
            },
            "properties": {
                "NAME": name,
                "FTYPE": ftype,
                "FCODE": 39004,
                "FCODE_DESC": "Lake/Pond: Hydrographic Category = Perennial",
                "SQKM": area,
                "SQMI": area * 0.386
            }
        }))
        .unwrap()
    }

    fn names(features: &[Feature]) -> Vec<&str> {
        features
            .iter()
            .filter_map(|f| f.property(NAME_PROPERTY).and_then(Value::as_str))
            .collect()
    }

    fn polygon_with_parts(parts: usize) -> Feature {
        let part = json!([[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]);
        let coordinates = vec![part; parts];
        serde_json::from_value(json!({
            "type": "Feature",
            "geometry": {"type": "MultiPolygon", "coordinates": coordinates},
            "properties": {"parts": parts}
        }))
        .unwrap()
    }

    #[test]
    fn ranks_by_area_descending_with_stable_ties() {
        let lakes = vec![
            lake("Small", "Lake/Pond", 1.0),
            lake("First Tie", "Lake/Pond", 5.0),
            lake("Huge", "Reservoir", 50.0),
            lake("Second Tie", "Lake/Pond", 5.0),
        ];

        let ranked = rank_lakes(lakes, StopFeatureVariant::Full.allowed_feature_types()).unwrap();
        assert_eq!(names(&ranked), ["Huge", "First Tie", "Second Tie", "Small"]);
    }

    #[test]
    fn filters_empty_names_disallowed_types_and_null_geometry() {
        let mut no_geometry = lake("Ghost", "Lake/Pond", 9.0);
        no_geometry.geometry = None;

        let lakes = vec![
            lake("", "Lake/Pond", 100.0),
            lake("Swamp", "Swamp/Marsh", 80.0),
            lake("Ditch", "Canal/Ditch", 70.0),
            no_geometry,
            lake("Pond", "Lake/Pond", 2.0),
        ];

        let full = rank_lakes(lakes.clone(), StopFeatureVariant::Full.allowed_feature_types())
            .unwrap();
        assert_eq!(names(&full), ["Ditch", "Pond"]);

        let lakes_only =
            rank_lakes(lakes, StopFeatureVariant::LakesOnly.allowed_feature_types()).unwrap();
        assert_eq!(names(&lakes_only), ["Pond"]);
    }

    #[test]
    fn caps_ranked_lakes() {
        #[allow(clippy::cast_precision_loss)]
        let lakes: Vec<Feature> = (0..MAX_RANKED_LAKES + 25)
            .map(|i| lake(&format!("Lake {i}"), "Lake/Pond", i as f64))
            .collect();

        let ranked = rank_lakes(lakes, StopFeatureVariant::Full.allowed_feature_types()).unwrap();
        assert_eq!(ranked.len(), MAX_RANKED_LAKES);
        assert_eq!(names(&ranked[..1]), [format!("Lake {}", MAX_RANKED_LAKES + 24)]);
    }

    #[test]
    fn non_numeric_area_is_fatal() {
        let mut bad = lake("Odd", "Lake/Pond", 1.0);
        bad.properties.insert(AREA_PROPERTY.to_string(), json!("big"));

        let err = rank_lakes(vec![lake("Fine", "Lake/Pond", 2.0), bad], &["Lake/Pond"])
            .unwrap_err();
        assert!(matches!(
            err,
            FeatureError::InvalidProperty { property: "SQKM", index: 1, .. }
        ));
    }

    #[test]
    fn relabel_strips_bulky_fields() {
        let mut feature = lake("Tahoe", "Lake/Pond", 490.0);
        relabel_lake(&mut feature, 0).unwrap();

        for property in STRIPPED_PROPERTIES {
            assert!(feature.property(property).is_none());
        }
        assert_eq!(feature.property(STOP_FEATURE_TYPE), Some(&json!("inland lake")));
        assert_eq!(feature.property(STOP_FEATURE_NAME), Some(&json!("Tahoe")));
        assert_eq!(feature.property(FEATURE_TYPE_PROPERTY), Some(&json!("Lake/Pond")));
    }

    #[test]
    fn relabel_requires_stripped_fields() {
        let mut feature = lake("Tahoe", "Lake/Pond", 490.0);
        feature.properties.shift_remove("SQMI");

        let err = relabel_lake(&mut feature, 3).unwrap_err();
        assert!(matches!(
            err,
            FeatureError::MissingProperty { property: "SQMI", index: 3 }
        ));
    }

    #[test]
    fn selects_first_polygon_with_more_than_two_parts() {
        let features = vec![
            polygon_with_parts(1),
            polygon_with_parts(2),
            polygon_with_parts(3),
            polygon_with_parts(5),
        ];

        let ocean = select_ocean_feature(features).unwrap();
        assert_eq!(ocean.property("parts"), Some(&json!(3)));

        assert!(matches!(
            select_ocean_feature(vec![polygon_with_parts(2)]),
            Err(FeatureError::NoOceanFeature)
        ));
    }

    #[test]
    fn assembles_in_output_order() {
        let mut country = polygon_with_parts(1);
        country.label_stop_feature(StopFeatureType::Country, json!("Canada"));
        let mut ocean = polygon_with_parts(3);
        ocean.label_stop_feature(StopFeatureType::Ocean, json!("Ocean"));
        let mut bay = polygon_with_parts(1);
        bay.label_stop_feature(StopFeatureType::Ocean, json!("Delaware Bay"));
        let mut tahoe = lake("Tahoe", "Lake/Pond", 490.0);
        relabel_lake(&mut tahoe, 0).unwrap();

        let collection = assemble_stop_features(vec![country], ocean, vec![bay], vec![tahoe]);
        let stop_names: Vec<&str> = collection
            .features
            .iter()
            .filter_map(|f| f.property(STOP_FEATURE_NAME).and_then(Value::as_str))
            .collect();

        assert_eq!(stop_names, ["Canada", "Ocean", "Delaware Bay", "Tahoe"]);
    }

    #[test]
    fn builds_from_files() {
        let dir = std::env::temp_dir().join(format!("river_runner_stop_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let write = |name: &str, features: Vec<Feature>| {
            let path = dir.join(name);
            write_collection(&path, &FeatureCollection::new(features)).unwrap();
            path
        };

        let mut small_without_geometry = lake("Gone", "Lake/Pond", 0.1);
        small_without_geometry.geometry = None;

        let sources = StopFeatureSources {
            lakes: write(
                "water_bodies.geojson",
                vec![lake("Erie", "Lake/Pond", 25_000.0), lake("Mead", "Reservoir", 640.0)],
            ),
            small_lakes: write(
                "smaller_water_bodies.geojson",
                vec![lake("Tiny", "Lake/Pond", 0.2), small_without_geometry],
            ),
            countries: vec![
                NamedSource::new(write("canada.geojson", vec![polygon_with_parts(1)]), "Canada"),
                NamedSource::new(write("mexico.geojson", vec![polygon_with_parts(1)]), "Mexico"),
            ],
            ocean: write(
                "ocean.geojson",
                vec![polygon_with_parts(1), polygon_with_parts(4)],
            ),
            bays: vec![NamedSource::new(
                write("sf_bay.geojson", vec![polygon_with_parts(1)]),
                "San Francisco Bay",
            )],
        };

        let stop_names = |collection: &FeatureCollection| -> Vec<String> {
            collection
                .features
                .iter()
                .filter_map(|f| f.property(STOP_FEATURE_NAME).and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        };

        let full = build_stop_features(&sources, StopFeatureVariant::Full, &null_progress())
            .unwrap();
        assert_eq!(
            stop_names(&full),
            ["Canada", "Mexico", "Ocean", "San Francisco Bay", "Erie", "Mead", "Tiny"]
        );

        let lakes_only =
            build_stop_features(&sources, StopFeatureVariant::LakesOnly, &null_progress())
                .unwrap();
        assert_eq!(
            stop_names(&lakes_only),
            ["Canada", "Mexico", "Ocean", "Erie", "Tiny"]
        );

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn parses_variant_names() {
        assert_eq!(
            "lakes-only".parse::<StopFeatureVariant>().unwrap(),
            StopFeatureVariant::LakesOnly
        );
        assert_eq!(StopFeatureVariant::Full.to_string(), "full");
    }
}
