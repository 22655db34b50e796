#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! `GeoJSON` feature types used by the stop feature and coordinate
//! transforms.
//!
//! Geometry coordinates are kept as raw JSON rather than parsed into typed
//! positions. Several source datasets declare `Polygon` geometries whose
//! coordinates are nested like a `MultiPolygon`; a typed parser would reject
//! them before they can be relabeled.

use geojson::JsonObject;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::{AsRefStr, Display, EnumString};

/// Property key holding the [`StopFeatureType`] of a stop feature.
pub const STOP_FEATURE_TYPE: &str = "stop_feature_type";

/// Property key holding the lower-cased source category of a stop feature.
pub const STOP_FEATURE_TYPE_SPECIFIC: &str = "stop_feature_type_specific";

/// Property key holding the display name of a stop feature.
pub const STOP_FEATURE_NAME: &str = "stop_feature_name";

/// Classification of a stopping feature.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum StopFeatureType {
    /// Any marine body: oceans, seas, bays, straits, reefs.
    #[serde(rename = "ocean")]
    #[strum(serialize = "ocean")]
    Ocean,
    /// Lakes, ponds, reservoirs and canals.
    #[serde(rename = "inland lake")]
    #[strum(serialize = "inland lake")]
    InlandLake,
    /// A national boundary.
    #[serde(rename = "country")]
    #[strum(serialize = "country")]
    Country,
}

/// A `GeoJSON` geometry with untyped coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// Declared geometry type (`LineString`, `Polygon`, `MultiPolygon`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Raw coordinate array. `Null` for geometry collections.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub coordinates: Value,
    /// Any other members (`geometries`, `bbox`, ...), passed through.
    #[serde(flatten)]
    pub foreign_members: JsonObject,
}

impl Geometry {
    /// Returns the element at `coordinates[0][0][0]`, if the coordinate
    /// array is nested at least three levels deep along its first elements.
    #[must_use]
    pub fn first_third_level_element(&self) -> Option<&Value> {
        self.coordinates.get(0)?.get(0)?.get(0)
    }

    /// Number of top-level elements in the coordinate array (rings for a
    /// `Polygon`, polygons for a `MultiPolygon`). Zero when the coordinates
    /// are not an array.
    #[must_use]
    pub fn top_level_len(&self) -> usize {
        self.coordinates.as_array().map_or(0, Vec::len)
    }
}

/// A single `GeoJSON` feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Always `"Feature"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Feature geometry. `None` when the source has `"geometry": null`.
    #[serde(default)]
    pub geometry: Option<Geometry>,
    /// Feature attributes.
    #[serde(default)]
    pub properties: JsonObject,
    /// Any other members (`id`, `bbox`, ...), passed through.
    #[serde(flatten)]
    pub foreign_members: JsonObject,
}

impl Feature {
    /// Creates a feature with the given geometry and properties.
    #[must_use]
    pub fn new(geometry: Option<Geometry>, properties: JsonObject) -> Self {
        Self {
            kind: "Feature".to_string(),
            geometry,
            properties,
            foreign_members: JsonObject::new(),
        }
    }

    /// Looks up a property by key.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Returns `true` if the feature carries a non-null geometry.
    #[must_use]
    pub const fn has_geometry(&self) -> bool {
        self.geometry.is_some()
    }

    /// Tags the feature as a stopping feature, keeping its other
    /// properties.
    pub fn label_stop_feature(&mut self, stop_type: StopFeatureType, name: Value) {
        self.properties.insert(
            STOP_FEATURE_TYPE.to_string(),
            Value::String(stop_type.to_string()),
        );
        self.properties.insert(STOP_FEATURE_NAME.to_string(), name);
    }
}

/// An ordered collection of [`Feature`]s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    /// Always `"FeatureCollection"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Features in source order.
    pub features: Vec<Feature>,
    /// Any other members (`name`, `crs`, ...), passed through.
    #[serde(flatten)]
    pub foreign_members: JsonObject,
}

impl FeatureCollection {
    /// Creates a collection from features, without foreign members.
    #[must_use]
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            kind: "FeatureCollection".to_string(),
            features,
            foreign_members: JsonObject::new(),
        }
    }

    /// Number of features in the collection.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Returns `true` if the collection holds no features.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
