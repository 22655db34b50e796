#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! `GeoJSON` transforms for the river runner frontend data files.
//!
//! Three independent batch transforms live here:
//!
//! - [`coordinates`] flattens simplified river line geometries into a
//!   point CSV tagged with the source feature id.
//! - [`global_stop`] merges Natural Earth marine polygons and lakes into a
//!   single ocean / inland lake stop feature collection.
//! - [`stop`] ranks NHD water bodies by area and merges them with country,
//!   ocean and bay polygons into the filtered stop feature collection.
//!
//! Every transform loads its inputs fully into memory, runs once, and
//! writes one output file. The first malformed record aborts the run.

pub mod coordinates;
pub mod global_stop;
pub mod io;
pub mod stop;

use thiserror::Error;

/// Errors that can occur while transforming feature collections.
#[derive(Debug, Error)]
pub enum FeatureError {
    /// Reading or writing a file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A feature lacks a property the transform requires.
    #[error("Feature {index} has no '{property}' property")]
    MissingProperty {
        /// Name of the missing property.
        property: &'static str,
        /// Position of the feature in its source collection.
        index: usize,
    },

    /// A property is present but has an unusable value.
    #[error("Feature {index} has an invalid '{property}' property: {message}")]
    InvalidProperty {
        /// Name of the offending property.
        property: &'static str,
        /// Position of the feature in its source collection.
        index: usize,
        /// Description of what went wrong.
        message: String,
    },

    /// A feature has a null geometry where one is required.
    #[error("Feature {index} has no geometry")]
    MissingGeometry {
        /// Position of the feature in its source collection.
        index: usize,
    },

    /// A geometry's coordinate array does not have the expected shape.
    #[error("Feature {index} has invalid coordinates: {message}")]
    InvalidCoordinates {
        /// Position of the feature in its source collection.
        index: usize,
        /// Description of what went wrong.
        message: String,
    },

    /// A source that must contribute a feature contains none.
    #[error("{label} contains no features")]
    EmptyCollection {
        /// Human-readable name of the source.
        label: String,
    },

    /// No feature in the ocean source has more than two polygons.
    #[error("Ocean source has no multi-part polygon feature")]
    NoOceanFeature,
}
