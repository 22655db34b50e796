#![allow(clippy::module_name_repetitions)]
//! Canonical file paths inside the data directory.
//!
//! Every transform reads and writes fixed file names relative to one data
//! directory (`data/` unless overridden on the command line).

use std::path::{Path, PathBuf};

use river_runner_features::stop::{NamedSource, StopFeatureSources};

/// Default data directory, relative to the working directory.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Resolves input and output file names against a data directory.
#[derive(Debug, Clone)]
pub struct DataPaths {
    root: PathBuf,
}

impl DataPaths {
    /// Creates paths rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The data directory itself.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Simplified river lines read by the coordinate transform.
    #[must_use]
    pub fn simplified_rivers(&self) -> PathBuf {
        self.file("simplified_rivers.geojson")
    }

    /// Point table written by the coordinate transform.
    #[must_use]
    pub fn coordinate_set(&self) -> PathBuf {
        self.file("coordinate_set.csv")
    }

    /// Natural Earth marine polygons.
    #[must_use]
    pub fn marine_polygons(&self) -> PathBuf {
        self.file("ne_10m_geography_marine_polys.geojson")
    }

    /// Natural Earth lakes.
    #[must_use]
    pub fn natural_earth_lakes(&self) -> PathBuf {
        self.file("ne_10m_lakes.geojson")
    }

    /// Output of the global stop feature transform.
    #[must_use]
    pub fn global_stopping_features(&self) -> PathBuf {
        self.file("global_stopping_features.geojson")
    }

    /// Inputs of the filtered stop feature transform.
    #[must_use]
    pub fn stop_feature_sources(&self) -> StopFeatureSources {
        StopFeatureSources {
            lakes: self.file("water_bodies.geojson"),
            small_lakes: self.file("smaller_water_bodies.geojson"),
            countries: vec![
                NamedSource::new(self.file("canada_polygon.geojson"), "Canada"),
                NamedSource::new(self.file("mexico_polygon.geojson"), "Mexico"),
            ],
            ocean: self.file("ocean_area.geojson"),
            bays: vec![
                NamedSource::new(self.file("sf_bay.geojson"), "San Francisco Bay"),
                NamedSource::new(self.file("delaware_bay.geojson"), "Delaware Bay"),
            ],
        }
    }

    /// Output of the filtered stop feature transform.
    #[must_use]
    pub fn stopping_features(&self) -> PathBuf {
        self.file("stopping_features.geojson")
    }

    /// NHDPlus value-added attribute Parquet table.
    #[must_use]
    pub fn vaa_parquet(&self) -> PathBuf {
        self.file("nhdplusVAA.parquet")
    }

    /// Trimmed VAA CSV.
    #[must_use]
    pub fn vaa_csv(&self) -> PathBuf {
        self.file("comid_vaa_mapping.csv")
    }

    /// Trimmed VAA lookup keyed by comid.
    #[must_use]
    pub fn vaa_json(&self) -> PathBuf {
        self.file("comid_vaa_mapping.json")
    }
}

impl Default for DataPaths {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_fixed_names_under_the_data_dir() {
        let paths = DataPaths::default();
        assert_eq!(paths.coordinate_set(), Path::new("data/coordinate_set.csv"));
        assert_eq!(paths.vaa_json(), Path::new("data/comid_vaa_mapping.json"));
    }

    #[test]
    fn stop_feature_sources_are_in_merge_order() {
        let sources = DataPaths::new("/tmp/rr").stop_feature_sources();

        let countries: Vec<&str> = sources.countries.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(countries, ["Canada", "Mexico"]);

        let bays: Vec<&str> = sources.bays.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(bays, ["San Francisco Bay", "Delaware Bay"]);
        assert_eq!(sources.ocean, Path::new("/tmp/rr/ocean_area.geojson"));
    }
}
