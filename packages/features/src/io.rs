//! Reading and writing `GeoJSON` feature collection files.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write as _};
use std::path::Path;

use river_runner_feature_models::{Feature, FeatureCollection};

use crate::FeatureError;

/// Loads an entire feature collection file into memory.
///
/// # Errors
///
/// Returns [`FeatureError`] if the file cannot be opened or is not a
/// `GeoJSON` feature collection.
pub fn read_collection(path: &Path) -> Result<FeatureCollection, FeatureError> {
    let reader = BufReader::new(File::open(path)?);
    let collection: FeatureCollection = serde_json::from_reader(reader)?;

    log::debug!(
        "Read {} features from {}",
        collection.len(),
        path.display()
    );

    Ok(collection)
}

/// Loads only the features of a collection file.
///
/// # Errors
///
/// Returns [`FeatureError`] if the file cannot be read or parsed.
pub fn read_features(path: &Path) -> Result<Vec<Feature>, FeatureError> {
    read_collection(path).map(|collection| collection.features)
}

/// Writes a feature collection as compact `GeoJSON`, creating the parent
/// directory if needed.
///
/// # Errors
///
/// Returns [`FeatureError`] if the file cannot be created or written.
pub fn write_collection(path: &Path, collection: &FeatureCollection) -> Result<(), FeatureError> {
    create_parent_dir(path)?;

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, collection)?;
    writer.flush()?;

    log::info!(
        "Wrote {} features to {}",
        collection.len(),
        path.display()
    );

    Ok(())
}

/// Creates the directory that will hold `path`, if it has one.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub fn create_parent_dir(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            std::fs::create_dir_all(parent)
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn writes_and_reads_back_a_collection() {
        let dir = std::env::temp_dir().join(format!(
            "river_runner_features_io_{}",
            std::process::id()
        ));
        let path = dir.join("nested").join("out.geojson");

        let collection: FeatureCollection = serde_json::from_value(json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "geometry": null, "properties": {"NAME": "Tahoe"}}
            ]
        }))
        .unwrap();

        write_collection(&path, &collection).unwrap();
        let features = read_features(&path).unwrap();

        assert_eq!(features.len(), 1);
        assert_eq!(features[0].property("NAME"), Some(&json!("Tahoe")));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn rejects_non_collection_input() {
        let path = std::env::temp_dir().join(format!(
            "river_runner_features_bad_{}.geojson",
            std::process::id()
        ));
        std::fs::write(&path, r#"{"type": "Feature"}"#).unwrap();

        let result = read_collection(&path);
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(FeatureError::Json(_))));
    }
}
