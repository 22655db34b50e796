#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command line entry point for the river runner data preparation
//! transforms.
//!
//! Each subcommand is one run-once transform that reads static files from
//! the data directory and writes its output next to them. Transforms share
//! nothing but the filesystem; `all` simply runs them back to back and
//! stops at the first failure.
//!
//! Uses `indicatif-log-bridge` (via [`river_runner_cli_utils::init_logger`])
//! so log lines and progress bars never fight for the terminal.

mod paths;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use river_runner_cli_utils::{IndicatifProgress, MultiProgress};
use river_runner_features::stop::StopFeatureVariant;
use river_runner_features::{coordinates, global_stop, stop};
use river_runner_progress::ProgressCallback as _;

use crate::paths::{DEFAULT_DATA_DIR, DataPaths};

#[derive(Parser)]
#[command(name = "river_runner", about = "River runner data preparation")]
struct Cli {
    /// Directory holding the source datasets and receiving the outputs
    #[arg(long, global = true, default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Flatten river line geometries into a point CSV
    Coordinates,
    /// Build the global ocean/lake stop feature `GeoJSON`
    GlobalStopFeatures,
    /// Build the filtered stop feature `GeoJSON`
    StopFeatures {
        /// Which lake types and extra polygons to include (`full` or `lakes-only`)
        #[arg(long, default_value_t = StopFeatureVariant::Full)]
        variant: StopFeatureVariant,
    },
    /// Trim the `NHDPlus` VAA table to CSV and comid-keyed JSON
    Vaa,
    /// Run every transform in sequence
    All,
}

fn run_coordinates(
    paths: &DataPaths,
    multi: &MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    let progress = IndicatifProgress::records_bar(multi, "Extracting river coordinates");
    let count = coordinates::build_coordinate_set(
        &paths.simplified_rivers(),
        &paths.coordinate_set(),
        &progress,
    )?;
    log::info!("Coordinate set complete: {count} points");
    Ok(())
}

fn run_global_stop_features(paths: &DataPaths) -> Result<(), Box<dyn std::error::Error>> {
    let count = global_stop::write_global_stop_features(
        &paths.marine_polygons(),
        &paths.natural_earth_lakes(),
        &paths.global_stopping_features(),
    )?;
    log::info!("Global stop features complete: {count} features");
    Ok(())
}

fn run_stop_features(
    paths: &DataPaths,
    variant: StopFeatureVariant,
    multi: &MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    let progress = IndicatifProgress::records_bar(multi, "Relabeling lakes");
    let count = stop::write_stop_features(
        &paths.stop_feature_sources(),
        variant,
        &paths.stopping_features(),
        &progress,
    )?;
    log::info!("Stop features complete: {count} features");
    Ok(())
}

fn run_vaa(paths: &DataPaths, multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    let progress = IndicatifProgress::records_bar(multi, "Trimming VAA rows");
    let summary = river_runner_vaa::trim_vaa_table(
        &paths.vaa_parquet(),
        &paths.vaa_csv(),
        &paths.vaa_json(),
        &progress,
    )?;
    log::info!(
        "VAA trim complete: {} of {} rows written",
        summary.rows_written,
        summary.rows_read
    );
    Ok(())
}

fn run_all(paths: &DataPaths, multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    let steps = IndicatifProgress::steps_bar(multi, "Transforms", 4);

    steps.set_message("Coordinates".to_string());
    run_coordinates(paths, multi)?;
    steps.inc(1);

    steps.set_message("Global stop features".to_string());
    run_global_stop_features(paths)?;
    steps.inc(1);

    steps.set_message("Stop features".to_string());
    run_stop_features(paths, StopFeatureVariant::Full, multi)?;
    steps.inc(1);

    steps.set_message("VAA".to_string());
    run_vaa(paths, multi)?;
    steps.inc(1);

    steps.finish("All transforms complete".to_string());
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = river_runner_cli_utils::init_logger();
    let cli = Cli::parse();

    let paths = DataPaths::new(cli.data_dir);
    log::debug!("Using data directory {}", paths.root().display());

    let result = match cli.command {
        Commands::Coordinates => run_coordinates(&paths, &multi),
        Commands::GlobalStopFeatures => run_global_stop_features(&paths),
        Commands::StopFeatures { variant } => run_stop_features(&paths, variant, &multi),
        Commands::Vaa => run_vaa(&paths, &multi),
        Commands::All => run_all(&paths, &multi),
    };

    if let Err(e) = &result {
        log::error!("{e}");
    }

    result
}
