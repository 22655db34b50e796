#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! NHDPlus value-added attribute (VAA) types.
//!
//! [`RawVaaRow`] mirrors the source Parquet columns, which are all stored as
//! floating point and use the dataset's ten-character truncated names.
//! [`VaaRow`] is the trimmed, typed row written for the frontend.

use serde::{Deserialize, Serialize};

/// Source columns read from the VAA table, in output order.
pub const SOURCE_COLUMNS: &[&str] = &[
    "comid",
    "streamleve",
    "levelpathi",
    "pathlength",
    "terminalfl",
    "lengthkm",
    "gnis_name",
];

/// One row of the VAA table as stored in the source file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawVaaRow {
    /// NHDPlus flowline identifier.
    pub comid: Option<f64>,
    /// Stream level (truncated source name for stream level).
    pub streamleve: Option<f64>,
    /// Level path identifier (truncated source name).
    pub levelpathi: Option<f64>,
    /// Distance to the network terminus in kilometres.
    pub pathlength: Option<f64>,
    /// Terminal flag: 1 if the flowline ends the network.
    pub terminalfl: Option<f64>,
    /// Flowline length in kilometres.
    pub lengthkm: Option<f64>,
    /// GNIS name. A single space means the flowline is unnamed.
    pub gnis_name: Option<String>,
}

/// A trimmed VAA row keyed by `comid`.
///
/// `comid` and `levelpathid` are strings so that JSON consumers never see
/// them as lossy floats or in exponent notation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaaRow {
    /// NHDPlus flowline identifier, as decimal digits.
    pub comid: String,
    /// Stream level.
    pub streamlvl: i64,
    /// Level path identifier, as decimal digits.
    pub levelpathid: String,
    /// Distance to the network terminus in kilometres.
    pub pathlength: Option<f64>,
    /// Terminal flag: 1 if the flowline ends the network.
    pub terminalfl: i64,
    /// Flowline length in kilometres.
    pub lengthkm: Option<f64>,
    /// GNIS name; empty when the flowline is unnamed.
    pub gnis_name: Option<String>,
}
