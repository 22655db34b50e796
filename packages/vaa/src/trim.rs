//! Cleaning and type coercion of VAA rows.

use std::sync::Arc;

use river_runner_progress::ProgressCallback;
use river_runner_vaa_models::{RawVaaRow, VaaRow};

use crate::VaaError;

/// Source value marking a flowline without a GNIS name.
pub const UNNAMED_SENTINEL: &str = " ";

/// Truncates a float column value toward zero.
///
/// # Errors
///
/// Returns [`VaaError::Coercion`] if the value is null, NaN, infinite, or
/// outside the `i64` range.
pub fn coerce_integer(
    value: Option<f64>,
    column: &'static str,
    row: usize,
) -> Result<i64, VaaError> {
    let coercion_error = || VaaError::Coercion {
        column,
        row,
        value: value.map_or_else(|| "null".to_string(), |v| v.to_string()),
    };

    let truncated = value
        .filter(|v| v.is_finite())
        .ok_or_else(coercion_error)?
        .trunc();

    // 2^63 is exactly representable, i64::MAX is not.
    #[allow(clippy::cast_precision_loss)]
    let upper = i64::MAX as f64;
    #[allow(clippy::cast_precision_loss)]
    let lower = i64::MIN as f64;
    if truncated >= upper || truncated < lower {
        return Err(coercion_error());
    }

    #[allow(clippy::cast_possible_truncation)]
    Ok(truncated as i64)
}

/// Replaces the single-space unnamed sentinel with an empty string.
#[must_use]
pub fn clean_name(name: Option<String>) -> Option<String> {
    name.map(|n| if n == UNNAMED_SENTINEL { String::new() } else { n })
}

/// Converts one source row into its trimmed form.
///
/// # Errors
///
/// Returns [`VaaError::Coercion`] if an identifier or flag column cannot be
/// coerced.
pub fn trim_row(raw: RawVaaRow, row: usize) -> Result<VaaRow, VaaError> {
    let comid = coerce_integer(raw.comid, "comid", row)?;
    let streamlvl = coerce_integer(raw.streamleve, "streamleve", row)?;
    let levelpathid = coerce_integer(raw.levelpathi, "levelpathi", row)?;
    let terminalfl = coerce_integer(raw.terminalfl, "terminalfl", row)?;

    Ok(VaaRow {
        comid: comid.to_string(),
        streamlvl,
        levelpathid: levelpathid.to_string(),
        pathlength: raw.pathlength,
        terminalfl,
        lengthkm: raw.lengthkm,
        gnis_name: clean_name(raw.gnis_name),
    })
}

/// Trims every row, preserving order. The first row that fails coercion
/// aborts the whole table.
///
/// # Errors
///
/// Returns [`VaaError::Coercion`] for the first row that cannot be coerced.
pub fn trim_rows(
    raw: Vec<RawVaaRow>,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Vec<VaaRow>, VaaError> {
    progress.set_total(raw.len() as u64);

    let mut rows = Vec::with_capacity(raw.len());
    for (index, raw_row) in raw.into_iter().enumerate() {
        rows.push(trim_row(raw_row, index)?);
        if index % 10_000 == 9_999 {
            progress.inc(10_000);
        }
    }

    progress.finish(format!("Trimmed {} VAA rows", rows.len()));

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use river_runner_progress::null_progress;

    use super::*;

    fn raw(comid: f64, name: Option<&str>) -> RawVaaRow {
        RawVaaRow {
            comid: Some(comid),
            streamleve: Some(1.0),
            levelpathi: Some(350_002_977.0),
            pathlength: Some(0.0),
            terminalfl: Some(1.0),
            lengthkm: Some(2.236),
            gnis_name: name.map(str::to_string),
        }
    }

    #[test]
    fn identifiers_become_plain_digit_strings() {
        let row = trim_row(raw(15_000_000_000.0, Some("Ohio River")), 0).unwrap();

        assert_eq!(row.comid, "15000000000");
        assert_eq!(row.levelpathid, "350002977");
        for id in [&row.comid, &row.levelpathid] {
            assert!(!id.contains(['.', 'e', 'E']));
        }
        assert_eq!(row.streamlvl, 1);
        assert_eq!(row.terminalfl, 1);
    }

    #[test]
    fn truncates_toward_zero() {
        assert_eq!(coerce_integer(Some(2.9), "streamleve", 0).unwrap(), 2);
        assert_eq!(coerce_integer(Some(-2.9), "streamleve", 0).unwrap(), -2);
    }

    #[test]
    fn replaces_single_space_name() {
        assert_eq!(clean_name(Some(" ".to_string())), Some(String::new()));
        assert_eq!(clean_name(Some("  ".to_string())), Some("  ".to_string()));
        assert_eq!(clean_name(None), None);

        let row = trim_row(raw(1.0, Some(" ")), 0).unwrap();
        assert_eq!(row.gnis_name.as_deref(), Some(""));
    }

    #[test]
    fn non_finite_and_null_values_are_fatal() {
        for value in [Some(f64::NAN), Some(f64::INFINITY), None, Some(1e19)] {
            let err = coerce_integer(value, "comid", 7).unwrap_err();
            assert!(matches!(err, VaaError::Coercion { column: "comid", row: 7, .. }));
        }
    }

    #[test]
    fn one_bad_row_fails_the_table() {
        let mut bad = raw(2.0, None);
        bad.terminalfl = Some(f64::NAN);

        let err = trim_rows(vec![raw(1.0, None), bad], &null_progress()).unwrap_err();
        assert!(matches!(
            err,
            VaaError::Coercion { column: "terminalfl", row: 1, .. }
        ));
    }

    #[test]
    fn keeps_row_count_and_order() {
        let rows = trim_rows(
            vec![raw(3.0, None), raw(1.0, Some(" ")), raw(2.0, Some("Bear Creek"))],
            &null_progress(),
        )
        .unwrap();

        let comids: Vec<&str> = rows.iter().map(|r| r.comid.as_str()).collect();
        assert_eq!(comids, ["3", "1", "2"]);
        assert!(rows.iter().all(|r| r.gnis_name.as_deref() != Some(" ")));
    }
}
