//! Reading persisted arc-traversal assignments.
//!
//! The fixed-route BD-cost model consumes the decision-variable file written
//! for a previously solved base model. Rows are `x,<i>,<j>,<value>`; any row
//! whose value exceeds `1e-5` in magnitude marks arc (i, j) as used. Rows
//! with other variable tags (`tau`, `u`, `y`, ...) and the header lines are
//! skipped.

use evrptw_core::{ArcMatrix, EvResult, EvrptwError};
use std::path::Path;

/// Tolerance below which a persisted binary value counts as zero.
pub const ARC_VALUE_TOLERANCE: f64 = 1e-5;

/// Read a decision-variable file into an [`ArcMatrix`] over `size`
/// expanded locations.
pub fn read_arc_matrix(path: &Path, size: usize) -> EvResult<ArcMatrix> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| {
            EvrptwError::MalformedInstance(format!("opening {}: {e}", path.display()))
        })?;

    let mut matrix = ArcMatrix::new(size);
    for (row, result) in reader.records().enumerate() {
        let record = result.map_err(|e| {
            EvrptwError::MalformedInstance(format!("{}: row {row}: {e}", path.display()))
        })?;
        if record.get(0).map(str::trim) != Some("x") {
            continue;
        }
        let parse = |idx: usize, what: &str| -> EvResult<f64> {
            record
                .get(idx)
                .and_then(|v| v.trim().parse().ok())
                .ok_or_else(|| {
                    EvrptwError::MalformedInstance(format!(
                        "{}: row {row}: bad {what} in arc record",
                        path.display()
                    ))
                })
        };
        let value = parse(3, "value")?;
        if value.abs() <= ARC_VALUE_TOLERANCE {
            continue;
        }
        let i = parse(1, "tail index")? as usize;
        let j = parse(2, "head index")? as usize;
        if i >= size || j >= size {
            return Err(EvrptwError::MalformedInstance(format!(
                "{}: arc ({i},{j}) out of range for {size} locations",
                path.display()
            )));
        }
        matrix.set(i, j);
    }

    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_arc_matrix() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("c101C5.csv");
        std::fs::write(
            &path,
            "objective,40.0\n\
             runtime_ms,120\n\
             x,0,3,1.0\n\
             x,3,4,0.9999999\n\
             x,4,5,0.000001\n\
             tau,3,15.0\n",
        )
        .unwrap();

        let matrix = read_arc_matrix(&path, 6).unwrap();
        assert!(matrix.used(0, 3));
        assert!(matrix.used(3, 4));
        // below the 1e-5 threshold
        assert!(!matrix.used(4, 5));
        assert_eq!(matrix.arcs().count(), 2);
    }

    #[test]
    fn test_out_of_range_arc() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "x,0,9,1.0\n").unwrap();

        let err = read_arc_matrix(&path, 4).unwrap_err();
        assert!(matches!(err, EvrptwError::MalformedInstance(_)));
    }
}
