//! Result file writing.
//!
//! One file per solved instance: `objective,<value>` on the first line,
//! `runtime_ms,<elapsed>` on the second, then one `<name>,<value>` line per
//! nonzero variable. Variable names embed commas (`x,0,3`), so lines are
//! written verbatim rather than through a quoting CSV writer — the
//! arc-traversal reader depends on those commas being field separators.

use evrptw_core::{EvResult, SolveReport};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Write a solve report to `path`.
pub fn write_report(path: &Path, report: &SolveReport) -> EvResult<()> {
    let file = std::fs::File::create(path)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "objective,{}", report.objective)?;
    writeln!(writer, "runtime_ms,{}", report.runtime_ms)?;
    for (name, value) in &report.variables {
        writeln!(writer, "{name},{value}")?;
    }
    writer.flush()?;

    info!(
        path = %path.display(),
        status = %report.status,
        objective = report.objective,
        "wrote result file"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arcs::read_arc_matrix;
    use evrptw_core::SolveStatus;
    use tempfile::TempDir;

    #[test]
    fn test_write_report_format() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("c101C5.csv");
        let report = SolveReport {
            status: SolveStatus::Optimal,
            objective: 40.0,
            runtime_ms: 321,
            variables: vec![
                ("x,0,1".into(), 1.0),
                ("x,1,2".into(), 1.0),
                ("tau,1".into(), 10.0),
            ],
        };
        write_report(&path, &report).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "objective,40");
        assert_eq!(lines[1], "runtime_ms,321");
        assert_eq!(lines[2], "x,0,1,1");
        assert_eq!(lines[4], "tau,1,10");
    }

    #[test]
    fn test_report_roundtrips_into_arc_matrix() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("r104C5.csv");
        let report = SolveReport {
            status: SolveStatus::Optimal,
            objective: 40.0,
            runtime_ms: 5,
            variables: vec![
                ("x,0,1".into(), 1.0),
                ("x,1,3".into(), 1.0),
                ("x,3,0".into(), 1.0),
                ("y,1".into(), 50.0),
            ],
        };
        write_report(&path, &report).unwrap();

        let matrix = read_arc_matrix(&path, 4).unwrap();
        assert_eq!(matrix.arcs().collect::<Vec<_>>(), vec![(0, 1), (1, 3), (3, 0)]);
    }
}
