//! Export helpers for CSV and JSON artifacts.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use coast_pvg::{Phase, PhaseKind, Solution, SolutionError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("sample step must be positive and finite (got {0})")]
    InvalidStep(f64),
    #[error("solution has no segments")]
    EmptySolution,
    #[error("failed to evaluate solution: {0}")]
    Solution(#[from] SolutionError),
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// One flattened trajectory sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrajectoryRow {
    pub t: f64,
    pub stage: u32,
    pub kind: PhaseKind,
    pub label: String,
    pub rx: f64,
    pub ry: f64,
    pub rz: f64,
    pub vx: f64,
    pub vy: f64,
    pub vz: f64,
    pub pvx: f64,
    pub pvy: f64,
    pub pvz: f64,
    pub prx: f64,
    pub pry: f64,
    pub prz: f64,
    pub pm: f64,
    pub dv: f64,
}

/// Sample `solution` every `step` from its start, always including the final time.
pub fn sample_solution(solution: &Solution, step: f64) -> Result<Vec<TrajectoryRow>, ExportError> {
    if !(step > 0.0 && step.is_finite()) {
        return Err(ExportError::InvalidStep(step));
    }
    let (t0, tf) = match (solution.t0(), solution.tf()) {
        (Some(t0), Some(tf)) => (t0, tf),
        _ => return Err(ExportError::EmptySolution),
    };

    let mut rows = Vec::new();
    let mut k = 0u64;
    loop {
        let t = t0 + step * k as f64;
        if t >= tf {
            break;
        }
        rows.push(row_at(solution, t)?);
        k += 1;
    }
    rows.push(row_at(solution, tf)?);
    Ok(rows)
}

fn row_at(solution: &Solution, t: f64) -> Result<TrajectoryRow, ExportError> {
    let segment = solution.segment_at(t)?;
    let y = segment.state_at(t).map_err(SolutionError::from)?;
    let Phase { kind, stage, label } = segment.phase().clone();
    Ok(TrajectoryRow {
        t,
        stage,
        kind,
        label: label.unwrap_or_default(),
        rx: y.r.x,
        ry: y.r.y,
        rz: y.r.z,
        vx: y.v.x,
        vy: y.v.y,
        vz: y.v.z,
        pvx: y.pv.x,
        pvy: y.pv.y,
        pvz: y.pv.z,
        prx: y.pr.x,
        pry: y.pr.y,
        prz: y.pr.z,
        pm: y.pm,
        dv: y.dv,
    })
}

/// Create a writer for the target path, handling stdout (`-`) by convention.
pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    Ok(Box::new(BufWriter::new(file)))
}

/// Write rows as CSV with a header line.
pub fn write_csv<W: Write>(writer: W, rows: &[TrajectoryRow]) -> Result<(), ExportError> {
    let mut csv = csv::Writer::from_writer(writer);
    for row in rows {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(())
}

/// Write rows as a pretty-printed JSON array.
pub fn write_json<W: Write>(mut writer: W, rows: &[TrajectoryRow]) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(&mut writer, rows)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
