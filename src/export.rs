use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::config::OutputFormat;
use crate::cos::peaks::{Extremum, ExtremumKind};
use crate::cos::Matrix;

// ---------------------------------------------------------------------------
// Correlation maps
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct MapDocument<'a> {
    axis: &'a [f64],
    values: Vec<Vec<f64>>,
}

/// Write a square correlation map labelled by `axis` to
/// `<dir>/<name>.<ext>`. Returns the written path.
pub fn write_map(
    dir: &Path,
    name: &str,
    axis: &[f64],
    map: &Matrix,
    format: OutputFormat,
) -> Result<PathBuf> {
    let path = dir.join(format!("{name}.{}", format.extension()));
    match format {
        OutputFormat::Csv => write_map_csv(&path, axis, map),
        OutputFormat::Json => write_json(
            &path,
            &MapDocument {
                axis,
                values: map.to_row_vecs(),
            },
        ),
    }
    .with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

/// Header row: empty corner then the axis; each data row starts with its
/// axis value.
fn write_map_csv(path: &Path, axis: &[f64], map: &Matrix) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    let mut header = vec![String::new()];
    header.extend(axis.iter().map(f64::to_string));
    writer.write_record(&header)?;

    for (label, row) in axis.iter().zip(map.to_row_vecs()) {
        let mut record = vec![label.to_string()];
        record.extend(row.iter().map(f64::to_string));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, value)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Extremum report
// ---------------------------------------------------------------------------

/// One line of the extremum report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtremumRecord {
    pub map: String,
    pub kind: ExtremumKind,
    pub x: usize,
    pub y: usize,
    pub axis_x: f64,
    pub axis_y: f64,
    pub value: f64,
}

impl ExtremumRecord {
    pub fn new(map: &str, axis: &[f64], extremum: &Extremum) -> Self {
        Self {
            map: map.to_string(),
            kind: extremum.kind,
            x: extremum.x,
            y: extremum.y,
            axis_x: axis[extremum.x],
            axis_y: axis[extremum.y],
            value: extremum.value,
        }
    }
}

pub fn write_extrema(dir: &Path, records: &[ExtremumRecord], format: OutputFormat) -> Result<PathBuf> {
    let path = dir.join(format!("extrema.{}", format.extension()));
    match format {
        OutputFormat::Csv => write_extrema_csv(&path, records),
        OutputFormat::Json => write_json(&path, &records),
    }
    .with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

fn write_extrema_csv(path: &Path, records: &[ExtremumRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    if records.is_empty() {
        writer.write_record(["map", "kind", "x", "y", "axis_x", "axis_y", "value"])?;
    }
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}
