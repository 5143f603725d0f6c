use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use super::model::MeasurementSeries;
use crate::cos::Matrix;

// ---------------------------------------------------------------------------
// Preparation options
// ---------------------------------------------------------------------------

/// Spectrum subtracted from every sample before correlation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reference {
    /// Use the raw intensities.
    None,
    /// Subtract the mean spectrum of the selection (dynamic spectrum).
    #[default]
    Mean,
    /// Subtract one measurement, by position in the ordered selection.
    Spectrum(usize),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Preparation {
    /// Inclusive spectral-axis window; bounds may be given in either order.
    pub range: Option<(f64, f64)>,
    pub reference: Reference,
}

/// Data matrix ready for correlation plus the axis labelling its rows.
#[derive(Debug, Clone)]
pub struct PreparedData {
    pub axis: Vec<f64>,
    /// Rows are axis points, columns are samples in perturbation order.
    pub matrix: Matrix,
}

// ---------------------------------------------------------------------------
// Series → Matrix
// ---------------------------------------------------------------------------

/// Arrange the spectra at `indices` (already in perturbation order) as the
/// columns of a data matrix, cropped and reference-corrected.
pub fn build_data_matrix(
    series: &MeasurementSeries,
    indices: &[usize],
    prep: &Preparation,
) -> Result<PreparedData> {
    let axis = series.shared_axis(indices)?;

    let rows: Vec<usize> = match prep.range {
        Some((a, b)) => {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            (0..axis.len())
                .filter(|&i| axis[i] >= lo && axis[i] <= hi)
                .collect()
        }
        None => (0..axis.len()).collect(),
    };
    if rows.is_empty() {
        bail!("no axis points inside the requested range");
    }

    let samples = indices.len();
    let reference: Option<Vec<f64>> = match prep.reference {
        Reference::None => None,
        Reference::Mean => Some(
            rows.iter()
                .map(|&r| {
                    let total: f64 = indices.iter().map(|&s| series.spectra[s].y[r]).sum();
                    total / samples as f64
                })
                .collect(),
        ),
        Reference::Spectrum(k) => {
            let Some(&s) = indices.get(k) else {
                bail!("reference spectrum {k} is outside the {samples} selected spectra");
            };
            Some(rows.iter().map(|&r| series.spectra[s].y[r]).collect())
        }
    };

    let data: Vec<Vec<f64>> = rows
        .iter()
        .enumerate()
        .map(|(row, &r)| {
            let offset = reference.as_ref().map_or(0.0, |rf| rf[row]);
            indices.iter().map(|&s| series.spectra[s].y[r] - offset).collect()
        })
        .collect();
    let matrix = Matrix::from_rows(data)?;

    log::debug!(
        "data matrix: {} axis points × {} samples, reference {:?}",
        matrix.height(),
        matrix.width(),
        prep.reference
    );
    Ok(PreparedData {
        axis: rows.iter().map(|&r| axis[r]).collect(),
        matrix,
    })
}
