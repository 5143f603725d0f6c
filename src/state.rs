use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::config::RunConfig;
use crate::cos::{self, peaks, CorrelationSpectra};
use crate::data::filter::{order_by, parse_selection, selected_indices};
use crate::data::loader::load_input;
use crate::data::model::MeasurementSeries;
use crate::data::prepare::{build_data_matrix, PreparedData};
use crate::export::{self, ExtremumRecord};

// ---------------------------------------------------------------------------
// Analysis state
// ---------------------------------------------------------------------------

/// Results of one run, kept together so callers can inspect every stage.
pub struct AnalysisState {
    /// Everything loaded from the input.
    pub series: MeasurementSeries,

    /// Selected spectra in perturbation order.
    pub sample_indices: Vec<usize>,

    /// Data matrix and its spectral axis.
    pub prepared: PreparedData,

    /// Φ and Ψ.
    pub spectra: CorrelationSpectra,
}

impl AnalysisState {
    /// Load, select, order, prepare and correlate according to `config`.
    pub fn run(config: &RunConfig) -> Result<Self> {
        let series = load_input(&config.input)?;
        log::info!(
            "Loaded {} spectra with columns {:?}",
            series.len(),
            series.column_names
        );

        let selection = parse_selection(&config.select)?;
        let mut sample_indices = selected_indices(&series, &selection);
        if let Some(column) = &config.order_by {
            order_by(&series, &mut sample_indices, column);
        }
        log::info!("{} spectra selected", sample_indices.len());

        let prepared = build_data_matrix(&series, &sample_indices, &config.preparation())?;
        let spectra = cos::analyze(&prepared.matrix).context("computing correlation maps")?;
        log::info!(
            "Computed {n}×{n} synchronous and asynchronous maps",
            n = prepared.axis.len()
        );

        Ok(Self {
            series,
            sample_indices,
            prepared,
            spectra,
        })
    }

    /// Global and local extrema of both maps, labelled with axis values.
    pub fn extrema(&self) -> Result<Vec<ExtremumRecord>> {
        let axis = &self.prepared.axis;
        let mut records = Vec::new();
        for (name, map) in self.maps() {
            if let Some((max, min)) = peaks::global_extrema(map) {
                records.push(ExtremumRecord::new(&format!("{name}_global"), axis, &max));
                records.push(ExtremumRecord::new(&format!("{name}_global"), axis, &min));
            }
            for extremum in peaks::local_extrema(map)? {
                records.push(ExtremumRecord::new(name, axis, &extremum));
            }
        }
        Ok(records)
    }

    fn maps(&self) -> [(&'static str, &cos::Matrix); 2] {
        [
            ("synchronous", &self.spectra.synchronous),
            ("asynchronous", &self.spectra.asynchronous),
        ]
    }

    /// Write the maps (and optionally the extremum report) to the output
    /// directory. Returns the written paths.
    pub fn export(&self, config: &RunConfig) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(&config.output_dir)
            .with_context(|| format!("creating {}", config.output_dir.display()))?;

        let mut written = Vec::new();
        for (name, map) in self.maps() {
            written.push(export::write_map(
                &config.output_dir,
                name,
                &self.prepared.axis,
                map,
                config.format,
            )?);
        }
        if config.extrema {
            let records = self.extrema()?;
            log::debug!("{} extrema", records.len());
            written.push(export::write_extrema(&config.output_dir, &records, config.format)?);
        }
        for path in &written {
            log::info!("Wrote {}", path.display());
        }
        Ok(written)
    }
}
