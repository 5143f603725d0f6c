use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::prepare::{Preparation, Reference};

/// Output file format for correlation maps and extrema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

/// Everything describing one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Data file or measurement directory.
    pub input: PathBuf,
    /// `column=value` predicates.
    pub select: Vec<String>,
    /// Metadata column giving the perturbation order.
    pub order_by: Option<String>,
    /// Inclusive spectral-axis window.
    pub range: Option<(f64, f64)>,
    pub reference: Reference,
    pub output_dir: PathBuf,
    pub format: OutputFormat,
    /// Also write the extremum report.
    pub extrema: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            select: Vec::new(),
            order_by: None,
            range: None,
            reference: Reference::Mean,
            output_dir: PathBuf::from("2dcos_out"),
            format: OutputFormat::Csv,
            extrema: true,
        }
    }
}

impl RunConfig {
    /// Read a JSON config file; missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn preparation(&self) -> Preparation {
        Preparation {
            range: self.range,
            reference: self.reference,
        }
    }
}
