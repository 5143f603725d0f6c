use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use anyhow::{bail, Result};

// ---------------------------------------------------------------------------
// MetadataValue – one metadata cell attached to a measurement
// ---------------------------------------------------------------------------

/// A dynamically-typed metadata value (sample name, temperature, file name…).
#[derive(Debug, Clone)]
pub enum MetadataValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl MetadataValue {
    /// Numeric view used for perturbation ordering.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetadataValue::Float(v) => Some(*v),
            MetadataValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Parse a textual cell, guessing the narrowest type.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() {
            MetadataValue::Null
        } else if let Ok(i) = s.parse::<i64>() {
            MetadataValue::Integer(i)
        } else if let Ok(f) = s.parse::<f64>() {
            MetadataValue::Float(f)
        } else if let Ok(b) = s.parse::<bool>() {
            MetadataValue::Bool(b)
        } else {
            MetadataValue::String(s.to_string())
        }
    }

    fn rank(&self) -> u8 {
        match self {
            MetadataValue::Null => 0,
            MetadataValue::Bool(_) => 1,
            MetadataValue::Integer(_) | MetadataValue::Float(_) => 2,
            MetadataValue::String(_) => 3,
        }
    }
}

impl PartialEq for MetadataValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for MetadataValue {}

impl PartialOrd for MetadataValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Numbers compare by value across Integer/Float, so `30` selects `30.0`
// and a mixed column still sorts numerically.
impl Ord for MetadataValue {
    fn cmp(&self, other: &Self) -> Ordering {
        use MetadataValue::*;
        match (self, other) {
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (String(a), String(b)) => a.cmp(b),
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                _ => a.rank().cmp(&b.rank()),
            },
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Null => write!(f, "<null>"),
            MetadataValue::Bool(b) => write!(f, "{b}"),
            MetadataValue::Integer(i) => write!(f, "{i}"),
            MetadataValue::Float(v) => write!(f, "{v}"),
            MetadataValue::String(s) => write!(f, "{s}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Spectrum – one measurement along the perturbation axis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Spectrum {
    /// Spectral axis (wavenumber, wavelength…).
    pub x: Vec<f64>,
    /// Intensities, same length as `x`.
    pub y: Vec<f64>,
    pub metadata: BTreeMap<String, MetadataValue>,
}

// ---------------------------------------------------------------------------
// MeasurementSeries – everything loaded from one input
// ---------------------------------------------------------------------------

/// Relative tolerance when checking that spectra share an axis.
const AXIS_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone)]
pub struct MeasurementSeries {
    pub spectra: Vec<Spectrum>,
    /// Sorted metadata column names.
    pub column_names: Vec<String>,
}

impl MeasurementSeries {
    pub fn from_spectra(spectra: Vec<Spectrum>) -> Self {
        let column_names: BTreeSet<String> = spectra
            .iter()
            .flat_map(|sp| sp.metadata.keys().cloned())
            .collect();
        MeasurementSeries {
            spectra,
            column_names: column_names.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.spectra.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spectra.is_empty()
    }

    /// The spectral axis shared by every spectrum in `indices`.
    pub fn shared_axis(&self, indices: &[usize]) -> Result<&[f64]> {
        let Some(&first) = indices.first() else {
            bail!("no spectra selected");
        };
        let axis = &self.spectra[first].x;

        for &idx in &indices[1..] {
            let other = &self.spectra[idx].x;
            if other.len() != axis.len() {
                bail!(
                    "spectrum {idx} has {} axis points but spectrum {first} has {}",
                    other.len(),
                    axis.len()
                );
            }
            let mismatch = axis.iter().zip(other).position(|(a, b)| {
                (a - b).abs() > AXIS_TOLERANCE * a.abs().max(b.abs()).max(1.0)
            });
            if let Some(pos) = mismatch {
                bail!(
                    "spectrum {idx} disagrees with spectrum {first} at axis point {pos} ({} vs {})",
                    other[pos],
                    axis[pos]
                );
            }
        }
        Ok(axis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spectrum(x: &[f64]) -> Spectrum {
        Spectrum {
            x: x.to_vec(),
            y: vec![0.0; x.len()],
            metadata: BTreeMap::new(),
        }
    }

    #[test]
    fn parse_guesses_types() {
        assert_eq!(MetadataValue::parse(""), MetadataValue::Null);
        assert_eq!(MetadataValue::parse("42"), MetadataValue::Integer(42));
        assert_eq!(MetadataValue::parse("2.5"), MetadataValue::Float(2.5));
        assert_eq!(MetadataValue::parse("true"), MetadataValue::Bool(true));
        assert_eq!(
            MetadataValue::parse(" run_a "),
            MetadataValue::String("run_a".into())
        );
    }

    #[test]
    fn numbers_order_by_value_across_types() {
        let mut values = vec![
            MetadataValue::Float(2.5),
            MetadataValue::String("a".into()),
            MetadataValue::Integer(3),
            MetadataValue::Null,
            MetadataValue::Integer(1),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![
                MetadataValue::Null,
                MetadataValue::Integer(1),
                MetadataValue::Float(2.5),
                MetadataValue::Integer(3),
                MetadataValue::String("a".into()),
            ]
        );
    }

    #[test]
    fn integer_and_float_with_same_value_are_equal() {
        assert_eq!(MetadataValue::Integer(30), MetadataValue::Float(30.0));
        assert_ne!(MetadataValue::Integer(30), MetadataValue::String("30".into()));
    }

    #[test]
    fn shared_axis_accepts_matching_spectra() {
        let series =
            MeasurementSeries::from_spectra(vec![spectrum(&[1.0, 2.0]), spectrum(&[1.0, 2.0])]);
        assert_eq!(series.shared_axis(&[0, 1]).unwrap(), &[1.0, 2.0]);
    }

    #[test]
    fn shared_axis_rejects_mismatches() {
        let series = MeasurementSeries::from_spectra(vec![
            spectrum(&[1.0, 2.0]),
            spectrum(&[1.0, 2.5]),
            spectrum(&[1.0]),
        ]);
        assert!(series.shared_axis(&[0, 1]).is_err());
        assert!(series.shared_axis(&[0, 2]).is_err());
        assert!(series.shared_axis(&[]).is_err());
    }
}
