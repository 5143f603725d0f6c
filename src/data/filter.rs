use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Context, Result};

use super::model::{MeasurementSeries, MetadataValue};

// ---------------------------------------------------------------------------
// Selection: which spectra take part in the correlation
// ---------------------------------------------------------------------------

/// Per-column accepted values: column_name → set of values.
/// Values of one column are OR-ed, columns are AND-ed.
pub type Selection = BTreeMap<String, BTreeSet<MetadataValue>>;

/// Parse `column=value` predicates into a [`Selection`].
pub fn parse_selection<S: AsRef<str>>(predicates: &[S]) -> Result<Selection> {
    let mut selection = Selection::new();
    for predicate in predicates {
        let predicate = predicate.as_ref();
        let (column, value) = predicate
            .split_once('=')
            .with_context(|| format!("selection '{predicate}' is not of the form column=value"))?;
        selection
            .entry(column.trim().to_string())
            .or_default()
            .insert(MetadataValue::parse(value));
    }
    Ok(selection)
}

/// Indices of spectra passing every column predicate, in load order.
/// A spectrum without the column only passes if `Null` is accepted.
pub fn selected_indices(series: &MeasurementSeries, selection: &Selection) -> Vec<usize> {
    series
        .spectra
        .iter()
        .enumerate()
        .filter(|(_, sp)| {
            selection.iter().all(|(column, accepted)| {
                let value = sp.metadata.get(column).unwrap_or(&MetadataValue::Null);
                accepted.contains(value)
            })
        })
        .map(|(i, _)| i)
        .collect()
}

// ---------------------------------------------------------------------------
// Perturbation ordering
// ---------------------------------------------------------------------------

/// Sort `indices` by the metadata column defining the perturbation axis.
/// Spectra lacking the column go last; ties keep load order.
pub fn order_by(series: &MeasurementSeries, indices: &mut [usize], column: &str) {
    indices.sort_by(|&a, &b| {
        let va = series.spectra[a].metadata.get(column);
        let vb = series.spectra[b].metadata.get(column);
        match (va, vb) {
            (Some(va), Some(vb)) => va.cmp(vb),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        }
    });
}
