use serde::Serialize;

use super::error::Result;
use super::matrix::Matrix;

/// Whether an extremum is a peak or a trough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtremumKind {
    Maximum,
    Minimum,
}

/// A cell of a correlation map singled out as an extremum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Extremum {
    pub x: usize,
    pub y: usize,
    pub value: f64,
    pub kind: ExtremumKind,
}

/// Global maximum and minimum of `map`. The first cell in row-major order
/// wins ties. `None` for a matrix without cells.
pub fn global_extrema(map: &Matrix) -> Option<(Extremum, Extremum)> {
    let mut cells = map.iter();
    let (value, x, y) = cells.next()?;
    let mut max = Extremum {
        x,
        y,
        value,
        kind: ExtremumKind::Maximum,
    };
    let mut min = Extremum {
        kind: ExtremumKind::Minimum,
        ..max
    };

    for (value, x, y) in cells {
        if value > max.value {
            max = Extremum { x, y, value, ..max };
        }
        if value < min.value {
            min = Extremum { x, y, value, ..min };
        }
    }
    Some((max, min))
}

/// Cells strictly above (maxima) or strictly below (minima) all of their
/// grid neighbours, in row-major order.
pub fn local_extrema(map: &Matrix) -> Result<Vec<Extremum>> {
    let mut found = Vec::new();
    for (value, x, y) in map.iter() {
        let neighbors = map.neighbor_indexes_of(x, y)?;
        if neighbors.is_empty() {
            continue;
        }

        let mut above_all = true;
        let mut below_all = true;
        for (nx, ny) in neighbors {
            let other = map.get(nx, ny)?;
            above_all &= value > other;
            below_all &= value < other;
        }

        let kind = if above_all {
            ExtremumKind::Maximum
        } else if below_all {
            ExtremumKind::Minimum
        } else {
            continue;
        };
        found.push(Extremum { x, y, value, kind });
    }
    log::trace!("found {} local extrema", found.len());
    Ok(found)
}
