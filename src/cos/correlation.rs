use std::f64::consts::PI;

use super::error::{CosError, Result};
use super::matrix::{dot_slices, Matrix};

// ---------------------------------------------------------------------------
// Hilbert–Noda transformation matrix
// ---------------------------------------------------------------------------

/// Hilbert–Noda transformation matrix of order `n`.
///
/// Entry `(j, k)` (row `j`, column `k`) is `1 / (π·(k − j))`, with a zero
/// diagonal. The result is antisymmetric.
pub fn hilbert_noda_matrix(n: usize) -> Result<Matrix> {
    if n == 0 {
        return Err(CosError::argument("Hilbert–Noda matrix order must be positive"));
    }
    Ok(Matrix::from_fn(n, n, |k, j| {
        if j == k {
            0.0
        } else {
            1.0 / (PI * (k as f64 - j as f64))
        }
    }))
}

// ---------------------------------------------------------------------------
// Synchronous / asynchronous correlation
// ---------------------------------------------------------------------------

/// Both correlation maps computed from the same data matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationSpectra {
    /// Φ – in-phase correlation.
    pub synchronous: Matrix,
    /// Ψ – out-of-phase correlation.
    pub asynchronous: Matrix,
}

/// `1 / (m − 1)` for `m` perturbation samples; needs `m ≥ 2`.
fn normalization(data: &Matrix) -> Result<f64> {
    let samples = data.width();
    if samples < 2 {
        return Err(CosError::argument(format!(
            "correlation needs at least 2 perturbation samples, got {samples}"
        )));
    }
    Ok(1.0 / (samples - 1) as f64)
}

/// Synchronous spectrum Φ.
///
/// Rows of `data` are spectral positions, columns are perturbation samples.
/// `Φ(i, j)` is the `(m − 1)`-normalised inner product of rows `i` and `j`.
pub fn synchronous(data: &Matrix) -> Result<Matrix> {
    let norm = normalization(data)?;
    let n = data.height();
    log::trace!("synchronous map: {n} positions × {} samples", data.width());

    let mut upper = vec![0.0; n * n];
    for i in 0..n {
        for j in i..n {
            upper[i * n + j] = norm * dot_slices(data.row_slice(i), data.row_slice(j));
        }
    }
    // Φ is symmetric; mirror the upper triangle.
    Ok(Matrix::from_fn(n, n, |x, y| {
        if x >= y {
            upper[y * n + x]
        } else {
            upper[x * n + y]
        }
    }))
}

/// Asynchronous spectrum Ψ.
///
/// `Ψ(i, j)` is row `i` of `data` dotted with `N · row_j`, where `N` is the
/// Hilbert–Noda matrix of order `m` (the sample count), normalised by `m − 1`.
pub fn asynchronous(data: &Matrix) -> Result<Matrix> {
    let norm = normalization(data)?;
    let noda = hilbert_noda_matrix(data.width())?;
    log::trace!("asynchronous map: {} positions × {} samples", data.height(), data.width());

    // Row j of `data · Nᵀ` is `N · row_j`.
    let transformed = data.matmul(&noda.transpose())?;
    let n = data.height();
    Ok(Matrix::from_fn(n, n, |j, i| {
        norm * dot_slices(data.row_slice(i), transformed.row_slice(j))
    }))
}

/// Compute Φ and Ψ for one data matrix.
pub fn analyze(data: &Matrix) -> Result<CorrelationSpectra> {
    let synchronous = synchronous(data)?;
    let asynchronous = asynchronous(data)?;
    log::debug!(
        "computed {}×{} correlation maps",
        synchronous.height(),
        synchronous.width()
    );
    Ok(CorrelationSpectra {
        synchronous,
        asynchronous,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn m(rows: &[&[f64]]) -> Matrix {
        Matrix::from_rows(rows.iter().map(|r| r.to_vec()).collect()).unwrap()
    }

    fn sample_data() -> Matrix {
        m(&[&[2.0, 2.0, 4.0], &[3.0, 4.0, -1.0], &[5.0, 4.0, 2.0]])
    }

    #[test]
    fn hilbert_noda_order_four() {
        let expected = m(&[
            &[0.0, 1.0, 1.0 / 2.0, 1.0 / 3.0],
            &[-1.0, 0.0, 1.0, 1.0 / 2.0],
            &[-1.0 / 2.0, -1.0, 0.0, 1.0],
            &[-1.0 / 3.0, -1.0 / 2.0, -1.0, 0.0],
        ])
        .scale(1.0 / PI);
        let actual = hilbert_noda_matrix(4).unwrap();
        assert_eq!(actual.width(), 4);
        assert_eq!(actual.height(), 4);
        for (value, x, y) in actual.iter() {
            assert_abs_diff_eq!(value, expected.get(x, y).unwrap(), epsilon = 1e-15);
        }
    }

    #[test]
    fn hilbert_noda_is_antisymmetric_with_zero_diagonal() {
        let noda = hilbert_noda_matrix(7).unwrap();
        for (value, x, y) in noda.iter() {
            if x == y {
                assert_eq!(value, 0.0);
            } else {
                assert_eq!(value, -noda.get(y, x).unwrap());
            }
        }
    }

    #[test]
    fn hilbert_noda_edge_orders() {
        assert_eq!(hilbert_noda_matrix(1).unwrap(), m(&[&[0.0]]));
        assert!(matches!(hilbert_noda_matrix(0), Err(CosError::Argument(_))));
    }

    #[test]
    fn synchronous_known_case() {
        // `sample_data` lists one perturbation sample per row, so the
        // spectral traces are its columns.
        let expected = m(&[&[19.0, 18.0, 7.5], &[18.0, 18.0, 6.0], &[7.5, 6.0, 10.5]]);
        let actual = synchronous(&sample_data().transpose()).unwrap();
        for (value, x, y) in actual.iter() {
            assert_abs_diff_eq!(value, expected.get(x, y).unwrap(), epsilon = 1e-12);
        }
    }

    #[test]
    fn synchronous_is_symmetric_for_rectangular_input() {
        let data = Matrix::from_fn(5, 4, |x, y| ((x * 3 + y) as f64).cos());
        let phi = synchronous(&data).unwrap();
        assert_eq!(phi.width(), 4);
        assert_eq!(phi.height(), 4);
        for (value, x, y) in phi.iter() {
            assert_eq!(value, phi.get(y, x).unwrap());
        }
    }

    #[test]
    fn asynchronous_matches_definition() {
        let data = sample_data();
        let psi = asynchronous(&data).unwrap();
        let noda = hilbert_noda_matrix(3).unwrap();
        for (value, x, y) in psi.iter() {
            let lagged = noda.matmul(&data.row(x).unwrap().transpose()).unwrap();
            let expected = 0.5 * data.row(y).unwrap().dot(&lagged).unwrap();
            assert_abs_diff_eq!(value, expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn asynchronous_is_antisymmetric() {
        let data = Matrix::from_fn(6, 3, |x, y| ((x + 2 * y) as f64).sin() + x as f64 * 0.1);
        let psi = asynchronous(&data).unwrap();
        for (value, x, y) in psi.iter() {
            assert_abs_diff_eq!(value, -psi.get(y, x).unwrap(), epsilon = 1e-12);
        }
    }

    #[test]
    fn in_phase_signals_have_no_asynchronous_correlation() {
        // Two rows proportional to each other change in phase.
        let data = m(&[&[1.0, 2.0, 3.0, 4.0], &[2.0, 4.0, 6.0, 8.0]]);
        let psi = asynchronous(&data).unwrap();
        assert_abs_diff_eq!(psi.get(1, 0).unwrap(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn single_sample_is_argument_error() {
        let data = m(&[&[1.0], &[2.0]]);
        assert!(matches!(synchronous(&data), Err(CosError::Argument(_))));
        assert!(matches!(asynchronous(&data), Err(CosError::Argument(_))));
        assert!(matches!(analyze(&data), Err(CosError::Argument(_))));
    }

    #[test]
    fn analyze_returns_both_maps() {
        let data = sample_data();
        let spectra = analyze(&data).unwrap();
        assert_eq!(spectra.synchronous, synchronous(&data).unwrap());
        assert_eq!(spectra.asynchronous, asynchronous(&data).unwrap());
    }
}
