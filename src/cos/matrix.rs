use std::fmt;

use super::error::{CosError, Result};

// ---------------------------------------------------------------------------
// Matrix – dense, immutable rectangular grid of f64
// ---------------------------------------------------------------------------

/// Dense rectangular matrix of `f64` values stored row-major.
///
/// `x` addresses columns (`0..width`), `y` addresses rows (`0..height`).
/// Every operation returns a fresh `Matrix`; nothing mutates in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    width: usize,
    height: usize,
    values: Vec<f64>,
}

impl Matrix {
    /// Build a matrix from row vectors. Fails if the rows differ in length
    /// or if there are no rows at all.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let height = rows.len();
        let width = match rows.first() {
            Some(first) => first.len(),
            None => return Err(CosError::shape("matrix needs at least one row")),
        };

        if let Some((y, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(CosError::shape(format!(
                "non-rectangular input: row 0 has {width} values but row {y} has {}",
                row.len()
            )));
        }

        let values = rows.into_iter().flatten().collect();
        Ok(Self {
            width,
            height,
            values,
        })
    }

    /// Build a `width × height` matrix by evaluating `f(x, y)` for every cell.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut values = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                values.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            values,
        }
    }

    /// Square identity matrix of order `n`.
    pub fn identity(n: usize) -> Self {
        Self::from_fn(n, n, |x, y| if x == y { 1.0 } else { 0.0 })
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    fn check_bounds(&self, x: usize, y: usize) -> Result<()> {
        if x >= self.width || y >= self.height {
            return Err(CosError::range(format!(
                "({x}, {y}) is outside a {}×{} matrix",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Value at column `x`, row `y`.
    pub fn get(&self, x: usize, y: usize) -> Result<f64> {
        self.check_bounds(x, y)?;
        Ok(self.values[y * self.width + x])
    }

    /// Borrow row `y` without bounds checking beyond the slice's own.
    pub(crate) fn row_slice(&self, y: usize) -> &[f64] {
        &self.values[y * self.width..(y + 1) * self.width]
    }

    /// Row `i` as a `1 × width` matrix.
    pub fn row(&self, i: usize) -> Result<Matrix> {
        if i >= self.height {
            return Err(CosError::range(format!(
                "row {i} requested from a matrix with {} rows",
                self.height
            )));
        }
        Ok(Self {
            width: self.width,
            height: 1,
            values: self.row_slice(i).to_vec(),
        })
    }

    /// Column `j` as a `height × 1` matrix.
    pub fn column(&self, j: usize) -> Result<Matrix> {
        if j >= self.width {
            return Err(CosError::range(format!(
                "column {j} requested from a matrix with {} columns",
                self.width
            )));
        }
        Ok(Self {
            width: 1,
            height: self.height,
            values: (0..self.height).map(|y| self.values[y * self.width + j]).collect(),
        })
    }

    pub fn transpose(&self) -> Matrix {
        Self::from_fn(self.height, self.width, |x, y| self.values[x * self.width + y])
    }

    /// Element-wise multiplication by `c`.
    pub fn scale(&self, c: f64) -> Matrix {
        Self {
            width: self.width,
            height: self.height,
            values: self.values.iter().map(|v| v * c).collect(),
        }
    }

    /// Matrix product `self · other`.
    ///
    /// Each cell accumulates left to right over the shared index so results
    /// are reproducible bit for bit.
    pub fn matmul(&self, other: &Matrix) -> Result<Matrix> {
        if self.width != other.height {
            return Err(CosError::shape(format!(
                "cannot multiply {}×{} by {}×{}",
                self.height, self.width, other.height, other.width
            )));
        }
        Ok(Self::from_fn(other.width, self.height, |x, y| {
            let mut sum = 0.0;
            for k in 0..self.width {
                sum += self.values[y * self.width + k] * other.values[k * other.width + x];
            }
            sum
        }))
    }

    /// Whether the matrix has a single row or a single column.
    pub fn is_vector(&self) -> bool {
        self.height == 1 || self.width == 1
    }

    /// Inner product `Σ aᵢ·bᵢ` of two vectors of equal length.
    ///
    /// Row and column vectors may be mixed; anything that is not a vector,
    /// or vectors of different lengths, is a shape error.
    pub fn dot(&self, other: &Matrix) -> Result<f64> {
        if !self.is_vector() || !other.is_vector() || self.values.len() != other.values.len() {
            return Err(CosError::shape(format!(
                "dot product needs two vectors of equal length, got {}×{} and {}×{}",
                self.height, self.width, other.height, other.width
            )));
        }
        Ok(dot_slices(&self.values, &other.values))
    }

    /// Lazy row-major traversal yielding `(value, x, y)` for every cell.
    pub fn iter(&self) -> impl Iterator<Item = (f64, usize, usize)> + '_ {
        let width = self.width;
        self.values
            .iter()
            .enumerate()
            .map(move |(i, &v)| (v, i % width, i / width))
    }

    /// In-bounds orthogonal and diagonal neighbours of `(x, y)`.
    ///
    /// A corner has 3, an edge cell 5 and an interior cell 8 (given at least
    /// two rows and columns).
    pub fn neighbor_indexes_of(&self, x: usize, y: usize) -> Result<Vec<(usize, usize)>> {
        self.check_bounds(x, y)?;
        let has_up = y > 0;
        let has_down = y + 1 < self.height;

        let mut out = Vec::with_capacity(8);
        if x > 0 {
            out.push((x - 1, y));
            if has_up {
                out.push((x - 1, y - 1));
            }
            if has_down {
                out.push((x - 1, y + 1));
            }
        }
        if x + 1 < self.width {
            out.push((x + 1, y));
            if has_up {
                out.push((x + 1, y - 1));
            }
            if has_down {
                out.push((x + 1, y + 1));
            }
        }
        if has_up {
            out.push((x, y - 1));
        }
        if has_down {
            out.push((x, y + 1));
        }
        Ok(out)
    }

    /// In-bounds orthogonal neighbours of `(x, y)`, in rotational order
    /// (left, up, right, down).
    pub fn cardinal_neighbor_indexes_of(&self, x: usize, y: usize) -> Result<Vec<(usize, usize)>> {
        self.check_bounds(x, y)?;
        let mut out = Vec::with_capacity(4);
        if x > 0 {
            out.push((x - 1, y));
        }
        if y > 0 {
            out.push((x, y - 1));
        }
        if x + 1 < self.width {
            out.push((x + 1, y));
        }
        if y + 1 < self.height {
            out.push((x, y + 1));
        }
        Ok(out)
    }

    /// All values, row-major.
    pub fn to_flat_vec(&self) -> Vec<f64> {
        self.values.clone()
    }

    pub fn to_row_vecs(&self) -> Vec<Vec<f64>> {
        (0..self.height).map(|y| self.row_slice(y).to_vec()).collect()
    }
}

/// Left-to-right accumulation of `Σ aᵢ·bᵢ`. Callers guarantee equal lengths.
pub(crate) fn dot_slices(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).fold(0.0, |acc, (x, y)| acc + x * y)
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            let cells: Vec<String> = self.row_slice(y).iter().map(|v| format!("{v:.4}")).collect();
            writeln!(f, "[{}]", cells.join(", "))?;
        }
        Ok(())
    }
}
