use std::fmt;

use ndarray::{ArrayView2, ArrayViewMut2};

use crate::error::{MatmulError, Result};

/// Values in the generated operands repeat with this period
const PATTERN_PERIOD: usize = 100;

/// Dense row-major matrix of `f64`
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    pub data: Vec<f64>,
    pub rows: usize,
    pub cols: usize,
}

impl Matrix {
    /// Create a zero-filled matrix with the given dimensions
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Matrix {
            data: vec![0.0; rows * cols],
            rows,
            cols,
        }
    }

    /// Create a matrix from a vector of data
    #[cfg(test)]
    pub fn from_vec(data: Vec<f64>, rows: usize, cols: usize) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(MatmulError::BufferSize {
                expected: rows * cols,
                actual: data.len(),
            });
        }
        Ok(Matrix { data, rows, cols })
    }

    /// Square n x n matrix whose entry at flat index `i` is `(i mod 100) + offset`
    pub fn patterned(n: usize, offset: f64) -> Self {
        let data = (0..n * n)
            .map(|i| (i % PATTERN_PERIOD) as f64 + offset)
            .collect();
        Matrix {
            data,
            rows: n,
            cols: n,
        }
    }

    /// Left operand of the benchmark: `A[i] = i mod 100`
    pub fn operand_a(n: usize) -> Self {
        Self::patterned(n, 0.0)
    }

    /// Right operand of the benchmark: `B[i] = (i mod 100) + 1`
    pub fn operand_b(n: usize) -> Self {
        Self::patterned(n, 1.0)
    }

    #[cfg(test)]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(self.data[row * self.cols + col])
    }

    /// Borrow a contiguous run of rows
    pub fn rows_slice(&self, start_row: usize, num_rows: usize) -> Result<&[f64]> {
        if start_row + num_rows > self.rows {
            return Err(MatmulError::RowRange {
                start: start_row,
                count: num_rows,
                rows: self.rows,
            });
        }
        Ok(&self.data[start_row * self.cols..(start_row + num_rows) * self.cols])
    }

    /// Single-process product, computed with the same kernel the workers use
    pub fn multiply(&self, other: &Matrix) -> Result<Matrix> {
        if self.cols != other.rows {
            return Err(MatmulError::BufferSize {
                expected: self.cols,
                actual: other.rows,
            });
        }

        let mut result = Matrix::zeros(self.rows, other.cols);
        multiply_row_block(&self.data, &other.data, self.cols, other.cols, &mut result.data)?;
        Ok(result)
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.data.chunks(self.cols.max(1)) {
            for (j, value) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{:.6}", value)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Multiply a block of rows of A by the full right operand B.
///
/// `a_block` holds `r` rows of width `inner`, `b` is `inner x cols` and
/// `c_block` receives `r x cols`. Every output cell is reset to zero and then
/// accumulated over `k` in ascending order, so the rounding of a given cell
/// does not depend on how the rows were partitioned.
pub fn multiply_row_block(
    a_block: &[f64],
    b: &[f64],
    inner: usize,
    cols: usize,
    c_block: &mut [f64],
) -> Result<()> {
    let block_rows = if inner == 0 { 0 } else { a_block.len() / inner };

    let a = ArrayView2::from_shape((block_rows, inner), a_block)?;
    let b = ArrayView2::from_shape((inner, cols), b)?;
    let mut c = ArrayViewMut2::from_shape((block_rows, cols), c_block)?;

    for i in 0..block_rows {
        for j in 0..cols {
            c[[i, j]] = 0.0;
            for k in 0..inner {
                c[[i, j]] += a[[i, k]] * b[[k, j]];
            }
        }
    }

    Ok(())
}
