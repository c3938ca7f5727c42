use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Row-major matrix of weekly values: one row per realization, one column
/// per week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

#[derive(Debug, Error)]
pub enum MatrixError {
    #[error("matrix data length {len} does not match {rows} rows x {cols} columns")]
    ShapeMismatch { rows: usize, cols: usize, len: usize },
    #[error("matrix must have at least one row and one column, got {rows}x{cols}")]
    Empty { rows: usize, cols: usize },
    #[error("non-finite value {value} at row {row}, week {week}")]
    NonFinite { row: usize, week: usize, value: f64 },
}

impl WeeklyMatrix {
    /// Build a matrix from a flat row-major buffer, rejecting shape
    /// mismatches and non-finite entries.
    pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self, MatrixError> {
        if rows == 0 || cols == 0 {
            return Err(MatrixError::Empty { rows, cols });
        }
        if data.len() != rows * cols {
            return Err(MatrixError::ShapeMismatch {
                rows,
                cols,
                len: data.len(),
            });
        }
        for (idx, &value) in data.iter().enumerate() {
            if !value.is_finite() {
                return Err(MatrixError::NonFinite {
                    row: idx / cols,
                    week: idx % cols,
                    value,
                });
            }
        }
        Ok(Self { rows, cols, data })
    }

    /// Build a matrix from per-realization rows of equal length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, MatrixError> {
        let row_count = rows.len();
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        if row_count == 0 || cols == 0 {
            return Err(MatrixError::Empty {
                rows: row_count,
                cols,
            });
        }
        let mut data = Vec::with_capacity(row_count * cols);
        for row in &rows {
            if row.len() != cols {
                return Err(MatrixError::ShapeMismatch {
                    rows: row_count,
                    cols,
                    len: row_count * row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Self::new(row_count, cols, data)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn row(&self, r: usize) -> Option<&[f64]> {
        if r < self.rows {
            Some(&self.data[r * self.cols..(r + 1) * self.cols])
        } else {
            None
        }
    }

    /// Multiply every entry by `factor`, consuming the matrix. Used for
    /// scenario scaling at ingest.
    pub fn scaled(mut self, factor: f64) -> Self {
        if factor != 1.0 {
            for value in &mut self.data {
                *value *= factor;
            }
        }
        self
    }
}
