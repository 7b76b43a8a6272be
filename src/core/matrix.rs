//! Column-major feature matrix used by the regression models.

use crate::error::{ForecastError, Result};

/// Named numeric feature columns with rows aligned to a monthly series.
///
/// Values are stored column-major: `columns[feature][row]`. The row count is
/// tracked separately so a matrix with no columns still knows its length.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureMatrix {
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
    n_rows: usize,
}

impl FeatureMatrix {
    /// Build a matrix from named columns of equal length.
    pub fn new(names: Vec<String>, columns: Vec<Vec<f64>>) -> Result<Self> {
        if names.len() != columns.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: names.len(),
                got: columns.len(),
            });
        }
        let n_rows = columns.first().map(|c| c.len()).unwrap_or(0);
        for col in &columns {
            if col.len() != n_rows {
                return Err(ForecastError::DimensionMismatch {
                    expected: n_rows,
                    got: col.len(),
                });
            }
        }
        Ok(Self {
            names,
            columns,
            n_rows,
        })
    }

    /// Build a matrix with no feature columns but a fixed number of rows.
    pub fn empty(n_rows: usize) -> Self {
        Self {
            names: Vec::new(),
            columns: Vec::new(),
            n_rows,
        }
    }

    /// Build a matrix from row-major data.
    pub fn from_rows(names: Vec<String>, rows: &[Vec<f64>]) -> Result<Self> {
        let k = names.len();
        let mut columns = vec![Vec::with_capacity(rows.len()); k];
        for row in rows {
            if row.len() != k {
                return Err(ForecastError::DimensionMismatch {
                    expected: k,
                    got: row.len(),
                });
            }
            for (j, &v) in row.iter().enumerate() {
                columns[j].push(v);
            }
        }
        Ok(Self {
            names,
            columns,
            n_rows: rows.len(),
        })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// All columns, `columns()[feature][row]`.
    pub fn columns(&self) -> &[Vec<f64>] {
        &self.columns
    }

    pub fn column(&self, index: usize) -> Result<&[f64]> {
        self.columns
            .get(index)
            .map(|c| c.as_slice())
            .ok_or(ForecastError::IndexOutOfBounds {
                index,
                size: self.columns.len(),
            })
    }

    pub fn column_by_name(&self, name: &str) -> Result<&[f64]> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.columns[i].as_slice())
            .ok_or_else(|| ForecastError::MissingColumn(name.to_string()))
    }

    /// Copy out a single row.
    pub fn row(&self, index: usize) -> Result<Vec<f64>> {
        if index >= self.n_rows {
            return Err(ForecastError::IndexOutOfBounds {
                index,
                size: self.n_rows,
            });
        }
        Ok(self.columns.iter().map(|c| c[index]).collect())
    }

    /// Contiguous row range `[start, end)`.
    pub fn slice_rows(&self, start: usize, end: usize) -> Result<Self> {
        if start > end || end > self.n_rows {
            return Err(ForecastError::IndexOutOfBounds {
                index: end,
                size: self.n_rows,
            });
        }
        Ok(Self {
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c[start..end].to_vec()).collect(),
            n_rows: end - start,
        })
    }

    /// The last `k` rows (all rows when `k` exceeds the length).
    pub fn last_rows(&self, k: usize) -> Self {
        let start = self.n_rows.saturating_sub(k);
        Self {
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c[start..].to_vec()).collect(),
            n_rows: self.n_rows - start,
        }
    }

    /// Gather rows by index; indices may repeat.
    pub fn take_rows(&self, indices: &[usize]) -> Result<Self> {
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.n_rows) {
            return Err(ForecastError::IndexOutOfBounds {
                index: bad,
                size: self.n_rows,
            });
        }
        Ok(Self {
            names: self.names.clone(),
            columns: self
                .columns
                .iter()
                .map(|c| indices.iter().map(|&i| c[i]).collect())
                .collect(),
            n_rows: indices.len(),
        })
    }

    /// Keep only the given columns, in the given order.
    pub fn select_columns(&self, indices: &[usize]) -> Result<Self> {
        let mut names = Vec::with_capacity(indices.len());
        let mut columns = Vec::with_capacity(indices.len());
        for &i in indices {
            let col = self.column(i)?;
            names.push(self.names[i].clone());
            columns.push(col.to_vec());
        }
        Ok(Self {
            names,
            columns,
            n_rows: self.n_rows,
        })
    }

    /// True when any cell is NaN or infinite.
    pub fn has_non_finite(&self) -> bool {
        self.columns
            .iter()
            .any(|c| c.iter().any(|v| !v.is_finite()))
    }
}
