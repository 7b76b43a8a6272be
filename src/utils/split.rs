//! Expanding-window splits for rolling-origin evaluation.
//!
//! A series of `n` rows is cut into folds whose training slice always starts
//! at row 0 and grows by one window per fold, each paired with the window
//! that immediately follows it as the test slice.

use crate::core::FeatureMatrix;
use crate::error::{ForecastError, Result};
use std::ops::Range;

/// How the window size is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitSpec {
    /// Fixed window length; the fold count is derived from it.
    WindowLength(usize),
    /// Fixed fold count; the window length is `floor(n / folds)`.
    Folds(usize),
}

/// One rolling-origin fold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    /// Fold position, 0-based.
    pub index: usize,
    /// Training rows, always starting at 0.
    pub train: Range<usize>,
    /// Test rows, directly after the training rows (possibly empty).
    pub test: Range<usize>,
}

impl Fold {
    pub fn train_len(&self) -> usize {
        self.train.len()
    }

    pub fn test_len(&self) -> usize {
        self.test.len()
    }

    pub fn train_slice<'a>(&self, values: &'a [f64]) -> &'a [f64] {
        &values[self.train.clone()]
    }

    pub fn test_slice<'a>(&self, values: &'a [f64]) -> &'a [f64] {
        &values[self.test.clone()]
    }

    pub fn train_rows(&self, x: &FeatureMatrix) -> Result<FeatureMatrix> {
        x.slice_rows(self.train.start, self.train.end)
    }

    pub fn test_rows(&self, x: &FeatureMatrix) -> Result<FeatureMatrix> {
        x.slice_rows(self.test.start, self.test.end)
    }
}

/// All folds of a split together with the recorded split boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollingSplit {
    /// Window length actually used.
    pub window_length: usize,
    /// Folds in order.
    pub folds: Vec<Fold>,
    /// Start row of each fold's test slice.
    pub split_indices: Vec<usize>,
}

impl RollingSplit {
    /// Number of folds.
    pub fn n_folds(&self) -> usize {
        self.folds.len()
    }

    pub fn fold(&self, index: usize) -> Result<&Fold> {
        self.folds.get(index).ok_or(ForecastError::IndexOutOfBounds {
            index,
            size: self.folds.len(),
        })
    }

    /// Validate a half-open group range `[start, end)` against the fold count.
    pub fn check_group_range(&self, start: usize, end: usize) -> Result<()> {
        if start > end {
            return Err(ForecastError::InvalidParameter(format!(
                "start group {} is after end group {}",
                start, end
            )));
        }
        if end > self.n_folds() {
            return Err(ForecastError::IndexOutOfBounds {
                index: end,
                size: self.n_folds(),
            });
        }
        Ok(())
    }
}

/// Split `total` ordered rows into expanding training windows.
///
/// With `WindowLength(w)` there are `ceil(total / w)` folds: fold `i` trains
/// on `[0, (i+1)w)` and tests on the next `w` rows, clipped to the data; the
/// last fold absorbs any remainder and trains on every row with an empty
/// test slice. With `Folds(k)` the window is `floor(total / k)` and the last
/// fold tests on all rows after `k * w`. When fewer rows than one window are
/// available the result is a single fold over all rows with an empty test
/// slice.
///
/// # Example
/// ```
/// use realty_forecast::utils::split::{rolling_split, SplitSpec};
///
/// let split = rolling_split(25, SplitSpec::WindowLength(10)).unwrap();
/// let train: Vec<usize> = split.folds.iter().map(|f| f.train_len()).collect();
/// let test: Vec<usize> = split.folds.iter().map(|f| f.test_len()).collect();
/// assert_eq!(train, vec![10, 20, 25]);
/// assert_eq!(test, vec![10, 5, 0]);
/// ```
pub fn rolling_split(total: usize, spec: SplitSpec) -> Result<RollingSplit> {
    let (window_length, n_folds) = match spec {
        SplitSpec::WindowLength(0) => {
            return Err(ForecastError::InvalidParameter(
                "window length must be positive".to_string(),
            ))
        }
        SplitSpec::Folds(0) => {
            return Err(ForecastError::InvalidParameter(
                "fold count must be positive".to_string(),
            ))
        }
        SplitSpec::WindowLength(w) => (w, total.div_ceil(w).max(1)),
        SplitSpec::Folds(k) => {
            let w = total / k;
            if w == 0 {
                (total, 1)
            } else {
                (w, k)
            }
        }
    };

    if window_length == 0 || total < window_length {
        let fold = Fold {
            index: 0,
            train: 0..total,
            test: total..total,
        };
        return Ok(RollingSplit {
            window_length,
            folds: vec![fold],
            split_indices: vec![total],
        });
    }

    let mut folds = Vec::with_capacity(n_folds);
    let mut split_indices = Vec::with_capacity(n_folds);
    for i in 0..n_folds {
        let train_end = ((i + 1) * window_length).min(total);
        let test_end = if i + 1 < n_folds {
            ((i + 2) * window_length).min(total)
        } else {
            total
        };
        folds.push(Fold {
            index: i,
            train: 0..train_end,
            test: train_end..test_end,
        });
        split_indices.push(train_end);
    }

    Ok(RollingSplit {
        window_length,
        folds,
        split_indices,
    })
}
