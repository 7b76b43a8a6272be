//! Derived regression features from a monthly table.
//!
//! Three families are produced from the base feature columns:
//! - `col_lagN`: N-period difference, `col[t] - col[t-N]`
//! - `col_pctN`: N-period percentage change of `col + 100`
//! - `01m` .. `12m`: one-hot calendar month indicators
//!
//! Rows before the first full lag are NaN, exactly as in the source column
//! alignment; the regression models skip them through `start_fit`.

use crate::core::Frame;
use crate::error::{ForecastError, Result};
use tracing::debug;

/// Offset added before a percentage change so values near zero do not flip
/// sign or explode.
pub const PCT_CHANGE_OFFSET: f64 = 100.0;

/// `values[t] - values[t-n]`, NaN for `t < n`.
pub fn lag_difference(values: &[f64], n: usize) -> Vec<f64> {
    (0..values.len())
        .map(|t| {
            if t >= n {
                values[t] - values[t - n]
            } else {
                f64::NAN
            }
        })
        .collect()
}

/// Percentage change over `n` periods of `values + 100`, NaN for `t < n`.
pub fn offset_pct_change(values: &[f64], n: usize) -> Vec<f64> {
    (0..values.len())
        .map(|t| {
            if t >= n {
                (values[t] + PCT_CHANGE_OFFSET) / (values[t - n] + PCT_CHANGE_OFFSET) - 1.0
            } else {
                f64::NAN
            }
        })
        .collect()
}

/// Name of the one-hot column for a two-character month token.
pub fn month_column_name(token: &str) -> String {
    format!("{}m", token)
}

/// Accumulates derived columns on top of a frame.
///
/// The feature list starts as the base columns in their given order; new
/// names are appended in the order the builder methods are called.
#[derive(Debug, Clone)]
pub struct FeatureEngineering {
    frame: Frame,
    base_columns: Vec<String>,
    feature_names: Vec<String>,
}

impl FeatureEngineering {
    /// Start from `frame` with `base_columns` as the raw features.
    ///
    /// Fails with `MissingColumn` if any base column is absent.
    pub fn new<S: AsRef<str>>(frame: Frame, base_columns: &[S]) -> Result<Self> {
        frame.require_columns(base_columns)?;
        let base: Vec<String> = base_columns
            .iter()
            .map(|c| c.as_ref().to_string())
            .collect();
        Ok(Self {
            frame,
            feature_names: base.clone(),
            base_columns: base,
        })
    }

    /// Add `col_lagN` for every base column and every requested N.
    pub fn create_lag_features(mut self, lags: &[usize]) -> Result<Self> {
        for col in self.base_columns.clone() {
            for &n in lags {
                check_period(n)?;
                let derived = lag_difference(self.frame.column(&col)?, n);
                let name = format!("{}_lag{}", col, n);
                self.push(&name, derived)?;
            }
        }
        Ok(self)
    }

    /// Add `col_pctN` for every base column and every requested N.
    pub fn create_pct_change_features(mut self, periods: &[usize]) -> Result<Self> {
        for col in self.base_columns.clone() {
            for &n in periods {
                check_period(n)?;
                let derived = offset_pct_change(self.frame.column(&col)?, n);
                let name = format!("{}_pct{}", col, n);
                self.push(&name, derived)?;
            }
        }
        Ok(self)
    }

    /// Add twelve indicator columns `01m` .. `12m` from the month labels.
    pub fn create_month_one_hot(mut self) -> Result<Self> {
        let n = self.frame.len();
        let mut indicators = vec![vec![0.0; n]; 12];
        for row in 0..n {
            let token = self.frame.month_token(row)?;
            let month: usize = token.parse().map_err(|_| {
                ForecastError::TimestampError(format!("invalid month token '{}'", token))
            })?;
            if !(1..=12).contains(&month) {
                return Err(ForecastError::TimestampError(format!(
                    "month token '{}' out of range",
                    token
                )));
            }
            indicators[month - 1][row] = 1.0;
        }
        for (i, values) in indicators.into_iter().enumerate() {
            let name = month_column_name(&format!("{:02}", i + 1));
            self.push(&name, values)?;
        }
        Ok(self)
    }

    fn push(&mut self, name: &str, values: Vec<f64>) -> Result<()> {
        self.frame.insert_column(name, values)?;
        if !self.feature_names.iter().any(|f| f == name) {
            self.feature_names.push(name.to_string());
        }
        debug!(column = name, "added derived feature");
        Ok(())
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Augmented frame and the full feature list.
    pub fn into_parts(self) -> (Frame, Vec<String>) {
        (self.frame, self.feature_names)
    }
}

fn check_period(n: usize) -> Result<()> {
    if n == 0 {
        return Err(ForecastError::InvalidParameter(
            "lag period must be at least 1".to_string(),
        ));
    }
    Ok(())
}
