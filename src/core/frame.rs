//! Monthly tabular dataset: one month column plus named numeric columns.

use crate::core::FeatureMatrix;
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;

/// Parse a `YYYY-MM` month label into the first day of that month.
pub fn parse_month(label: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", label.trim()), "%Y-%m-%d")
        .map_err(|e| ForecastError::TimestampError(format!("invalid month '{}': {}", label, e)))
}

/// Format a date as a `YYYY-MM` month label.
pub fn month_label(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// A time-ordered monthly table.
///
/// Rows are months in strictly increasing order; the ordering is never
/// changed after construction. Columns are stored column-major like
/// [`FeatureMatrix`].
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    months: Vec<String>,
    labels: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl Frame {
    /// Create a frame over the given months (`YYYY-MM`, strictly increasing).
    pub fn new(months: Vec<String>) -> Result<Self> {
        let mut previous: Option<NaiveDate> = None;
        for label in &months {
            let date = parse_month(label)?;
            if let Some(prev) = previous {
                if date <= prev {
                    return Err(ForecastError::TimestampError(format!(
                        "months must be strictly increasing, '{}' follows {}",
                        label,
                        month_label(prev)
                    )));
                }
            }
            previous = Some(date);
        }
        Ok(Self {
            months,
            labels: Vec::new(),
            values: Vec::new(),
        })
    }

    /// Builder-style column insertion.
    pub fn with_column(mut self, name: &str, values: Vec<f64>) -> Result<Self> {
        self.insert_column(name, values)?;
        Ok(self)
    }

    /// Insert a column, replacing any existing column of the same name.
    pub fn insert_column(&mut self, name: &str, values: Vec<f64>) -> Result<()> {
        if values.len() != self.months.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: self.months.len(),
                got: values.len(),
            });
        }
        match self.labels.iter().position(|l| l == name) {
            Some(i) => self.values[i] = values,
            None => {
                self.labels.push(name.to_string());
                self.values.push(values);
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.months.len()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    pub fn months(&self) -> &[String] {
        &self.months
    }

    pub fn column_names(&self) -> &[String] {
        &self.labels
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.labels.iter().any(|l| l == name)
    }

    pub fn column(&self, name: &str) -> Result<&[f64]> {
        self.labels
            .iter()
            .position(|l| l == name)
            .map(|i| self.values[i].as_slice())
            .ok_or_else(|| ForecastError::MissingColumn(name.to_string()))
    }

    /// Fail on the first required column that is not present.
    pub fn require_columns<S: AsRef<str>>(&self, names: &[S]) -> Result<()> {
        for name in names {
            if !self.has_column(name.as_ref()) {
                return Err(ForecastError::MissingColumn(name.as_ref().to_string()));
            }
        }
        Ok(())
    }

    /// Two-character calendar-month token of row `index` (e.g. `"07"`).
    pub fn month_token(&self, index: usize) -> Result<&str> {
        let label = self
            .months
            .get(index)
            .ok_or(ForecastError::IndexOutOfBounds {
                index,
                size: self.months.len(),
            })?;
        let start = label.len().saturating_sub(2);
        label
            .get(start..)
            .ok_or_else(|| ForecastError::TimestampError(format!("invalid month '{}'", label)))
    }

    /// Extract the named columns, in order, as a feature matrix.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<FeatureMatrix> {
        self.require_columns(names)?;
        let columns = names
            .iter()
            .map(|n| self.column(n.as_ref()).map(|c| c.to_vec()))
            .collect::<Result<Vec<_>>>()?;
        let labels = names.iter().map(|n| n.as_ref().to_string()).collect();
        if columns.is_empty() {
            return Ok(FeatureMatrix::empty(self.len()));
        }
        FeatureMatrix::new(labels, columns)
    }

    /// Contiguous row range `[start, end)`.
    pub fn slice(&self, start: usize, end: usize) -> Result<Self> {
        if start > end || end > self.len() {
            return Err(ForecastError::IndexOutOfBounds {
                index: end,
                size: self.len(),
            });
        }
        Ok(Self {
            months: self.months[start..end].to_vec(),
            labels: self.labels.clone(),
            values: self.values.iter().map(|c| c[start..end].to_vec()).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn months(n: usize) -> Vec<String> {
        (0..n)
            .map(|i| format!("{}-{:02}", 2016 + i / 12, i % 12 + 1))
            .collect()
    }

    #[test]
    fn rejects_unordered_or_malformed_months() {
        assert!(Frame::new(vec!["2020-01".into(), "2019-12".into()]).is_err());
        assert!(Frame::new(vec!["2020-13".into()]).is_err());
        assert!(Frame::new(vec!["January".into()]).is_err());
        assert!(Frame::new(months(24)).is_ok());
    }

    #[test]
    fn columns_are_validated_and_replaced() {
        let frame = Frame::new(months(3))
            .unwrap()
            .with_column("a", vec![1.0, 2.0, 3.0])
            .unwrap();
        assert!(frame.clone().with_column("b", vec![1.0]).is_err());

        let frame = frame.with_column("a", vec![4.0, 5.0, 6.0]).unwrap();
        assert_eq!(frame.column_names().len(), 1);
        assert_eq!(frame.column("a").unwrap(), &[4.0, 5.0, 6.0]);
    }

    #[test]
    fn require_columns_fails_fast() {
        let frame = Frame::new(months(2))
            .unwrap()
            .with_column("count_sale", vec![1.0, 2.0])
            .unwrap();
        assert!(frame.require_columns(&["count_sale"]).is_ok());
        assert_eq!(
            frame.require_columns(&["count_sale", "count_list"]),
            Err(ForecastError::MissingColumn("count_list".into()))
        );
    }

    #[test]
    fn month_token_is_last_two_characters() {
        let frame = Frame::new(months(14)).unwrap();
        assert_eq!(frame.month_token(0).unwrap(), "01");
        assert_eq!(frame.month_token(13).unwrap(), "02");
    }

    #[test]
    fn select_and_slice() {
        let frame = Frame::new(months(4))
            .unwrap()
            .with_column("a", vec![1.0, 2.0, 3.0, 4.0])
            .unwrap()
            .with_column("b", vec![5.0, 6.0, 7.0, 8.0])
            .unwrap();
        let m = frame.select(&["b", "a"]).unwrap();
        assert_eq!(m.names(), &["b".to_string(), "a".to_string()]);
        assert_eq!(m.column(0).unwrap(), &[5.0, 6.0, 7.0, 8.0]);

        let s = frame.slice(1, 3).unwrap();
        assert_eq!(s.months(), &["2016-02".to_string(), "2016-03".to_string()]);
        assert_eq!(s.column("b").unwrap(), &[6.0, 7.0]);
    }
}
