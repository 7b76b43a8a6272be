//! Error types for the realty-forecast library.

use thiserror::Error;

/// Result type alias for forecast operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors that can occur during forecasting operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Month/timestamp-related error.
    #[error("timestamp error: {0}")]
    TimestampError(String),

    /// Model has not been fitted yet.
    #[error("model must be fitted before prediction")]
    FitRequired,

    /// Missing values detected when not allowed.
    #[error("missing values detected in data")]
    MissingValues,

    /// A required column is absent from the source table.
    #[error("missing required column: {0}")]
    MissingColumn(String),

    /// Index out of bounds.
    #[error("index out of bounds: {index} (size: {size})")]
    IndexOutOfBounds { index: usize, size: usize },

    /// Computation error (e.g., numerical issues).
    #[error("computation error: {0}")]
    ComputationError(String),

    /// Malformed input records or configuration documents.
    #[error("data format error: {0}")]
    DataFormat(String),
}

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::DataFormat(err.to_string())
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::DataFormat(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_descriptive() {
        let err = ForecastError::EmptyData;
        assert_eq!(err.to_string(), "empty input data");

        let err = ForecastError::InsufficientData { needed: 24, got: 5 };
        assert_eq!(
            err.to_string(),
            "insufficient data: need at least 24, got 5"
        );

        let err = ForecastError::InvalidParameter("horizon must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "invalid parameter: horizon must be positive"
        );

        let err = ForecastError::MissingColumn("count_sale".to_string());
        assert_eq!(err.to_string(), "missing required column: count_sale");

        let err = ForecastError::FitRequired;
        assert_eq!(err.to_string(), "model must be fitted before prediction");
    }

    #[test]
    fn errors_are_clonable_and_comparable() {
        let err1 = ForecastError::MissingValues;
        let err2 = err1.clone();
        assert_eq!(err1, err2);
    }

    #[test]
    fn json_errors_map_to_data_format() {
        let err: ForecastError = serde_json::from_str::<u32>("not json").unwrap_err().into();
        assert!(matches!(err, ForecastError::DataFormat(_)));
    }
}
