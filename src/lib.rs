//! # realty-forecast
//!
//! Rolling multi-horizon forecasting of monthly real-estate market series.
//!
//! Combines a per-horizon regression ensemble (lasso selection, ridge or
//! tree, bootstrap uncertainty) with a Bayesian structural time-series model
//! (local linear trend plus seasonal, fit by variational inference), blends
//! the two over a short horizon and extends the forecast with the structural
//! model.

// Allow some clippy warnings for cleaner code in specific cases
#![allow(clippy::too_many_arguments)]
#![allow(clippy::type_complexity)]
#![allow(clippy::needless_range_loop)]

pub mod config;
pub mod core;
pub mod data;
pub mod error;
pub mod features;
pub mod models;
pub mod regression;
pub mod transform;
pub mod utils;

pub use error::{ForecastError, Result};

pub mod prelude {
    pub use crate::config::ForecastConfig;
    pub use crate::core::{FeatureMatrix, ForecastBundle, Frame};
    pub use crate::error::{ForecastError, Result};
    pub use crate::features::FeatureEngineering;
    pub use crate::models::{
        RegressionConfig, RollingCombined, RollingRegression, RollingStructural,
        StructuralConfig, StructuralForecaster, WindowForecast,
    };
    pub use crate::regression::{ModelKind, Regressor};
    pub use crate::utils::{calculate_metrics, quantile_normal, AccuracyMetrics};
}
