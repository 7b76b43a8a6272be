//! Forecasting models.

pub mod combined;
pub mod regression_ensemble;
pub mod rolling_structural;
pub mod structural;

pub use combined::{RollingCombined, WindowForecast};
pub use regression_ensemble::{
    horizon_target, HorizonDiagnostics, RegressionConfig, RegressionForecast, RegressionWindow,
    RollingRegression, RollingRegressionResult,
};
pub use rolling_structural::RollingStructural;
pub use structural::{StructuralConfig, StructuralForecaster};
