//! Core data structures: monthly tables, feature matrices and forecast bundles.

mod forecast;
mod frame;
mod matrix;

pub use forecast::ForecastBundle;
pub use frame::{month_label, parse_month, Frame};
pub use matrix::FeatureMatrix;
