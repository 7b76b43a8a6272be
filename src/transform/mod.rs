//! Data transformations applied before model fitting.

pub mod scale;

pub use scale::{standardize, ColumnScaler, ScaleResult};
