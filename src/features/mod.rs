//! Feature engineering for the regression ensemble.
//!
//! # Example
//!
//! ```
//! use realty_forecast::core::Frame;
//! use realty_forecast::features::FeatureEngineering;
//!
//! let months = (1..=6).map(|m| format!("2020-{:02}", m)).collect();
//! let frame = Frame::new(months)
//!     .unwrap()
//!     .with_column("count_sale", vec![10.0, 12.0, 11.0, 14.0, 15.0, 13.0])
//!     .unwrap();
//!
//! let (frame, names) = FeatureEngineering::new(frame, &["count_sale"])
//!     .unwrap()
//!     .create_lag_features(&[1])
//!     .unwrap()
//!     .create_month_one_hot()
//!     .unwrap()
//!     .into_parts();
//!
//! assert_eq!(names[1], "count_sale_lag1");
//! assert_eq!(frame.column("count_sale_lag1").unwrap()[1], 2.0);
//! ```

pub mod engineering;

pub use engineering::{
    lag_difference, month_column_name, offset_pct_change, FeatureEngineering, PCT_CHANGE_OFFSET,
};
