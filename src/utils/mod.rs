//! Utility functions for forecasting models.

pub mod bootstrap;
pub mod linalg;
pub mod metrics;
pub mod optimization;
pub mod split;
pub mod stats;

pub use bootstrap::{resample_indices, seeded_rng, summarize, BootstrapSummary};
pub use metrics::{calculate_metrics, overlap_metrics, AccuracyMetrics};
pub use optimization::{central_difference, minimize_adam, Adam, AdamConfig, AdamResult};
pub use split::{rolling_split, Fold, RollingSplit, SplitSpec};
pub use stats::quantile_normal;
