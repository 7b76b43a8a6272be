//! Regression learners used by the per-horizon ensemble.
//!
//! - [`LassoCv`]: L1 feature selection with a cross-validated penalty
//! - [`RidgeCv`]: ridge regression with leave-one-out penalty choice
//! - [`DecisionTree`]: CART regression tree
//! - [`HorizonModel`]: standardise, select and fit for one horizon

mod horizon;
mod lasso;
mod ridge;
mod traits;
mod tree;

pub use horizon::HorizonModel;
pub use lasso::{LassoCv, LassoCvConfig};
pub use ridge::{RidgeCv, DEFAULT_RIDGE_ALPHAS};
pub use traits::{BoxedRegressor, Regressor};
pub use tree::{DecisionTree, TreeConfig};

use serde::{Deserialize, Serialize};

/// Final regressor fitted after feature selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Ridge regression on the standardised selected columns.
    #[default]
    Linear,
    /// Regression tree on the raw selected columns.
    Tree,
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelKind::Linear => write!(f, "linear"),
            ModelKind::Tree => write!(f, "tree"),
        }
    }
}
