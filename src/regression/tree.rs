//! CART regression tree with squared-error splits.

use crate::core::FeatureMatrix;
use crate::error::{ForecastError, Result};
use crate::regression::traits::{check_columns, check_training_data, Regressor};
use tracing::debug;

/// Configuration for [`DecisionTree`].
#[derive(Debug, Clone)]
pub struct TreeConfig {
    /// Maximum depth of the tree (default: 8).
    pub max_depth: usize,
    /// Minimum number of rows required to split a node (default: 2).
    pub min_samples_split: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 8,
            min_samples_split: 2,
        }
    }
}

impl TreeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf(f64),
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Regression tree; leaves predict the mean target of their rows.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    config: TreeConfig,
    nodes: Vec<Node>,
    n_features: usize,
    depth: usize,
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    sse: f64,
}

impl DecisionTree {
    pub fn new(config: TreeConfig) -> Self {
        Self {
            config,
            nodes: Vec::new(),
            n_features: 0,
            depth: 0,
        }
    }

    /// Depth of the fitted tree (0 for a single leaf).
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf(_)))
            .count()
    }

    fn best_split(columns: &[Vec<f64>], y: &[f64], rows: &[usize]) -> Option<SplitCandidate> {
        let n = rows.len();
        let total: f64 = rows.iter().map(|&i| y[i]).sum();
        let total_sq: f64 = rows.iter().map(|&i| y[i] * y[i]).sum();
        let parent_sse = total_sq - total * total / n as f64;
        let mut best: Option<SplitCandidate> = None;

        for (feature, column) in columns.iter().enumerate() {
            let mut order = rows.to_vec();
            order.sort_by(|&a, &b| column[a].total_cmp(&column[b]));

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;
            for k in 0..n - 1 {
                let yi = y[order[k]];
                left_sum += yi;
                left_sq += yi * yi;
                let here = column[order[k]];
                let next = column[order[k + 1]];
                if next <= here {
                    continue;
                }
                let nl = (k + 1) as f64;
                let nr = (n - k - 1) as f64;
                let right_sum = total - left_sum;
                let right_sq = total_sq - left_sq;
                let sse = (left_sq - left_sum * left_sum / nl) + (right_sq - right_sum * right_sum / nr);
                if best.as_ref().map_or(true, |b| sse < b.sse) {
                    best = Some(SplitCandidate {
                        feature,
                        threshold: (here + next) / 2.0,
                        sse,
                    });
                }
            }
        }

        best.filter(|b| b.sse < parent_sse - 1e-12 * parent_sse.abs().max(1.0))
    }

    fn build(&mut self, columns: &[Vec<f64>], y: &[f64], rows: Vec<usize>, depth: usize) -> usize {
        let mean = rows.iter().map(|&i| y[i]).sum::<f64>() / rows.len() as f64;
        let index = self.nodes.len();
        self.nodes.push(Node::Leaf(mean));
        self.depth = self.depth.max(depth);

        if depth >= self.config.max_depth || rows.len() < self.config.min_samples_split.max(2) {
            return index;
        }
        let Some(split) = Self::best_split(columns, y, &rows) else {
            return index;
        };

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .iter()
            .partition(|&&i| columns[split.feature][i] <= split.threshold);
        let left = self.build(columns, y, left_rows, depth + 1);
        let right = self.build(columns, y, right_rows, depth + 1);
        self.nodes[index] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        index
    }

    fn predict_row(&self, x: &FeatureMatrix, row: usize) -> f64 {
        let mut node = 0;
        loop {
            match &self.nodes[node] {
                Node::Leaf(value) => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if x.columns()[*feature][row] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self::new(TreeConfig::default())
    }
}

impl Regressor for DecisionTree {
    fn fit(&mut self, x: &FeatureMatrix, y: &[f64]) -> Result<()> {
        check_training_data(x, y, 1)?;
        self.nodes.clear();
        self.depth = 0;
        self.n_features = x.n_cols();
        let rows: Vec<usize> = (0..y.len()).collect();
        self.build(x.columns(), y, rows, 0);
        debug!(
            depth = self.depth,
            leaves = self.n_leaves(),
            rows = y.len(),
            "tree fit"
        );
        Ok(())
    }

    fn predict(&self, x: &FeatureMatrix) -> Result<Vec<f64>> {
        if self.nodes.is_empty() {
            return Err(ForecastError::FitRequired);
        }
        check_columns(x, self.n_features)?;
        Ok((0..x.n_rows()).map(|i| self.predict_row(x, i)).collect())
    }

    fn name(&self) -> &str {
        "DecisionTree"
    }

    fn is_fitted(&self) -> bool {
        !self.nodes.is_empty()
    }
}
