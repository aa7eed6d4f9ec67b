//! CART regression tree.
//!
//! Splits are chosen greedily to minimize the summed squared error of the two children
//! (equivalently, maximize `S_l^2 / n_l + S_r^2 / n_r` where `S` is the target sum).
//! Thresholds sit halfway between consecutive distinct feature values and samples with
//! `x[feature] <= threshold` go left.
//!
//! Nodes are stored in a flat arena, root at index 0, children always after their parent.

use crate::model::{
    validate_training_data, Estimator, InferenceModel, ModelError, ModelResult,
};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

// Splits that improve the proxy score by less than this are treated as no-ops.
const MIN_IMPROVEMENT: f64 = 1e-12;

/// Decision tree regressor (unfitted).
#[derive(Clone, Debug, PartialEq)]
pub struct DecisionTreeRegressor {
    /// Maximum depth; `None` grows until leaves are pure or too small to split.
    pub max_depth: Option<usize>,
    /// Minimum number of samples required to split a node.
    pub min_samples_split: usize,
    /// Minimum number of samples in each child.
    pub min_samples_leaf: usize,
}

impl Default for DecisionTreeRegressor {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

impl DecisionTreeRegressor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    pub fn with_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.min_samples_leaf = min_samples_leaf;
        self
    }

    pub(crate) fn validate(&self) -> ModelResult<()> {
        if self.max_depth == Some(0) {
            return Err(ModelError::InvalidParameter(
                "max_depth must be at least 1".to_string(),
            ));
        }
        if self.min_samples_split < 2 {
            return Err(ModelError::InvalidParameter(
                "min_samples_split must be at least 2".to_string(),
            ));
        }
        if self.min_samples_leaf < 1 {
            return Err(ModelError::InvalidParameter(
                "min_samples_leaf must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Grows a tree on the rows named by `indices` (duplicates allowed, as in a
    /// bootstrap sample). Inputs must already be validated.
    pub(crate) fn fit_indices(
        &self,
        x: ArrayView2<f64>,
        y: ArrayView1<f64>,
        mut indices: Vec<usize>,
    ) -> FittedDecisionTree {
        let mut nodes = vec![TreeNode::Leaf {
            value: 0.0,
            n_samples: 0,
        }];
        // (node id, start, end, depth) over `indices`
        let mut stack = vec![(0usize, 0usize, indices.len(), 0usize)];

        while let Some((id, start, end, depth)) = stack.pop() {
            let samples = &mut indices[start..end];
            let n = samples.len();
            let sum: f64 = samples.iter().map(|&i| y[i]).sum();
            let value = sum / n as f64;

            let depth_allows = self.max_depth.map_or(true, |max| depth < max);
            let split = if depth_allows && n >= self.min_samples_split {
                self.best_split(x, y, samples, sum)
            } else {
                None
            };

            match split {
                Some(split) => {
                    let mid = partition(samples, |i| x[[i, split.feature]] <= split.threshold);
                    let left = nodes.len();
                    let right = left + 1;
                    nodes.push(TreeNode::Leaf {
                        value: 0.0,
                        n_samples: 0,
                    });
                    nodes.push(TreeNode::Leaf {
                        value: 0.0,
                        n_samples: 0,
                    });
                    nodes[id] = TreeNode::Split {
                        feature: split.feature,
                        threshold: split.threshold,
                        left,
                        right,
                    };
                    stack.push((right, start + mid, end, depth + 1));
                    stack.push((left, start, start + mid, depth + 1));
                }
                None => {
                    nodes[id] = TreeNode::Leaf {
                        value,
                        n_samples: n,
                    };
                }
            }
        }

        FittedDecisionTree {
            nodes,
            n_features: x.ncols(),
        }
    }

    fn best_split(
        &self,
        x: ArrayView2<f64>,
        y: ArrayView1<f64>,
        samples: &[usize],
        total: f64,
    ) -> Option<Split> {
        let n = samples.len();
        let mut best_score = total * total / n as f64 + MIN_IMPROVEMENT;
        let mut best = None;
        let mut pairs: Vec<(f64, f64)> = Vec::with_capacity(n);

        for feature in 0..x.ncols() {
            pairs.clear();
            pairs.extend(samples.iter().map(|&i| (x[[i, feature]], y[i])));
            pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

            if pairs[0].0 == pairs[n - 1].0 {
                continue;
            }

            let mut left_sum = 0.0;
            for k in 0..n - 1 {
                left_sum += pairs[k].1;
                let n_left = k + 1;
                let n_right = n - n_left;
                if pairs[k].0 == pairs[k + 1].0 {
                    continue;
                }
                if n_left < self.min_samples_leaf || n_right < self.min_samples_leaf {
                    continue;
                }
                let right_sum = total - left_sum;
                let score =
                    left_sum * left_sum / n_left as f64 + right_sum * right_sum / n_right as f64;
                if score > best_score {
                    best_score = score;
                    best = Some(Split {
                        feature,
                        threshold: midpoint(pairs[k].0, pairs[k + 1].0),
                    });
                }
            }
        }

        best
    }
}

impl Estimator for DecisionTreeRegressor {
    type Fitted = FittedDecisionTree;

    fn fit(&self, x: &Array2<f64>, y: &Array1<f64>) -> ModelResult<FittedDecisionTree> {
        self.validate()?;
        validate_training_data(x, y)?;
        Ok(self.fit_indices(x.view(), y.view(), (0..x.nrows()).collect()))
    }
}

struct Split {
    feature: usize,
    threshold: f64,
}

fn midpoint(a: f64, b: f64) -> f64 {
    let mid = a + (b - a) / 2.0;
    // Rounding can land on `b` for adjacent floats, which would send it left
    if mid >= b {
        a
    } else {
        mid
    }
}

/// Reorders `items` so every element satisfying `pred` comes first; returns their count.
fn partition<F: Fn(usize) -> bool>(items: &mut [usize], pred: F) -> usize {
    let mut mid = 0;
    for k in 0..items.len() {
        if pred(items[k]) {
            items.swap(mid, k);
            mid += 1;
        }
    }
    mid
}

/// A node of a fitted tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    Leaf {
        value: f64,
        n_samples: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Serializable tree: the node arena plus its input width.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    pub nodes: Vec<TreeNode>,
    pub n_features: usize,
}

/// Fitted decision tree ready for inference.
#[derive(Clone, Debug)]
pub struct FittedDecisionTree {
    nodes: Vec<TreeNode>,
    n_features: usize,
}

impl FittedDecisionTree {
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, TreeNode::Leaf { .. }))
            .count()
    }

    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            if let TreeNode::Split { left, right, .. } = self.nodes[id] {
                stack.push((left, depth + 1));
                stack.push((right, depth + 1));
            }
        }
        max_depth
    }
}

impl InferenceModel for FittedDecisionTree {
    type ParamsRepr = TreeParams;

    fn predict(&self, input: ArrayView1<f64>) -> f64 {
        let mut id = 0;
        loop {
            match self.nodes[id] {
                TreeNode::Leaf { value, .. } => return value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => id = if input[feature] <= threshold { left } else { right },
            }
        }
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn extract_params(&self) -> TreeParams {
        TreeParams {
            nodes: self.nodes.clone(),
            n_features: self.n_features,
        }
    }

    fn from_params(params: TreeParams) -> ModelResult<Self> {
        if params.nodes.is_empty() {
            return Err(ModelError::InvalidParameter("tree has no nodes".to_string()));
        }
        let n_nodes = params.nodes.len();
        for (id, node) in params.nodes.iter().enumerate() {
            match *node {
                TreeNode::Leaf { value, .. } if !value.is_finite() => {
                    return Err(ModelError::InvalidParameter(format!(
                        "leaf {id} has non-finite value"
                    )));
                }
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    // children after parent rules out cycles
                    if left <= id || right <= id || left >= n_nodes || right >= n_nodes {
                        return Err(ModelError::InvalidParameter(format!(
                            "node {id} has invalid children ({left}, {right})"
                        )));
                    }
                    if feature >= params.n_features || threshold.is_nan() {
                        return Err(ModelError::InvalidParameter(format!(
                            "node {id} splits on invalid feature {feature}"
                        )));
                    }
                }
                TreeNode::Leaf { .. } => {}
            }
        }
        Ok(Self {
            nodes: params.nodes,
            n_features: params.n_features,
        })
    }
}
