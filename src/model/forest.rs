//! Random forest regressor: an average of CART trees grown on bootstrap samples.
//!
//! Trees are independent, so they are grown in parallel with rayon. Each tree draws its
//! bootstrap sample from its own `ChaCha8Rng` seeded from the forest seed and the tree
//! index, which keeps the fitted forest identical regardless of thread scheduling.

use crate::model::tree::{DecisionTreeRegressor, FittedDecisionTree, TreeParams};
use crate::model::{
    validate_training_data, Estimator, InferenceModel, ModelError, ModelResult,
};
use ndarray::{Array1, Array2, ArrayView1};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Random forest regressor (unfitted).
#[derive(Clone, Debug, PartialEq)]
pub struct RandomForestRegressor {
    pub n_estimators: usize,
    /// Draw each tree's training rows with replacement.
    pub bootstrap: bool,
    pub seed: u64,
    pub tree: DecisionTreeRegressor,
}

impl Default for RandomForestRegressor {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            bootstrap: true,
            seed: 42,
            tree: DecisionTreeRegressor::default(),
        }
    }
}

impl RandomForestRegressor {
    pub fn new(n_estimators: usize) -> Self {
        Self {
            n_estimators,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_bootstrap(mut self, bootstrap: bool) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    pub fn with_tree(mut self, tree: DecisionTreeRegressor) -> Self {
        self.tree = tree;
        self
    }

    fn tree_rng(&self, index: usize) -> ChaCha8Rng {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        rng.set_stream(index as u64);
        rng
    }
}

impl Estimator for RandomForestRegressor {
    type Fitted = FittedRandomForest;

    fn fit(&self, x: &Array2<f64>, y: &Array1<f64>) -> ModelResult<FittedRandomForest> {
        if self.n_estimators == 0 {
            return Err(ModelError::InvalidParameter(
                "n_estimators must be at least 1".to_string(),
            ));
        }
        self.tree.validate()?;
        validate_training_data(x, y)?;

        let n = x.nrows();
        let trees = (0..self.n_estimators)
            .into_par_iter()
            .map(|t| {
                let indices = if self.bootstrap {
                    let mut rng = self.tree_rng(t);
                    (0..n).map(|_| rng.random_range(0..n)).collect()
                } else {
                    (0..n).collect()
                };
                self.tree.fit_indices(x.view(), y.view(), indices)
            })
            .collect();

        Ok(FittedRandomForest {
            trees,
            n_features: x.ncols(),
        })
    }
}

/// Serializable forest: one [`TreeParams`] per tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub trees: Vec<TreeParams>,
    pub n_features: usize,
}

/// Fitted random forest ready for inference.
#[derive(Clone, Debug)]
pub struct FittedRandomForest {
    trees: Vec<FittedDecisionTree>,
    n_features: usize,
}

impl FittedRandomForest {
    pub fn trees(&self) -> &[FittedDecisionTree] {
        &self.trees
    }
}

impl InferenceModel for FittedRandomForest {
    type ParamsRepr = ForestParams;

    fn predict(&self, input: ArrayView1<f64>) -> f64 {
        let total: f64 = self.trees.iter().map(|t| t.predict(input)).sum();
        total / self.trees.len() as f64
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn extract_params(&self) -> ForestParams {
        ForestParams {
            trees: self.trees.iter().map(InferenceModel::extract_params).collect(),
            n_features: self.n_features,
        }
    }

    fn from_params(params: ForestParams) -> ModelResult<Self> {
        if params.trees.is_empty() {
            return Err(ModelError::InvalidParameter("forest has no trees".to_string()));
        }
        let trees = params
            .trees
            .into_iter()
            .map(|tree| {
                if tree.n_features != params.n_features {
                    return Err(ModelError::ShapeMismatch {
                        expected: format!("{} features", params.n_features),
                        got: format!("tree with {} features", tree.n_features),
                    });
                }
                FittedDecisionTree::from_params(tree)
            })
            .collect::<ModelResult<Vec<_>>>()?;
        Ok(Self {
            trees,
            n_features: params.n_features,
        })
    }
}
