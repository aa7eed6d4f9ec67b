use crate::model::{
    FittedDecisionTree, FittedRandomForest, ForestParams, Fitted, InferenceModel, LinearModel,
    ModelResult, SerializableLinearParams, TreeParams,
};
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The candidate model families compared during training.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    LinearRegression,
    RandomForest,
    DecisionTree,
}

impl ModelKind {
    /// Candidates in evaluation order. On equal test MSE the earlier one wins.
    pub const ALL: [ModelKind; 3] = [
        ModelKind::LinearRegression,
        ModelKind::RandomForest,
        ModelKind::DecisionTree,
    ];
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModelKind::LinearRegression => "Linear Regression",
            ModelKind::RandomForest => "Random Forest",
            ModelKind::DecisionTree => "Decision Tree",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ModelParams {
    Linear(SerializableLinearParams),
    DecisionTree(TreeParams),
    RandomForest(ForestParams),
}

/// Any fitted candidate model.
#[derive(Clone, Debug)]
pub enum Regressor {
    Linear(LinearModel<Fitted>),
    DecisionTree(FittedDecisionTree),
    RandomForest(FittedRandomForest),
}

impl Regressor {
    pub fn kind(&self) -> ModelKind {
        match self {
            Regressor::Linear(_) => ModelKind::LinearRegression,
            Regressor::DecisionTree(_) => ModelKind::DecisionTree,
            Regressor::RandomForest(_) => ModelKind::RandomForest,
        }
    }
}

impl From<LinearModel<Fitted>> for Regressor {
    fn from(model: LinearModel<Fitted>) -> Self {
        Regressor::Linear(model)
    }
}

impl From<FittedDecisionTree> for Regressor {
    fn from(model: FittedDecisionTree) -> Self {
        Regressor::DecisionTree(model)
    }
}

impl From<FittedRandomForest> for Regressor {
    fn from(model: FittedRandomForest) -> Self {
        Regressor::RandomForest(model)
    }
}

impl InferenceModel for Regressor {
    type ParamsRepr = ModelParams;

    fn predict(&self, input: ArrayView1<f64>) -> f64 {
        match self {
            Regressor::Linear(m) => m.predict(input),
            Regressor::DecisionTree(m) => m.predict(input),
            Regressor::RandomForest(m) => m.predict(input),
        }
    }

    fn predict_batch(&self, input: &Array2<f64>) -> Array1<f64> {
        match self {
            Regressor::Linear(m) => m.predict_batch(input),
            Regressor::DecisionTree(m) => m.predict_batch(input),
            Regressor::RandomForest(m) => m.predict_batch(input),
        }
    }

    fn n_features(&self) -> usize {
        match self {
            Regressor::Linear(m) => m.n_features(),
            Regressor::DecisionTree(m) => m.n_features(),
            Regressor::RandomForest(m) => m.n_features(),
        }
    }

    fn extract_params(&self) -> ModelParams {
        match self {
            Regressor::Linear(m) => ModelParams::Linear(m.extract_params()),
            Regressor::DecisionTree(m) => ModelParams::DecisionTree(m.extract_params()),
            Regressor::RandomForest(m) => ModelParams::RandomForest(m.extract_params()),
        }
    }

    fn from_params(params: ModelParams) -> ModelResult<Self> {
        Ok(match params {
            ModelParams::Linear(p) => Regressor::Linear(LinearModel::<Fitted>::from_params(p)?),
            ModelParams::DecisionTree(p) => {
                Regressor::DecisionTree(FittedDecisionTree::from_params(p)?)
            }
            ModelParams::RandomForest(p) => {
                Regressor::RandomForest(FittedRandomForest::from_params(p)?)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DecisionTreeRegressor, Estimator, LinearParams};
    use ndarray::array;

    #[test]
    fn test_kind_display_names() {
        assert_eq!(ModelKind::LinearRegression.to_string(), "Linear Regression");
        assert_eq!(ModelKind::RandomForest.to_string(), "Random Forest");
        assert_eq!(ModelKind::DecisionTree.to_string(), "Decision Tree");
    }

    #[test]
    fn test_regressor_dispatches_to_inner_model() {
        let linear = LinearModel::<Fitted>::new(LinearParams {
            weights: array![2.0, 1.0],
            bias: -1.0,
        });
        let regressor = Regressor::from(linear);
        assert_eq!(regressor.kind(), ModelKind::LinearRegression);
        assert_eq!(regressor.n_features(), 2);
        assert_eq!(regressor.predict(array![1.0, 3.0].view()), 4.0);
    }

    #[test]
    fn test_regressor_params_keep_variant() {
        let x = array![[0.0], [1.0], [2.0], [3.0]];
        let y = array![0.0, 0.0, 4.0, 4.0];
        let tree = DecisionTreeRegressor::new().fit(&x, &y).unwrap();
        let regressor = Regressor::from(tree);

        let restored = Regressor::from_params(regressor.extract_params()).unwrap();
        assert_eq!(restored.kind(), ModelKind::DecisionTree);
        assert_eq!(restored.predict_batch(&x), y);
    }
}
