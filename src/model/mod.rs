//! Regression models with compile-time state tracking.
//!
//! Two families of models live here:
//!
//! - gradient-trained models ([`linear::LinearModel`]) implement [`TrainableModel`] and
//!   are driven by a [`crate::trainer::Trainer`];
//! - greedy tree learners ([`tree::DecisionTreeRegressor`], [`forest::RandomForestRegressor`])
//!   implement [`Estimator`] and fit in one call.
//!
//! Every fitted model implements [`InferenceModel`]. [`Regressor`] wraps whichever one
//! won model selection so it can be stored in an artifact.

pub mod error;
pub mod forest;
pub mod linear;
pub mod regressor;
pub mod state;
pub mod tree;

pub use error::{ModelError, ModelResult};
pub use forest::{FittedRandomForest, ForestParams, RandomForestRegressor};
pub use linear::{LinearModel, LinearParams, LinearRegression, SerializableLinearParams};
pub use regressor::{ModelKind, ModelParams, Regressor};
pub use state::{Fitted, Unfitted};
pub use tree::{DecisionTreeRegressor, FittedDecisionTree, TreeNode, TreeParams};

use crate::serialization::SerializableParams;
use ndarray::{Array1, Array2, ArrayView1};

/// A model trained by gradient descent.
///
/// `forward` computes predictions for a batch, `backward` maps the loss gradient with
/// respect to those predictions onto parameter gradients.
pub trait TrainableModel {
    type Params;
    type Gradients;
    type Output;

    fn forward(&self, input: &Array2<f64>) -> Array1<f64>;
    fn backward(&self, input: &Array2<f64>, grad_output: &Array1<f64>) -> Self::Gradients;
    fn params(&self) -> &Self::Params;
    fn update_params(&mut self, new_params: &Self::Params);

    /// Drops training-only state and returns the inference model.
    fn into_fitted(self) -> Self::Output;
}

/// Parameter arithmetic needed by optimizers.
pub trait ParamOps: Clone {
    fn add(&self, other: &Self) -> Self;
    fn scale(&self, scalar: f64) -> Self;
}

/// A model fitted in a single call, without an external training loop.
pub trait Estimator {
    type Fitted: InferenceModel;

    fn fit(&self, x: &Array2<f64>, y: &Array1<f64>) -> ModelResult<Self::Fitted>;
}

/// A fitted model ready for prediction and serialization.
pub trait InferenceModel {
    /// Plain serializable form of the learned parameters.
    type ParamsRepr: SerializableParams;

    /// Predict a single sample.
    ///
    /// # Panics
    /// May panic if `input.len() != self.n_features()`; use [`Self::predict_checked`]
    /// on untrusted input.
    fn predict(&self, input: ArrayView1<f64>) -> f64;

    /// Predict every row of `input`.
    fn predict_batch(&self, input: &Array2<f64>) -> Array1<f64> {
        input.rows().into_iter().map(|row| self.predict(row)).collect()
    }

    /// Number of input features the model was fitted on.
    fn n_features(&self) -> usize;

    /// Predict a single sample, rejecting wrong widths and non-finite results.
    fn predict_checked(&self, input: ArrayView1<f64>) -> ModelResult<f64> {
        if input.len() != self.n_features() {
            return Err(ModelError::ShapeMismatch {
                expected: format!("{} features", self.n_features()),
                got: format!("{} features", input.len()),
            });
        }
        let prediction = self.predict(input);
        if !prediction.is_finite() {
            return Err(ModelError::InvalidValue(format!(
                "model produced non-finite prediction {prediction}"
            )));
        }
        Ok(prediction)
    }

    fn extract_params(&self) -> Self::ParamsRepr;

    fn from_params(params: Self::ParamsRepr) -> ModelResult<Self>
    where
        Self: Sized;
}

/// Checks the `(X, y)` pair handed to `fit`.
pub(crate) fn validate_training_data(x: &Array2<f64>, y: &Array1<f64>) -> ModelResult<()> {
    if x.nrows() == 0 {
        return Err(ModelError::EmptyData("cannot fit on zero samples".to_string()));
    }
    if x.nrows() != y.len() {
        return Err(ModelError::ShapeMismatch {
            expected: format!("{} targets", x.nrows()),
            got: format!("{} targets", y.len()),
        });
    }
    if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
        return Err(ModelError::InvalidValue(
            "training data contains NaN or infinite values".to_string(),
        ));
    }
    Ok(())
}
