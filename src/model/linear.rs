//! Linear regression with compile-time state tracking.
//!
//! - [`LinearRegression`] = `LinearModel<Unfitted>`: used during training.
//! - `LinearModel<Fitted>`: inference-only, serializable predictor.
//!
//! The fitted model is free from training hyperparameters; learning rate, penalty and
//! stopping rules live in the optimizer, regularizer and trainer.

use crate::model::{
    Fitted, InferenceModel, ModelError, ModelResult, ParamOps, TrainableModel, Unfitted,
};
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

/// Trainable parameters of a linear model: weights and bias.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearParams {
    pub weights: Array1<f64>,
    pub bias: f64,
}

/// Serializable representation of linear model parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SerializableLinearParams {
    pub weights: Vec<f64>,
    pub bias: f64,
}

impl From<&LinearParams> for SerializableLinearParams {
    fn from(params: &LinearParams) -> Self {
        Self {
            weights: params.weights.to_vec(),
            bias: params.bias,
        }
    }
}

impl TryFrom<SerializableLinearParams> for LinearParams {
    type Error = ModelError;

    fn try_from(value: SerializableLinearParams) -> Result<Self, Self::Error> {
        if value.weights.is_empty() {
            return Err(ModelError::InvalidParameter(
                "linear model has no weights".to_string(),
            ));
        }
        if value.weights.iter().any(|w| !w.is_finite()) || !value.bias.is_finite() {
            return Err(ModelError::InvalidParameter(
                "linear model parameters must be finite".to_string(),
            ));
        }
        Ok(Self {
            weights: Array1::from(value.weights),
            bias: value.bias,
        })
    }
}

impl ParamOps for LinearParams {
    fn add(&self, other: &Self) -> Self {
        Self {
            weights: &self.weights + &other.weights,
            bias: self.bias + other.bias,
        }
    }

    fn scale(&self, scalar: f64) -> Self {
        Self {
            weights: &self.weights * scalar,
            bias: self.bias * scalar,
        }
    }
}

/// A linear model with state encoded at the type level.
///
/// - When `S = Unfitted`: implements [`TrainableModel`].
/// - When `S = Fitted`: implements [`InferenceModel`].
///
/// `predict()` on an untrained model does not compile.
#[derive(Clone, Debug)]
pub struct LinearModel<S> {
    params: LinearParams,
    _state: PhantomData<S>,
}

impl LinearModel<Fitted> {
    /// Creates a fitted linear model from trained parameters.
    pub fn new(params: LinearParams) -> Self {
        Self {
            params,
            _state: PhantomData,
        }
    }

    pub fn weights(&self) -> &Array1<f64> {
        &self.params.weights
    }

    pub fn bias(&self) -> f64 {
        self.params.bias
    }
}

/// Inference for a trained linear model: `y = w^T x + b`.
impl InferenceModel for LinearModel<Fitted> {
    type ParamsRepr = SerializableLinearParams;

    fn predict(&self, input: ArrayView1<f64>) -> f64 {
        self.params.weights.dot(&input) + self.params.bias
    }

    fn predict_batch(&self, input: &Array2<f64>) -> Array1<f64> {
        input.dot(&self.params.weights) + self.params.bias
    }

    fn n_features(&self) -> usize {
        self.params.weights.len()
    }

    fn extract_params(&self) -> Self::ParamsRepr {
        (&self.params).into()
    }

    fn from_params(params: Self::ParamsRepr) -> ModelResult<Self> {
        Ok(Self::new(LinearParams::try_from(params)?))
    }
}

/// Forward pass: `X @ w + b`.
/// Backward pass: `∇w = X^T · grad`, `∇b = sum(grad)`.
impl TrainableModel for LinearModel<Unfitted> {
    type Params = LinearParams;
    type Gradients = LinearParams;
    type Output = LinearModel<Fitted>;

    fn forward(&self, x: &Array2<f64>) -> Array1<f64> {
        x.dot(&self.params.weights) + self.params.bias
    }

    fn backward(&self, x: &Array2<f64>, grad_output: &Array1<f64>) -> Self::Gradients {
        LinearParams {
            weights: x.t().dot(grad_output),
            bias: grad_output.sum(),
        }
    }

    fn params(&self) -> &Self::Params {
        &self.params
    }

    fn update_params(&mut self, params: &Self::Params) {
        self.params = params.clone();
    }

    fn into_fitted(self) -> LinearModel<Fitted> {
        LinearModel::<Fitted>::new(self.params)
    }
}

/// Alias for an **unfitted** linear regression model.
pub type LinearRegression = LinearModel<Unfitted>;

impl LinearRegression {
    /// Creates a linear regression model with zero-initialized weights.
    pub fn new(n_features: usize) -> Self {
        Self {
            params: LinearParams {
                weights: Array1::zeros(n_features),
                bias: 0.0,
            },
            _state: PhantomData,
        }
    }

    /// Constructs a model from explicit parameters (warm start).
    pub fn from_params(params: LinearParams) -> Self {
        Self {
            params,
            _state: PhantomData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn params(weights: Array1<f64>, bias: f64) -> LinearParams {
        LinearParams { weights, bias }
    }

    #[test]
    fn test_param_ops_add() {
        let result = params(array![1.0, 2.0], 0.5).add(&params(array![0.5, 1.0], 0.5));
        assert_eq!(result, params(array![1.5, 3.0], 1.0));
    }

    #[test]
    fn test_param_ops_scale_negative() {
        let result = params(array![2.0], 1.0).scale(-1.0);
        assert_eq!(result, params(array![-2.0], -1.0));
    }

    #[test]
    fn test_linear_regression_new_zero_initialized() {
        let model = LinearRegression::new(3);
        assert_eq!(model.params().weights, array![0.0, 0.0, 0.0]);
        assert_eq!(model.params().bias, 0.0);
    }

    #[test]
    fn test_forward_and_backward() {
        let model = LinearRegression::from_params(params(array![2.0, -1.0], 0.5));
        let x = array![[1.0, 1.0], [0.0, 2.0]];

        assert_eq!(model.forward(&x), array![1.5, -1.5]);

        let grads = model.backward(&x, &array![1.0, 0.5]);
        assert_eq!(grads.weights, array![1.0, 2.0]);
        assert_eq!(grads.bias, 1.5);
    }

    #[test]
    fn test_fitted_predict_single_and_batch_agree() {
        let fitted = LinearRegression::from_params(params(array![2.0, 3.0], 1.0)).into_fitted();
        let x = array![[1.0, 0.0], [0.5, 2.0]];

        let batch = fitted.predict_batch(&x);
        assert_eq!(batch, array![3.0, 8.0]);
        assert_eq!(fitted.predict(x.row(1)), batch[1]);
    }

    #[test]
    fn test_predict_checked_rejects_wrong_width() {
        let fitted = LinearModel::<Fitted>::new(params(array![1.0, 1.0], 0.0));
        let short = array![1.0];
        assert!(matches!(
            fitted.predict_checked(short.view()),
            Err(ModelError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_params_restore() {
        let fitted = LinearModel::<Fitted>::new(params(array![0.25, -4.0], 2.0));
        let restored = LinearModel::<Fitted>::from_params(fitted.extract_params()).unwrap();
        assert_eq!(restored.weights(), fitted.weights());
        assert_eq!(restored.bias(), 2.0);
    }

    #[test]
    fn test_from_params_rejects_non_finite() {
        let repr = SerializableLinearParams {
            weights: vec![1.0, f64::NAN],
            bias: 0.0,
        };
        assert!(LinearModel::<Fitted>::from_params(repr).is_err());
    }
}
