use crate::model::{LinearParams, LinearRegression, TrainableModel};
use ndarray::Array1;

/// Penalty added to the training loss, together with its gradient w.r.t. the model's
/// parameters.
pub trait Regularizer<M: TrainableModel> {
    fn regularizer_penalty_grad(&self, model: &M) -> (f64, M::Gradients);
}

/// L2 (ridge) penalty on the weights: `0.5 · α · ‖w‖²`. The bias is not penalized.
#[derive(Clone, Copy, Debug)]
pub struct L2 {
    pub alpha: f64,
}

impl L2 {
    pub fn new(alpha: f64) -> Self {
        Self { alpha }
    }
}

impl Regularizer<LinearRegression> for L2 {
    fn regularizer_penalty_grad(&self, model: &LinearRegression) -> (f64, LinearParams) {
        let weights = &model.params().weights;
        let penalty = 0.5 * self.alpha * weights.dot(weights);
        (
            penalty,
            LinearParams {
                weights: weights * self.alpha,
                bias: 0.0,
            },
        )
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoRegularizer;

impl Regularizer<LinearRegression> for NoRegularizer {
    fn regularizer_penalty_grad(&self, model: &LinearRegression) -> (f64, LinearParams) {
        (
            0.0,
            LinearParams {
                weights: Array1::zeros(model.params().weights.len()),
                bias: 0.0,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn model() -> LinearRegression {
        LinearRegression::from_params(LinearParams {
            weights: array![2.0, -1.0],
            bias: 3.0,
        })
    }

    #[test]
    fn test_l2_penalty_and_grad() {
        let (penalty, grads) = L2::new(0.1).regularizer_penalty_grad(&model());
        // 0.5 * 0.1 * (4 + 1)
        assert!((penalty - 0.25).abs() < 1e-12);
        assert_eq!(grads.weights, array![0.2, -0.1]);
        assert_eq!(grads.bias, 0.0);
    }

    #[test]
    fn test_no_regularizer_is_zero() {
        let (penalty, grads) = NoRegularizer.regularizer_penalty_grad(&model());
        assert_eq!(penalty, 0.0);
        assert_eq!(grads.weights, array![0.0, 0.0]);
    }
}
