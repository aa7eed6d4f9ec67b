use ndarray::Array1;

/// A trait for differentiable loss functions used during model training.
///
/// Implementors must define:
/// - How to compute the scalar loss value (for logging and early stopping).
/// - How to compute the gradient of the loss w.r.t. the model's predictions.
///
/// The gradient is passed to the model's `backward()` method.
pub trait Loss {
    /// Computes the scalar loss value.
    fn loss(&self, prediction: &Array1<f64>, target: &Array1<f64>) -> f64;

    /// Computes the gradient of the loss w.r.t. the prediction: ∂L/∂pred.
    fn grad_wrt_prediction(&self, prediction: &Array1<f64>, target: &Array1<f64>)
        -> Array1<f64>;
}

/// Mean Squared Error (MSE) loss: `L = (1/n) * Σ(pred_i - target_i)^2`
///
/// Gradient w.r.t. prediction: `∂L/∂pred = (pred - target) / n`
///
/// The factor of 2 is absorbed into the learning rate.
#[derive(Clone, Copy, Debug, Default)]
pub struct MSELoss;

impl Loss for MSELoss {
    fn loss(&self, pred: &Array1<f64>, target: &Array1<f64>) -> f64 {
        let diff = pred - target;
        diff.dot(&diff) / pred.len() as f64
    }

    fn grad_wrt_prediction(&self, pred: &Array1<f64>, target: &Array1<f64>) -> Array1<f64> {
        (pred - target) / pred.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_mse_loss() {
        let pred = array![3.0, 5.0];
        let target = array![1.0, 2.0];

        let mse = MSELoss;
        // ((3-1)^2 + (5-2)^2) / 2 = (4 + 9) / 2 = 6.5
        assert!((mse.loss(&pred, &target) - 6.5).abs() < 1e-12);

        // (pred - target) / n = [2.0, 3.0] / 2
        assert_eq!(mse.grad_wrt_prediction(&pred, &target), array![1.0, 1.5]);
    }

    #[test]
    fn test_mse_loss_zero_on_exact_fit() {
        let y = array![0.5, -2.0, 7.25];
        assert_eq!(MSELoss.loss(&y, &y), 0.0);
        assert_eq!(MSELoss.grad_wrt_prediction(&y, &y), array![0.0, 0.0, 0.0]);
    }
}
