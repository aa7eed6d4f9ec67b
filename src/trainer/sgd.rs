use crate::dataset::InMemoryDataset;
use crate::loss::MSELoss;
use crate::model::{
    validate_training_data, Estimator, Fitted, LinearModel, LinearRegression, ModelError,
    ModelResult,
};
use crate::optimizer::{LearningRate, SGD};
use crate::regularizers::L2;
use crate::trainer::Trainer;
use ndarray::{Array1, Array2};

/// Linear regression fitted by stochastic gradient descent with an L2 penalty.
///
/// Defaults: `eta0 = 0.01` with inverse scaling (`power_t = 0.25`), `alpha = 1e-4`,
/// per-sample updates, up to 1000 epochs, stopping after 5 epochs without a `1e-3`
/// improvement.
#[derive(Clone, Debug, PartialEq)]
pub struct SgdRegressor {
    pub learning_rate: f64,
    pub power_t: f64,
    pub alpha: f64,
    pub max_epochs: usize,
    /// `None` disables early stopping.
    pub tol: Option<f64>,
    pub n_iter_no_change: usize,
    pub batch_size: usize,
    pub shuffle: bool,
    pub seed: u64,
}

impl Default for SgdRegressor {
    fn default() -> Self {
        Self {
            learning_rate: 0.01,
            power_t: 0.25,
            alpha: 1e-4,
            max_epochs: 1000,
            tol: Some(1e-3),
            n_iter_no_change: 5,
            batch_size: 1,
            shuffle: true,
            seed: 42,
        }
    }
}

impl SgdRegressor {
    fn validate(&self) -> ModelResult<()> {
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(ModelError::InvalidParameter(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if !(self.alpha.is_finite() && self.alpha >= 0.0) {
            return Err(ModelError::InvalidParameter(format!(
                "alpha must be non-negative, got {}",
                self.alpha
            )));
        }
        if !self.power_t.is_finite() {
            return Err(ModelError::InvalidParameter(format!(
                "power_t must be finite, got {}",
                self.power_t
            )));
        }
        Ok(())
    }
}

impl Estimator for SgdRegressor {
    type Fitted = LinearModel<Fitted>;

    fn fit(&self, x: &Array2<f64>, y: &Array1<f64>) -> ModelResult<LinearModel<Fitted>> {
        self.validate()?;
        validate_training_data(x, y)?;

        let optimizer = SGD::new(self.learning_rate).with_schedule(LearningRate::InvScaling {
            power_t: self.power_t,
        });
        let mut builder = Trainer::builder(MSELoss, optimizer, L2::new(self.alpha))
            .batch_size(self.batch_size)
            .max_epochs(self.max_epochs)
            .n_iter_no_change(self.n_iter_no_change)
            .shuffle(self.shuffle)
            .seed(self.seed);
        if let Some(tol) = self.tol {
            builder = builder.tol(tol);
        }

        let dataset = InMemoryDataset::new(x.clone(), y.clone())
            .map_err(|e| ModelError::Dataset(e.to_string()))?;
        builder.build().fit(LinearRegression::new(x.ncols()), &dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::InferenceModel;
    use ndarray::array;

    #[test]
    fn test_sgd_regressor_recovers_linear_relation() {
        // y = 3 * x0 - 2 * x1 + 0.5 on standardized-looking inputs
        let x = Array2::from_shape_fn((200, 2), |(i, j)| {
            let v = ((i * 7 + j * 13) % 23) as f64 / 11.5 - 1.0;
            if j == 0 { v } else { -v * 0.5 + ((i % 5) as f64 - 2.0) * 0.4 }
        });
        let y = x.column(0).mapv(|v| 3.0 * v) - x.column(1).mapv(|v| 2.0 * v) + 0.5;

        let model = SgdRegressor {
            learning_rate: 0.05,
            tol: None,
            max_epochs: 200,
            alpha: 0.0,
            ..SgdRegressor::default()
        }
        .fit(&x, &y)
        .unwrap();

        assert!((model.weights()[0] - 3.0).abs() < 0.05, "{:?}", model.weights());
        assert!((model.weights()[1] + 2.0).abs() < 0.05, "{:?}", model.weights());
        assert!((model.bias() - 0.5).abs() < 0.05, "{}", model.bias());
    }

    #[test]
    fn test_sgd_regressor_default_fits_reasonably() {
        let x = Array2::from_shape_fn((100, 1), |(i, _)| (i as f64 - 50.0) / 29.0);
        let y = x.column(0).mapv(|v| 1.5 * v + 2.0);
        let model = SgdRegressor::default().fit(&x, &y).unwrap();

        let preds = model.predict_batch(&x);
        let mse = (&preds - &y).mapv(|d| d * d).mean().unwrap_or(f64::NAN);
        assert!(mse < 0.05, "mse = {mse}");
    }

    #[test]
    fn test_sgd_regressor_rejects_bad_hyperparameters() {
        let x = array![[1.0], [2.0]];
        let y = array![1.0, 2.0];
        let bad = SgdRegressor {
            learning_rate: 0.0,
            ..SgdRegressor::default()
        };
        assert!(matches!(
            bad.fit(&x, &y),
            Err(ModelError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_sgd_regressor_rejects_nan_input() {
        let x = array![[1.0], [f64::NAN]];
        let y = array![1.0, 2.0];
        assert!(SgdRegressor::default().fit(&x, &y).is_err());
    }
}
