//! Regression metrics used to compare candidate models on held-out data.

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Metrics for evaluating regression models.
pub struct Metrics;

impl Metrics {
    /// Mean Squared Error: `mean((y_true - y_pred)^2)`. Lower is better.
    ///
    /// # Panics
    /// Panics if the inputs differ in length.
    pub fn mse(y_true: ArrayView1<f64>, y_pred: ArrayView1<f64>) -> f64 {
        assert_eq!(y_true.len(), y_pred.len(), "Arrays must have the same length");
        if y_true.is_empty() {
            return 0.0;
        }
        let diff = &y_true - &y_pred;
        diff.dot(&diff) / y_true.len() as f64
    }

    /// Root Mean Squared Error, in the units of the target.
    pub fn rmse(y_true: ArrayView1<f64>, y_pred: ArrayView1<f64>) -> f64 {
        Self::mse(y_true, y_pred).sqrt()
    }

    /// Mean Absolute Error: `mean(|y_true - y_pred|)`.
    ///
    /// # Panics
    /// Panics if the inputs differ in length.
    pub fn mae(y_true: ArrayView1<f64>, y_pred: ArrayView1<f64>) -> f64 {
        assert_eq!(y_true.len(), y_pred.len(), "Arrays must have the same length");
        if y_true.is_empty() {
            return 0.0;
        }
        (&y_true - &y_pred).mapv(f64::abs).sum() / y_true.len() as f64
    }

    /// Coefficient of determination: `1 - SS_res / SS_tot`.
    ///
    /// A constant target has `SS_tot = 0`; the score is then 1.0 for a perfect prediction
    /// and 0.0 otherwise.
    pub fn r2(y_true: ArrayView1<f64>, y_pred: ArrayView1<f64>) -> f64 {
        assert_eq!(y_true.len(), y_pred.len(), "Arrays must have the same length");
        if y_true.is_empty() {
            return 0.0;
        }
        let mean = y_true.sum() / y_true.len() as f64;
        let ss_tot: f64 = y_true.iter().map(|&t| (t - mean).powi(2)).sum();
        let diff = &y_true - &y_pred;
        let ss_res = diff.dot(&diff);
        if ss_tot == 0.0 {
            return if ss_res == 0.0 { 1.0 } else { 0.0 };
        }
        1.0 - ss_res / ss_tot
    }
}

/// The metrics reported for one candidate on the test partition.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub mse: f64,
    pub rmse: f64,
    pub mae: f64,
    pub r2: f64,
}

impl RegressionMetrics {
    pub fn compute(y_true: ArrayView1<f64>, y_pred: ArrayView1<f64>) -> Self {
        let mse = Metrics::mse(y_true, y_pred);
        Self {
            mse,
            rmse: mse.sqrt(),
            mae: Metrics::mae(y_true, y_pred),
            r2: Metrics::r2(y_true, y_pred),
        }
    }
}

impl fmt::Display for RegressionMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MSE: {:.4}, RMSE: {:.4}, MAE: {:.4}, R²: {:.4}",
            self.mse, self.rmse, self.mae, self.r2
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_mse_rmse_mae() {
        let y_true = array![1.0, 2.0, 3.0, 4.0];
        let y_pred = array![1.0, 3.0, 3.0, 2.0];
        // errors: 0, -1, 0, 2
        assert!((Metrics::mse(y_true.view(), y_pred.view()) - 1.25).abs() < 1e-12);
        assert!((Metrics::rmse(y_true.view(), y_pred.view()) - 1.25f64.sqrt()).abs() < 1e-12);
        assert!((Metrics::mae(y_true.view(), y_pred.view()) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_r2_perfect_and_mean() {
        let y = array![1.0, 2.0, 3.0];
        assert_eq!(Metrics::r2(y.view(), y.view()), 1.0);
        let mean = array![2.0, 2.0, 2.0];
        assert!(Metrics::r2(y.view(), mean.view()).abs() < 1e-12);
    }

    #[test]
    fn test_r2_constant_target() {
        let y = array![5.0, 5.0];
        assert_eq!(Metrics::r2(y.view(), y.view()), 1.0);
        assert_eq!(Metrics::r2(y.view(), array![4.0, 6.0].view()), 0.0);
    }

    #[test]
    fn test_compute_matches_individual_metrics() {
        let y_true = array![0.5, 1.5, 2.5];
        let y_pred = array![1.0, 1.0, 3.0];
        let m = RegressionMetrics::compute(y_true.view(), y_pred.view());
        assert_eq!(m.mse, Metrics::mse(y_true.view(), y_pred.view()));
        assert_eq!(m.rmse, m.mse.sqrt());
        assert!((m.mae - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_display_reports_every_metric() {
        let m = RegressionMetrics {
            mse: 0.25,
            rmse: 0.5,
            mae: 0.375,
            r2: 0.9,
        };
        assert_eq!(
            m.to_string(),
            "MSE: 0.2500, RMSE: 0.5000, MAE: 0.3750, R²: 0.9000"
        );
    }

    #[test]
    #[should_panic(expected = "same length")]
    fn test_mse_length_mismatch_panics() {
        Metrics::mse(array![1.0].view(), array![1.0, 2.0].view());
    }
}
