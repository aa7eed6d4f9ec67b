//! Mini-batch training loop for gradient-trained models.
//!
//! A [`Trainer`] ties together a [`Loss`], an [`Optimizer`] and a [`Regularizer`] and drives
//! any [`TrainableModel`] over a [`Dataset`]. Each epoch visits the samples in a fresh order
//! drawn from a seeded `ChaCha8Rng`; training stops after `max_epochs` or once the epoch
//! loss has failed to improve on the best seen by more than `tol` for `n_iter_no_change`
//! consecutive epochs.

pub mod sgd;

pub use sgd::SgdRegressor;

use crate::dataset::Dataset;
use crate::loss::Loss;
use crate::model::{ModelError, ModelResult, ParamOps, TrainableModel};
use crate::optimizer::Optimizer;
use crate::regularizers::Regularizer;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::marker::PhantomData;

pub struct Trainer<L, O, M, R> {
    pub(crate) batch_size: usize,
    pub(crate) max_epochs: usize,
    pub(crate) tol: Option<f64>,
    pub(crate) n_iter_no_change: usize,
    pub(crate) shuffle: bool,
    pub(crate) seed: u64,
    pub(crate) loss_fn: L,
    pub(crate) optimizer: O,
    pub(crate) regularizer: R,
    _model: PhantomData<M>,
}

pub struct TrainerBuilder<L, O, M, R> {
    batch_size: usize,
    max_epochs: usize,
    tol: Option<f64>,
    n_iter_no_change: usize,
    shuffle: bool,
    seed: u64,
    loss_fn: L,
    optimizer: O,
    regularizer: R,
    _model: PhantomData<M>,
}

impl<L, O, M, R> TrainerBuilder<L, O, M, R> {
    pub fn new(loss_fn: L, optimizer: O, regularizer: R) -> Self {
        Self {
            batch_size: 32,
            max_epochs: 1000,
            tol: None,
            n_iter_no_change: 5,
            shuffle: true,
            seed: 0,
            loss_fn,
            optimizer,
            regularizer,
            _model: PhantomData,
        }
    }

    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    pub fn max_epochs(mut self, epochs: usize) -> Self {
        self.max_epochs = epochs;
        self
    }

    /// Enables early stopping: an epoch counts as an improvement only if its loss is below
    /// `best - tol`.
    pub fn tol(mut self, tol: f64) -> Self {
        self.tol = Some(tol);
        self
    }

    pub fn n_iter_no_change(mut self, n: usize) -> Self {
        self.n_iter_no_change = n;
        self
    }

    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn build(self) -> Trainer<L, O, M, R> {
        Trainer {
            batch_size: self.batch_size,
            max_epochs: self.max_epochs,
            tol: self.tol,
            n_iter_no_change: self.n_iter_no_change,
            shuffle: self.shuffle,
            seed: self.seed,
            loss_fn: self.loss_fn,
            optimizer: self.optimizer,
            regularizer: self.regularizer,
            _model: PhantomData,
        }
    }
}

impl<L, O, M, R> Trainer<L, O, M, R> {
    pub fn builder(loss_fn: L, optimizer: O, regularizer: R) -> TrainerBuilder<L, O, M, R> {
        TrainerBuilder::new(loss_fn, optimizer, regularizer)
    }
}

impl<L, O, M, P, R> Trainer<L, O, M, R>
where
    L: Loss,
    M: TrainableModel<Params = P, Gradients = P>,
    O: Optimizer<P>,
    R: Regularizer<M>,
    P: ParamOps,
{
    pub fn fit<D: Dataset>(&self, mut model: M, dataset: &D) -> ModelResult<M::Output> {
        if self.batch_size == 0 {
            return Err(ModelError::InvalidParameter(
                "batch_size must be at least 1".to_string(),
            ));
        }
        if self.max_epochs == 0 {
            return Err(ModelError::InvalidParameter(
                "max_epochs must be at least 1".to_string(),
            ));
        }
        let n_total = dataset.len();
        if n_total == 0 {
            return Err(ModelError::EmptyData("dataset is empty".to_string()));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut order: Vec<usize> = (0..n_total).collect();
        let mut t = 0usize;
        let mut best_loss = f64::INFINITY;
        let mut no_improvement = 0usize;

        for epoch in 0..self.max_epochs {
            if self.shuffle {
                order.shuffle(&mut rng);
            }

            let mut total_loss = 0.0;
            for batch in dataset.batches(&order, self.batch_size) {
                let (batch_x, batch_y) =
                    batch.map_err(|e| ModelError::Dataset(e.to_string()))?;
                let preds = model.forward(&batch_x);
                let (reg_penalty, reg_grad) = self.regularizer.regularizer_penalty_grad(&model);
                total_loss +=
                    (self.loss_fn.loss(&preds, &batch_y) + reg_penalty) * batch_y.len() as f64;

                let grad_preds = self.loss_fn.grad_wrt_prediction(&preds, &batch_y);
                let grads = model.backward(&batch_x, &grad_preds).add(&reg_grad);
                t += 1;
                let new_params = self.optimizer.step(model.params(), &grads, t);
                model.update_params(&new_params);
            }

            let avg_loss = total_loss / n_total as f64;
            if !avg_loss.is_finite() {
                return Err(ModelError::Diverged { epoch });
            }
            log::debug!("Epoch {}: loss = {}", epoch, avg_loss);

            if let Some(tol) = self.tol {
                if avg_loss > best_loss - tol {
                    no_improvement += 1;
                } else {
                    no_improvement = 0;
                }
                best_loss = best_loss.min(avg_loss);
                if no_improvement >= self.n_iter_no_change {
                    log::info!(
                        "Early stopping after {} epochs: loss {:.6}, best {:.6}",
                        epoch + 1,
                        avg_loss,
                        best_loss
                    );
                    break;
                }
            }
        }

        Ok(model.into_fitted())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::InMemoryDataset;
    use crate::loss::MSELoss;
    use crate::model::{InferenceModel, LinearRegression};
    use crate::optimizer::SGD;
    use crate::regularizers::NoRegularizer;
    use ndarray::{array, Array1, Array2};

    fn line_dataset() -> InMemoryDataset {
        // y = 2x + 1
        let x = Array2::from_shape_fn((20, 1), |(i, _)| i as f64 / 10.0);
        let y: Array1<f64> = x.column(0).mapv(|v| 2.0 * v + 1.0);
        InMemoryDataset::new(x, y).unwrap()
    }

    #[test]
    fn test_trainer_fits_line() {
        let trainer = Trainer::builder(MSELoss, SGD::new(0.1), NoRegularizer)
            .batch_size(4)
            .max_epochs(2000)
            .seed(1)
            .build();
        let fitted = trainer.fit(LinearRegression::new(1), &line_dataset()).unwrap();

        assert!((fitted.weights()[0] - 2.0).abs() < 1e-3);
        assert!((fitted.bias() - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_trainer_is_deterministic_for_seed() {
        let build = || {
            Trainer::builder(MSELoss, SGD::new(0.05), NoRegularizer)
                .batch_size(1)
                .max_epochs(5)
                .seed(9)
                .build()
        };
        let a = build().fit(LinearRegression::new(1), &line_dataset()).unwrap();
        let b = build().fit(LinearRegression::new(1), &line_dataset()).unwrap();
        assert_eq!(a.extract_params(), b.extract_params());
    }

    #[test]
    fn test_trainer_diverges_on_huge_learning_rate() {
        let x = array![[1e3], [2e3], [3e3]];
        let y = array![1.0, 2.0, 3.0];
        let ds = InMemoryDataset::new(x, y).unwrap();
        let trainer = Trainer::builder(MSELoss, SGD::new(1e6), NoRegularizer)
            .batch_size(3)
            .max_epochs(200)
            .build();
        assert!(matches!(
            trainer.fit(LinearRegression::new(1), &ds),
            Err(ModelError::Diverged { .. })
        ));
    }

    #[test]
    fn test_trainer_rejects_zero_batch_size() {
        let trainer = Trainer::builder(MSELoss, SGD::new(0.1), NoRegularizer)
            .batch_size(0)
            .build();
        assert!(trainer.fit(LinearRegression::new(1), &line_dataset()).is_err());
    }
}
