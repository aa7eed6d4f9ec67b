//! Dataset abstractions for the training pipeline.
//!
//! - [`Dataset`]: a source of `(X, y)` pairs where `X` is a feature matrix of shape
//!   `(n_samples, n_features)` and `y` a target vector of shape `(n_samples,)`.
//! - [`InMemoryDataset`]: a dense `(X, y)` pair with a seeded train/test split.
//! - [`energy`]: loading and encoding of the household energy CSV.
//!
//! Batches are addressed by sample indices rather than ranges so that a trainer can shuffle
//! the visiting order each epoch without copying the dataset.

pub mod energy;
pub mod memory;

pub use self::energy::{EncodedEnergyData, EnergyRecord};
pub use self::memory::InMemoryDataset;

use crate::preprocessing::PreprocessingError;
use ndarray::{Array1, Array2};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading, encoding or splitting a dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Failed to open dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Invalid record at row {row}: {message}")]
    InvalidRecord { row: u64, message: String },
    #[error("Dataset is empty")]
    Empty,
    #[error("Invalid split: {0}")]
    InvalidSplit(String),
    #[error("Shape mismatch: {0}")]
    Shape(String),
    #[error(transparent)]
    Preprocessing(#[from] PreprocessingError),
}

/// Abstract interface for a supervised regression dataset.
pub trait Dataset {
    /// Total number of samples.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Gathers the given samples, in the given order, into a batch.
    fn get_batch(&self, indices: &[usize]) -> Result<(Array2<f64>, Array1<f64>), DatasetError>;

    /// Iterates over batches of at most `batch_size` samples following `order`.
    fn batches<'a>(&'a self, order: &'a [usize], batch_size: usize) -> DatasetBatchIter<'a, Self>
    where
        Self: Sized,
    {
        DatasetBatchIter {
            dataset: self,
            chunks: order.chunks(batch_size.max(1)),
        }
    }
}

/// Iterator over the batches of a [`Dataset`].
pub struct DatasetBatchIter<'a, D> {
    dataset: &'a D,
    chunks: std::slice::Chunks<'a, usize>,
}

impl<D: Dataset> Iterator for DatasetBatchIter<'_, D> {
    type Item = Result<(Array2<f64>, Array1<f64>), DatasetError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.chunks.next().map(|chunk| self.dataset.get_batch(chunk))
    }
}
