use crate::dataset::{Dataset, DatasetError};
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Dense in-memory dataset.
#[derive(Clone, Debug)]
pub struct InMemoryDataset {
    x: Array2<f64>,
    y: Array1<f64>,
}

impl InMemoryDataset {
    pub fn new(x: Array2<f64>, y: Array1<f64>) -> Result<Self, DatasetError> {
        if x.nrows() != y.len() {
            return Err(DatasetError::Shape(format!(
                "x has {} rows but y has {} values",
                x.nrows(),
                y.len()
            )));
        }
        if x.nrows() == 0 {
            return Err(DatasetError::Empty);
        }
        Ok(Self { x, y })
    }

    pub fn features(&self) -> &Array2<f64> {
        &self.x
    }

    pub fn targets(&self) -> &Array1<f64> {
        &self.y
    }

    pub fn into_parts(self) -> (Array2<f64>, Array1<f64>) {
        (self.x, self.y)
    }

    /// Shuffles the rows with a seeded `ChaCha8Rng` and splits off `ceil(n * test_fraction)`
    /// rows as the test partition. Returns `(train, test)`.
    ///
    /// The same seed always yields the same partition.
    pub fn train_test_split(
        &self,
        test_fraction: f64,
        seed: u64,
    ) -> Result<(InMemoryDataset, InMemoryDataset), DatasetError> {
        if !(test_fraction > 0.0 && test_fraction < 1.0) {
            return Err(DatasetError::InvalidSplit(format!(
                "test_fraction must be in (0, 1), got {test_fraction}"
            )));
        }
        let n = self.len();
        let n_test = (n as f64 * test_fraction).ceil() as usize;
        if n_test == 0 || n_test >= n {
            return Err(DatasetError::InvalidSplit(format!(
                "{n} samples cannot be split into non-empty train and test partitions"
            )));
        }

        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(&mut ChaCha8Rng::seed_from_u64(seed));
        let (test_idx, train_idx) = order.split_at(n_test);

        Ok((self.subset(train_idx), self.subset(test_idx)))
    }

    fn subset(&self, indices: &[usize]) -> InMemoryDataset {
        InMemoryDataset {
            x: self.x.select(Axis(0), indices),
            y: self.y.select(Axis(0), indices),
        }
    }
}

impl Dataset for InMemoryDataset {
    fn len(&self) -> usize {
        self.x.nrows()
    }

    fn get_batch(&self, indices: &[usize]) -> Result<(Array2<f64>, Array1<f64>), DatasetError> {
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.len()) {
            return Err(DatasetError::Shape(format!(
                "sample index {bad} out of range for {} samples",
                self.len()
            )));
        }
        let batch = self.subset(indices);
        Ok((batch.x, batch.y))
    }
}
