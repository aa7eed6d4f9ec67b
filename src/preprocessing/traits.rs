//! Core traits for preprocessing transformers.
//!
//! - [`Transformer`]: used during fitting; has hyperparameters and learns from data.
//! - [`FittedTransformer`]: after fitting; ready for inference and serialization.

use crate::preprocessing::error::PreprocessingError;
use crate::serialization::SerializableParams;

/// Trait for unfitted transformers with hyperparameters.
///
/// # Associated Types
/// - `Input`: data the transformer learns from (a numeric matrix, rows of categories, ...).
/// - `Output`: data produced by the fitted transformer.
/// - `Params`: serializable representation of learned parameters.
/// - `Fitted`: the corresponding fitted transformer type.
pub trait Transformer: Clone {
    /// Input data type for fitting and transformation.
    type Input: ?Sized;
    /// Output data type after transformation.
    type Output;
    /// Serializable representation of learned parameters.
    type Params: SerializableParams;
    /// The fitted transformer type ready for inference.
    type Fitted: FittedTransformer<Params = Self::Params, Input = Self::Input, Output = Self::Output>;

    /// Fit the transformer to the training data.
    ///
    /// # Errors
    /// Returns [`PreprocessingError`] if the data is empty, contains invalid values,
    /// or has a shape the transformer cannot handle.
    fn fit(&self, data: &Self::Input) -> Result<Self::Fitted, PreprocessingError>;

    /// Fit the transformer and transform the same data in one step.
    fn fit_transform(&self, data: &Self::Input) -> Result<Self::Output, PreprocessingError> {
        self.fit(data)?.transform(data)
    }
}

/// Trait for fitted transformers ready for inference.
///
/// # Guarantees
/// - `extract_params()` + `from_params()` reproduces the same transform.
/// - `transform` never mutates the learned parameters.
pub trait FittedTransformer: Clone {
    /// Input data type for transformation.
    type Input: ?Sized;
    /// Output data type after transformation.
    type Output;
    /// Serializable representation of learned parameters.
    type Params: SerializableParams;

    /// Transform data using learned parameters.
    ///
    /// # Errors
    /// Returns [`PreprocessingError`] if the input width doesn't match the number of
    /// features seen during fit, or the input contains values the transformer rejects.
    fn transform(&self, data: &Self::Input) -> Result<Self::Output, PreprocessingError>;

    /// Extract learned parameters as a serializable representation.
    fn extract_params(&self) -> Self::Params;

    /// Reconstruct a fitted transformer from parameters.
    fn from_params(params: Self::Params) -> Result<Self, PreprocessingError>
    where
        Self: Sized;

    /// Returns the number of input features seen during fit.
    fn n_features_in(&self) -> usize;
}
