use thiserror::Error;

/// Errors raised while fitting, restoring or running a model.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Empty data: {0}")]
    EmptyData(String),
    #[error("Shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: String, got: String },
    #[error("Invalid value: {0}")]
    InvalidValue(String),
    #[error("Training diverged at epoch {epoch}: loss is not finite")]
    Diverged { epoch: usize },
    #[error("Dataset error: {0}")]
    Dataset(String),
}

pub type ModelResult<T> = Result<T, ModelError>;
