use crate::artifact::{ArtifactError, TrainedArtifact};
use crate::model::{InferenceModel, ModelError};
use crate::preprocessing::PreprocessingError;
use crate::service::request::PredictionRequest;
use ndarray::{Array1, ArrayView1};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("no request field matches feature '{0}'")]
    MissingFeature(String),
    #[error("feature vector has {got} values but the model expects {expected}")]
    FeatureCount { expected: usize, got: usize },
    #[error("failed to scale features: {0}")]
    Transform(#[from] PreprocessingError),
    #[error("inference failed: {0}")]
    Inference(#[from] ModelError),
}

impl PredictError {
    /// Whether the error was caused by the request rather than by the server.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            PredictError::MissingFeature(_) | PredictError::FeatureCount { .. }
        )
    }
}

/// Read-only inference state shared by all workers.
#[derive(Clone, Debug)]
pub struct Predictor {
    artifact: TrainedArtifact,
}

impl Predictor {
    pub fn new(artifact: TrainedArtifact) -> Self {
        Self { artifact }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ArtifactError> {
        TrainedArtifact::load(path).map(Self::new)
    }

    pub fn artifact(&self) -> &TrainedArtifact {
        &self.artifact
    }

    /// Builds the feature vector in the artifact's feature order.
    pub fn assemble(&self, request: &PredictionRequest) -> Result<Array1<f64>, PredictError> {
        self.artifact
            .feature_names()
            .iter()
            .map(|name| {
                request
                    .feature_value(name)
                    .ok_or_else(|| PredictError::MissingFeature(name.clone()))
            })
            .collect()
    }

    /// Scales a raw feature vector and runs the model, rounding to two decimals.
    pub fn predict_vector(&self, features: ArrayView1<f64>) -> Result<f64, PredictError> {
        let expected = self.artifact.feature_names().len();
        if features.len() != expected {
            return Err(PredictError::FeatureCount {
                expected,
                got: features.len(),
            });
        }
        let scaled = self.artifact.scaler().transform_sample(features)?;
        let prediction = round2(self.artifact.model().predict_checked(scaled.view())?);
        if !prediction.is_finite() {
            return Err(ModelError::InvalidValue(format!(
                "prediction {prediction} is not finite"
            ))
            .into());
        }
        Ok(prediction)
    }

    pub fn predict(&self, request: &PredictionRequest) -> Result<f64, PredictError> {
        let features = self.assemble(request)?;
        self.predict_vector(features.view())
    }
}

// Above 2^52 every f64 is an integer and scaling by 100 can overflow.
fn round2(x: f64) -> f64 {
    if x.abs() >= 4_503_599_627_370_496.0 {
        return x;
    }
    (x * 100.0).round() / 100.0
}
