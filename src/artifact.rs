//! The trained artifact: the selected model, the scaler fitted on the training partition
//! and the ordered encoded feature names, persisted together as one bincode file.

use crate::model::{InferenceModel, ModelError, ModelParams, Regressor};
use crate::preprocessing::{
    FittedStandardScaler, FittedTransformer, PreprocessingError, StandardScalerParams,
};
use crate::serialization::SerializableParams;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("I/O error on artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to decode artifact: {0}")]
    Decode(String),
    #[error("Failed to encode artifact: {0}")]
    Encode(String),
    #[error("Inconsistent artifact: {0}")]
    Inconsistent(String),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Preprocessing(#[from] PreprocessingError),
}

/// On-disk schema of a [`TrainedArtifact`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArtifactParams {
    pub model: ModelParams,
    pub scaler: StandardScalerParams,
    pub feature_names: Vec<String>,
}

/// A selected model bundled with its scaler and feature layout.
///
/// Construction checks that the scaler width, the model width and the number of feature
/// names agree, so a loaded artifact is always internally consistent.
#[derive(Clone, Debug)]
pub struct TrainedArtifact {
    model: Regressor,
    scaler: FittedStandardScaler,
    feature_names: Vec<String>,
}

impl TrainedArtifact {
    pub fn new(
        model: Regressor,
        scaler: FittedStandardScaler,
        feature_names: Vec<String>,
    ) -> Result<Self, ArtifactError> {
        if feature_names.is_empty() {
            return Err(ArtifactError::Inconsistent(
                "feature_names is empty".to_string(),
            ));
        }
        if scaler.n_features_in() != feature_names.len() {
            return Err(ArtifactError::Inconsistent(format!(
                "scaler expects {} features but {} feature names are recorded",
                scaler.n_features_in(),
                feature_names.len()
            )));
        }
        if model.n_features() != feature_names.len() {
            return Err(ArtifactError::Inconsistent(format!(
                "model expects {} features but {} feature names are recorded",
                model.n_features(),
                feature_names.len()
            )));
        }
        Ok(Self {
            model,
            scaler,
            feature_names,
        })
    }

    pub fn model(&self) -> &Regressor {
        &self.model
    }

    pub fn scaler(&self) -> &FittedStandardScaler {
        &self.scaler
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn extract_params(&self) -> ArtifactParams {
        ArtifactParams {
            model: self.model.extract_params(),
            scaler: self.scaler.extract_params(),
            feature_names: self.feature_names.clone(),
        }
    }

    pub fn from_params(params: ArtifactParams) -> Result<Self, ArtifactError> {
        let model = Regressor::from_params(params.model)?;
        let scaler = FittedStandardScaler::from_params(params.scaler)?;
        Self::new(model, scaler, params.feature_names)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ArtifactError> {
        self.extract_params()
            .to_bytes()
            .map_err(|e| ArtifactError::Encode(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ArtifactError> {
        let params =
            ArtifactParams::from_bytes(bytes).map_err(|e| ArtifactError::Decode(e.to_string()))?;
        Self::from_params(params)
    }

    /// Writes the artifact to `path`, replacing any previous file.
    ///
    /// The bytes go to a temporary file in the destination directory which is then renamed
    /// over `path`, so readers never observe a partially written artifact.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ArtifactError> {
        let path = path.as_ref();
        let io_err = |source: std::io::Error| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        };

        let bytes = self.to_bytes()?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(io_err)?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
        tmp.write_all(&bytes).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(path).map_err(|e| io_err(e.error))?;

        log::info!("Saved {} artifact to {}", self.model.kind(), path.display());
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let artifact = Self::from_bytes(&bytes)?;
        log::info!(
            "Loaded {} artifact with {} features from {}",
            artifact.model.kind(),
            artifact.feature_names.len(),
            path.display()
        );
        Ok(artifact)
    }
}
