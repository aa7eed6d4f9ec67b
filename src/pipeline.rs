//! End-to-end training run.
//!
//! Load the CSV, encode it, split it, standardize with statistics from the train partition,
//! fit every candidate, keep the one with the lowest test MSE and persist it together with
//! the scaler and the feature layout.

use crate::artifact::{ArtifactError, TrainedArtifact};
use crate::config::TrainingConfig;
use crate::dataset::energy::{encode_records, load_energy_csv};
use crate::dataset::{DatasetError, EncodedEnergyData};
use crate::metrics::RegressionMetrics;
use crate::model::{Estimator, InferenceModel, ModelError, ModelKind, Regressor};
use crate::preprocessing::{FittedTransformer, PreprocessingError, StandardScaler, Transformer};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    Preprocessing(#[from] PreprocessingError),
    #[error("Failed to fit {kind}: {source}")]
    Model {
        kind: ModelKind,
        #[source]
        source: ModelError,
    },
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
    #[error("No candidate model produced a finite test MSE")]
    NoFiniteCandidate,
}

/// Test-partition metrics of one candidate. `metrics` is `None` when the candidate
/// diverged during training.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CandidateResult {
    pub kind: ModelKind,
    pub metrics: Option<RegressionMetrics>,
}

impl CandidateResult {
    fn finite_mse(&self) -> Option<f64> {
        self.metrics.map(|m| m.mse).filter(|mse| mse.is_finite())
    }
}

/// Prediction of the selected model on the first test sample.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SampleDemo {
    pub actual: f64,
    pub predicted: f64,
    pub absolute_error: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub n_train: usize,
    pub n_test: usize,
    pub feature_names: Vec<String>,
    pub candidates: Vec<CandidateResult>,
    pub best: ModelKind,
    pub best_mse: f64,
    pub demo: SampleDemo,
    pub artifact_path: Option<PathBuf>,
}

/// Runs the whole pipeline on `config.dataset_path` and writes the artifact to
/// `artifact_path`. Nothing is written if any step fails.
pub fn run(config: &TrainingConfig, artifact_path: &Path) -> Result<TrainingReport, PipelineError> {
    let records = load_energy_csv(&config.dataset_path)?;
    let encoded = encode_records(&records)?;
    let (artifact, mut report) = train(encoded, config)?;

    artifact.save(artifact_path)?;
    log::info!(
        "Saved best model ({}) with MSE {:.4} to {}",
        report.best,
        report.best_mse,
        artifact_path.display()
    );
    report.artifact_path = Some(artifact_path.to_path_buf());
    Ok(report)
}

/// Trains and selects a model on already-encoded data, without touching the filesystem.
pub fn train(
    data: EncodedEnergyData,
    config: &TrainingConfig,
) -> Result<(TrainedArtifact, TrainingReport), PipelineError> {
    let feature_names = data.feature_names.clone();
    let (train, test) = data
        .into_dataset()?
        .train_test_split(config.test_fraction, config.seed)?;
    let (x_train, y_train) = train.into_parts();
    let (x_test, y_test) = test.into_parts();
    log::info!(
        "Split into {} training and {} test samples",
        x_train.nrows(),
        x_test.nrows()
    );

    let scaler = StandardScaler::new().fit(&x_train)?;
    let x_train = scaler.transform(&x_train)?;
    let x_test = scaler.transform(&x_test)?;

    let mut candidates = Vec::with_capacity(ModelKind::ALL.len());
    let mut models = Vec::with_capacity(ModelKind::ALL.len());
    for kind in ModelKind::ALL {
        let model = fit_candidate(kind, config, &x_train, &y_train)?;
        let metrics = model.as_ref().map(|m| {
            let predictions = m.predict_batch(&x_test);
            RegressionMetrics::compute(y_test.view(), predictions.view())
        });
        match metrics {
            Some(m) if m.mse.is_finite() => log::info!("{kind} - {m}"),
            _ => log::warn!("{kind} has no finite test MSE and cannot be selected"),
        }
        candidates.push(CandidateResult { kind, metrics });
        models.push(model);
    }

    let best_index = select_best(&candidates).ok_or(PipelineError::NoFiniteCandidate)?;
    let best_mse = candidates[best_index]
        .finite_mse()
        .ok_or(PipelineError::NoFiniteCandidate)?;
    let model = models
        .swap_remove(best_index)
        .ok_or(PipelineError::NoFiniteCandidate)?;
    let best_kind = model.kind();
    log::info!("Best model: {best_kind} with MSE {best_mse:.4}");

    let demo = sample_demo(&model, &x_test, &y_test);
    log::info!(
        "Sample prediction - actual: {:.2} kWh, predicted: {:.2} kWh, error: {:.2} kWh",
        demo.actual,
        demo.predicted,
        demo.absolute_error
    );

    let report = TrainingReport {
        n_train: x_train.nrows(),
        n_test: x_test.nrows(),
        feature_names: feature_names.clone(),
        candidates,
        best: best_kind,
        best_mse,
        demo,
        artifact_path: None,
    };
    let artifact = TrainedArtifact::new(model, scaler, feature_names)?;
    Ok((artifact, report))
}

/// Index of the candidate with the lowest finite MSE. Ties go to the earliest candidate.
fn select_best(candidates: &[CandidateResult]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, mse) in candidates
        .iter()
        .enumerate()
        .filter_map(|(i, c)| c.finite_mse().map(|mse| (i, mse)))
    {
        if best.map_or(true, |(_, best_mse)| mse < best_mse) {
            best = Some((index, mse));
        }
    }
    best.map(|(index, _)| index)
}

/// Fits one candidate. A linear model whose training loss diverges yields `None` instead of
/// aborting the run; every other failure is an error.
fn fit_candidate(
    kind: ModelKind,
    config: &TrainingConfig,
    x: &Array2<f64>,
    y: &Array1<f64>,
) -> Result<Option<Regressor>, PipelineError> {
    log::info!("Training {kind}");
    let fitted = match kind {
        ModelKind::LinearRegression => config
            .linear
            .estimator(config.seed)
            .fit(x, y)
            .map(Regressor::from),
        ModelKind::RandomForest => config
            .forest
            .estimator(config.seed)
            .fit(x, y)
            .map(Regressor::from),
        ModelKind::DecisionTree => config.tree.estimator().fit(x, y).map(Regressor::from),
    };
    match fitted {
        Ok(model) => Ok(Some(model)),
        Err(ModelError::Diverged { epoch }) => {
            log::warn!("{kind} diverged at epoch {epoch}");
            Ok(None)
        }
        Err(source) => Err(PipelineError::Model { kind, source }),
    }
}

fn sample_demo(model: &Regressor, x_test: &Array2<f64>, y_test: &Array1<f64>) -> SampleDemo {
    let actual = y_test[0];
    let predicted = model.predict(x_test.row(0));
    SampleDemo {
        actual,
        predicted,
        absolute_error: (actual - predicted).abs(),
    }
}
