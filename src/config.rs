//! Layered application configuration.
//!
//! Sources, later ones winning: the embedded `default.toml`, an optional TOML file, and
//! environment variables prefixed with `GRIDGUARDIAN__` where `__` separates nested keys.
//! Command-line flags are applied on top by the CLI.

use crate::model::{DecisionTreeRegressor, RandomForestRegressor};
use crate::trainer::SgdRegressor;
use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULT_CONFIG: &str = include_str!("default.toml");
const ENV_PREFIX: &str = "GRIDGUARDIAN__";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub artifact_path: PathBuf,
    pub training: TrainingConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    /// Loads the configuration, merging `file` (if given) over the defaults and the
    /// environment over both.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Toml::string(DEFAULT_CONFIG));
        if let Some(path) = file {
            if !path.is_file() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            figment = figment.merge(Toml::file(path));
        }
        Self::extract(figment.merge(env_provider()))
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        figment.extract().map_err(|e| ConfigError::Invalid(Box::new(e)))
    }
}

fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX).map(|key| key.as_str().replace("__", ".").into())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub dataset_path: PathBuf,
    /// Fraction of rows held out for model selection.
    pub test_fraction: f64,
    /// Seeds the split, the SGD visiting order and the forest's bootstrap samples.
    pub seed: u64,
    pub linear: LinearConfig,
    pub forest: ForestConfig,
    pub tree: TreeConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("data/energy_consumption.csv"),
            test_fraction: 0.2,
            seed: 42,
            linear: LinearConfig::default(),
            forest: ForestConfig::default(),
            tree: TreeConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinearConfig {
    pub learning_rate: f64,
    pub power_t: f64,
    pub alpha: f64,
    pub max_epochs: usize,
    pub tol: Option<f64>,
    pub n_iter_no_change: usize,
    pub batch_size: usize,
}

impl Default for LinearConfig {
    fn default() -> Self {
        let sgd = SgdRegressor::default();
        Self {
            learning_rate: sgd.learning_rate,
            power_t: sgd.power_t,
            alpha: sgd.alpha,
            max_epochs: sgd.max_epochs,
            tol: sgd.tol,
            n_iter_no_change: sgd.n_iter_no_change,
            batch_size: sgd.batch_size,
        }
    }
}

impl LinearConfig {
    pub fn estimator(&self, seed: u64) -> SgdRegressor {
        SgdRegressor {
            learning_rate: self.learning_rate,
            power_t: self.power_t,
            alpha: self.alpha,
            max_epochs: self.max_epochs,
            tol: self.tol,
            n_iter_no_change: self.n_iter_no_change,
            batch_size: self.batch_size,
            shuffle: true,
            seed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    pub n_estimators: usize,
    pub bootstrap: bool,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            bootstrap: true,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

impl ForestConfig {
    pub fn estimator(&self, seed: u64) -> RandomForestRegressor {
        RandomForestRegressor::new(self.n_estimators)
            .with_bootstrap(self.bootstrap)
            .with_seed(seed)
            .with_tree(
                DecisionTreeRegressor::new()
                    .with_max_depth(self.max_depth)
                    .with_min_samples_split(self.min_samples_split)
                    .with_min_samples_leaf(self.min_samples_leaf),
            )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

impl TreeConfig {
    pub fn estimator(&self) -> DecisionTreeRegressor {
        DecisionTreeRegressor::new()
            .with_max_depth(self.max_depth)
            .with_min_samples_split(self.min_samples_split)
            .with_min_samples_leaf(self.min_samples_leaf)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Number of actix-web workers; defaults to the number of physical cores.
    #[serde(default)]
    pub workers: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            workers: None,
        }
    }
}
