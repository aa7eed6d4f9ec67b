//! # gridguardian
//!
//! Household energy consumption prediction. An offline pipeline trains three regression
//! candidates on the energy CSV and persists the best one; an HTTP service loads that
//! artifact once and answers `POST /predict`.
//!
//! ## Core Design Principles
//!
//! - **Stateful Type Safety**: gradient-trained models carry their state in the type
//!   (`Unfitted` vs `Fitted`); `predict()` on an untrained model does not compile.
//! - **Training/Inference Separation**: fitted models and transformers contain only the
//!   parameters needed for prediction; losses, optimizers, regularizers and the trainer
//!   live apart from them.
//! - **One artifact**: the selected model, the scaler and the encoded feature names are
//!   serialized together and validated on load.
//!
//! ## Quick Start
//!
//! ```no_run
//! use gridguardian::config::TrainingConfig;
//! use gridguardian::pipeline;
//! use gridguardian::service::Predictor;
//! use std::path::Path;
//!
//! let report = pipeline::run(&TrainingConfig::default(), Path::new("model.bin"))?;
//! println!("selected {} (MSE {:.4})", report.best, report.best_mse);
//!
//! let predictor = Predictor::load("model.bin")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Module Structure
//!
//! - `dataset`: energy CSV loading, in-memory `(X, y)` data, seeded train/test split
//! - `preprocessing`: one-hot encoding and standard scaling
//! - `model`: linear model, decision tree, random forest, the `Regressor` enum
//! - `loss`, `optimizer`, `regularizers`, `trainer`: gradient training of the linear model
//! - `metrics`: MSE, RMSE, MAE, R²
//! - `artifact`: persisted model bundle
//! - `pipeline`: end-to-end training run
//! - `service`: actix-web prediction service
//! - `config`, `cli`: layered configuration and command line

pub mod artifact;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod loss;
pub mod metrics;
pub mod model;
pub mod optimizer;
pub mod pipeline;
pub mod preprocessing;
pub mod regularizers;
pub mod serialization;
pub mod service;
pub mod trainer;
