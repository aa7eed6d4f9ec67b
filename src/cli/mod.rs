use crate::artifact::ArtifactError;
use crate::config::{AppConfig, ConfigError};
use crate::pipeline::{self, PipelineError};
use crate::service::{self, Predictor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Training failed: {0}")]
    Pipeline(#[from] PipelineError),
    #[error("Failed to load model artifact: {0}")]
    Artifact(#[from] ArtifactError),
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}

#[derive(Debug, Parser)]
#[command(
    name = "gridguardian",
    about = "Household energy consumption prediction: training pipeline and HTTP service",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Train the candidate models and save the best one
    Train {
        /// Energy consumption CSV
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Where to write the model artifact
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Seed for the split, SGD shuffling and forest bootstrap
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Serve predictions over HTTP
    Serve {
        /// Model artifact to load
        #[arg(short, long)]
        artifact: Option<PathBuf>,

        #[arg(long)]
        host: Option<String>,

        #[arg(short, long)]
        port: Option<u16>,
    },
}

impl Cli {
    /// Loads the layered configuration and applies the flags given on the command line.
    pub fn resolve_config(&self) -> Result<AppConfig, ConfigError> {
        let mut config = AppConfig::load(self.config.as_deref())?;
        match &self.command {
            Commands::Train { data, output, seed } => {
                if let Some(data) = data {
                    config.training.dataset_path = data.clone();
                }
                if let Some(output) = output {
                    config.artifact_path = output.clone();
                }
                if let Some(seed) = seed {
                    config.training.seed = *seed;
                }
            }
            Commands::Serve {
                artifact,
                host,
                port,
            } => {
                if let Some(artifact) = artifact {
                    config.artifact_path = artifact.clone();
                }
                if let Some(host) = host {
                    config.server.host = host.clone();
                }
                if let Some(port) = port {
                    config.server.port = *port;
                }
            }
        }
        Ok(config)
    }
}

pub fn run(cli: Cli) -> Result<(), CliError> {
    let config = cli.resolve_config()?;
    match cli.command {
        Commands::Train { .. } => {
            let report = pipeline::run(&config.training, &config.artifact_path)?;
            log::info!(
                "Training complete: {} selected from {} candidates",
                report.best,
                report.candidates.len()
            );
        }
        Commands::Serve { .. } => {
            let predictor = Predictor::load(&config.artifact_path)?;
            actix_web::rt::System::new().block_on(service::serve(predictor, &config.server))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_train_flags() {
        let cli = Cli::parse_from([
            "gridguardian",
            "train",
            "--data",
            "energy.csv",
            "--output",
            "out/model.bin",
            "--seed",
            "7",
        ]);
        let config = cli.resolve_config().unwrap();
        assert_eq!(config.training.dataset_path, PathBuf::from("energy.csv"));
        assert_eq!(config.artifact_path, PathBuf::from("out/model.bin"));
        assert_eq!(config.training.seed, 7);
    }

    #[test]
    fn test_parse_serve_with_global_flags() {
        let cli = Cli::parse_from(["gridguardian", "serve", "--port", "9001", "-v"]);
        assert!(cli.verbose);
        let config = cli.resolve_config().unwrap();
        assert_eq!(config.server.port, 9001);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_missing_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["gridguardian"]).is_err());
    }
}
