use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Parameter ranges must be provided")]
    MissingParamRanges,

    #[error("No accelerator devices found")]
    NoDevices,

    #[error("Evaluation error: {0}")]
    Evaluation(String),

    #[error("Artifact already exists: {}", .0.display())]
    ArtifactExists(PathBuf),

    #[error("Worker pool error: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Config source error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("TOML error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl SearchError {
    /// Errors that must abort a run before any genome is evaluated.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            SearchError::Configuration(_)
                | SearchError::MissingParamRanges
                | SearchError::NoDevices
                | SearchError::Config(_)
        )
    }
}
