use super::{
    ranges::ParamRanges,
    runtime::{DeviceConfig, OutputConfig},
    search::SearchConfig,
    traits::ConfigSection,
    training::{DataConfig, TrainerConfig, TrainingConfig},
};
use crate::engines::generation::genome::ModelShape;
use crate::error::SearchError;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, RwLock};

/// Prefix for environment overrides, e.g. `KOOPMAN_GA__SEARCH__GENERATIONS=3`.
pub const ENV_PREFIX: &str = "KOOPMAN_GA";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub search: SearchConfig,
    pub training: TrainingConfig,
    pub model: ModelShape,
    pub param_ranges: Option<ParamRanges>,
    pub devices: DeviceConfig,
    pub data: DataConfig,
    pub output: OutputConfig,
    pub trainer: TrainerConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), SearchError> {
        self.search.validate()?;
        self.training.validate()?;
        self.ranges()?.validate()?;
        self.devices.validate()?;
        self.data.validate()?;
        self.output.validate()?;
        self.trainer.validate()?;
        Ok(())
    }

    pub fn ranges(&self) -> Result<&ParamRanges, SearchError> {
        self.param_ranges
            .as_ref()
            .ok_or(SearchError::MissingParamRanges)
    }
}

pub struct ConfigManager {
    config: Arc<RwLock<AppConfig>>,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(AppConfig::default())),
        }
    }

    /// Load a TOML file, apply `KOOPMAN_GA__*` environment overrides, and
    /// validate before replacing the current configuration.
    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<(), SearchError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SearchError::Configuration(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let settings = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;

        *self.config.write().unwrap_or_else(|e| e.into_inner()) = config;
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), SearchError> {
        let config = self.get();
        let toml_str = toml::to_string_pretty(&config)?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    pub fn get(&self) -> AppConfig {
        self.config.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn update<F>(&self, f: F) -> Result<(), SearchError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut candidate = self.get();
        f(&mut candidate);
        candidate.validate()?;
        *self.config.write().unwrap_or_else(|e| e.into_inner()) = candidate;
        Ok(())
    }
}
