use super::traits::ConfigSection;
use crate::error::SearchError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Fixed training constants handed to every fitness evaluation.
///
/// `check_epoch` is the truncated budget that makes an evaluation a cheap
/// proxy for full training; `epochs` is the nominal schedule the trainer
/// scales its learning-rate decay against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub epochs: usize,
    pub check_epoch: usize,
    pub learning_rate: f64,
    pub batch_size: usize,
    /// Prediction steps per sample (`S_p`).
    pub prediction_steps: usize,
    /// Trajectory length (`T`).
    pub horizon: usize,
    pub dt: f64,
    /// Models trained per evaluation; the lowest loss is reported (`M`).
    pub model_count: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 50,
            check_epoch: 5,
            learning_rate: 1e-3,
            batch_size: 256,
            prediction_steps: 30,
            horizon: 50,
            dt: 0.02,
            model_count: 1,
        }
    }
}

impl ConfigSection for TrainingConfig {
    fn section_name() -> &'static str {
        "training"
    }

    fn validate(&self) -> Result<(), SearchError> {
        if self.check_epoch == 0 {
            return Err(SearchError::Configuration(
                "Evaluation budget (check_epoch) must be at least 1".to_string(),
            ));
        }
        if self.batch_size == 0 || self.model_count == 0 {
            return Err(SearchError::Configuration(
                "Batch size and model count must be positive".to_string(),
            ));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(SearchError::Configuration(format!(
                "Learning rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if !(self.dt > 0.0) {
            return Err(SearchError::Configuration("dt must be positive".to_string()));
        }
        Ok(())
    }
}

/// Opaque handles to the tensors every evaluation trains and validates on.
/// They are passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub train: PathBuf,
    pub validation: PathBuf,
}

impl ConfigSection for DataConfig {
    fn section_name() -> &'static str {
        "data"
    }

    fn validate(&self) -> Result<(), SearchError> {
        if self.train.as_os_str().is_empty() || self.validation.as_os_str().is_empty() {
            return Err(SearchError::Configuration(
                "Training and validation data locations must be set".to_string(),
            ));
        }
        Ok(())
    }
}

/// External training program used by the process-isolated evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("python3"),
            args: vec!["train_candidate.py".to_string()],
        }
    }
}

impl ConfigSection for TrainerConfig {
    fn section_name() -> &'static str {
        "trainer"
    }

    fn validate(&self) -> Result<(), SearchError> {
        if self.program.as_os_str().is_empty() {
            return Err(SearchError::Configuration(
                "Trainer program must be set".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_locations_are_required() {
        assert!(matches!(
            DataConfig::default().validate(),
            Err(SearchError::Configuration(_))
        ));

        let partial = DataConfig {
            train: PathBuf::from("data/train_tensor.pt"),
            ..DataConfig::default()
        };
        assert!(partial.validate().is_err());

        let data = DataConfig {
            train: PathBuf::from("data/train_tensor.pt"),
            validation: PathBuf::from("data/test_tensor.pt"),
        };
        assert!(data.validate().is_ok());
    }
}
