use super::traits::ConfigSection;
use crate::error::SearchError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where accelerator ids come from.
///
/// With `ids` unset the list is read from `CUDA_VISIBLE_DEVICES`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub ids: Option<Vec<usize>>,
}

impl ConfigSection for DeviceConfig {
    fn section_name() -> &'static str {
        "devices"
    }

    fn validate(&self) -> Result<(), SearchError> {
        if let Some(ids) = &self.ids {
            let mut sorted = ids.clone();
            sorted.sort_unstable();
            sorted.dedup();
            if sorted.len() != ids.len() {
                return Err(SearchError::Configuration(format!(
                    "Device ids must be unique: {:?}",
                    ids
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    /// Artifact for generation `g` is `<dir>/<prefix><g>.json`.
    pub prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            prefix: "best_params_".to_string(),
        }
    }
}

impl ConfigSection for OutputConfig {
    fn section_name() -> &'static str {
        "output"
    }

    fn validate(&self) -> Result<(), SearchError> {
        if self.prefix.contains(std::path::MAIN_SEPARATOR) {
            return Err(SearchError::Configuration(format!(
                "Artifact prefix must be a file name, got '{}'",
                self.prefix
            )));
        }
        Ok(())
    }
}
