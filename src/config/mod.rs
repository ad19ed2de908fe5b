pub mod traits;
pub mod search;
pub mod training;
pub mod ranges;
pub mod runtime;
pub mod manager;

pub use manager::{AppConfig, ConfigManager};
pub use ranges::{IntRange, ParamRanges, RealRange};
pub use runtime::{DeviceConfig, OutputConfig};
pub use search::SearchConfig;
pub use training::{DataConfig, TrainerConfig, TrainingConfig};
