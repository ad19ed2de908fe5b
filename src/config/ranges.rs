use super::traits::ConfigSection;
use crate::engines::generation::genome::Param;
use crate::error::SearchError;
use serde::{Deserialize, Serialize};

/// Inclusive integer range, written as `[low, high]` in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(i64, i64)", into = "(i64, i64)")]
pub struct IntRange {
    pub low: i64,
    pub high: i64,
}

/// Inclusive real range, written as `[low, high]` in config files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct RealRange {
    pub low: f64,
    pub high: f64,
}

impl IntRange {
    pub fn new(low: i64, high: i64) -> Self {
        Self { low, high }
    }

    pub fn contains(&self, value: i64) -> bool {
        (self.low..=self.high).contains(&value)
    }

    pub fn clamp(&self, value: i64) -> i64 {
        value.max(self.low).min(self.high)
    }
}

impl RealRange {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.low).min(self.high)
    }
}

impl From<(i64, i64)> for IntRange {
    fn from((low, high): (i64, i64)) -> Self {
        Self { low, high }
    }
}

impl From<IntRange> for (i64, i64) {
    fn from(range: IntRange) -> Self {
        (range.low, range.high)
    }
}

impl From<(f64, f64)> for RealRange {
    fn from((low, high): (f64, f64)) -> Self {
        Self { low, high }
    }
}

impl From<RealRange> for (f64, f64) {
    fn from(range: RealRange) -> Self {
        (range.low, range.high)
    }
}

/// Search bounds for every ranged genome field.
///
/// Lowercase aliases cover config sources that fold key case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamRanges {
    #[serde(rename = "Num_x_Obsv", alias = "num_x_obsv")]
    pub x_observables: IntRange,
    #[serde(rename = "Num_u_Obsv", alias = "num_u_obsv")]
    pub u_observables: IntRange,
    #[serde(rename = "Num_x_Neurons", alias = "num_x_neurons")]
    pub x_neurons: IntRange,
    #[serde(rename = "Num_u_Neurons", alias = "num_u_neurons")]
    pub u_neurons: IntRange,
    #[serde(rename = "Num_hidden_x", alias = "num_hidden_x")]
    pub hidden_x: IntRange,
    #[serde(rename = "Num_hidden_u", alias = "num_hidden_u")]
    pub hidden_u: IntRange,
    pub alpha0: RealRange,
    pub alpha1: RealRange,
    pub alpha2: RealRange,
}

impl ParamRanges {
    pub fn int(&self, param: Param) -> Option<IntRange> {
        match param {
            Param::XObsv => Some(self.x_observables),
            Param::UObsv => Some(self.u_observables),
            Param::XNeurons => Some(self.x_neurons),
            Param::UNeurons => Some(self.u_neurons),
            Param::HiddenX => Some(self.hidden_x),
            Param::HiddenU => Some(self.hidden_u),
            Param::Alpha0 | Param::Alpha1 | Param::Alpha2 => None,
        }
    }

    pub fn real(&self, param: Param) -> Option<RealRange> {
        match param {
            Param::Alpha0 => Some(self.alpha0),
            Param::Alpha1 => Some(self.alpha1),
            Param::Alpha2 => Some(self.alpha2),
            _ => None,
        }
    }
}

impl Default for ParamRanges {
    fn default() -> Self {
        Self {
            x_observables: IntRange::new(2, 10),
            u_observables: IntRange::new(2, 10),
            x_neurons: IntRange::new(10, 60),
            u_neurons: IntRange::new(10, 60),
            hidden_x: IntRange::new(1, 4),
            hidden_u: IntRange::new(1, 4),
            alpha0: RealRange::new(0.01, 1.0),
            alpha1: RealRange::new(1e-9, 1e-5),
            alpha2: RealRange::new(1e-18, 1e-12),
        }
    }
}

impl ConfigSection for ParamRanges {
    fn section_name() -> &'static str {
        "param_ranges"
    }

    fn validate(&self) -> Result<(), SearchError> {
        for param in Param::ALL {
            if let Some(range) = self.int(param) {
                if range.low > range.high {
                    return Err(SearchError::Configuration(format!(
                        "{} range is empty: [{}, {}]",
                        param, range.low, range.high
                    )));
                }
                if range.low < 0 {
                    return Err(SearchError::Configuration(format!(
                        "{} must be non-negative, got lower bound {}",
                        param, range.low
                    )));
                }
            }
            if let Some(range) = self.real(param) {
                if !(range.low > 0.0 && range.high.is_finite() && range.low <= range.high) {
                    return Err(SearchError::Configuration(format!(
                        "{} range must be positive and finite with low <= high: [{:e}, {:e}]",
                        param, range.low, range.high
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_parse_from_pairs() {
        let toml_str = r#"
            Num_x_Obsv = [2, 4]
            Num_u_Obsv = [2, 4]
            Num_x_Neurons = [10, 20]
            Num_u_Neurons = [10, 20]
            Num_hidden_x = [1, 3]
            Num_hidden_u = [1, 3]
            alpha0 = [0.01, 1.0]
            alpha1 = [1e-9, 1e-5]
            alpha2 = [1e-18, 1e-12]
        "#;
        let ranges: ParamRanges = toml::from_str(toml_str).unwrap();
        assert_eq!(ranges.x_neurons, IntRange::new(10, 20));
        assert_eq!(ranges.alpha2, RealRange::new(1e-18, 1e-12));
        assert!(ranges.validate().is_ok());
    }

    #[test]
    fn inverted_range_is_rejected() {
        let mut ranges = ParamRanges::default();
        ranges.hidden_u = IntRange::new(3, 1);
        assert!(matches!(ranges.validate(), Err(SearchError::Configuration(_))));
    }

    #[test]
    fn non_positive_weight_is_rejected() {
        let mut ranges = ParamRanges::default();
        ranges.alpha1 = RealRange::new(0.0, 1e-5);
        assert!(ranges.validate().is_err());
    }

    #[test]
    fn clamp_stays_inclusive() {
        let range = IntRange::new(10, 20);
        assert_eq!(range.clamp(25), 20);
        assert_eq!(range.clamp(5), 10);
        assert_eq!(range.clamp(20), 20);
        assert!(RealRange::new(1e-9, 1e-5).contains(1e-5));
    }
}
