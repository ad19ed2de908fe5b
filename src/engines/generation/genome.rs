//! Hyperparameter genome for the Koopman autoencoder search.
//!
//! A genome carries two structural fields that are fixed for the whole run
//! (`Num_meas`, `Num_inputs`) and nine ranged fields that the genetic
//! operators are allowed to touch:
//! - six integer sizes: observable dimensions, neuron counts and hidden-layer
//!   depths for the state ("x") and input ("u") sub-networks
//! - three positive regularisation weights (`alpha0..alpha2`) that vary on a
//!   decade scale
//!
//! Genomes serialise with the key names the training collaborator expects,
//! so a saved artifact can be fed straight back into a full training run.
//!
//! # Example
//!
//! ```
//! use koopman_ga::engines::generation::genome::{Genome, ModelShape, Param, ParamValue};
//!
//! let genome = Genome {
//!     shape: ModelShape { measurement_count: 3, input_count: 1 },
//!     x_observables: 4,
//!     u_observables: 2,
//!     x_neurons: 30,
//!     u_neurons: 20,
//!     hidden_x: 2,
//!     hidden_u: 1,
//!     alpha0: 0.1,
//!     alpha1: 1e-7,
//!     alpha2: 1e-14,
//! };
//! assert_eq!(genome.get(Param::XNeurons), ParamValue::Int(30));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Structural fields shared by every genome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelShape {
    #[serde(rename = "Num_meas", alias = "num_meas", alias = "measurement_count")]
    pub measurement_count: usize,
    #[serde(rename = "Num_inputs", alias = "num_inputs", alias = "input_count")]
    pub input_count: usize,
}

impl Default for ModelShape {
    fn default() -> Self {
        Self {
            measurement_count: 3,
            input_count: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    #[serde(flatten)]
    pub shape: ModelShape,
    #[serde(rename = "Num_x_Obsv", alias = "num_x_obsv")]
    pub x_observables: i64,
    #[serde(rename = "Num_u_Obsv", alias = "num_u_obsv")]
    pub u_observables: i64,
    #[serde(rename = "Num_x_Neurons", alias = "num_x_neurons")]
    pub x_neurons: i64,
    #[serde(rename = "Num_u_Neurons", alias = "num_u_neurons")]
    pub u_neurons: i64,
    #[serde(rename = "Num_hidden_x", alias = "num_hidden_x")]
    pub hidden_x: i64,
    #[serde(rename = "Num_hidden_u", alias = "num_hidden_u")]
    pub hidden_u: i64,
    pub alpha0: f64,
    pub alpha1: f64,
    pub alpha2: f64,
}

/// The ranged (searchable) genome fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Param {
    XObsv,
    UObsv,
    XNeurons,
    UNeurons,
    HiddenX,
    HiddenU,
    Alpha0,
    Alpha1,
    Alpha2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Int(i64),
    Real(f64),
}

/// How a field moves when the mutation roll hits it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Perturbation {
    /// Add or subtract `step`.
    Step(i64),
    /// Multiply by `10^e`, `e` drawn from the slice.
    Decades(&'static [i32]),
}

impl Param {
    pub const ALL: [Param; 9] = [
        Param::XObsv,
        Param::UObsv,
        Param::XNeurons,
        Param::UNeurons,
        Param::HiddenX,
        Param::HiddenU,
        Param::Alpha0,
        Param::Alpha1,
        Param::Alpha2,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Param::XObsv => "Num_x_Obsv",
            Param::UObsv => "Num_u_Obsv",
            Param::XNeurons => "Num_x_Neurons",
            Param::UNeurons => "Num_u_Neurons",
            Param::HiddenX => "Num_hidden_x",
            Param::HiddenU => "Num_hidden_u",
            Param::Alpha0 => "alpha0",
            Param::Alpha1 => "alpha1",
            Param::Alpha2 => "alpha2",
        }
    }

    pub fn is_integer(self) -> bool {
        !matches!(self, Param::Alpha0 | Param::Alpha1 | Param::Alpha2)
    }

    pub fn perturbation(self) -> Perturbation {
        match self {
            Param::XObsv | Param::UObsv | Param::HiddenX | Param::HiddenU => Perturbation::Step(1),
            Param::XNeurons | Param::UNeurons => Perturbation::Step(5),
            Param::Alpha0 => Perturbation::Decades(&[-1, 1]),
            Param::Alpha1 => Perturbation::Decades(&[-2, -1, 1, 2]),
            Param::Alpha2 => Perturbation::Decades(&[-3, -2, -1, 1, 2, 3]),
        }
    }

    /// Starting magnitudes for the real-valued weights. Integer fields are
    /// drawn from their full range instead.
    pub fn initial_choices(self) -> &'static [f64] {
        match self {
            Param::Alpha0 => &[0.1],
            Param::Alpha1 => &[1e-9, 1e-8, 1e-7, 1e-6, 1e-5],
            Param::Alpha2 => &[1e-18, 1e-17, 1e-16, 1e-15, 1e-14, 1e-13, 1e-12],
            _ => &[],
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl Genome {
    pub fn get(&self, param: Param) -> ParamValue {
        match param {
            Param::XObsv => ParamValue::Int(self.x_observables),
            Param::UObsv => ParamValue::Int(self.u_observables),
            Param::XNeurons => ParamValue::Int(self.x_neurons),
            Param::UNeurons => ParamValue::Int(self.u_neurons),
            Param::HiddenX => ParamValue::Int(self.hidden_x),
            Param::HiddenU => ParamValue::Int(self.hidden_u),
            Param::Alpha0 => ParamValue::Real(self.alpha0),
            Param::Alpha1 => ParamValue::Real(self.alpha1),
            Param::Alpha2 => ParamValue::Real(self.alpha2),
        }
    }

    pub fn int_mut(&mut self, param: Param) -> Option<&mut i64> {
        match param {
            Param::XObsv => Some(&mut self.x_observables),
            Param::UObsv => Some(&mut self.u_observables),
            Param::XNeurons => Some(&mut self.x_neurons),
            Param::UNeurons => Some(&mut self.u_neurons),
            Param::HiddenX => Some(&mut self.hidden_x),
            Param::HiddenU => Some(&mut self.hidden_u),
            Param::Alpha0 | Param::Alpha1 | Param::Alpha2 => None,
        }
    }

    pub fn real_mut(&mut self, param: Param) -> Option<&mut f64> {
        match param {
            Param::Alpha0 => Some(&mut self.alpha0),
            Param::Alpha1 => Some(&mut self.alpha1),
            Param::Alpha2 => Some(&mut self.alpha2),
            _ => None,
        }
    }

    /// Copy `param` from `other` into `self`.
    pub fn take_from(&mut self, other: &Genome, param: Param) {
        match other.get(param) {
            ParamValue::Int(v) => {
                if let Some(slot) = self.int_mut(param) {
                    *slot = v;
                }
            }
            ParamValue::Real(v) => {
                if let Some(slot) = self.real_mut(param) {
                    *slot = v;
                }
            }
        }
    }
}

impl fmt::Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{Num_meas: {}, Num_inputs: {}",
            self.shape.measurement_count, self.shape.input_count
        )?;
        for param in Param::ALL {
            match self.get(param) {
                ParamValue::Int(v) => write!(f, ", {}: {}", param, v)?,
                ParamValue::Real(v) => write!(f, ", {}: {:e}", param, v)?,
            }
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Genome {
        Genome {
            shape: ModelShape {
                measurement_count: 6,
                input_count: 2,
            },
            x_observables: 3,
            u_observables: 4,
            x_neurons: 15,
            u_neurons: 10,
            hidden_x: 2,
            hidden_u: 3,
            alpha0: 0.1,
            alpha1: 1e-7,
            alpha2: 1e-15,
        }
    }

    #[test]
    fn serialises_with_training_key_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["Num_meas"], 6);
        assert_eq!(json["Num_inputs"], 2);
        assert_eq!(json["Num_x_Neurons"], 15);
        assert_eq!(json["Num_hidden_u"], 3);
        assert_eq!(json["alpha1"], 1e-7);
    }

    #[test]
    fn typed_accessors_match_fields() {
        let mut genome = sample();
        assert!(genome.real_mut(Param::XObsv).is_none());
        assert!(genome.int_mut(Param::Alpha2).is_none());

        *genome.int_mut(Param::HiddenX).unwrap() = 1;
        assert_eq!(genome.get(Param::HiddenX), ParamValue::Int(1));

        let mut other = sample();
        other.alpha0 = 0.01;
        genome.take_from(&other, Param::Alpha0);
        assert_eq!(genome.alpha0, 0.01);
    }

    #[test]
    fn every_param_has_a_perturbation_of_the_right_kind() {
        for param in Param::ALL {
            match param.perturbation() {
                Perturbation::Step(step) => {
                    assert!(param.is_integer());
                    assert!(step > 0);
                }
                Perturbation::Decades(exps) => {
                    assert!(!param.is_integer());
                    assert!(!exps.contains(&0));
                    assert!(!param.initial_choices().is_empty());
                }
            }
        }
    }
}
