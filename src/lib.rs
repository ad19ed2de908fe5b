//! Genetic-algorithm hyperparameter search for Koopman-operator
//! autoencoders.
//!
//! Candidates are scored by a short, device-pinned training run (see
//! [`engines::evaluation::Evaluator`]) dispatched across a fixed pool of
//! accelerators, one evaluation per device at a time.

pub mod config;
pub mod engines;
pub mod error;
pub mod types;

pub use error::SearchError;
