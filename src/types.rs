use crate::engines::generation::genome::Genome;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Loss recorded for an evaluation that failed.
pub const FAILED_LOSS: f64 = f64::INFINITY;

/// Accelerator index, as understood by the training collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Device(pub usize);

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GPU {}", self.0)
    }
}

/// Fitness record: one genome paired with the loss it scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Position of the genome in the population it was evaluated with.
    pub index: usize,
    pub genome: Genome,
    pub device: Device,
    pub loss: f64,
}

impl Evaluation {
    pub fn new(index: usize, genome: Genome, device: Device, loss: f64) -> Self {
        Self {
            index,
            genome,
            device,
            loss: normalize_loss(loss),
        }
    }

    /// Higher is better.
    pub fn fitness(&self) -> f64 {
        -self.loss
    }

    pub fn failed(&self) -> bool {
        self.loss == FAILED_LOSS
    }
}

/// Losses no real training run can produce. NaN carries no ordering and
/// negative infinity would pin the best-so-far forever.
pub fn is_degenerate_loss(loss: f64) -> bool {
    loss.is_nan() || loss == f64::NEG_INFINITY
}

/// Degenerate losses rank with failures.
pub fn normalize_loss(loss: f64) -> f64 {
    if is_degenerate_loss(loss) {
        FAILED_LOSS
    } else {
        loss
    }
}

/// Best-first ordering: ascending loss.
pub fn compare_loss(a: &Evaluation, b: &Evaluation) -> Ordering {
    a.loss.total_cmp(&b.loss)
}

/// Evaluations sorted best-first. The sort is stable, so equal losses keep
/// population order.
pub fn rank_by_fitness(evaluated: &[Evaluation]) -> Vec<&Evaluation> {
    let mut ranked: Vec<&Evaluation> = evaluated.iter().collect();
    ranked.sort_by(|a, b| compare_loss(a, b));
    ranked
}
