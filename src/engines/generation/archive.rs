use crate::config::OutputConfig;
use crate::engines::generation::genome::Genome;
use crate::error::SearchError;
use crate::types::{rank_by_fitness, Evaluation, FAILED_LOSS};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::PathBuf;

/// Best genome seen so far in a run. The loss only ever goes down.
#[derive(Debug, Clone)]
pub struct BestSoFar {
    genome: Option<Genome>,
    loss: f64,
}

impl Default for BestSoFar {
    fn default() -> Self {
        Self {
            genome: None,
            loss: FAILED_LOSS,
        }
    }
}

impl BestSoFar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn genome(&self) -> Option<&Genome> {
        self.genome.as_ref()
    }

    pub fn loss(&self) -> f64 {
        self.loss
    }

    /// Fold in a generation's results. Replaces the holder only on a strictly
    /// lower loss; returns whether that happened.
    ///
    /// While nothing has scored a finite loss yet, the generation's top-ranked
    /// candidate is held with an infinite loss so there is always something
    /// to report.
    pub fn observe(&mut self, evaluated: &[Evaluation]) -> bool {
        let mut improved = false;
        for evaluation in evaluated {
            if evaluation.loss < self.loss {
                self.loss = evaluation.loss;
                self.genome = Some(evaluation.genome.clone());
                improved = true;
            }
        }

        if self.genome.is_none() {
            if let Some(first) = rank_by_fitness(evaluated).first() {
                self.genome = Some(first.genome.clone());
                self.loss = first.loss;
            }
        }

        improved
    }
}

/// On-disk form of a generation's best: genome fields plus `loss`. A failed
/// (infinite) loss is written as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestRecord {
    #[serde(flatten)]
    pub genome: Genome,
    pub loss: Option<f64>,
}

impl BestRecord {
    pub fn new(genome: Genome, loss: f64) -> Self {
        Self {
            genome,
            loss: loss.is_finite().then_some(loss),
        }
    }

    pub fn loss_or_failed(&self) -> f64 {
        self.loss.unwrap_or(FAILED_LOSS)
    }
}

/// Write-once per-generation artifacts.
pub struct GenerationArchive {
    dir: PathBuf,
    prefix: String,
}

impl GenerationArchive {
    pub fn new(config: &OutputConfig) -> Self {
        Self {
            dir: config.dir.clone(),
            prefix: config.prefix.clone(),
        }
    }

    /// Generations are numbered from 1.
    pub fn path_for(&self, generation: usize) -> PathBuf {
        self.dir.join(format!("{}{}.json", self.prefix, generation))
    }

    pub fn save(&self, generation: usize, record: &BestRecord) -> Result<PathBuf, SearchError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(generation);

        let file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(SearchError::ArtifactExists(path));
            }
            Err(e) => return Err(e.into()),
        };

        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, record)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(path)
    }

    pub fn load(&self, generation: usize) -> Result<BestRecord, SearchError> {
        let contents = fs::read_to_string(self.path_for(generation))?;
        Ok(serde_json::from_str(&contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::generation::genome::ModelShape;
    use crate::types::Device;

    fn genome(x_neurons: i64) -> Genome {
        Genome {
            shape: ModelShape::default(),
            x_observables: 2,
            u_observables: 2,
            x_neurons,
            u_neurons: 10,
            hidden_x: 1,
            hidden_u: 1,
            alpha0: 0.1,
            alpha1: 1e-9,
            alpha2: 1e-18,
        }
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "koopman-ga-archive-{}-{}",
            std::process::id(),
            name
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn best_only_improves() {
        let mut best = BestSoFar::new();
        assert!(best.observe(&[
            Evaluation::new(0, genome(10), Device(0), 3.0),
            Evaluation::new(1, genome(11), Device(1), 2.0),
        ]));
        assert_eq!(best.loss(), 2.0);

        assert!(!best.observe(&[Evaluation::new(0, genome(12), Device(0), 2.0)]));
        assert_eq!(best.genome(), Some(&genome(11)));

        assert!(best.observe(&[Evaluation::new(0, genome(13), Device(0), 0.5)]));
        assert_eq!(best.genome(), Some(&genome(13)));
    }

    #[test]
    fn all_failures_still_yield_a_holder() {
        let mut best = BestSoFar::new();
        assert!(!best.observe(&[
            Evaluation::new(0, genome(10), Device(0), f64::INFINITY),
            Evaluation::new(1, genome(11), Device(1), f64::NAN),
        ]));
        assert_eq!(best.genome(), Some(&genome(10)));
        assert_eq!(best.loss(), f64::INFINITY);

        assert!(best.observe(&[Evaluation::new(0, genome(14), Device(0), 9.0)]));
        assert_eq!(best.genome(), Some(&genome(14)));
    }

    #[test]
    fn negative_infinity_cannot_pin_the_best() {
        let mut best = BestSoFar::new();
        best.observe(&[
            Evaluation::new(0, genome(10), Device(0), f64::NEG_INFINITY),
            Evaluation::new(1, genome(11), Device(1), 4.0),
        ]);
        assert_eq!(best.genome(), Some(&genome(11)));

        assert!(best.observe(&[Evaluation::new(0, genome(12), Device(0), 1.5)]));
        assert_eq!(best.loss(), 1.5);
    }

    #[test]
    fn artifacts_are_write_once() {
        let dir = scratch_dir("write-once");
        let archive = GenerationArchive::new(&OutputConfig {
            dir: dir.clone(),
            prefix: "best_params_".to_string(),
        });

        let record = BestRecord::new(genome(15), 0.25);
        let path = archive.save(1, &record).unwrap();
        assert_eq!(path, dir.join("best_params_1.json"));
        assert_eq!(archive.load(1).unwrap(), record);

        let again = archive.save(1, &BestRecord::new(genome(16), 0.1));
        assert!(matches!(again, Err(SearchError::ArtifactExists(_))));
        assert_eq!(archive.load(1).unwrap(), record);
    }

    #[test]
    fn artifact_uses_training_key_names() {
        let dir = scratch_dir("keys");
        let archive = GenerationArchive::new(&OutputConfig {
            dir,
            prefix: "gen_".to_string(),
        });
        let path = archive.save(2, &BestRecord::new(genome(20), f64::INFINITY)).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(json["Num_x_Neurons"], 20);
        assert_eq!(json["Num_meas"], 3);
        assert!(json["loss"].is_null());
    }
}
