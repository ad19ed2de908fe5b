use crate::config::{AppConfig, DataConfig, ParamRanges, SearchConfig, TrainingConfig};
use crate::engines::dispatch::{require_devices, DeviceEnumerator, Dispatcher};
use crate::engines::evaluation::Evaluator;
use crate::engines::generation::{
    archive::{BestRecord, BestSoFar, GenerationArchive},
    genome::{Genome, ModelShape},
    operators::{crossover, mutate, mutate_until_distinct, select_elites, tournament_selection},
    population::initialize_population,
};
use crate::error::SearchError;
use crate::types::Evaluation;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::path::PathBuf;

/// Outcome of one generation.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    /// 1-based, matching the artifact name.
    pub generation: usize,
    /// The evaluated population, in population order.
    pub evaluations: Vec<Evaluation>,
    /// Best-so-far after this generation.
    pub best: Genome,
    pub best_loss: f64,
    pub artifact: PathBuf,
    pub completed_at: DateTime<Utc>,
}

impl GenerationReport {
    pub fn failures(&self) -> usize {
        self.evaluations.iter().filter(|e| e.failed()).count()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub best: Genome,
    pub best_loss: f64,
    pub generations: Vec<GenerationReport>,
}

pub trait ProgressCallback: Send {
    fn on_generation_start(&mut self, generation: usize);
    fn on_candidate_evaluated(&mut self, evaluation: &Evaluation, total: usize);
    fn on_generation_complete(&mut self, report: &GenerationReport);
}

/// Generational GA over Koopman autoencoder hyperparameters.
///
/// Each generation is evaluated in full on the device pool, folded into the
/// best-so-far, persisted, and then replaced by a new population of elites
/// plus tournament-bred children.
pub struct EvolutionEngine<E: Evaluator> {
    search: SearchConfig,
    training: TrainingConfig,
    data: DataConfig,
    shape: ModelShape,
    ranges: ParamRanges,
    dispatcher: Dispatcher,
    archive: GenerationArchive,
    evaluator: E,
    rng: StdRng,
}

impl<E: Evaluator> EvolutionEngine<E> {
    /// Validate the configuration and enumerate devices. Fails before any
    /// genome exists if ranges are missing or no device is available.
    pub fn new<D: DeviceEnumerator + ?Sized>(
        config: &AppConfig,
        devices: &D,
        evaluator: E,
    ) -> Result<Self, SearchError> {
        let ranges = config.ranges()?.clone();
        config.validate()?;

        let devices = require_devices(devices)?;
        info!(
            "Using {} device(s): {}",
            devices.len(),
            devices
                .iter()
                .map(|d| d.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let rng = match config.search.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            search: config.search.clone(),
            training: config.training.clone(),
            data: config.data.clone(),
            shape: config.model,
            ranges,
            dispatcher: Dispatcher::new(devices)?,
            archive: GenerationArchive::new(&config.output),
            evaluator,
            rng,
        })
    }

    /// Run every generation and return the best genome found.
    pub fn run<C: ProgressCallback>(&mut self, mut callback: C) -> Result<SearchReport, SearchError> {
        let mut population = initialize_population(
            self.search.population_size,
            self.shape,
            &self.ranges,
            &mut self.rng,
        );
        let mut best = BestSoFar::new();
        let mut reports = Vec::with_capacity(self.search.generations);

        for generation in 0..self.search.generations {
            callback.on_generation_start(generation);

            let evaluated = self.dispatcher.dispatch(
                &population,
                &self.evaluator,
                &self.training,
                &self.data,
            )?;

            for evaluation in &evaluated {
                info!(
                    "[{}] Candidate: {} | Loss: {}",
                    evaluation.device, evaluation.genome, evaluation.loss
                );
                callback.on_candidate_evaluated(evaluation, evaluated.len());
            }

            let failures = evaluated.iter().filter(|e| e.failed()).count();
            if failures == evaluated.len() {
                warn!(
                    "Every candidate in generation {} failed to evaluate",
                    generation + 1
                );
            }

            if best.observe(&evaluated) {
                debug!("Best loss improved to {}", best.loss());
            }

            let best_genome = best.genome().cloned().ok_or_else(|| {
                SearchError::Configuration("Population is empty".to_string())
            })?;
            info!(
                "Best candidate in generation {}: {} (Loss: {})",
                generation + 1,
                best_genome,
                best.loss()
            );

            let artifact = self
                .archive
                .save(generation + 1, &BestRecord::new(best_genome.clone(), best.loss()))?;
            info!("Saved GA best parameters to {}", artifact.display());

            let report = GenerationReport {
                generation: generation + 1,
                evaluations: evaluated,
                best: best_genome,
                best_loss: best.loss(),
                artifact,
                completed_at: Utc::now(),
            };
            callback.on_generation_complete(&report);

            if generation + 1 < self.search.generations {
                population = self.create_next_generation(&report.evaluations);
            }
            reports.push(report);
        }

        let best_genome = best.genome().cloned().ok_or_else(|| {
            SearchError::Configuration("At least one generation must run".to_string())
        })?;
        info!("Best candidate overall: {} (Loss: {})", best_genome, best.loss());

        Ok(SearchReport {
            best: best_genome,
            best_loss: best.loss(),
            generations: reports,
        })
    }

    fn create_next_generation(&mut self, evaluated: &[Evaluation]) -> Vec<Genome> {
        let mut next_generation = select_elites(evaluated, self.search.elitism_count);

        while next_generation.len() < self.search.population_size {
            let parent1 = tournament_selection(evaluated, self.search.tournament_size, &mut self.rng);
            let parent2 = tournament_selection(evaluated, self.search.tournament_size, &mut self.rng);

            let mut child = crossover(&parent1, &parent2, &mut self.rng);
            mutate(&mut child, &self.ranges, self.search.mutation_rate, &mut self.rng);

            let distinct = mutate_until_distinct(
                &mut child,
                &parent1,
                &self.ranges,
                self.search.retry_mutation_rate,
                self.search.max_mutation_retries,
                &mut self.rng,
            );
            if !distinct {
                debug!(
                    "Keeping child identical to its parent after {} retries",
                    self.search.max_mutation_retries
                );
            }

            next_generation.push(child);
        }

        next_generation
    }
}
