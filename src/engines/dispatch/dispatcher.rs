use crate::config::{DataConfig, TrainingConfig};
use crate::engines::evaluation::{evaluate_isolated, EvaluationRequest, Evaluator};
use crate::engines::generation::genome::Genome;
use crate::error::SearchError;
use crate::types::{Device, Evaluation, FAILED_LOSS};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

/// Fans a population out over a fixed device list.
///
/// Genome `i` runs on device `i mod D`. Each device gets one worker that
/// drains its share in population order, so a device never hosts two
/// evaluations at once. The worker pool lives for a single `dispatch` call
/// and every evaluation finishes before it returns.
pub struct Dispatcher {
    devices: Vec<Device>,
}

impl Dispatcher {
    pub fn new(devices: Vec<Device>) -> Result<Self, SearchError> {
        if devices.is_empty() {
            return Err(SearchError::NoDevices);
        }
        Ok(Self { devices })
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn device_for(&self, index: usize) -> Device {
        self.devices[index % self.devices.len()]
    }

    /// Population indices per device, in population order. Devices with
    /// nothing to do are left out.
    pub fn lanes(&self, population_size: usize) -> Vec<(Device, Vec<usize>)> {
        let d = self.devices.len();
        self.devices
            .iter()
            .enumerate()
            .map(|(slot, &device)| (device, (slot..population_size).step_by(d).collect::<Vec<_>>()))
            .filter(|(_, indices)| !indices.is_empty())
            .collect()
    }

    /// Evaluate every genome and return the results in population order.
    pub fn dispatch<E: Evaluator + ?Sized>(
        &self,
        population: &[Genome],
        evaluator: &E,
        training: &TrainingConfig,
        data: &DataConfig,
    ) -> Result<Vec<Evaluation>, SearchError> {
        if population.is_empty() {
            return Ok(Vec::new());
        }

        let lanes = self.lanes(population.len());
        let pool = ThreadPoolBuilder::new()
            .num_threads(lanes.len())
            .thread_name(|i| format!("koopman-ga-worker-{}", i))
            .build()?;

        let lane_results: Vec<Vec<(usize, f64)>> = pool.install(|| {
            lanes
                .par_iter()
                .with_max_len(1)
                .map(|(device, indices)| {
                    indices
                        .iter()
                        .map(|&i| {
                            let request = EvaluationRequest {
                                genome: &population[i],
                                device: *device,
                                training,
                                data,
                            };
                            (i, evaluate_isolated(evaluator, &request))
                        })
                        .collect::<Vec<_>>()
                })
                .collect()
        });
        drop(pool);

        let mut losses = vec![FAILED_LOSS; population.len()];
        for (i, loss) in lane_results.into_iter().flatten() {
            losses[i] = loss;
        }

        Ok(population
            .iter()
            .zip(losses)
            .enumerate()
            .map(|(i, (genome, loss))| Evaluation::new(i, genome.clone(), self.device_for(i), loss))
            .collect())
    }
}
