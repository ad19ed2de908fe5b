use super::evolution_engine::{GenerationReport, ProgressCallback};
use crate::types::Evaluation;
use log::info;

pub struct ConsoleProgressCallback {
    total_generations: usize,
}

impl ConsoleProgressCallback {
    pub fn new(total_generations: usize) -> Self {
        Self { total_generations }
    }
}

impl ProgressCallback for ConsoleProgressCallback {
    fn on_generation_start(&mut self, generation: usize) {
        info!(
            "Generation {}/{} starting...",
            generation + 1,
            self.total_generations
        );
    }

    fn on_candidate_evaluated(&mut self, evaluation: &Evaluation, total: usize) {
        let done = evaluation.index + 1;
        if done % 10 == 0 || done == total {
            info!("  Evaluated {}/{} candidates", done, total);
        }
    }

    fn on_generation_complete(&mut self, report: &GenerationReport) {
        info!(
            "Generation {}/{} complete. Best loss: {:.6}, failures: {}",
            report.generation,
            self.total_generations,
            report.best_loss,
            report.failures()
        );
    }
}

// For callers embedding the search in another thread
pub struct ChannelProgressCallback {
    sender: std::sync::mpsc::Sender<ProgressMessage>,
}

#[derive(Debug, Clone)]
pub enum ProgressMessage {
    GenerationStart(usize),
    CandidateEvaluated { evaluation: Evaluation, total: usize },
    GenerationComplete(GenerationReport),
}

impl ChannelProgressCallback {
    pub fn new(sender: std::sync::mpsc::Sender<ProgressMessage>) -> Self {
        Self { sender }
    }
}

impl ProgressCallback for ChannelProgressCallback {
    fn on_generation_start(&mut self, generation: usize) {
        let _ = self.sender.send(ProgressMessage::GenerationStart(generation));
    }

    fn on_candidate_evaluated(&mut self, evaluation: &Evaluation, total: usize) {
        let _ = self.sender.send(ProgressMessage::CandidateEvaluated {
            evaluation: evaluation.clone(),
            total,
        });
    }

    fn on_generation_complete(&mut self, report: &GenerationReport) {
        let _ = self
            .sender
            .send(ProgressMessage::GenerationComplete(report.clone()));
    }
}
