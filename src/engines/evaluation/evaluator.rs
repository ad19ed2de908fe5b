use crate::config::{DataConfig, TrainingConfig};
use crate::engines::generation::genome::Genome;
use crate::error::SearchError;
use crate::types::{is_degenerate_loss, Device, FAILED_LOSS};
use log::{debug, warn};
use serde::Serialize;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Everything one fitness evaluation needs.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationRequest<'a> {
    pub genome: &'a Genome,
    pub device: Device,
    pub training: &'a TrainingConfig,
    pub data: &'a DataConfig,
}

/// The training collaborator: train `request.genome` for the truncated
/// budget on `request.device` and report the validation loss.
///
/// Implementations must keep the work on the given device. Returning `Err`
/// or panicking is allowed; callers go through [`evaluate_isolated`].
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, request: &EvaluationRequest<'_>) -> Result<f64, SearchError>;
}

/// Run one evaluation, converting any error, panic or degenerate loss into
/// [`FAILED_LOSS`] so a bad configuration cannot take the generation down.
pub fn evaluate_isolated<E: Evaluator + ?Sized>(
    evaluator: &E,
    request: &EvaluationRequest<'_>,
) -> f64 {
    debug!("Evaluating on {}: {}", request.device, request.genome);

    match panic::catch_unwind(AssertUnwindSafe(|| evaluator.evaluate(request))) {
        Ok(Ok(loss)) if is_degenerate_loss(loss) => {
            warn!(
                "Error evaluating candidate: {} | loss is {} on {}",
                request.genome, loss, request.device
            );
            FAILED_LOSS
        }
        Ok(Ok(loss)) => loss,
        Ok(Err(e)) => {
            warn!(
                "Error evaluating candidate: {} | {} on {}",
                request.genome, e, request.device
            );
            FAILED_LOSS
        }
        Err(payload) => {
            warn!(
                "Error evaluating candidate: {} | panicked on {}: {}",
                request.genome,
                request.device,
                panic_message(payload.as_ref())
            );
            FAILED_LOSS
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Adapter turning a closure into an [`Evaluator`].
pub struct FnEvaluator<F> {
    f: F,
}

impl<F> FnEvaluator<F>
where
    F: Fn(&EvaluationRequest<'_>) -> Result<f64, SearchError> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Evaluator for FnEvaluator<F>
where
    F: Fn(&EvaluationRequest<'_>) -> Result<f64, SearchError> + Send + Sync,
{
    fn evaluate(&self, request: &EvaluationRequest<'_>) -> Result<f64, SearchError> {
        (self.f)(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::generation::genome::ModelShape;

    fn genome() -> Genome {
        Genome {
            shape: ModelShape::default(),
            x_observables: 2,
            u_observables: 2,
            x_neurons: 10,
            u_neurons: 10,
            hidden_x: 1,
            hidden_u: 1,
            alpha0: 0.1,
            alpha1: 1e-9,
            alpha2: 1e-18,
        }
    }

    fn run<E: Evaluator>(evaluator: &E) -> f64 {
        let g = genome();
        let training = TrainingConfig::default();
        let data = DataConfig::default();
        let request = EvaluationRequest {
            genome: &g,
            device: Device(1),
            training: &training,
            data: &data,
        };
        evaluate_isolated(evaluator, &request)
    }

    #[test]
    fn successful_loss_passes_through() {
        let evaluator = FnEvaluator::new(|req| Ok(req.genome.x_neurons as f64 * 0.5));
        assert_eq!(run(&evaluator), 5.0);
    }

    #[test]
    fn errors_become_infinite_loss() {
        let evaluator =
            FnEvaluator::new(|_| Err(SearchError::Evaluation("out of memory".to_string())));
        assert_eq!(run(&evaluator), FAILED_LOSS);
    }

    #[test]
    fn panics_become_infinite_loss() {
        let evaluator = FnEvaluator::new(|req| {
            if req.device == Device(1) {
                panic!("device lost");
            }
            Ok(0.0)
        });
        assert_eq!(run(&evaluator), FAILED_LOSS);
    }

    #[test]
    fn nan_becomes_infinite_loss() {
        let evaluator = FnEvaluator::new(|_| Ok(f64::NAN));
        assert_eq!(run(&evaluator), FAILED_LOSS);
    }

    #[test]
    fn negative_infinity_becomes_infinite_loss() {
        let evaluator = FnEvaluator::new(|_| Ok(f64::NEG_INFINITY));
        assert_eq!(run(&evaluator), FAILED_LOSS);
    }
}
