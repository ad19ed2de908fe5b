pub mod command;
pub mod evaluator;

pub use command::CommandEvaluator;
pub use evaluator::{evaluate_isolated, EvaluationRequest, Evaluator, FnEvaluator};
