use super::evaluator::{EvaluationRequest, Evaluator};
use crate::config::TrainerConfig;
use crate::error::SearchError;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Evaluates each genome in its own trainer process.
///
/// The process sees only its assigned accelerator (`CUDA_VISIBLE_DEVICES`),
/// receives the [`EvaluationRequest`] as JSON on stdin and must print the
/// loss as the last line of stdout. Anything else counts as a failure.
pub struct CommandEvaluator {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandEvaluator {
    pub fn new(config: &TrainerConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
        }
    }
}

impl Evaluator for CommandEvaluator {
    fn evaluate(&self, request: &EvaluationRequest<'_>) -> Result<f64, SearchError> {
        let payload = serde_json::to_vec(request)?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .env("CUDA_VISIBLE_DEVICES", request.device.0.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| {
                SearchError::Evaluation(format!(
                    "Failed to start trainer '{}': {}",
                    self.program.display(),
                    e
                ))
            })?;

        // A trainer that dies before reading its request closes the pipe.
        // Reap it regardless and report its exit status over the write error.
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(&payload),
            None => Ok(()),
        };

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(SearchError::Evaluation(format!(
                "Trainer exited with {}",
                output.status
            )));
        }
        written?;

        parse_loss(&String::from_utf8_lossy(&output.stdout))
    }
}

/// The loss is the last non-empty line of trainer output.
pub fn parse_loss(stdout: &str) -> Result<f64, SearchError> {
    let line = stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .last()
        .ok_or_else(|| SearchError::Evaluation("Trainer printed no loss".to_string()))?;

    line.parse::<f64>()
        .map_err(|_| SearchError::Evaluation(format!("Unparsable loss line: '{}'", line)))
}
