use anyhow::Context;
use koopman_ga::config::ConfigManager;
use koopman_ga::engines::dispatch::ConfiguredDevices;
use koopman_ga::engines::evaluation::CommandEvaluator;
use koopman_ga::engines::generation::{ConsoleProgressCallback, EvolutionEngine};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "koopman-ga.toml".to_string());

    let manager = ConfigManager::new();
    manager
        .load_from_file(&config_path)
        .with_context(|| format!("loading config from '{}'", config_path))?;
    let config = manager.get();

    let devices = ConfiguredDevices::new(config.devices.clone());
    let evaluator = CommandEvaluator::new(&config.trainer);

    let mut engine = EvolutionEngine::new(&config, &devices, evaluator)?;
    let report = engine.run(ConsoleProgressCallback::new(config.search.generations))?;

    println!("{}", serde_json::to_string_pretty(&report.best)?);
    Ok(())
}
