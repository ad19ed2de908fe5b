pub mod archive;
pub mod evolution_engine;
pub mod genome;
pub mod operators;
pub mod population;
pub mod progress;

pub use archive::{BestRecord, BestSoFar, GenerationArchive};
pub use evolution_engine::{
    EvolutionEngine, GenerationReport, ProgressCallback, SearchReport,
};
pub use genome::{Genome, ModelShape, Param, ParamValue};
pub use progress::{ChannelProgressCallback, ConsoleProgressCallback, ProgressMessage};
