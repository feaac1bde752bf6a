//! Producer pool, file writer, and the orchestrator that runs them

pub mod consumer;
pub mod orchestrator;
pub mod producer;

pub use consumer::{DrainMode, FileWriter, WriterState, DEFAULT_POLL_INTERVAL};
pub use orchestrator::{Pipeline, PipelineBuilder, RunSummary};
pub use producer::Producer;
