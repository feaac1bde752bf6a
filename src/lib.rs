//! # Log Pipeline
//!
//! A many-producer, single-writer logging pipeline. A pool of producer
//! threads builds timestamped log lines and pushes them onto a shared,
//! unbounded queue; one writer thread drains the queue into a file.
//!
//! ## Features
//!
//! - **Lossless hand-off**: concurrent producers never lose or duplicate a line
//! - **Per-producer order**: each producer's lines reach the file in the order written
//! - **Clean termination**: the writer stops only once every producer is done
//!   and the queue is empty
//! - **Best-effort writes**: a failed append is reported and skipped, never fatal

pub mod config;
pub mod core;
pub mod pipeline;
pub mod sinks;
pub mod verify;

pub mod prelude {
    pub use crate::config::PipelineConfig;
    pub use crate::core::{
        CompletionSignal, Diagnostics, LogLevel, LogLine, LogQueue, ParsedLine, PipelineError,
        PipelineMetrics, Result, TimestampFormat,
    };
    pub use crate::pipeline::{
        DrainMode, FileWriter, Pipeline, PipelineBuilder, Producer, RunSummary, WriterState,
    };
    pub use crate::sinks::{FaultySink, FileSink, LineSink};
    pub use crate::verify::{verify_output, VerifyReport};
}

pub use crate::config::PipelineConfig;
pub use crate::core::{
    CompletionSignal, Diagnostics, LogLevel, LogLine, LogQueue, ParsedLine, PipelineError,
    PipelineMetrics, Result, TimestampFormat,
};
pub use crate::pipeline::{
    DrainMode, FileWriter, Pipeline, PipelineBuilder, Producer, RunSummary, WriterState,
};
pub use crate::sinks::{FaultySink, FileSink, LineSink};
pub use crate::verify::{verify_output, VerifyReport};
