//! Core pipeline types: the shared queue, completion signal, log lines,
//! and the ambient error, metrics, and diagnostics support

pub mod diagnostics;
pub mod error;
pub mod log_line;
pub mod metrics;
pub mod queue;
pub mod signal;
pub mod timestamp;

pub use diagnostics::{Diagnostics, LogLevel, Stream};
pub use error::{PipelineError, Result};
pub use log_line::{current_thread_id, LogLine, ParsedLine};
pub use metrics::PipelineMetrics;
pub use queue::LogQueue;
pub use signal::CompletionSignal;
pub use timestamp::TimestampFormat;
