//! File writer: the single consumer of the log queue
//!
//! The writer is a two-state machine. While `Draining` it repeatedly takes a
//! line off the queue and appends it to its sink. It moves to `Done` only when
//! the completion signal is set *and* the queue is empty, then flushes the sink
//! and exits.
//!
//! A failed append drops that one line, is reported to diagnostics and
//! counted in the metrics, and the writer carries on.

use crate::core::{
    CompletionSignal, Diagnostics, LogLine, LogQueue, PipelineMetrics, Result,
};
use crate::sinks::{FileSink, LineSink};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Default idle interval between queue checks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How the writer idles when the queue is empty
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrainMode {
    /// Sleep for the poll interval, then check again
    #[default]
    Poll,
    /// Block on the queue for up to the poll interval; a new line wakes the
    /// writer immediately
    Wait,
}

impl fmt::Display for DrainMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrainMode::Poll => write!(f, "poll"),
            DrainMode::Wait => write!(f, "wait"),
        }
    }
}

impl FromStr for DrainMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "poll" => Ok(DrainMode::Poll),
            "wait" => Ok(DrainMode::Wait),
            _ => Err(format!("Invalid drain mode: '{}'", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    Draining,
    Done,
}

pub struct FileWriter<S: LineSink> {
    sink: S,
    queue: Arc<LogQueue>,
    signal: Arc<CompletionSignal>,
    metrics: Arc<PipelineMetrics>,
    diagnostics: Diagnostics,
    poll_interval: Duration,
    drain_mode: DrainMode,
    state: WriterState,
}

impl FileWriter<FileSink> {
    /// Open the output file and build a writer for it.
    ///
    /// An error here is fatal to the run; see [`FileSink::open`].
    pub fn open(
        path: impl Into<PathBuf>,
        queue: Arc<LogQueue>,
        signal: Arc<CompletionSignal>,
        metrics: Arc<PipelineMetrics>,
        diagnostics: Diagnostics,
    ) -> Result<Self> {
        let sink = FileSink::open(path)?;
        Ok(Self::with_sink(sink, queue, signal, metrics, diagnostics))
    }
}

impl<S: LineSink> FileWriter<S> {
    pub fn with_sink(
        sink: S,
        queue: Arc<LogQueue>,
        signal: Arc<CompletionSignal>,
        metrics: Arc<PipelineMetrics>,
        diagnostics: Diagnostics,
    ) -> Self {
        Self {
            sink,
            queue,
            signal,
            metrics,
            diagnostics,
            poll_interval: DEFAULT_POLL_INTERVAL,
            drain_mode: DrainMode::default(),
            state: WriterState::Draining,
        }
    }

    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    #[must_use]
    pub fn with_drain_mode(mut self, mode: DrainMode) -> Self {
        self.drain_mode = mode;
        self
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    /// Run one iteration of the drain loop and return the resulting state
    pub fn step(&mut self) -> WriterState {
        if self.state == WriterState::Done {
            return self.state;
        }

        // Read the signal before dequeuing. The signal is set only after every
        // producer has returned, so if it was already set and the queue is
        // still empty, no line can arrive later.
        let done = self.signal.is_set();

        let next = match self.drain_mode {
            DrainMode::Wait if !done => self.queue.dequeue_timeout(self.poll_interval),
            _ => self.queue.try_dequeue(),
        };

        match next {
            Some(line) => self.write(&line),
            None if done => self.state = WriterState::Done,
            None => {
                self.metrics.record_idle_poll();
                if self.drain_mode == DrainMode::Poll {
                    thread::sleep(self.poll_interval);
                }
            }
        }

        self.state
    }

    /// Drain until done, then flush. The sink is dropped on return, or
    /// during unwinding if anything outside a sink call panics.
    pub fn run(mut self) {
        while self.step() == WriterState::Draining {}

        if let Err(e) = self.sink.flush() {
            self.diagnostics
                .error(format!("Final flush of {} failed: {}", self.sink.name(), e));
        }

        self.diagnostics.debug(format!(
            "File writer finished: {} lines written, {} dropped.",
            self.metrics.written(),
            self.metrics.write_failures()
        ));
    }

    /// Append one line, isolating sink errors and panics
    fn write(&mut self, line: &LogLine) {
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            self.sink.append(line)
        }));

        match result {
            Ok(Ok(())) => {
                self.metrics.record_written();
            }
            Ok(Err(e)) => {
                self.metrics.record_write_failure();
                self.diagnostics.error(format!(
                    "Write to {} failed, line dropped: {}",
                    self.sink.name(),
                    e
                ));
            }
            Err(panic_info) => {
                self.metrics.record_write_failure();
                self.diagnostics.error(format!(
                    "Write to {} panicked, line dropped: {}",
                    self.sink.name(),
                    panic_message(&*panic_info)
                ));
            }
        }
    }
}

fn panic_message(panic_info: &(dyn Any + Send)) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
