//! Pipeline orchestrator
//!
//! Wires the queue, completion signal, producers, and file writer together
//! and runs them to completion:
//!
//! 1. delete any previous output file
//! 2. start the clock
//! 3. launch the producers
//! 4. launch the writer
//! 5. join every producer
//! 6. set the completion signal
//! 7. join the writer
//! 8. stop the clock and report

use super::consumer::FileWriter;
use super::producer::Producer;
use crate::config::PipelineConfig;
use crate::core::{
    CompletionSignal, Diagnostics, LogQueue, PipelineError, PipelineMetrics, Result,
    TimestampFormat,
};
use crate::pipeline::DrainMode;
use crate::sinks::{FaultySink, FileSink, LineSink};
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Outcome of a completed run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub output_path: PathBuf,
    pub producers: usize,
    pub writes_per_producer: u64,
    pub enqueued: u64,
    pub written: u64,
    pub write_failures: u64,
    pub idle_polls: u64,
    pub elapsed_ms: u64,
}

impl RunSummary {
    pub fn expected_lines(&self) -> u64 {
        self.producers as u64 * self.writes_per_producer
    }

    /// Every produced line made it into the file
    pub fn is_complete(&self) -> bool {
        self.written == self.expected_lines()
    }
}

pub struct Pipeline {
    config: PipelineConfig,
    diagnostics: Diagnostics,
}

impl Pipeline {
    /// Build a pipeline with console diagnostics derived from `config`
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let diagnostics = config.diagnostics();
        Self::with_diagnostics(config, diagnostics)
    }

    pub fn with_diagnostics(config: PipelineConfig, diagnostics: Diagnostics) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            diagnostics,
        })
    }

    /// Create a builder for Pipeline
    ///
    /// # Example
    /// ```no_run
    /// use log_pipeline::Pipeline;
    ///
    /// let summary = Pipeline::builder()
    ///     .output_path("/tmp/output.txt")
    ///     .producers(2)
    ///     .writes_per_producer(3)
    ///     .build()
    ///     .unwrap()
    ///     .run()
    ///     .unwrap();
    ///
    /// assert_eq!(summary.written, 6);
    /// ```
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline to completion.
    ///
    /// The only error that stops a run before any line is produced is a
    /// failure to open the output file. Failed appends are reported through
    /// diagnostics and counted in the summary instead.
    pub fn run(&self) -> Result<RunSummary> {
        let path = self.config.output_path.as_path();
        remove_previous_output(path)?;

        let start = Instant::now();

        let queue = Arc::new(LogQueue::new());
        let signal = Arc::new(CompletionSignal::new());
        let metrics = Arc::new(PipelineMetrics::new());

        // The writer needs its file before anything is produced; without it
        // there is nowhere for lines to go.
        let sink = match self.open_sink() {
            Ok(sink) => sink,
            Err(e) => {
                self.diagnostics.fatal(e.to_string());
                return Err(e);
            }
        };
        let writer = FileWriter::with_sink(
            sink,
            Arc::clone(&queue),
            Arc::clone(&signal),
            Arc::clone(&metrics),
            self.diagnostics.clone(),
        )
        .with_poll_interval(self.config.poll_interval())
        .with_drain_mode(self.config.drain_mode);

        let mut producers = Vec::with_capacity(self.config.producers);
        for index in 0..self.config.producers {
            let producer = Producer::new(
                index,
                self.config.writes_per_producer,
                Arc::clone(&queue),
                Arc::clone(&metrics),
                self.diagnostics.clone(),
            )
            .with_timestamp_format(self.config.timestamp_format.clone());

            match thread::Builder::new()
                .name(format!("producer-{}", index))
                .spawn(move || producer.run())
            {
                Ok(handle) => producers.push(handle),
                Err(e) => {
                    join_producers(producers, &self.diagnostics);
                    return Err(spawn_error("producer", e));
                }
            }
        }

        let writer = match thread::Builder::new()
            .name("file-writer".to_string())
            .spawn(move || writer.run())
        {
            Ok(handle) => handle,
            Err(e) => {
                join_producers(producers, &self.diagnostics);
                return Err(spawn_error("file writer", e));
            }
        };

        let panicked = join_producers(producers, &self.diagnostics);

        signal.set();

        if writer.join().is_err() {
            self.diagnostics.error("File writer thread panicked.");
            return Err(PipelineError::WriterPanicked);
        }

        let elapsed = start.elapsed();

        if let Some(index) = panicked {
            return Err(PipelineError::ProducerPanicked { index });
        }

        self.diagnostics
            .info(format!("Total execution time: {} ms", elapsed.as_millis()));
        self.diagnostics.info(format!(
            "All producers have finished executing. Log lines written to '{}'.",
            path.display()
        ));

        Ok(RunSummary {
            output_path: path.to_path_buf(),
            producers: self.config.producers,
            writes_per_producer: self.config.writes_per_producer,
            enqueued: metrics.enqueued(),
            written: metrics.written(),
            write_failures: metrics.write_failures(),
            idle_polls: metrics.idle_polls(),
            elapsed_ms: elapsed.as_millis() as u64,
        })
    }

    fn open_sink(&self) -> Result<Box<dyn LineSink>> {
        let file = FileSink::open(&self.config.output_path)?;
        if self.config.failure_rate <= 0.0 {
            return Ok(Box::new(file));
        }

        let faulty = match self.config.failure_seed {
            Some(seed) => FaultySink::with_seed(file, self.config.failure_rate, seed)?,
            None => FaultySink::new(file, self.config.failure_rate)?,
        };
        Ok(Box::new(faulty))
    }
}

/// Delete the output of a previous run. A missing file is not an error.
fn remove_previous_output(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(PipelineError::io_operation(
            "removing previous output",
            format!("cannot delete '{}'", path.display()),
            e,
        )),
    }
}

/// Join every producer, returning the index of the first one that panicked
fn join_producers(
    handles: Vec<thread::JoinHandle<()>>,
    diagnostics: &Diagnostics,
) -> Option<usize> {
    let mut panicked = None;
    for (index, handle) in handles.into_iter().enumerate() {
        if handle.join().is_err() {
            diagnostics.error(format!("Producer {} panicked.", index));
            panicked.get_or_insert(index);
        }
    }
    panicked
}

fn spawn_error(what: &str, source: io::Error) -> PipelineError {
    PipelineError::io_operation("spawning thread", format!("cannot start {}", what), source)
}

/// Builder for constructing a Pipeline with a fluent API
///
/// # Example
/// ```
/// use log_pipeline::prelude::*;
/// use std::time::Duration;
///
/// let pipeline = Pipeline::builder()
///     .output_path("lines.txt")
///     .producers(4)
///     .writes_per_producer(1_000)
///     .poll_interval(Duration::from_millis(5))
///     .drain_mode(DrainMode::Wait)
///     .diagnostics(Diagnostics::capturing())
///     .build()
///     .unwrap();
///
/// assert_eq!(pipeline.config().producers, 4);
/// ```
pub struct PipelineBuilder {
    config: PipelineConfig,
    diagnostics: Option<Diagnostics>,
}

impl PipelineBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            diagnostics: None,
        }
    }

    /// Start from an existing configuration
    #[must_use = "builder methods return a new value"]
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_path = path.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn producers(mut self, producers: usize) -> Self {
        self.config.producers = producers;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn writes_per_producer(mut self, writes: u64) -> Self {
        self.config.writes_per_producer = writes;
        self
    }

    /// Set the writer's idle interval
    ///
    /// Sub-millisecond intervals are rounded up to 1 ms.
    #[must_use = "builder methods return a new value"]
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval_ms = (interval.as_millis() as u64).max(1);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn drain_mode(mut self, mode: DrainMode) -> Self {
        self.config.drain_mode = mode;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.config.timestamp_format = format;
        self
    }

    /// Fail each append with probability `rate`, optionally seeded
    #[must_use = "builder methods return a new value"]
    pub fn failure_rate(mut self, rate: f64, seed: Option<u64>) -> Self {
        self.config.failure_rate = rate;
        self.config.failure_seed = seed;
        self
    }

    /// Use these diagnostics instead of console output derived from the config
    #[must_use = "builder methods return a new value"]
    pub fn diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = Some(diagnostics);
        self
    }

    /// Validate the configuration and build the Pipeline
    pub fn build(self) -> Result<Pipeline> {
        match self.diagnostics {
            Some(diagnostics) => Pipeline::with_diagnostics(self.config, diagnostics),
            None => Pipeline::new(self.config),
        }
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn pipeline(path: &Path, producers: usize, writes: u64) -> (Pipeline, Diagnostics) {
        let diagnostics = Diagnostics::capturing();
        let pipeline = Pipeline::builder()
            .output_path(path)
            .producers(producers)
            .writes_per_producer(writes)
            .poll_interval(Duration::from_millis(1))
            .diagnostics(diagnostics.clone())
            .build()
            .expect("valid pipeline");
        (pipeline, diagnostics)
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        assert!(Pipeline::builder().producers(0).build().is_err());
        assert!(Pipeline::builder().failure_rate(2.0, None).build().is_err());
        assert!(Pipeline::builder()
            .timestamp_format(TimestampFormat::Custom("%Q".to_string()))
            .build()
            .is_err());
    }

    #[test]
    fn test_builder_rounds_poll_interval_up() {
        let pipeline = Pipeline::builder()
            .poll_interval(Duration::from_micros(10))
            .diagnostics(Diagnostics::capturing())
            .build()
            .expect("valid pipeline");
        assert_eq!(pipeline.config().poll_interval_ms, 1);
    }

    #[test]
    fn test_run_writes_every_line() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("out.txt");
        let (pipeline, diagnostics) = pipeline(&path, 3, 10);

        let summary = pipeline.run().expect("run");
        assert_eq!(summary.enqueued, 30);
        assert_eq!(summary.written, 30);
        assert_eq!(summary.write_failures, 0);
        assert!(summary.is_complete());

        let content = fs::read_to_string(&path).expect("read output");
        assert_eq!(content.lines().count(), 30);

        let captured = diagnostics.captured();
        let completions = captured
            .iter()
            .filter(|l| l.contains("completed its work."))
            .count();
        assert_eq!(completions, 3);
        assert!(captured.iter().any(|l| l.contains("Total execution time:")));
    }

    #[test]
    fn test_remove_previous_output_tolerates_missing_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("never-created.txt");
        assert!(remove_previous_output(&path).is_ok());

        fs::write(&path, "old").expect("seed file");
        remove_previous_output(&path).expect("remove");
        assert!(!path.exists());
    }

    #[test]
    fn test_unopenable_output_is_fatal() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("missing").join("out.txt");
        let (pipeline, diagnostics) = pipeline(&path, 2, 5);

        let err = pipeline.run().expect_err("run must fail");
        assert!(err.is_fatal_open());
        assert!(diagnostics
            .captured()
            .iter()
            .any(|l| l.contains("[FATAL]")));
        // No producer ran
        assert!(!diagnostics
            .captured()
            .iter()
            .any(|l| l.contains("completed its work.")));
    }
}
