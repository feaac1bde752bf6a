//! Producer worker

use crate::core::{Diagnostics, LogLine, LogQueue, PipelineMetrics, TimestampFormat};
use std::sync::Arc;

/// One worker of the producer pool
///
/// Builds `writes` log lines, numbered from 1, and pushes each onto the shared
/// queue in order. The queue is unbounded, so enqueueing never fails. A line
/// whose timestamp cannot be rendered is reported and skipped.
pub struct Producer {
    index: usize,
    writes: u64,
    queue: Arc<LogQueue>,
    metrics: Arc<PipelineMetrics>,
    timestamp_format: TimestampFormat,
    diagnostics: Diagnostics,
}

impl Producer {
    pub fn new(
        index: usize,
        writes: u64,
        queue: Arc<LogQueue>,
        metrics: Arc<PipelineMetrics>,
        diagnostics: Diagnostics,
    ) -> Self {
        Self {
            index,
            writes,
            queue,
            metrics,
            timestamp_format: TimestampFormat::default(),
            diagnostics,
        }
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Enqueue every line, then report completion
    pub fn run(self) {
        for n in 1..=self.writes {
            match LogLine::try_new(self.index, n, &self.timestamp_format) {
                Ok(line) => {
                    self.queue.enqueue(line);
                    self.metrics.record_enqueued();
                }
                Err(e) => self.diagnostics.error(format!(
                    "Producer {} could not format write {}, line skipped: {}",
                    self.index, n, e
                )),
            }
        }

        self.diagnostics
            .info(format!("Producer {} completed its work.", self.index));
    }
}
