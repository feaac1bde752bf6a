//! Pipeline metrics for observability
//!
//! Counters shared by producers and the writer. They never influence control
//! flow; they exist so a run can report what happened to every line.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for a pipeline run
///
/// # Example
///
/// ```
/// use log_pipeline::PipelineMetrics;
///
/// let metrics = PipelineMetrics::new();
///
/// metrics.record_enqueued();
/// metrics.record_enqueued();
/// metrics.record_written();
/// metrics.record_write_failure();
///
/// assert_eq!(metrics.enqueued(), 2);
/// assert_eq!(metrics.failure_rate(), 50.0);
/// ```
#[derive(Debug)]
pub struct PipelineMetrics {
    /// Lines pushed onto the queue by producers
    enqueued: AtomicU64,

    /// Lines appended to the output file
    written: AtomicU64,

    /// Lines dequeued but lost because the append failed
    write_failures: AtomicU64,

    /// Times the writer found the queue empty before completion
    idle_polls: AtomicU64,
}

impl PipelineMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            enqueued: AtomicU64::new(0),
            written: AtomicU64::new(0),
            write_failures: AtomicU64::new(0),
            idle_polls: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn enqueued(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn written(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn write_failures(&self) -> u64 {
        self.write_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn idle_polls(&self) -> u64 {
        self.idle_polls.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_enqueued(&self) -> u64 {
        self.enqueued.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_written(&self) -> u64 {
        self.written.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_write_failure(&self) -> u64 {
        self.write_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_idle_poll(&self) -> u64 {
        self.idle_polls.fetch_add(1, Ordering::Relaxed)
    }

    /// Lines dequeued by the writer, successful or not
    pub fn processed(&self) -> u64 {
        self.written() + self.write_failures()
    }

    /// Get write failure rate as a percentage (0.0 - 100.0)
    ///
    /// Returns 0.0 if nothing has been processed.
    pub fn failure_rate(&self) -> f64 {
        let failed = self.write_failures() as f64;
        let total = self.processed() as f64;
        if total == 0.0 {
            0.0
        } else {
            (failed / total) * 100.0
        }
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for PipelineMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            enqueued: AtomicU64::new(self.enqueued()),
            written: AtomicU64::new(self.written()),
            write_failures: AtomicU64::new(self.write_failures()),
            idle_polls: AtomicU64::new(self.idle_polls()),
        }
    }
}
