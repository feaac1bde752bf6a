//! Sink wrapper that fails a fraction of appends
//!
//! Used to exercise the writer's best-effort policy: a failed append loses
//! that one line, gets reported, and the writer keeps going.

use super::LineSink;
use crate::core::{LogLine, PipelineError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io;

pub struct FaultySink<S> {
    inner: S,
    failure_rate: f64,
    rng: StdRng,
    name: String,
}

impl<S: LineSink> FaultySink<S> {
    /// Wrap `inner`, failing each append with probability `failure_rate`.
    ///
    /// `failure_rate` must lie within `[0, 1]`.
    pub fn new(inner: S, failure_rate: f64) -> Result<Self> {
        Self::build(inner, failure_rate, StdRng::from_entropy())
    }

    /// Same as [`FaultySink::new`] with a reproducible failure sequence
    pub fn with_seed(inner: S, failure_rate: f64, seed: u64) -> Result<Self> {
        Self::build(inner, failure_rate, StdRng::seed_from_u64(seed))
    }

    fn build(inner: S, failure_rate: f64, rng: StdRng) -> Result<Self> {
        if !(0.0..=1.0).contains(&failure_rate) {
            return Err(PipelineError::config(
                "failure_rate",
                format!("must be within [0, 1], got {}", failure_rate),
            ));
        }

        let name = format!("faulty({})", inner.name());
        Ok(Self {
            inner,
            failure_rate,
            rng,
            name,
        })
    }

    pub fn failure_rate(&self) -> f64 {
        self.failure_rate
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: LineSink> LineSink for FaultySink<S> {
    fn append(&mut self, line: &LogLine) -> Result<()> {
        if self.rng.gen_bool(self.failure_rate) {
            return Err(PipelineError::io_operation(
                "appending line",
                "simulated write failure",
                io::Error::new(io::ErrorKind::Other, "injected failure"),
            ));
        }
        self.inner.append(line)
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.flush()
    }

    fn name(&self) -> &str {
        &self.name
    }
}
