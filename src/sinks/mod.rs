//! Output sinks for the file writer

pub mod faulty;
pub mod file;

pub use faulty::FaultySink;
pub use file::FileSink;

use crate::core::{LogLine, Result};

/// Destination the writer appends dequeued lines to
///
/// A sink is owned by exactly one writer thread, so it only needs `Send`.
pub trait LineSink: Send {
    fn append(&mut self, line: &LogLine) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn name(&self) -> &str;
}

impl<S: LineSink + ?Sized> LineSink for Box<S> {
    fn append(&mut self, line: &LogLine) -> Result<()> {
        (**self).append(line)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
