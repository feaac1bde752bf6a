//! File sink implementation

use super::LineSink;
use crate::core::{LogLine, PipelineError, Result};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Append-only output file
///
/// Opened once, written sequentially, flushed on drop.
pub struct FileSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl FileSink {
    /// Open `path` for appending, creating it if missing.
    ///
    /// Failure here is fatal for a pipeline run: the writer has nowhere to put
    /// anything. The error is [`PipelineError::OutputOpen`].
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use log_pipeline::sinks::FileSink;
    ///
    /// let sink = FileSink::open("/var/log/pipeline.txt").unwrap();
    /// assert_eq!(sink.path().to_str(), Some("/var/log/pipeline.txt"));
    /// ```
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| PipelineError::output_open(&path, e))?;

        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LineSink for FileSink {
    fn append(&mut self, line: &LogLine) -> Result<()> {
        self.writer.write_all(line.as_bytes())?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        // Ensure all buffered data reaches the file
        let _ = self.writer.flush();
    }
}
