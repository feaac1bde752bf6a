//! Error types for the log pipeline

use std::path::Path;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (config file) error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The writer could not open its output file
    #[error("Cannot open output file '{path}': {source}")]
    OutputOpen {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Writer thread panicked outside of a sink call
    #[error("File writer thread panicked")]
    WriterPanicked,

    /// Producer thread panicked
    #[error("Producer {index} panicked")]
    ProducerPanicked { index: usize },

    /// Output file failed verification
    #[error("Output verification failed: {message}")]
    Verification { message: String },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl PipelineError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        PipelineError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an output open error
    pub fn output_open(path: &Path, source: std::io::Error) -> Self {
        PipelineError::OutputOpen {
            path: path.display().to_string(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        PipelineError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a verification error
    pub fn verification(message: impl Into<String>) -> Self {
        PipelineError::Verification {
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        PipelineError::Other(msg.into())
    }

    /// Whether this is the unrecoverable "writer has no destination" case
    pub fn is_fatal_open(&self) -> bool {
        matches!(self, PipelineError::OutputOpen { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = PipelineError::config("producers", "must be at least 1");
        assert!(matches!(err, PipelineError::InvalidConfiguration { .. }));

        let err = PipelineError::verification("line 3 is malformed");
        assert!(matches!(err, PipelineError::Verification { .. }));

        let err = PipelineError::ProducerPanicked { index: 4 };
        assert_eq!(err.to_string(), "Producer 4 panicked");
    }

    #[test]
    fn test_error_display() {
        let err = PipelineError::config("failure_rate", "must be within [0, 1]");
        assert_eq!(
            err.to_string(),
            "Invalid configuration for failure_rate: must be within [0, 1]"
        );

        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = PipelineError::output_open(Path::new("/var/log/out.txt"), io_err);
        assert_eq!(
            err.to_string(),
            "Cannot open output file '/var/log/out.txt': access denied"
        );
    }

    #[test]
    fn test_fatal_classification() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such directory");
        assert!(PipelineError::output_open(Path::new("x"), io_err).is_fatal_open());

        let io_err = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err = PipelineError::io_operation("appending line", "write failed", io_err);
        assert!(!err.is_fatal_open());
        assert!(err.to_string().contains("appending line"));
        assert!(!PipelineError::WriterPanicked.is_fatal_open());
    }
}
