//! Shared log queue
//!
//! An unbounded multi-producer queue of [`LogLine`]s backed by a crossbeam
//! channel. Any number of threads may [`enqueue`](LogQueue::enqueue)
//! concurrently; the single writer drains it with
//! [`try_dequeue`](LogQueue::try_dequeue).
//!
//! Lines pushed by one thread come out in the order that thread pushed them.
//! There is no ordering between lines from different threads.

use super::log_line::LogLine;
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

/// Unbounded, thread-safe FIFO of log lines
///
/// Share it with `Arc<LogQueue>`.
///
/// # Example
///
/// ```
/// use log_pipeline::core::{LogLine, LogQueue};
///
/// let queue = LogQueue::new();
/// queue.enqueue(LogLine::from_parts(0, "1", 1, "now"));
///
/// assert_eq!(queue.len(), 1);
/// assert!(queue.try_dequeue().is_some());
/// assert!(queue.try_dequeue().is_none());
/// ```
#[derive(Debug)]
pub struct LogQueue {
    sender: Sender<LogLine>,
    receiver: Receiver<LogLine>,
}

impl LogQueue {
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    /// Add a line to the back of the queue. Never blocks.
    pub fn enqueue(&self, line: LogLine) {
        // The receiver lives in `self`, so the channel cannot be disconnected
        // and an unbounded send cannot fail.
        let _ = self.sender.send(line);
    }

    /// Remove the line at the front of the queue, if any. Never blocks.
    pub fn try_dequeue(&self) -> Option<LogLine> {
        self.receiver.try_recv().ok()
    }

    /// Remove the line at the front of the queue, waiting up to `timeout`
    /// for one to arrive.
    pub fn dequeue_timeout(&self, timeout: Duration) -> Option<LogLine> {
        match self.receiver.recv_timeout(timeout) {
            Ok(line) => Some(line),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Number of lines currently buffered
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

impl Default for LogQueue {
    fn default() -> Self {
        Self::new()
    }
}
