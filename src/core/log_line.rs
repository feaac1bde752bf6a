//! Log line structure
//!
//! A [`LogLine`] is the rendered, newline-terminated text a producer hands to
//! the queue:
//!
//! ```text
//! Thread {producer} :: {thread id} - Write {n} - : {timestamp}
//! ```
//!
//! Once built it is never modified; the writer appends its bytes verbatim.

use super::timestamp::TimestampFormat;
use chrono::Local;
use std::cell::RefCell;
use std::fmt;

// Thread-local cache so the id is only rendered once per thread
thread_local! {
    static THREAD_ID_CACHE: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Get the cached numeric id of the current thread
///
/// `ThreadId` only exposes its value through `Debug` (`ThreadId(7)`), so the
/// number is cut out of that rendering.
pub fn current_thread_id() -> String {
    THREAD_ID_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| {
                let debug = format!("{:?}", std::thread::current().id());
                debug
                    .trim_start_matches("ThreadId(")
                    .trim_end_matches(')')
                    .to_string()
            })
            .clone()
    })
}

/// Replace characters that would split one line into several
fn sanitize(field: &str) -> String {
    field
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine(String);

impl LogLine {
    /// Build the line for write `write_index` of producer `producer_index`,
    /// stamped with the current thread and wall-clock time.
    pub fn new(producer_index: usize, write_index: u64, format: &TimestampFormat) -> Self {
        let timestamp = format.format(&Local::now());
        Self::from_parts(producer_index, &current_thread_id(), write_index, &timestamp)
    }

    /// Like [`LogLine::new`], but fails instead of falling back when the
    /// timestamp cannot be rendered
    pub fn try_new(
        producer_index: usize,
        write_index: u64,
        format: &TimestampFormat,
    ) -> Result<Self, fmt::Error> {
        let timestamp = format.try_format(&Local::now())?;
        Ok(Self::from_parts(
            producer_index,
            &current_thread_id(),
            write_index,
            &timestamp,
        ))
    }

    pub fn from_parts(
        producer_index: usize,
        thread_id: &str,
        write_index: u64,
        timestamp: &str,
    ) -> Self {
        LogLine(format!(
            "Thread {} :: {} - Write {} - : {}\n",
            producer_index,
            sanitize(thread_id),
            write_index,
            sanitize(timestamp)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn parse(&self) -> Option<ParsedLine> {
        ParsedLine::parse(&self.0)
    }
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fields recovered from a rendered log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub producer_index: usize,
    pub thread_id: String,
    pub write_index: u64,
    pub timestamp: String,
}

impl ParsedLine {
    /// Parse one line of output, with or without its trailing newline.
    ///
    /// Returns `None` when the line does not match the log line layout.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.strip_suffix('\n').unwrap_or(line);
        let rest = line.strip_prefix("Thread ")?;
        let (producer, rest) = rest.split_once(" :: ")?;
        let (thread_id, rest) = rest.split_once(" - Write ")?;
        let (write, timestamp) = rest.split_once(" - : ")?;

        Some(Self {
            producer_index: producer.parse().ok()?,
            thread_id: thread_id.to_string(),
            write_index: write.parse().ok()?,
            timestamp: timestamp.to_string(),
        })
    }
}
