//! One-shot completion signal

use std::sync::atomic::{AtomicBool, Ordering};

/// A flag that goes from unset to set exactly once and never resets
///
/// The orchestrator sets it after every producer has finished; the writer
/// reads it to decide when an empty queue means "done".
///
/// # Example
///
/// ```
/// use log_pipeline::core::CompletionSignal;
///
/// let signal = CompletionSignal::new();
/// assert!(!signal.is_set());
///
/// assert!(signal.set());
/// assert!(!signal.set()); // already set
/// assert!(signal.is_set());
/// ```
#[derive(Debug, Default)]
pub struct CompletionSignal {
    done: AtomicBool,
}

impl CompletionSignal {
    pub const fn new() -> Self {
        Self {
            done: AtomicBool::new(false),
        }
    }

    /// Set the signal. Returns `true` if this call performed the transition.
    ///
    /// Release ordering: every enqueue made before `set` is visible to a
    /// thread that observes `is_set() == true`.
    pub fn set(&self) -> bool {
        !self.done.swap(true, Ordering::AcqRel)
    }

    #[inline]
    pub fn is_set(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }
}
