//! Retry budget for the active source
//!
//! Pure counter logic. Transport, decode and structural failures all draw
//! from the same budget; the controller's inter-request delay is the only
//! spacing between attempts.

use crate::state::SourceProgress;

/// What to do after a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryVerdict {
    /// Fetch the same page again
    Retry,

    /// Abandon the source
    GiveUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Counts a failed attempt and decides whether the page gets another one
    pub fn on_failure(&self, progress: &mut SourceProgress) -> RetryVerdict {
        progress.retries += 1;

        if progress.retries < self.max_retries {
            RetryVerdict::Retry
        } else {
            RetryVerdict::GiveUp
        }
    }

    /// Resets the budget after a page decoded successfully
    pub fn on_success(&self, progress: &mut SourceProgress) {
        progress.retries = 0;
    }
}
