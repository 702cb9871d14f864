//! Output module for run results
//!
//! This module holds the [`RunSummary`] returned by a finished run and the
//! statistics printout used by the command-line front end.

pub mod stats;

pub use stats::{print_statistics, RunStatistics};

/// How one source ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSummary {
    pub source_id: String,

    /// Last page number reached
    pub last_page: u32,

    /// Pages that decoded successfully
    pub pages_fetched: u32,

    /// Reviews extracted across those pages
    pub reviews: usize,

    /// Rendered error if the source ran out of retries
    pub error: Option<String>,
}

/// Per-source results of a finished run, in visiting order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub sources: Vec<SourceSummary>,
}

impl RunSummary {
    pub fn total_reviews(&self) -> usize {
        self.sources.iter().map(|s| s.reviews).sum()
    }

    pub fn total_pages(&self) -> u32 {
        self.sources.iter().map(|s| s.pages_fetched).sum()
    }

    pub fn failed_sources(&self) -> impl Iterator<Item = &SourceSummary> {
        self.sources.iter().filter(|s| s.error.is_some())
    }
}
