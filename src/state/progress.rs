use crate::state::SourcePhase;

/// Mutable progress of the source currently being collected
///
/// Owned exclusively by the pagination controller while the source is active
/// and discarded once it completes.
#[derive(Debug, Clone)]
pub struct SourceProgress {
    /// Storefront listing identifier
    pub source_id: String,

    /// Zero-based number of the page being worked on
    pub page: u32,

    /// Consecutive failed attempts at the current page
    pub retries: u32,

    /// Pages that decoded successfully
    pub pages_fetched: u32,

    /// Records extracted across all successful pages
    pub records: usize,

    phase: SourcePhase,
}

impl SourceProgress {
    pub fn new(source_id: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            page: 0,
            retries: 0,
            pages_fetched: 0,
            records: 0,
            phase: SourcePhase::Idle,
        }
    }

    pub fn phase(&self) -> SourcePhase {
        self.phase
    }

    /// Moves the source to its next phase
    pub fn enter(&mut self, next: SourcePhase) {
        debug_assert!(
            self.phase.can_transition_to(next),
            "invalid phase transition {} -> {}",
            self.phase,
            next
        );
        tracing::trace!(
            "Source {} page {}: {} -> {}",
            self.source_id,
            self.page,
            self.phase,
            next
        );
        self.phase = next;
    }

    /// Records a successfully decoded page
    pub fn record_page(&mut self, records: usize) {
        self.pages_fetched += 1;
        self.records += records;
    }

    /// Moves on to the following page number
    pub fn advance_page(&mut self) {
        self.page += 1;
    }
}
