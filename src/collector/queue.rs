//! Source queue driver
//!
//! Sources are visited front to back, one at a time. Each finished source
//! produces exactly one `source-done`; `all-sources-done` follows the last.

use crate::collector::controller::PaginationController;
use crate::collector::events::{EventBus, SourceDone};
use crate::config::SourceList;
use crate::output::{RunSummary, SourceSummary};
use std::collections::VecDeque;

/// Ordered sources still to visit; a popped source is never revisited
#[derive(Debug, Clone, Default)]
pub struct SourceQueue {
    pending: VecDeque<String>,
}

impl SourceQueue {
    pub fn new(sources: SourceList) -> Self {
        Self {
            pending: sources.into_inner().into(),
        }
    }

    pub fn next_source(&mut self) -> Option<String> {
        self.pending.pop_front()
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Runs every queued source to completion and reports overall completion
pub(crate) async fn drive(
    mut queue: SourceQueue,
    controller: &PaginationController<'_>,
    events: &EventBus,
) -> RunSummary {
    let mut summary = RunSummary::default();

    while let Some(source_id) = queue.next_source() {
        tracing::info!(
            "Collecting reviews for {} ({} sources queued after it)",
            source_id,
            queue.remaining()
        );

        let outcome = controller.run(&source_id).await;
        debug_assert!(outcome.progress.phase().is_terminal());
        let done = SourceDone {
            source_id,
            page: outcome.progress.page,
            sources_remaining: queue.remaining(),
            error: outcome.error,
        };

        match &done.error {
            Some(error) => tracing::warn!("Finished {} with error: {}", done.source_id, error),
            None => tracing::info!(
                "Finished {} after page {} ({} reviews)",
                done.source_id,
                done.page,
                outcome.progress.records
            ),
        }

        summary.sources.push(SourceSummary {
            source_id: done.source_id.clone(),
            last_page: done.page,
            pages_fetched: outcome.progress.pages_fetched,
            reviews: outcome.progress.records,
            error: done.error.as_ref().map(ToString::to_string),
        });

        events.emit_source_done(&done);
    }

    tracing::info!("All sources done");
    events.emit_all_sources_done();
    summary
}
