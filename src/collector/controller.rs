//! Pagination controller - drives the page loop of one source
//!
//! Per source the controller cycles through
//! `Idle -> Fetching -> Decoding -> {Deciding | Retrying}` until the source is
//! `Done`. Exactly one page is in flight at any time, and the next fetch is
//! only scheduled once the current page has been decoded, published and
//! decided on.

use crate::collector::events::{Decision, EventBus, PageDecision};
use crate::collector::fetcher::Transport;
use crate::collector::page::{extract_page, publish_page};
use crate::collector::record::Review;
use crate::collector::request::PageRequest;
use crate::collector::retry::{RetryPolicy, RetryVerdict};
use crate::config::{CollectorConfig, Pagination};
use crate::markup::Decoder;
use crate::state::{SourcePhase, SourceProgress};
use crate::{PageError, SourceError};
use url::Url;

/// How a source ended
#[derive(Debug)]
pub(crate) struct SourceOutcome {
    pub progress: SourceProgress,
    pub error: Option<SourceError>,
}

pub(crate) struct PaginationController<'a> {
    config: &'a CollectorConfig,
    endpoint: &'a Url,
    transport: &'a dyn Transport,
    decoder: &'a dyn Decoder,
    events: &'a EventBus,
    retry: RetryPolicy,
}

impl<'a> PaginationController<'a> {
    pub fn new(
        config: &'a CollectorConfig,
        endpoint: &'a Url,
        transport: &'a dyn Transport,
        decoder: &'a dyn Decoder,
        events: &'a EventBus,
    ) -> Self {
        Self {
            config,
            endpoint,
            transport,
            decoder,
            events,
            retry: RetryPolicy::new(config.max_retries),
        }
    }

    /// Collects one source until the pagination policy, the caller, or the retry budget ends it
    pub async fn run(&self, source_id: &str) -> SourceOutcome {
        let mut progress = SourceProgress::new(source_id);

        loop {
            // The delay precedes every attempt, retries included
            if !self.config.delay.is_zero() {
                tokio::time::sleep(self.config.delay).await;
            }

            match self.attempt(&mut progress).await {
                Ok(reviews) => {
                    progress.enter(SourcePhase::Deciding);
                    self.retry.on_success(&mut progress);
                    progress.record_page(reviews.len());

                    match self.decide(&progress, reviews).await {
                        Decision::Continue => {
                            progress.enter(SourcePhase::Idle);
                            progress.advance_page();
                        }
                        Decision::Stop => {
                            progress.enter(SourcePhase::Done);
                            return SourceOutcome {
                                progress,
                                error: None,
                            };
                        }
                    }
                }
                Err(error) => {
                    progress.enter(SourcePhase::Retrying);

                    match self.retry.on_failure(&mut progress) {
                        RetryVerdict::Retry => {
                            tracing::warn!(
                                "Attempt {}/{} at page {} of {} failed, retrying: {}",
                                progress.retries,
                                self.retry.max_retries(),
                                progress.page,
                                progress.source_id,
                                error
                            );
                            progress.enter(SourcePhase::Idle);
                        }
                        RetryVerdict::GiveUp => {
                            tracing::warn!(
                                "Giving up on {} at page {} after {} attempts: {}",
                                progress.source_id,
                                progress.page,
                                progress.retries,
                                error
                            );
                            progress.enter(SourcePhase::Done);
                            let error = SourceError::RetriesExhausted {
                                page: progress.page,
                                attempts: progress.retries,
                                last_error: error,
                            };
                            return SourceOutcome {
                                progress,
                                error: Some(error),
                            };
                        }
                    }
                }
            }
        }
    }

    /// Fetches and decodes the current page
    async fn attempt(&self, progress: &mut SourceProgress) -> Result<Vec<Review>, PageError> {
        progress.enter(SourcePhase::Fetching);

        let request = PageRequest::new(
            self.endpoint,
            &progress.source_id,
            progress.page,
            &self.config.user_agent,
        );
        tracing::debug!(
            "Fetching page {} of {}: {}",
            progress.page,
            progress.source_id,
            request.url
        );

        let body = self.transport.fetch(&request).await?;

        progress.enter(SourcePhase::Decoding);
        let tree = self.decoder.decode(&body)?;
        let reviews = extract_page(
            &tree,
            &progress.source_id,
            progress.page,
            self.config.skip_malformed,
        )?;

        tracing::debug!(
            "Page {} of {} decoded with {} reviews",
            progress.page,
            progress.source_id,
            reviews.len()
        );
        Ok(reviews)
    }

    /// Publishes the page and applies the pagination policy
    async fn decide(&self, progress: &SourceProgress, reviews: Vec<Review>) -> Decision {
        let exhausted = reviews.is_empty();

        match self.config.pagination() {
            Pagination::FixedCap(max_pages) => {
                publish_page(
                    self.events,
                    &progress.source_id,
                    progress.page,
                    reviews,
                    None,
                );

                let below_cap = max_pages == 0 || progress.page + 1 < max_pages;
                if !exhausted && below_cap {
                    Decision::Continue
                } else {
                    Decision::Stop
                }
            }
            Pagination::CallerDriven => {
                let (decision, pending) = PageDecision::channel(exhausted);
                publish_page(
                    self.events,
                    &progress.source_id,
                    progress.page,
                    reviews,
                    Some(decision),
                );

                // Suspends until a handle is resolved; there is no timeout
                match pending.await {
                    Ok(decision) => decision,
                    Err(_) => {
                        tracing::warn!(
                            "No decision was made for page {} of {}, stopping",
                            progress.page,
                            progress.source_id
                        );
                        Decision::Stop
                    }
                }
            }
        }
    }
}
