//! Collector module for storefront review harvesting
//!
//! This module contains the collection engine, including:
//! - Page request construction and the HTTP transport
//! - Review list location and per-review field extraction
//! - The retry budget and the per-source pagination controller
//! - The source queue driver and the event surface
//!
//! # Example
//!
//! ```no_run
//! use review_collector::{Collector, CollectorOptions};
//!
//! # async fn run() -> review_collector::Result<()> {
//! let mut collector = Collector::new("585027354", CollectorOptions::default().max_pages(2))?;
//! collector.on_record_found(|event| {
//!     println!("{} stars on page {}", event.review.rating, event.page);
//! });
//! collector.collect().await;
//! # Ok(())
//! # }
//! ```

mod controller;
mod events;
mod extract;
mod fetcher;
mod page;
mod queue;
mod record;
mod request;
mod retry;

pub use events::{
    AllSourcesDone, Decision, EventBus, PageComplete, PageDecision, RecordFound, SourceDone,
};
pub use extract::{
    extract_review, parse_rating, parse_review_date, parse_review_id, parse_version_line,
    FieldError,
};
pub use fetcher::{build_http_client, HttpTransport, Transport, TransportError};
pub use page::{extract_page, review_list, StructureError};
pub use queue::SourceQueue;
pub use record::{Device, Platform, RecordKind, Review};
pub use request::{review_page_url, PageRequest, DEFAULT_ENDPOINT};
pub use retry::{RetryPolicy, RetryVerdict};

use crate::config::{CollectorConfig, CollectorOptions, SourceList};
use crate::markup::{Decoder, XmlDecoder};
use crate::output::RunSummary;
use crate::CollectorError;
use controller::PaginationController;
use url::Url;

/// One single-use collection run over an ordered list of sources
///
/// Handlers must be registered before [`Collector::collect`], which consumes
/// the collector.
pub struct Collector {
    sources: SourceList,
    config: CollectorConfig,
    endpoint: Url,
    transport: Box<dyn Transport>,
    decoder: Box<dyn Decoder>,
    events: EventBus,
}

impl Collector {
    /// Creates a collector that fetches pages over HTTP
    ///
    /// # Arguments
    ///
    /// * `sources` - A single listing identifier or an ordered collection of them
    /// * `options` - Caller options; anything unset takes its default
    ///
    /// # Returns
    ///
    /// * `Ok(Collector)` - Ready to accept handlers
    /// * `Err(CollectorError)` - Invalid sources or options, or the HTTP client failed to build
    pub fn new(
        sources: impl Into<SourceList>,
        options: CollectorOptions,
    ) -> Result<Self, CollectorError> {
        let (sources, config) = validate(sources.into(), options)?;
        let transport = HttpTransport::new()?;
        Self::assemble(sources, config, Box::new(transport))
    }

    /// Creates a collector that fetches pages through the given transport
    pub fn with_transport(
        sources: impl Into<SourceList>,
        options: CollectorOptions,
        transport: impl Transport + 'static,
    ) -> Result<Self, CollectorError> {
        let (sources, config) = validate(sources.into(), options)?;
        Self::assemble(sources, config, Box::new(transport))
    }

    fn assemble(
        sources: SourceList,
        config: CollectorConfig,
        transport: Box<dyn Transport>,
    ) -> Result<Self, CollectorError> {
        Ok(Self {
            sources,
            config,
            endpoint: Url::parse(DEFAULT_ENDPOINT)?,
            transport,
            decoder: Box::new(XmlDecoder),
            events: EventBus::new(),
        })
    }

    /// Points requests at another review endpoint; the query template is unchanged
    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Replaces the markup decoder
    pub fn with_decoder(mut self, decoder: impl Decoder + 'static) -> Self {
        self.decoder = Box::new(decoder);
        self
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    pub fn sources(&self) -> &SourceList {
        &self.sources
    }

    pub fn on_record_found(
        &mut self,
        handler: impl Fn(&RecordFound) + Send + Sync + 'static,
    ) -> &mut Self {
        self.events.on_record_found(handler);
        self
    }

    pub fn on_page_complete(
        &mut self,
        handler: impl Fn(&PageComplete) + Send + Sync + 'static,
    ) -> &mut Self {
        self.events.on_page_complete(handler);
        self
    }

    pub fn on_source_done(
        &mut self,
        handler: impl Fn(&SourceDone) + Send + Sync + 'static,
    ) -> &mut Self {
        self.events.on_source_done(handler);
        self
    }

    pub fn on_all_sources_done(
        &mut self,
        handler: impl Fn(&AllSourcesDone) + Send + Sync + 'static,
    ) -> &mut Self {
        self.events.on_all_sources_done(handler);
        self
    }

    /// Runs every source to completion
    ///
    /// Failures never escape as errors: a source that exhausts its retries is
    /// reported through `source-done` and the run moves on to the next one.
    pub async fn collect(self) -> RunSummary {
        tracing::info!(
            "Starting collection for {} sources ({:?})",
            self.sources.len(),
            self.config.pagination()
        );

        let controller = PaginationController::new(
            &self.config,
            &self.endpoint,
            self.transport.as_ref(),
            self.decoder.as_ref(),
            &self.events,
        );

        queue::drive(SourceQueue::new(self.sources.clone()), &controller, &self.events).await
    }
}

impl std::fmt::Debug for Collector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collector")
            .field("sources", &self.sources)
            .field("config", &self.config)
            .field("endpoint", &self.endpoint.as_str())
            .field("events", &self.events)
            .finish()
    }
}

fn validate(
    sources: SourceList,
    options: CollectorOptions,
) -> Result<(SourceList, CollectorConfig), CollectorError> {
    sources.validate()?;
    let config = CollectorConfig::from_options(options)?;
    Ok((sources, config))
}
