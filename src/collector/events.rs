//! Event surface between the collector and its caller
//!
//! Four event kinds flow outward: `record-found`, `page-complete`,
//! `source-done` and `all-sources-done`. Handlers run synchronously on the
//! collector's task, in registration order. Under caller-driven pagination,
//! `page-complete` also carries a [`PageDecision`] through which the caller
//! resumes or stops the suspended source.

use crate::collector::record::Review;
use crate::SourceError;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::oneshot;

/// A review was extracted
#[derive(Debug, Clone)]
pub struct RecordFound {
    pub source_id: String,
    pub page: u32,
    pub review: Review,
}

/// A page decoded successfully; its reviews were already reported one by one
#[derive(Debug)]
pub struct PageComplete {
    pub source_id: String,
    pub page: u32,
    pub reviews: Vec<Review>,

    /// Present only under caller-driven pagination
    pub decision: Option<PageDecision>,
}

impl PageComplete {
    /// Asks the collector to fetch the next page; see [`PageDecision::proceed`]
    pub fn proceed(&self) -> bool {
        self.decision.as_ref().is_some_and(PageDecision::proceed)
    }

    /// Asks the collector to finish this source; see [`PageDecision::stop`]
    pub fn stop(&self) -> bool {
        self.decision.as_ref().is_some_and(PageDecision::stop)
    }
}

/// A source finished, either normally or because its retry budget ran out
#[derive(Debug)]
pub struct SourceDone {
    pub source_id: String,

    /// Last page number reached
    pub page: u32,

    /// Sources still queued after this one
    pub sources_remaining: usize,

    pub error: Option<SourceError>,
}

/// Every queued source has finished
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllSourcesDone;

/// Outcome of a caller-driven page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Continue,
    Stop,
}

struct DecisionSlot {
    sender: Mutex<Option<oneshot::Sender<Decision>>>,
    exhausted: bool,
}

/// Single-use continue/stop handle for one page
///
/// Clones share the same slot: whichever call lands first takes effect and
/// every later call is a no-op returning `false`. On an empty page
/// `proceed` behaves like `stop`. If every clone is dropped without a
/// decision the collector stops the source.
#[derive(Clone)]
pub struct PageDecision {
    slot: Arc<DecisionSlot>,
}

impl PageDecision {
    pub(crate) fn channel(exhausted: bool) -> (Self, oneshot::Receiver<Decision>) {
        let (sender, receiver) = oneshot::channel();
        let decision = Self {
            slot: Arc::new(DecisionSlot {
                sender: Mutex::new(Some(sender)),
                exhausted,
            }),
        };
        (decision, receiver)
    }

    /// Continues with the next page; returns whether this call took effect
    pub fn proceed(&self) -> bool {
        if self.slot.exhausted {
            self.resolve(Decision::Stop)
        } else {
            self.resolve(Decision::Continue)
        }
    }

    /// Finishes the source after this page; returns whether this call took effect
    pub fn stop(&self) -> bool {
        self.resolve(Decision::Stop)
    }

    /// Returns true once either decision has been made
    pub fn is_resolved(&self) -> bool {
        self.slot
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    fn resolve(&self, decision: Decision) -> bool {
        let sender = self
            .slot
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match sender {
            Some(sender) => sender.send(decision).is_ok(),
            None => false,
        }
    }
}

impl fmt::Debug for PageDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageDecision")
            .field("exhausted", &self.slot.exhausted)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

type Handler<E> = Box<dyn Fn(&E) + Send + Sync>;

/// Handlers for one event kind, invoked in registration order
struct Handlers<E> {
    handlers: Vec<Handler<E>>,
}

impl<E> Default for Handlers<E> {
    fn default() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }
}

impl<E> Handlers<E> {
    fn push(&mut self, handler: Handler<E>) {
        self.handlers.push(handler);
    }

    fn emit(&self, event: &E) {
        for handler in &self.handlers {
            handler(event);
        }
    }
}

/// In-process publish/subscribe channel for collector events
///
/// There is no replay buffer; a handler only sees events emitted after it
/// was registered.
#[derive(Default)]
pub struct EventBus {
    record_found: Handlers<RecordFound>,
    page_complete: Handlers<PageComplete>,
    source_done: Handlers<SourceDone>,
    all_sources_done: Handlers<AllSourcesDone>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_record_found(&mut self, handler: impl Fn(&RecordFound) + Send + Sync + 'static) {
        self.record_found.push(Box::new(handler));
    }

    pub fn on_page_complete(&mut self, handler: impl Fn(&PageComplete) + Send + Sync + 'static) {
        self.page_complete.push(Box::new(handler));
    }

    pub fn on_source_done(&mut self, handler: impl Fn(&SourceDone) + Send + Sync + 'static) {
        self.source_done.push(Box::new(handler));
    }

    pub fn on_all_sources_done(
        &mut self,
        handler: impl Fn(&AllSourcesDone) + Send + Sync + 'static,
    ) {
        self.all_sources_done.push(Box::new(handler));
    }

    pub fn emit_record_found(&self, event: &RecordFound) {
        self.record_found.emit(event);
    }

    pub fn emit_page_complete(&self, event: &PageComplete) {
        self.page_complete.emit(event);
    }

    pub fn emit_source_done(&self, event: &SourceDone) {
        self.source_done.emit(event);
    }

    pub fn emit_all_sources_done(&self) {
        self.all_sources_done.emit(&AllSourcesDone);
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("record_found", &self.record_found.handlers.len())
            .field("page_complete", &self.page_complete.handlers.len())
            .field("source_done", &self.source_done.handlers.len())
            .field("all_sources_done", &self.all_sources_done.handlers.len())
            .finish()
    }
}
