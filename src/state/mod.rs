//! Per-source state tracking
//!
//! This module defines the phases a source moves through while the
//! pagination controller drives it, and the mutable progress record
//! (current page, retry count) the controller owns for the active source.

mod phase;
mod progress;

pub use phase::SourcePhase;
pub use progress::SourceProgress;
