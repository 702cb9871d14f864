//! Phase definitions for the per-source pagination state machine
use std::fmt;

/// Represents where the active source currently is in its page loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourcePhase {
    /// Waiting out the inter-request delay before the next fetch
    Idle,

    /// A page request is in flight
    Fetching,

    /// The payload is being decoded and its records extracted
    Decoding,

    /// The page succeeded; the pagination policy (or the caller) decides what's next
    Deciding,

    /// The attempt failed and the retry budget is being consulted
    Retrying,

    /// The source is finished, successfully or not
    Done,
}

impl SourcePhase {
    /// Returns true once no further page will be requested for the source
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns true if moving from `self` to `next` is a legal step of the page loop
    pub fn can_transition_to(&self, next: SourcePhase) -> bool {
        use SourcePhase::*;

        matches!(
            (self, next),
            (Idle, Fetching)
                | (Fetching, Decoding)
                | (Fetching, Retrying)
                | (Decoding, Deciding)
                | (Decoding, Retrying)
                | (Deciding, Idle)
                | (Deciding, Done)
                | (Retrying, Idle)
                | (Retrying, Done)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Decoding => "decoding",
            Self::Deciding => "deciding",
            Self::Retrying => "retrying",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for SourcePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
