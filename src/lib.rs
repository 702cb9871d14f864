//! Review Collector: an incremental storefront review harvester
//!
//! This crate pages through the customer reviews of one or more storefront
//! listings, decodes each markup page into typed [`Review`] records, and
//! reports progress to the caller through an in-process event surface.
//! Pagination is either capped at a fixed number of pages or driven by the
//! caller, who decides after every page whether the source should continue.

pub mod collector;
pub mod config;
pub mod markup;
pub mod output;
pub mod state;

use thiserror::Error;

/// Main error type for operations that fail before or outside a run
#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid source identifier: {0:?}")]
    InvalidSource(String),

    #[error("Source identifier listed more than once: {0}")]
    DuplicateSource(String),
}

/// A failed attempt at one page
///
/// Every variant is retryable and draws from the same retry budget.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("transport failure: {0}")]
    Transport(#[from] collector::TransportError),

    #[error("decode failure: {0}")]
    Decode(#[from] markup::DecodeError),

    #[error("unexpected page structure: {0}")]
    Structure(#[from] collector::StructureError),
}

/// Terminal failure of a single source, reported through `source-done`
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("gave up on page {page} after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        page: u32,
        attempts: u32,
        last_error: PageError,
    },
}

/// Result type alias for collector operations
pub type Result<T> = std::result::Result<T, CollectorError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use collector::{
    AllSourcesDone, Collector, Decision, PageComplete, PageDecision, RecordFound, SourceDone,
};
pub use collector::{Device, Platform, RecordKind, Review};
pub use config::{CollectorConfig, CollectorOptions, SourceList};
pub use output::RunSummary;
pub use state::{SourcePhase, SourceProgress};
