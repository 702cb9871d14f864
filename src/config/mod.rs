//! Configuration module for the review collector
//!
//! This module resolves caller options into a validated [`CollectorConfig`],
//! holds the ordered [`SourceList`], and loads the TOML file used by the
//! command-line front end.
//!
//! # Example
//!
//! ```
//! use review_collector::config::{CollectorConfig, CollectorOptions};
//!
//! let config = CollectorConfig::from_options(CollectorOptions::default().max_pages(2)).unwrap();
//! assert_eq!(config.max_pages, 2);
//! ```

mod parser;
mod sources;
mod types;
mod validation;

// Re-export types
pub use sources::SourceList;
pub use types::{
    CollectorConfig, CollectorOptions, FileConfig, Pagination, DEFAULT_DELAY_MS,
    DEFAULT_MAX_PAGES, DEFAULT_MAX_RETRIES, DEFAULT_USER_AGENT,
};
pub use validation::validate;

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
