use serde::Deserialize;
use std::time::Duration;

/// Default number of pages fetched per source under the fixed-cap policy
pub const DEFAULT_MAX_PAGES: u32 = 5;

/// Default spacing between two consecutive requests (milliseconds)
pub const DEFAULT_DELAY_MS: u64 = 1000;

/// Default number of failed attempts tolerated for a single page
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// User agent of the desktop storefront client
pub const DEFAULT_USER_AGENT: &str =
    "iTunes/12.1.2 (Macintosh; OS X 10.10.3) AppleWebKit/0600.5.17";

/// Caller-supplied options; anything left as `None` falls back to its default
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CollectorOptions {
    /// Maximum pages per source, 0 means unbounded
    #[serde(rename = "max-pages")]
    pub max_pages: Option<u32>,

    /// User agent sent with every page request
    #[serde(rename = "user-agent")]
    pub user_agent: Option<String>,

    /// Delay applied before every request (milliseconds)
    #[serde(rename = "delay")]
    pub delay_ms: Option<u64>,

    /// Failed attempts tolerated per page before the source is abandoned
    #[serde(rename = "max-retries")]
    pub max_retries: Option<u32>,

    /// Ask the caller after every page whether to continue
    #[serde(rename = "caller-driven")]
    pub caller_driven: Option<bool>,

    /// Drop malformed records instead of failing the whole page
    #[serde(rename = "skip-malformed")]
    pub skip_malformed: Option<bool>,
}

impl CollectorOptions {
    pub fn max_pages(mut self, pages: u32) -> Self {
        self.max_pages = Some(pages);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = Some(delay_ms);
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    pub fn caller_driven(mut self, enabled: bool) -> Self {
        self.caller_driven = Some(enabled);
        self
    }

    pub fn skip_malformed(mut self, enabled: bool) -> Self {
        self.skip_malformed = Some(enabled);
        self
    }
}

/// How the controller decides whether to fetch the next page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pagination {
    /// Continue automatically while pages are non-empty, up to a cap (0 = unbounded)
    FixedCap(u32),

    /// Suspend after every page until the caller decides
    CallerDriven,
}

/// Validated configuration for one run; immutable once built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorConfig {
    pub max_pages: u32,
    pub delay: Duration,
    pub max_retries: u32,
    pub user_agent: String,
    pub caller_driven: bool,
    pub skip_malformed: bool,
}

impl CollectorConfig {
    /// Returns the active pagination policy
    ///
    /// Caller-driven pagination takes precedence over the page cap.
    pub fn pagination(&self) -> Pagination {
        if self.caller_driven {
            Pagination::CallerDriven
        } else {
            Pagination::FixedCap(self.max_pages)
        }
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
            delay: Duration::from_millis(DEFAULT_DELAY_MS),
            max_retries: DEFAULT_MAX_RETRIES,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            caller_driven: false,
            skip_malformed: false,
        }
    }
}

/// On-disk configuration used by the command-line front end
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    /// Storefront listing identifiers, visited in order
    #[serde(default)]
    pub sources: Vec<String>,

    #[serde(default)]
    pub collector: CollectorOptions,
}
