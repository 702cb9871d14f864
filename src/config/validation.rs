use crate::config::types::{
    CollectorConfig, CollectorOptions, DEFAULT_DELAY_MS, DEFAULT_MAX_PAGES, DEFAULT_MAX_RETRIES,
    DEFAULT_USER_AGENT,
};
use crate::ConfigError;
use std::time::Duration;

impl CollectorConfig {
    /// Builds a validated configuration, filling every missing option with its default
    ///
    /// # Errors
    ///
    /// * `ConfigError::Validation` - `max_retries` is zero or the user agent is blank
    pub fn from_options(options: CollectorOptions) -> Result<Self, ConfigError> {
        let caller_driven = options.caller_driven.unwrap_or(false);

        if caller_driven {
            if let Some(max_pages) = options.max_pages {
                tracing::warn!(
                    "Both max-pages ({}) and caller-driven pagination were supplied; \
                     caller-driven pagination takes precedence",
                    max_pages
                );
            }
        }

        let config = Self {
            max_pages: options.max_pages.unwrap_or(DEFAULT_MAX_PAGES),
            delay: Duration::from_millis(options.delay_ms.unwrap_or(DEFAULT_DELAY_MS)),
            max_retries: options.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            user_agent: options
                .user_agent
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            caller_driven,
            skip_malformed: options.skip_malformed.unwrap_or(false),
        };

        validate(&config)?;
        Ok(config)
    }
}

/// Validates a fully resolved configuration
pub fn validate(config: &CollectorConfig) -> Result<(), ConfigError> {
    if config.max_retries < 1 {
        return Err(ConfigError::Validation(
            "max_retries must be >= 1".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}
