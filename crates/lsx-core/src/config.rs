//! Export engine configuration
//!
//! All tuning knobs live on one explicit struct passed in at construction,
//! with named fields and documented defaults. Environment overrides are
//! applied only by [`ExportConfig::from_env`], never read ad hoc by the
//! engine.

use std::time::Duration;

// ============================================================================
// Export Configuration Constants
// ============================================================================

/// Default Lightspeed API base URL (account-scoped resources live under it).
pub const DEFAULT_API_BASE: &str = "https://api.lightspeedapp.com/API/V3/Account";

/// Default records per page; the API maximum.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Default delay between catalog page requests in milliseconds.
pub const DEFAULT_PAGE_DELAY_MS: u64 = 100;

/// Floor for the page delay override; going lower trips the API rate limit.
pub const MIN_PAGE_DELAY_MS: u64 = 50;

/// Default delay between destination batch pushes in milliseconds.
/// Airtable allows 5 req/sec; 180 leaves headroom.
pub const DEFAULT_PUSH_DELAY_MS: u64 = 180;

/// Floor for the push delay override.
pub const MIN_PUSH_DELAY_MS: u64 = 150;

/// Default number of concurrent lookup builds.
pub const DEFAULT_LOOKUP_CONCURRENCY: usize = 4;

/// Default wall-clock budget for a managed export run, in seconds.
pub const DEFAULT_EXPORT_TIMEOUT_SECS: u64 = 3600;

/// Export engine configuration
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Source API base URL (overridable for tests)
    pub api_base: String,

    /// Records requested per page
    pub page_size: usize,

    /// Delay between page requests in milliseconds (skipped before page 1)
    pub page_delay_ms: u64,

    /// Delay between destination batch pushes in milliseconds
    pub push_delay_ms: u64,

    /// Concurrent lookup builds
    pub lookup_concurrency: usize,

    /// Wall-clock budget for a managed export run, in seconds
    pub export_timeout_secs: u64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            page_delay_ms: DEFAULT_PAGE_DELAY_MS,
            push_delay_ms: DEFAULT_PUSH_DELAY_MS,
            lookup_concurrency: DEFAULT_LOOKUP_CONCURRENCY,
            export_timeout_secs: DEFAULT_EXPORT_TIMEOUT_SECS,
        }
    }
}

impl ExportConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults plus environment overrides
    ///
    /// - `LSX_API_BASE`: source API base URL (staging or test servers)
    /// - `LSX_PAGE_DELAY_MS`: inter-page delay (floor 50; raise to 150 if
    ///   the source API returns 429)
    /// - `LSX_PUSH_DELAY_MS`: inter-batch delay (floor 150)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(base) = lsx_common::env::var_trimmed("LSX_API_BASE") {
            config.api_base = base.trim_end_matches('/').to_string();
        }
        if let Some(ms) = lsx_common::env::delay_override_ms("LSX_PAGE_DELAY_MS", MIN_PAGE_DELAY_MS)
        {
            config.page_delay_ms = ms;
        }
        if let Some(ms) = lsx_common::env::delay_override_ms("LSX_PUSH_DELAY_MS", MIN_PUSH_DELAY_MS)
        {
            config.push_delay_ms = ms;
        }

        config
    }

    /// Set the source API base URL
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    /// Set the page size
    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = size;
        self
    }

    /// Set the inter-page delay in milliseconds
    pub fn with_page_delay_ms(mut self, ms: u64) -> Self {
        self.page_delay_ms = ms;
        self
    }

    /// Set the inter-batch push delay in milliseconds
    pub fn with_push_delay_ms(mut self, ms: u64) -> Self {
        self.push_delay_ms = ms;
        self
    }

    /// Set the lookup build concurrency
    pub fn with_lookup_concurrency(mut self, concurrency: usize) -> Self {
        self.lookup_concurrency = concurrency.max(1);
        self
    }

    /// Set the managed-run timeout in seconds
    pub fn with_export_timeout_secs(mut self, secs: u64) -> Self {
        self.export_timeout_secs = secs;
        self
    }

    /// Inter-page delay as a Duration
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    /// Inter-batch push delay as a Duration
    pub fn push_delay(&self) -> Duration {
        Duration::from_millis(self.push_delay_ms)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExportConfig::new();
        assert_eq!(config.page_size, 100);
        assert_eq!(config.page_delay_ms, 100);
        assert_eq!(config.push_delay_ms, 180);
        assert_eq!(config.lookup_concurrency, 4);
        assert_eq!(config.export_timeout_secs, 3600);
        assert!(config.api_base.starts_with("https://api.lightspeedapp.com"));
    }

    #[test]
    fn test_builders() {
        let config = ExportConfig::new()
            .with_api_base("http://localhost:9999")
            .with_page_size(3)
            .with_page_delay_ms(0)
            .with_lookup_concurrency(0);
        assert_eq!(config.api_base, "http://localhost:9999");
        assert_eq!(config.page_size, 3);
        assert_eq!(config.page_delay(), Duration::from_millis(0));
        // concurrency of zero would deadlock buffer_unordered
        assert_eq!(config.lookup_concurrency, 1);
    }
}
