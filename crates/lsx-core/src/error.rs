//! Error types for the export engine
//!
//! Every fatal error carries a human-readable remediation hint so the CLI
//! (or the managed-job wrapper) can show users what to do next instead of a
//! raw stack trace.

use thiserror::Error;

/// Result type alias for export operations
pub type Result<T> = std::result::Result<T, ExportError>;

/// OAuth token exchange and refresh failures
///
/// Distinguishes permanently revoked grants (which require the full
/// authorization flow to run again) from transient network failures.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The stored refresh token was revoked or expired; only re-authorizing helps
    #[error("Lightspeed sign-in has expired or was revoked. Reconnect by running 'lsx login' and completing the authorization flow again.")]
    RevokedGrant,

    /// The token endpoint rejected the request
    #[error("Token endpoint returned {status}: {message}. Check the OAuth client ID, client secret, and redirect URI.")]
    TokenEndpoint { status: u16, message: String },

    /// The token response was not in the expected shape
    #[error("Token response missing '{0}'. The OAuth server reply was malformed; retry, and check that the token endpoints are correct.")]
    MissingField(&'static str),

    /// A request still got 401 after a successful token refresh
    #[error("Request was rejected with 401 even after refreshing the access token. Check the API token scopes, or reconnect with 'lsx login'.")]
    Unauthorized,

    /// Transport-level failure talking to the OAuth or API server
    #[error("Network error: {0}. Check your internet connection and retry.")]
    Network(#[from] reqwest::Error),
}

/// Errors for catalog extraction and destination sync
#[derive(Error, Debug)]
pub enum ExportError {
    /// Token lifecycle failure (fatal to the current export)
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Pagination failed partway through a resource fetch
    ///
    /// `partial` is how many records were retrieved before the failure;
    /// callers must not treat partial results as usable.
    #[error("Fetching {resource} failed after {partial} records: {reason}. Partial results were discarded; re-run the export.")]
    Fetch {
        resource: String,
        partial: usize,
        status: Option<reqwest::StatusCode>,
        reason: String,
    },

    /// Destination table/field creation was rejected
    #[error("Airtable rejected the table schema: {0}. Check that the base ID is correct and the token has the schema.bases:write scope.")]
    Schema(String),

    /// A destination batch was rejected even after the rate-limit retry
    ///
    /// `batch_index` identifies the failed batch; batches before it were
    /// already pushed and must not be re-sent.
    #[error("Airtable rejected batch {batch_index}: {reason}. Earlier batches were already pushed. Check the token scopes (data.records:write) and re-run for the remaining records.")]
    Push { batch_index: usize, reason: String },

    /// The managed export run exceeded its wall-clock budget
    #[error("Export timed out after {0} seconds. No output was produced; raise the timeout or narrow the export with a category filter.")]
    Timeout(u64),

    /// Filesystem failure writing output artifacts
    #[error("File operation failed: {0}. Check that the output directory exists and is writable.")]
    Io(#[from] std::io::Error),

    /// JSON serialization failure
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV serialization failure
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),
}

impl ExportError {
    /// Create a destination schema error
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    /// True when this is a fetch failure with the given HTTP status
    pub fn is_fetch_status(&self, code: reqwest::StatusCode) -> bool {
        matches!(self, ExportError::Fetch { status: Some(s), .. } if *s == code)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_reports_partial_count() {
        let err = ExportError::Fetch {
            resource: "Item".to_string(),
            partial: 200,
            status: Some(reqwest::StatusCode::BAD_GATEWAY),
            reason: "HTTP 502".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("after 200 records"));
        assert!(msg.contains("Item"));
    }

    #[test]
    fn test_is_fetch_status() {
        let err = ExportError::Fetch {
            resource: "Item".to_string(),
            partial: 0,
            status: Some(reqwest::StatusCode::BAD_REQUEST),
            reason: "HTTP 400".to_string(),
        };
        assert!(err.is_fetch_status(reqwest::StatusCode::BAD_REQUEST));
        assert!(!err.is_fetch_status(reqwest::StatusCode::TOO_MANY_REQUESTS));
    }

    #[test]
    fn test_auth_error_hints() {
        assert!(AuthError::RevokedGrant.to_string().contains("lsx login"));
        assert!(AuthError::Unauthorized.to_string().contains("scopes"));
    }
}
