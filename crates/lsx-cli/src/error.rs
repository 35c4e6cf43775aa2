//! Error types for the LSX CLI
//!
//! This module provides user-friendly error types with clear, actionable
//! messages that help users understand what went wrong and how to fix it.

use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Comprehensive error type for CLI operations
///
/// All errors are designed to be user-facing with clear messages and
/// suggestions.
#[derive(Error, Debug)]
pub enum CliError {
    /// Export pipeline failed
    #[error(transparent)]
    Export(#[from] lsx_core::ExportError),

    /// Authentication failed outside the export pipeline
    #[error(transparent)]
    Auth(#[from] lsx_core::AuthError),

    /// A required credential is not configured
    #[error("Missing credential: {0}. Set it in .env or pass the matching flag (run 'lsx export --help' for names). Run 'lsx login' to obtain OAuth tokens.")]
    MissingCredential(&'static str),

    /// The OAuth login flow was abandoned or returned bad data
    #[error("Login failed: {0}. Re-run 'lsx login' and complete the authorization in the browser, or use --no-browser and paste the full redirect URL.")]
    Login(String),

    /// File system operation failed
    #[error("File operation failed: {0}. Check file permissions and disk space.")]
    Io(#[from] std::io::Error),
}
