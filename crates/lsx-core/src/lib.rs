//! LSX Core - Lightspeed catalog extraction and field mapping
//!
//! Pulls product catalog data out of the Lightspeed Retail (R-Series) REST
//! API and maps it into flat, Airtable-shaped rows.
//!
//! # Pipeline
//!
//! 1. [`fields::resolve`] turns a field-id selection into an ordered schema
//!    and derives which item relations and lookup tables it needs.
//! 2. [`lookup::build_all`] fetches the needed id→name lookup tables with
//!    bounded concurrency.
//! 3. [`fetch::PaginatedFetcher`] walks the cursor-paginated `Item`
//!    collection through an [`auth::ApiSession`] that refreshes OAuth tokens
//!    on 401.
//! 4. [`project::project`] flattens each raw item into a [`project::Row`].
//! 5. [`airtable::AirtableClient`] (optional) creates the destination table
//!    schema and pushes rows in rate-limited batches; [`output`] writes
//!    JSON/CSV artifacts.
//!
//! [`engine::ExportEngine`] orchestrates steps 1-4.
//!
//! # Example
//!
//! ```no_run
//! use lsx_core::auth::{ApiSession, Credential, TokenAuthority};
//! use lsx_core::config::ExportConfig;
//! use lsx_core::engine::ExportEngine;
//!
//! #[tokio::main]
//! async fn main() -> lsx_core::Result<()> {
//!     let authority = TokenAuthority::new("client-id", "client-secret");
//!     let credential = Credential::new("access", "refresh");
//!     let session = ApiSession::new(credential, authority);
//!     let config = ExportConfig::from_env();
//!     let engine = ExportEngine::new(&session, &config, "12345");
//!
//!     let outcome = engine.export(&["name", "price", "vendor_name"], None).await?;
//!     println!("{} rows", outcome.rows.len());
//!     Ok(())
//! }
//! ```

pub mod airtable;
pub mod auth;
pub mod config;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod fields;
pub mod json;
pub mod lookup;
pub mod output;
pub mod project;

// Re-export commonly used types
pub use error::{AuthError, ExportError, Result};
pub use project::Row;
