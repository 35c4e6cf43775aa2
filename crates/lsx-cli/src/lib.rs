//! LSX CLI Library
//!
//! Command-line interface for exporting a Lightspeed R-Series catalog.
//!
//! # Overview
//!
//! The LSX CLI wraps the export pipeline in four commands:
//!
//! - **Export**: Fetch the catalog and write JSON/CSV, optionally pushing
//!   to Airtable (`lsx export`)
//! - **Login**: Run the OAuth authorization flow and persist tokens
//!   (`lsx login`)
//! - **Categories**: List the account's categories for `--category-id`
//!   filtering (`lsx categories`)
//! - **Fields**: Show the exportable field catalog (`lsx fields`)

pub mod commands;
pub mod envfile;
pub mod error;
pub mod session;

// Re-export commonly used types
pub use error::{CliError, Result};

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// LSX - Lightspeed catalog export tool
#[derive(Parser, Debug)]
#[command(name = "lsx")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print CLI documentation as markdown
    #[arg(long, hide = true)]
    pub markdown_help: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export the catalog to JSON/CSV and optionally push to Airtable
    Export {
        /// Directory to write output files
        #[arg(short, long, default_value = "output")]
        output_dir: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Both)]
        format: OutputFormat,

        /// Emit JSON in Airtable create-records shape
        #[arg(long)]
        airtable_json: bool,

        /// Lightspeed account ID
        #[arg(long, env = "LIGHTSPEED_ACCOUNT_ID")]
        account_id: Option<String>,

        /// Lightspeed access token
        #[arg(long, env = "LIGHTSPEED_ACCESS_TOKEN", hide_env_values = true)]
        access_token: Option<String>,

        /// OAuth refresh token for automatic token refresh
        #[arg(long, env = "LIGHTSPEED_REFRESH_TOKEN", hide_env_values = true)]
        refresh_token: Option<String>,

        /// OAuth client ID
        #[arg(long, env = "LIGHTSPEED_CLIENT_ID")]
        client_id: Option<String>,

        /// OAuth client secret
        #[arg(long, env = "LIGHTSPEED_CLIENT_SECRET", hide_env_values = true)]
        client_secret: Option<String>,

        /// Restrict the export to one category (see `lsx categories`)
        #[arg(long)]
        category_id: Option<String>,

        /// Comma-separated field ids (see `lsx fields`)
        #[arg(long, env = "AIRTABLE_FIELDS")]
        fields: Option<String>,

        /// Skip the Airtable push even when credentials are configured
        #[arg(long)]
        no_push_airtable: bool,
    },

    /// Authorize with Lightspeed and persist tokens to .env
    Login {
        /// OAuth client ID
        #[arg(long, env = "LIGHTSPEED_CLIENT_ID")]
        client_id: Option<String>,

        /// OAuth client secret
        #[arg(long, env = "LIGHTSPEED_CLIENT_SECRET", hide_env_values = true)]
        client_secret: Option<String>,

        /// Local port for the OAuth callback listener
        #[arg(long, default_value_t = 8765)]
        port: u16,

        /// Skip opening the browser; paste the redirect URL instead
        #[arg(long)]
        no_browser: bool,
    },

    /// List the account's item categories
    Categories {
        /// Lightspeed account ID
        #[arg(long, env = "LIGHTSPEED_ACCOUNT_ID")]
        account_id: Option<String>,

        /// Lightspeed access token
        #[arg(long, env = "LIGHTSPEED_ACCESS_TOKEN", hide_env_values = true)]
        access_token: Option<String>,

        /// OAuth refresh token for automatic token refresh
        #[arg(long, env = "LIGHTSPEED_REFRESH_TOKEN", hide_env_values = true)]
        refresh_token: Option<String>,

        /// OAuth client ID
        #[arg(long, env = "LIGHTSPEED_CLIENT_ID")]
        client_id: Option<String>,

        /// OAuth client secret
        #[arg(long, env = "LIGHTSPEED_CLIENT_SECRET", hide_env_values = true)]
        client_secret: Option<String>,
    },

    /// Show the exportable field catalog
    Fields,
}

/// Output file formats for `lsx export`
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Csv,
    Both,
}
