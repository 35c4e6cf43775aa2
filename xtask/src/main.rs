//! Build automation tasks for LSX
//!
//! This tool provides various automation tasks for the LSX project, including:
//! - Generating CLI documentation from source code
//! - Future build-related tasks

use clap::Parser;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation tasks for LSX", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Generate CLI documentation in markdown format
    GenerateCliDocs {
        /// Output directory for generated documentation
        #[arg(short, long, default_value = "docs")]
        output_dir: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::GenerateCliDocs { output_dir } => generate_cli_docs(&output_dir)?,
    }

    Ok(())
}

fn generate_cli_docs(output_dir: &str) -> anyhow::Result<()> {
    println!("Generating CLI documentation...");

    // Generate markdown from clap definitions
    let markdown = clap_markdown::help_markdown::<lsx_cli::Cli>();

    let content = format!(
        r#"---
title: CLI Reference
description: Complete command reference for the LSX CLI
---

# LSX CLI Reference

This documentation is auto-generated from the CLI source code. Last updated: {}.

## Overview

LSX exports a Lightspeed R-Series product catalog to Airtable-ready JSON/CSV
files and can push the result straight into an Airtable base.

## Installation

### From Source

```bash
git clone https://github.com/datadir-lab/lsx.git
cd lsx
cargo install --path crates/lsx-cli
```

## Quick Start

```bash
# Authorize with Lightspeed (stores tokens in .env)
lsx login

# See which categories and fields are available
lsx categories
lsx fields

# Export the catalog and push to Airtable
lsx export --fields name,cost,price,vendor_name,image
```

## Commands

{}

## Environment Variables

- `LIGHTSPEED_ACCOUNT_ID` - Lightspeed account ID
- `LIGHTSPEED_ACCESS_TOKEN` / `LIGHTSPEED_REFRESH_TOKEN` - OAuth tokens (managed by `lsx login`)
- `LIGHTSPEED_CLIENT_ID` / `LIGHTSPEED_CLIENT_SECRET` - OAuth client credentials
- `AIRTABLE_API_KEY`, `AIRTABLE_BASE_ID` - Destination base credentials
- `AIRTABLE_TABLE_NAME` - Existing table to push into (default: `Items`)
- `AIRTABLE_CREATE_NEW_TABLE` - Create a fresh table per export (`true`/`false`)
- `AIRTABLE_FIELDS` - Comma-separated field ids (see `lsx fields`)
- `LSX_PAGE_DELAY_MS` / `LSX_PUSH_DELAY_MS` - Rate-limit tuning
- `LSX_LOG_LEVEL` - Logging level (e.g., `debug`, `info`, `warn`, `error`)

---

*This documentation is automatically generated from the CLI source code. To update, run `cargo xtask generate-cli-docs`.*
"#,
        chrono::Utc::now().format("%Y-%m-%d"),
        markdown
    );

    // Create output directory if it doesn't exist
    let output_path = PathBuf::from(output_dir);
    fs::create_dir_all(&output_path)?;

    let file_path = output_path.join("cli-reference.md");
    fs::write(&file_path, content)?;

    println!("Generated CLI documentation at: {}", file_path.display());
    Ok(())
}
