//! LSX CLI - Main entry point

use clap::Parser;
use lsx_cli::session::CredentialArgs;
use lsx_cli::{Cli, Commands};
use lsx_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    // Load .env before argument parsing so env-backed flags see it
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Handle markdown help generation
    if cli.markdown_help {
        println!("{}", clap_markdown::help_markdown::<Cli>());
        return;
    }

    // Ensure a command is provided
    if cli.command.is_none() {
        eprintln!("Error: A subcommand is required");
        eprintln!();
        eprintln!("For more information, try '--help'.");
        process::exit(2);
    }

    // Initialize logging based on verbose flag and environment
    let log_config = if cli.verbose {
        LogConfig::builder()
            .level(LogLevel::Debug)
            .output(LogOutput::Console)
            .log_file_prefix("lsx-cli".to_string())
            .build()
    } else {
        LogConfig::builder()
            .level(LogLevel::Warn)
            .output(LogOutput::Console)
            .log_file_prefix("lsx-cli".to_string())
            .build()
    };

    // Merge with environment variables (they take precedence)
    let log_config = LogConfig::from_env().unwrap_or(log_config);

    // Initialize logging (ignore errors as the CLI should work without it)
    let _ = init_logging(&log_config);

    if let Err(e) = execute_command(cli).await {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Execute the CLI command
async fn execute_command(cli: Cli) -> lsx_cli::Result<()> {
    // Command is guaranteed to exist at this point (checked in main)
    let Some(command) = cli.command else {
        unreachable!("Command should have been validated in main");
    };

    match command {
        Commands::Export {
            output_dir,
            format,
            airtable_json,
            account_id,
            access_token,
            refresh_token,
            client_id,
            client_secret,
            category_id,
            fields,
            no_push_airtable,
        } => {
            lsx_cli::commands::export::run(lsx_cli::commands::export::ExportOptions {
                credentials: CredentialArgs {
                    account_id,
                    access_token,
                    refresh_token,
                    client_id,
                    client_secret,
                },
                output_dir,
                format,
                airtable_json,
                category_id,
                fields,
                no_push_airtable,
            })
            .await
        },

        Commands::Login {
            client_id,
            client_secret,
            port,
            no_browser,
        } => lsx_cli::commands::login::run(client_id, client_secret, port, no_browser).await,

        Commands::Categories {
            account_id,
            access_token,
            refresh_token,
            client_id,
            client_secret,
        } => {
            lsx_cli::commands::categories::run(CredentialArgs {
                account_id,
                access_token,
                refresh_token,
                client_id,
                client_secret,
            })
            .await
        },

        Commands::Fields => lsx_cli::commands::fields::run().await,
    }
}
