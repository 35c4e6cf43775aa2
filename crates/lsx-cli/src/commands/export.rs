//! `lsx export` - fetch the catalog, write files, push to Airtable

use crate::envfile;
use crate::error::Result;
use crate::session::{build_session, CredentialArgs};
use crate::OutputFormat;
use indicatif::{ProgressBar, ProgressStyle};
use lsx_core::airtable::{AirtableClient, TableHandle};
use lsx_core::config::ExportConfig;
use lsx_core::engine::{ExportEngine, ExportOutcome};
use lsx_core::output::{self, JsonStyle};
use lsx_core::ExportError;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Base name of the output files inside the output directory
const OUTPUT_BASE_NAME: &str = "lightspeed_items";

const DEFAULT_TABLE_NAME: &str = "Items";

/// Options for one export run
pub struct ExportOptions {
    pub credentials: CredentialArgs,
    pub output_dir: PathBuf,
    pub format: OutputFormat,
    pub airtable_json: bool,
    pub category_id: Option<String>,
    pub fields: Option<String>,
    pub no_push_airtable: bool,
}

pub async fn run(options: ExportOptions) -> Result<()> {
    let session = build_session(&options.credentials).await?;
    let account_id = options.credentials.account_id()?.to_string();
    let config = ExportConfig::from_env();

    let field_ids = split_field_ids(options.fields.as_deref());
    let field_refs: Vec<&str> = field_ids.iter().map(String::as_str).collect();
    let category_id = options
        .category_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty());

    let engine = ExportEngine::new(&session, &config, &account_id);

    let spinner = spinner("Exporting catalog from Lightspeed...");
    let outcome = tokio::time::timeout(
        Duration::from_secs(config.export_timeout_secs),
        engine.export(&field_refs, category_id),
    )
    .await
    .map_err(|_| ExportError::Timeout(config.export_timeout_secs))??;
    spinner.finish_with_message(format!("Exported {} items", outcome.rows.len()));

    write_outputs(&options, &outcome)?;

    if options.no_push_airtable {
        info!("Airtable push skipped (--no-push-airtable)");
    } else {
        push_to_airtable(&engine, &config, &outcome, category_id).await?;
    }

    // A refresh may have rotated the credential mid-run; persist it so the
    // next invocation does not start from a dead token.
    if options.credentials.refresh_token.is_some() {
        let credential = session.credential().await;
        envfile::upsert(
            Path::new(".env"),
            &[
                ("LIGHTSPEED_ACCESS_TOKEN", &credential.access_token),
                ("LIGHTSPEED_REFRESH_TOKEN", &credential.refresh_token),
            ],
        )?;
    }

    println!("Done. Total records: {}", outcome.rows.len());
    Ok(())
}

fn write_outputs(options: &ExportOptions, outcome: &ExportOutcome) -> Result<()> {
    std::fs::create_dir_all(&options.output_dir)?;
    let base = options.output_dir.join(OUTPUT_BASE_NAME);

    if matches!(options.format, OutputFormat::Json | OutputFormat::Both) {
        let path = base.with_extension("json");
        let style = if options.airtable_json {
            JsonStyle::Airtable
        } else {
            JsonStyle::Flat
        };
        output::write_json(&path, &outcome.rows, style)?;
        println!("Wrote {}", path.display());
    }
    if matches!(options.format, OutputFormat::Csv | OutputFormat::Both) {
        let path = base.with_extension("csv");
        output::write_csv(&path, &outcome.rows)?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

/// Push the rows when Airtable credentials are configured
async fn push_to_airtable(
    engine: &ExportEngine<'_>,
    config: &ExportConfig,
    outcome: &ExportOutcome,
    category_id: Option<&str>,
) -> Result<()> {
    let api_key = lsx_common::env::var_trimmed("AIRTABLE_API_KEY")
        .or_else(|| lsx_common::env::var_trimmed("AIRTABLE_TOKEN"));
    let base_id = lsx_common::env::var_trimmed("AIRTABLE_BASE_ID");
    let (Some(api_key), Some(base_id)) = (api_key, base_id) else {
        info!("Airtable credentials not configured; skipping push");
        return Ok(());
    };

    let client = AirtableClient::new(&api_key, &base_id, config);
    let table = if create_new_table_requested() {
        let display_name = match category_id {
            Some(id) => category_display_name(engine, id).await,
            None => "All categories".to_string(),
        };
        println!("Creating new Airtable table: {display_name}");
        client.create_table(&display_name, &outcome.fields).await?
    } else {
        let name = lsx_common::env::var_trimmed("AIRTABLE_TABLE_NAME")
            .unwrap_or_else(|| DEFAULT_TABLE_NAME.to_string());
        TableHandle::from_name(&name)
    };

    println!("Pushing to Airtable...");
    let pushed = client.push(&table, &outcome.rows, &outcome.fields).await?;
    println!("Pushed {pushed} records to Airtable.");

    let url = if table.as_str().starts_with("tbl") {
        format!("https://airtable.com/{}/{}", base_id, table.as_str())
    } else {
        format!("https://airtable.com/{base_id}")
    };
    if open::that(&url).is_err() {
        println!("Open the base at {url}");
    }
    Ok(())
}

/// Resolve a category id to its path for the table name
///
/// Falls back to the raw id when the listing fails; the push itself still
/// proceeds.
async fn category_display_name(engine: &ExportEngine<'_>, category_id: &str) -> String {
    match engine.categories().await {
        Ok(categories) => categories
            .into_iter()
            .find(|entry| entry.id == category_id)
            .map(|entry| entry.path)
            .unwrap_or_else(|| category_id.to_string()),
        Err(err) => {
            warn!(error = %err, "Could not resolve category name for table title");
            category_id.to_string()
        },
    }
}

fn create_new_table_requested() -> bool {
    lsx_common::env::var_trimmed("AIRTABLE_CREATE_NEW_TABLE")
        .map(|raw| matches!(raw.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

fn split_field_ids(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner} {msg}").unwrap_or(ProgressStyle::default_spinner()),
    );
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_split_field_ids() {
        assert_eq!(
            split_field_ids(Some("Name, COST ,,price")),
            vec!["name", "cost", "price"]
        );
        assert!(split_field_ids(None).is_empty());
        assert!(split_field_ids(Some("  ")).is_empty());
    }
}
