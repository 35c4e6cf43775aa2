//! `lsx categories` - list the account's item categories

use crate::error::Result;
use crate::session::{build_session, CredentialArgs};
use lsx_core::config::ExportConfig;
use lsx_core::engine::ExportEngine;

pub async fn run(credentials: CredentialArgs) -> Result<()> {
    let session = build_session(&credentials).await?;
    let account_id = credentials.account_id()?;
    let config = ExportConfig::from_env();

    let engine = ExportEngine::new(&session, &config, account_id);
    let categories = engine.categories().await?;

    println!("Item categories (use --category-id ID to filter exports):");
    for entry in &categories {
        println!("  {:>6}  {}", entry.id, entry.path);
    }
    println!("{} categories.", categories.len());
    Ok(())
}
