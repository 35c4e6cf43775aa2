//! Export orchestration
//!
//! Drives one full catalog export: resolves the field selection, builds the
//! lookup maps and fetches the item pages concurrently, then projects every
//! raw item into a flat row once both sides have completed.

use crate::auth::ApiSession;
use crate::config::ExportConfig;
use crate::error::Result;
use crate::fetch::PaginatedFetcher;
use crate::fields::{self, FieldDescriptor, Relation};
use crate::json::text;
use crate::lookup::{self, LookupKind};
use crate::project::{self, Row};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{info, warn};

/// Result of one export run
pub struct ExportOutcome {
    /// Resolved field schema, in output order
    pub fields: Vec<&'static FieldDescriptor>,
    /// One flat row per catalog item
    pub rows: Vec<Row>,
}

/// One entry of the category listing
#[derive(Debug, Clone)]
pub struct CategoryEntry {
    pub id: String,
    pub path: String,
}

/// Orchestrates catalog exports against one account
pub struct ExportEngine<'a> {
    session: &'a ApiSession,
    config: &'a ExportConfig,
    account_id: String,
}

impl<'a> ExportEngine<'a> {
    pub fn new(session: &'a ApiSession, config: &'a ExportConfig, account_id: &str) -> Self {
        Self {
            session,
            config,
            account_id: account_id.to_string(),
        }
    }

    /// Run a full export for the given field selection
    ///
    /// Unknown field ids are dropped; an empty selection falls back to the
    /// default field set. `category_id` restricts the export to one
    /// category when present. Lookup tables and item pages are fetched
    /// concurrently; a failed lookup degrades to empty values for its
    /// fields, while an item fetch failure aborts the run.
    pub async fn export(
        &self,
        field_ids: &[&str],
        category_id: Option<&str>,
    ) -> Result<ExportOutcome> {
        let fields = fields::resolve(field_ids);
        let relations = fields::relations_required(&fields);
        let lookups = fields::lookups_required(&fields);

        info!(
            account_id = %self.account_id,
            fields = fields.len(),
            lookups = lookups.len(),
            "starting catalog export"
        );

        let (maps, items) = tokio::join!(
            lookup::build_all(self.session, self.config, &self.account_id, &lookups),
            self.fetch_items(&relations, category_id),
        );
        let items = items?;

        let rows: Vec<Row> = items
            .iter()
            .map(|item| project::project(item, &maps, &fields))
            .collect();

        info!(rows = rows.len(), "catalog export complete");
        Ok(ExportOutcome { fields, rows })
    }

    /// Fetch all item pages, degrading the relation set on a 400 response
    ///
    /// Some accounts reject the richer relation combinations outright. One
    /// retry with the minimal set (images only, when selected) keeps the
    /// export alive at the cost of relation-backed fields.
    async fn fetch_items(
        &self,
        relations: &[Relation],
        category_id: Option<&str>,
    ) -> Result<Vec<Value>> {
        let fetcher = PaginatedFetcher::new(self.session, self.config);
        let relation_names: Vec<&str> = relations.iter().map(|r| r.as_str()).collect();
        let extra_params: Vec<(String, String)> = category_id
            .map(|id| vec![("categoryID".to_string(), id.to_string())])
            .unwrap_or_default();

        let first = fetcher
            .fetch_all(
                &self.account_id,
                "Item",
                "itemID",
                &relation_names,
                &extra_params,
            )
            .await;

        match first {
            Err(ref err) if err.is_fetch_status(StatusCode::BAD_REQUEST) => {
                let minimal: Vec<&str> = if relations.contains(&Relation::Images) {
                    vec![Relation::Images.as_str()]
                } else {
                    Vec::new()
                };
                warn!(
                    requested = ?relation_names,
                    retained = ?minimal,
                    "item fetch rejected relation set, retrying with minimal relations"
                );
                fetcher
                    .fetch_all(&self.account_id, "Item", "itemID", &minimal, &extra_params)
                    .await
            },
            other => other,
        }
    }

    /// List all categories of the account as id/path pairs, sorted by path
    pub async fn categories(&self) -> Result<Vec<CategoryEntry>> {
        let fetcher = PaginatedFetcher::new(self.session, self.config);
        let records = fetcher
            .fetch_all(&self.account_id, "Category", "name", &[], &[])
            .await?;

        let mut entries: Vec<CategoryEntry> = records
            .iter()
            .filter_map(|record| {
                let id = text(record, "categoryID");
                if id.is_empty() {
                    return None;
                }
                let mut path = text(record, "fullPathName");
                if path.is_empty() {
                    path = text(record, "name");
                }
                Some(CategoryEntry { id, path })
            })
            .collect();
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }
}
