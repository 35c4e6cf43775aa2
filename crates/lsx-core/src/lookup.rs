//! Auxiliary id→name lookup tables
//!
//! Lookups are mutually independent, so they are fetched with bounded
//! concurrency. A lookup the tenant's account does not support (departments
//! are not enabled everywhere) fails softly: the export proceeds and rows
//! depending on that lookup get blank values.

use crate::auth::ApiSession;
use crate::config::ExportConfig;
use crate::fetch::PaginatedFetcher;
use crate::json::text;
use futures::stream::{self, StreamExt};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{info, warn};

/// The lookup tables an export may need
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupKind {
    Vendor,
    Category,
    Manufacturer,
    Department,
}

impl LookupKind {
    /// Source resource collection for this lookup
    pub fn resource(self) -> &'static str {
        match self {
            LookupKind::Vendor => "Vendor",
            LookupKind::Category => "Category",
            LookupKind::Manufacturer => "Manufacturer",
            LookupKind::Department => "Department",
        }
    }

    /// Sort/id field of the resource
    pub fn id_field(self) -> &'static str {
        match self {
            LookupKind::Vendor => "vendorID",
            LookupKind::Category => "categoryID",
            LookupKind::Manufacturer => "manufacturerID",
            LookupKind::Department => "departmentID",
        }
    }
}

impl std::fmt::Display for LookupKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.resource())
    }
}

/// All lookup maps for one export run
///
/// Built fresh per export, read-only afterwards. A kind that was not
/// requested (or failed softly) is simply an empty map.
#[derive(Debug, Clone, Default)]
pub struct LookupMaps {
    /// vendorID -> vendor name
    pub vendors: HashMap<String, String>,
    /// categoryID -> full path segments (from `fullPathName`, split on "/")
    pub category_paths: HashMap<String, Vec<String>>,
    /// manufacturerID -> name (brand)
    pub manufacturers: HashMap<String, String>,
    /// departmentID -> name
    pub departments: HashMap<String, String>,
}

/// Build the requested lookup maps with bounded concurrency
///
/// Never fails: a kind whose fetch errors degrades to an empty map so the
/// export can continue.
pub async fn build_all(
    session: &ApiSession,
    config: &ExportConfig,
    account_id: &str,
    kinds: &[LookupKind],
) -> LookupMaps {
    if kinds.is_empty() {
        return LookupMaps::default();
    }

    let results: Vec<(LookupKind, Vec<Value>)> = stream::iter(kinds.iter().copied())
        .map(|kind| async move {
            let fetcher = PaginatedFetcher::new(session, config);
            match fetcher
                .fetch_all(account_id, kind.resource(), kind.id_field(), &[], &[])
                .await
            {
                Ok(records) => (kind, records),
                Err(err) => {
                    warn!(lookup = %kind, error = %err, "Lookup build failed; continuing with an empty map");
                    (kind, Vec::new())
                },
            }
        })
        .buffer_unordered(config.lookup_concurrency.max(1))
        .collect()
        .await;

    let mut maps = LookupMaps::default();
    for (kind, records) in results {
        match kind {
            LookupKind::Vendor => maps.vendors = name_map(&records, kind.id_field()),
            LookupKind::Category => maps.category_paths = category_path_map(&records),
            LookupKind::Manufacturer => maps.manufacturers = name_map(&records, kind.id_field()),
            LookupKind::Department => maps.departments = name_map(&records, kind.id_field()),
        }
    }

    info!(
        vendors = maps.vendors.len(),
        categories = maps.category_paths.len(),
        manufacturers = maps.manufacturers.len(),
        departments = maps.departments.len(),
        "Lookup maps ready"
    );
    maps
}

fn name_map(records: &[Value], id_field: &str) -> HashMap<String, String> {
    records
        .iter()
        .map(|record| (text(record, id_field), text(record, "name")))
        .filter(|(id, _)| !id.is_empty())
        .collect()
}

fn category_path_map(records: &[Value]) -> HashMap<String, Vec<String>> {
    let mut paths = HashMap::new();
    for record in records {
        let id = text(record, "categoryID");
        if id.is_empty() {
            continue;
        }
        let full = {
            let path = text(record, "fullPathName");
            if path.is_empty() {
                text(record, "name")
            } else {
                path
            }
        };
        let segments: Vec<String> = full
            .split('/')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();
        paths.insert(id, segments);
    }
    paths
}
