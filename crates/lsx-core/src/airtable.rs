//! Airtable destination sync
//!
//! Pushes projected rows into an Airtable base in fixed-size batches, with
//! optional table creation through the metadata API.

use crate::config::ExportConfig;
use crate::error::{ExportError, Result};
use crate::fields::{FieldDescriptor, ValueType};
use crate::project::Row;
use chrono::Local;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tracing::{info, warn};

pub const AIRTABLE_API_BASE: &str = "https://api.airtable.com/v0";
pub const AIRTABLE_META_BASE: &str = "https://api.airtable.com/v0/meta";

/// Maximum records per create-records request
pub const BATCH_SIZE: usize = 10;

/// Wait before the single retry after a 429 response
pub const RATE_LIMIT_BACKOFF_SECS: u64 = 30;

const RESPONSE_SUMMARY_LIMIT: usize = 600;

/// Identifies the destination table for record pushes
///
/// Holds a `tbl…` id when the table was just created, otherwise the table
/// name. Pushing to a freshly created table by name can 403 before the
/// name propagates, so the id is preferred.
#[derive(Debug, Clone)]
pub struct TableHandle(String);

impl TableHandle {
    pub fn from_name(name: &str) -> Self {
        Self(sanitize_table_name(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Client for one Airtable base
pub struct AirtableClient {
    client: Client,
    api_key: String,
    base_id: String,
    api_base: String,
    meta_base: String,
    push_delay: std::time::Duration,
    rate_limit_backoff: std::time::Duration,
}

impl AirtableClient {
    pub fn new(api_key: &str, base_id: &str, config: &ExportConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            base_id: base_id.to_string(),
            api_base: AIRTABLE_API_BASE.to_string(),
            meta_base: AIRTABLE_META_BASE.to_string(),
            push_delay: config.push_delay(),
            rate_limit_backoff: std::time::Duration::from_secs(RATE_LIMIT_BACKOFF_SECS),
        }
    }

    /// Override the 429 backoff, for tests
    pub fn with_rate_limit_backoff(mut self, backoff: std::time::Duration) -> Self {
        self.rate_limit_backoff = backoff;
        self
    }

    /// Override endpoints, for tests against a local mock server
    pub fn with_endpoints(mut self, api_base: &str, meta_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self.meta_base = meta_base.trim_end_matches('/').to_string();
        self
    }

    /// Create a new table in the base and return its handle
    ///
    /// The name gets a timestamp suffix so repeated exports never collide
    /// with an existing table. Returns the `tbl…` id when the response
    /// carries one.
    pub async fn create_table(
        &self,
        table_name: &str,
        fields: &[&'static FieldDescriptor],
    ) -> Result<TableHandle> {
        let url = format!("{}/bases/{}/tables", self.meta_base, self.base_id);
        let unique_name = format!(
            "{} ({})",
            sanitize_table_name(table_name),
            Local::now().format("%Y-%m-%d %H.%M")
        );
        let payload = json!({
            "name": unique_name,
            "description": "Exported from Lightspeed",
            "fields": build_table_schema(fields),
        });

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| ExportError::schema(format!("table create request failed: {e}")))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(ExportError::schema(format!(
                "table create failed (HTTP {}): {}",
                status.as_u16(),
                error_message(&body)
            )));
        }

        let data: Value = serde_json::from_str(&body)
            .map_err(|e| ExportError::schema(format!("unreadable table create response: {e}")))?;
        let table_id = data
            .get("id")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|id| !id.is_empty());
        let created_name = data
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(&unique_name);
        info!(table = created_name, "created Airtable table");

        Ok(TableHandle(
            table_id.unwrap_or(&unique_name).to_string(),
        ))
    }

    /// Push all rows into the table in batches of [`BATCH_SIZE`]
    ///
    /// A 429 response waits [`RATE_LIMIT_BACKOFF_SECS`] and retries the
    /// batch once; any other failure aborts with the index of the batch
    /// that failed. Returns the number of records pushed.
    pub async fn push(
        &self,
        table: &TableHandle,
        rows: &[Row],
        fields: &[&'static FieldDescriptor],
    ) -> Result<usize> {
        if rows.is_empty() {
            info!("no rows to push to Airtable");
            return Ok(0);
        }

        let url = format!(
            "{}/{}/{}",
            self.api_base,
            self.base_id,
            urlencoding::encode(table.as_str())
        );

        let mut total = 0usize;
        for (batch_index, batch) in rows.chunks(BATCH_SIZE).enumerate() {
            let records: Vec<Value> = batch
                .iter()
                .map(|row| json!({"fields": row_to_airtable_fields(row, fields)}))
                .collect();
            let payload = json!({"records": records});

            let mut response = self.send_batch(&url, &payload, batch_index).await?;
            if response.status() == StatusCode::TOO_MANY_REQUESTS {
                warn!(
                    batch = batch_index,
                    backoff_secs = self.rate_limit_backoff.as_secs(),
                    "Airtable rate limit, backing off before retry"
                );
                tokio::time::sleep(self.rate_limit_backoff).await;
                response = self.send_batch(&url, &payload, batch_index).await?;
            }

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(ExportError::Push {
                    batch_index,
                    reason: format!("HTTP {}: {}", status.as_u16(), error_message(&body)),
                });
            }

            total += batch.len();
            if total % 500 == 0 || total == rows.len() {
                info!(pushed = total, total = rows.len(), "Airtable push progress");
            }
            tokio::time::sleep(self.push_delay).await;
        }

        info!(records = total, "Airtable push complete");
        Ok(total)
    }

    async fn send_batch(
        &self,
        url: &str,
        payload: &Value,
        batch_index: usize,
    ) -> Result<reqwest::Response> {
        self.client
            .post(url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .json(payload)
            .send()
            .await
            .map_err(|e| ExportError::Push {
                batch_index,
                reason: format!("request failed: {e}"),
            })
    }
}

/// Make a string safe as an Airtable table name
///
/// Strips path-like characters, collapses whitespace, caps at 100 chars.
pub fn sanitize_table_name(name: &str) -> String {
    let mut cleaned = name.trim().to_string();
    for bad in ['/', '\\', '?', '#'] {
        cleaned = cleaned.replace(bad, " ");
    }
    let collapsed: String = cleaned
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
        .chars()
        .take(100)
        .collect();
    if collapsed.is_empty() {
        "Untitled".to_string()
    } else {
        collapsed
    }
}

/// Convert one row into the Airtable `fields` object
///
/// Keys are display names. Number fields must parse or they are skipped;
/// attachment fields split the joined URL string back into `{url}` objects;
/// empty values are skipped entirely.
pub fn row_to_airtable_fields(row: &Row, fields: &[&'static FieldDescriptor]) -> Value {
    let mut out = serde_json::Map::new();
    for descriptor in fields {
        let raw = row
            .get(descriptor.row_key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim();
        if raw.is_empty() {
            continue;
        }
        match descriptor.value_type {
            ValueType::Number => {
                if let Ok(num) = raw.parse::<f64>() {
                    if let Some(value) = serde_json::Number::from_f64(num) {
                        out.insert(descriptor.display_name.to_string(), Value::Number(value));
                    }
                }
            },
            ValueType::AttachmentList => {
                let urls: Vec<Value> = raw
                    .split('|')
                    .map(str::trim)
                    .filter(|url| !url.is_empty())
                    .map(|url| json!({"url": url}))
                    .collect();
                if !urls.is_empty() {
                    out.insert(descriptor.display_name.to_string(), Value::Array(urls));
                }
            },
            ValueType::Text => {
                out.insert(
                    descriptor.display_name.to_string(),
                    Value::String(raw.to_string()),
                );
            },
        }
    }
    Value::Object(out)
}

/// Build the field schema for the table create API
pub fn build_table_schema(fields: &[&'static FieldDescriptor]) -> Vec<Value> {
    fields
        .iter()
        .map(|descriptor| match descriptor.value_type {
            ValueType::Number => json!({
                "name": descriptor.display_name,
                "type": "number",
                "options": {"precision": 0},
            }),
            ValueType::AttachmentList => json!({
                "name": descriptor.display_name,
                "type": "multipleAttachments",
            }),
            ValueType::Text => json!({
                "name": descriptor.display_name,
                "type": "singleLineText",
            }),
        })
        .collect()
}

/// Pull the `error.message` out of an Airtable error body, else truncate it
fn error_message(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<Value>(body) {
        if let Some(message) = parsed
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(Value::as_str)
        {
            return message.to_string();
        }
    }
    let mut end = body.len().min(RESPONSE_SUMMARY_LIMIT);
    while end > 0 && !body.is_char_boundary(end) {
        end -= 1;
    }
    body[..end].to_string()
}
