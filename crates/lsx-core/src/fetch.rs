//! Cursor-based pagination over source resource collections
//!
//! Pages are requested with a fixed `limit` and `sort`; continuation is
//! driven purely by the `@attributes.next` URL the server embeds in each
//! response. Pagination is sequential because each page's URL comes from
//! the previous response. A fixed inter-page delay keeps us under the
//! upstream rate limit; it is skipped before the very first page.

use crate::auth::ApiSession;
use crate::config::ExportConfig;
use crate::error::{AuthError, ExportError, Result};
use crate::json::normalize_to_list;
use serde_json::Value;
use tracing::{debug, info};

/// Paginated fetcher for one export run
pub struct PaginatedFetcher<'a> {
    session: &'a ApiSession,
    config: &'a ExportConfig,
}

impl<'a> PaginatedFetcher<'a> {
    pub fn new(session: &'a ApiSession, config: &'a ExportConfig) -> Self {
        Self { session, config }
    }

    /// Fetch every record of a resource collection, in server sort order
    ///
    /// `load_relations` is sent JSON-encoded on the first page (the next-page
    /// URL already carries it). On mid-pagination failure the error reports
    /// how many records were retrieved; those partial results are discarded.
    pub async fn fetch_all(
        &self,
        account_id: &str,
        resource: &str,
        sort: &str,
        load_relations: &[&str],
        extra_params: &[(String, String)],
    ) -> Result<Vec<Value>> {
        let mut url = format!("{}/{}/{}.json", self.config.api_base, account_id, resource);
        let mut params: Vec<(String, String)> = vec![
            ("limit".to_string(), self.config.page_size.to_string()),
            ("sort".to_string(), sort.to_string()),
        ];
        if !load_relations.is_empty() {
            params.push((
                "load_relations".to_string(),
                serde_json::to_string(load_relations)?,
            ));
        }
        params.extend(extra_params.iter().cloned());

        let mut records: Vec<Value> = Vec::new();
        let mut page = 0usize;

        loop {
            page += 1;
            if page > 1 {
                tokio::time::sleep(self.config.page_delay()).await;
            }

            let response = match self.session.get(&url, &params).await {
                Ok(response) => response,
                Err(AuthError::Network(err)) => {
                    return Err(ExportError::Fetch {
                        resource: resource.to_string(),
                        partial: records.len(),
                        status: err.status(),
                        reason: err.to_string(),
                    })
                },
                Err(err) => return Err(err.into()),
            };

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(ExportError::Fetch {
                    resource: resource.to_string(),
                    partial: records.len(),
                    status: Some(status),
                    reason: format!("HTTP {}: {}", status.as_u16(), summarize(&body)),
                });
            }

            let body: Value = match response.json().await {
                Ok(body) => body,
                Err(err) => {
                    return Err(ExportError::Fetch {
                        resource: resource.to_string(),
                        partial: records.len(),
                        status: None,
                        reason: format!("invalid JSON page: {}", err),
                    })
                },
            };

            // The page carries records under the resource's own key; a page
            // with no such key means the collection is empty.
            if body.get(resource).is_none() {
                break;
            }
            records.extend(normalize_to_list(body.get(resource)));

            match next_page_url(&body) {
                Some(next) => {
                    url = next;
                    // The next-page URL already embeds limit/sort/filters.
                    params.clear();
                },
                None => break,
            }

            if page % 50 == 0 {
                info!(resource, records = records.len(), "Pagination in progress");
            }
        }

        debug!(resource, records = records.len(), pages = page, "Fetch complete");
        Ok(records)
    }
}

/// Extract the server-supplied next-page cursor URL, if any
fn next_page_url(body: &Value) -> Option<String> {
    let attrs = body.get("@attributes").or_else(|| body.get("attributes"))?;
    let next = attrs.get("next")?.as_str()?.trim();
    if next.is_empty() {
        None
    } else {
        Some(next.to_string())
    }
}

fn summarize(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.len() <= 300 {
        trimmed.to_string()
    } else {
        let mut end = 300;
        while !trimmed.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &trimmed[..end])
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_next_page_url_present() {
        let body = json!({
            "@attributes": {"next": "https://api.example.com/Item.json?after=100"},
            "Item": []
        });
        assert_eq!(
            next_page_url(&body).unwrap(),
            "https://api.example.com/Item.json?after=100"
        );
    }

    #[test]
    fn test_next_page_url_absent_or_blank() {
        assert_eq!(next_page_url(&json!({"Item": []})), None);
        assert_eq!(
            next_page_url(&json!({"@attributes": {"next": "  "}})),
            None
        );
        assert_eq!(next_page_url(&json!({"@attributes": {}})), None);
    }

    #[test]
    fn test_next_page_url_legacy_attributes_key() {
        let body = json!({"attributes": {"next": "https://api.example.com/next"}});
        assert_eq!(
            next_page_url(&body).unwrap(),
            "https://api.example.com/next"
        );
    }
}
