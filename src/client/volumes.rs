//! Google Books volumes-search client implementation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::client::{PageResult, SearchClient, SearchError};
use crate::config::SearchConfig;
use crate::models::{BookSummary, PageRequest};

/// Field-selection parameter restricting the response payload to the fields
/// this client reads. An optimization only; parsing works without it.
const FIELDS_PARAMETER: &str = "items(volumeInfo/title,volumeInfo/authors,volumeInfo/infoLink)";

/// Volumes-search client
///
/// Fetches one bounded page of book results per request over the REST API.
#[derive(Debug, Clone)]
pub struct VolumesClient {
    client: Arc<Client>,
    base_url: String,
}

impl VolumesClient {
    /// Create a new client with default settings.
    pub fn new() -> Self {
        Self::with_config(&SearchConfig::default())
    }

    /// Create a client from a configuration.
    pub fn with_config(config: &SearchConfig) -> Self {
        let client = Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .read_timeout(Duration::from_secs(config.read_timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client: Arc::new(client),
            base_url: config.base_url.clone(),
        }
    }

    /// Create a client against a different base endpoint.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let config = SearchConfig {
            base_url: base_url.into(),
            ..SearchConfig::default()
        };
        Self::with_config(&config)
    }

    /// Build the request URL for one page.
    fn build_url(&self, request: &PageRequest) -> String {
        format!(
            "{}?q={}&startIndex={}&maxResults={}&fields={}",
            self.base_url,
            urlencoding::encode(&request.query),
            request.start_index,
            request.page_size,
            FIELDS_PARAMETER,
        )
    }

    /// Extract book summaries from a decoded response.
    ///
    /// A missing `items` field is the empty (exhausted) page, not an error.
    /// Malformed individual items are skipped; the rest of the page parses.
    fn extract_books(response: VolumesResponse) -> Vec<BookSummary> {
        let Some(items) = response.items else {
            return Vec::new();
        };

        let mut books = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            match serde_json::from_value::<VolumeItem>(item) {
                Ok(item) => books.push(BookSummary {
                    title: item.volume_info.title,
                    authors: item.volume_info.authors,
                    detail_url: item.volume_info.info_link,
                }),
                Err(err) => {
                    debug!(index, %err, "skipping malformed volume item");
                }
            }
        }
        books
    }
}

impl Default for VolumesClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchClient for VolumesClient {
    async fn fetch_page(&self, request: &PageRequest) -> PageResult {
        let url = self.build_url(request);
        debug!(query = %request.query, start_index = request.start_index, "fetching page");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SearchError::Transport(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), query = %request.query, "volumes search failed");
            return Err(SearchError::Network(format!("status {}", status.as_u16())));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SearchError::Transport(format!("reading body: {e}")))?;

        let parsed: VolumesResponse = serde_json::from_str(&body)
            .map_err(|e| SearchError::Parse(format!("invalid payload: {e}")))?;

        Ok(Self::extract_books(parsed))
    }
}

// ===== Volumes API Types =====

#[derive(Debug, Deserialize)]
struct VolumesResponse {
    /// Absent when the search is exhausted. Items stay raw so one bad entry
    /// cannot fail the whole page.
    #[serde(default)]
    items: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct VolumeItem {
    #[serde(rename = "volumeInfo")]
    volume_info: VolumeInfo,
}

#[derive(Debug, Deserialize)]
struct VolumeInfo {
    title: String,
    #[serde(default)]
    authors: Vec<String>,
    #[serde(rename = "infoLink", default)]
    info_link: String,
}
