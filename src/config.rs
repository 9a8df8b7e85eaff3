//! Configuration management.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Base endpoint for a Google Books volumes search.
const VOLUMES_API_BASE: &str = "https://www.googleapis.com/books/v1/volumes";

/// Settings for constructing a [`VolumesClient`](crate::client::VolumesClient).
///
/// Timeouts are policy, not protocol; every field has a default and can be
/// overridden from a TOML file or the `BOOKSCOUT_*` environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Base endpoint of the volumes-search API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Results requested per page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Seconds to wait for a connection to be established.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Seconds to wait for response data once connected.
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            page_size: default_page_size(),
            connect_timeout_secs: default_connect_timeout(),
            read_timeout_secs: default_read_timeout(),
        }
    }
}

fn default_base_url() -> String {
    VOLUMES_API_BASE.to_string()
}

fn default_page_size() -> usize {
    crate::models::DEFAULT_PAGE_SIZE
}

fn default_connect_timeout() -> u64 {
    15
}

fn default_read_timeout() -> u64 {
    10
}

/// Load configuration from a file, with `BOOKSCOUT_*` environment overrides.
pub fn load_config(path: &Path) -> Result<SearchConfig, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(config::Environment::with_prefix("BOOKSCOUT"))
        .build()?;

    settings.try_deserialize()
}
