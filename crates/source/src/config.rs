//! Remote source configuration.

use serde::{Deserialize, Serialize};

/// Placeholder replaced by the canonical date in [`SourceConfig::url_template`].
pub const DATE_PLACEHOLDER: &str = "{date}";

/// Market summary source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Download URL with a `{date}` placeholder (YYYY-MM-DD)
    #[serde(default = "default_url_template")]
    pub url_template: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// User-Agent header (optional)
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_url_template() -> String {
    "https://dps.psx.com.pk/download/mkt_summary/{date}.Z".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url_template: default_url_template(),
            timeout_secs: default_timeout_secs(),
            user_agent: None,
        }
    }
}

impl SourceConfig {
    /// Renders the download URL for a canonical date string.
    pub fn url_for(&self, canonical_date: &str) -> String {
        self.url_template.replace(DATE_PLACEHOLDER, canonical_date)
    }
}
