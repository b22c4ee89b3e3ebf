//! Configuration for the category checker.
//!
//! Every field has a default, so an empty JSON object is a valid config.
//! ```json
//! {
//!   "user_agent": "my-tool/1.0",
//!   "timeout_secs": 5,
//!   "listing": { "limit": "max", "follow_continuation": true, "max_batches": 5 },
//!   "category_cache_keying": "title_and_language",
//!   "category_cache": { "max_entries": 10000, "ttl_secs": 86400 },
//!   "resolve_concurrency": 4
//! }
//! ```

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{path::Path, time::Duration};

pub const DEFAULT_USER_AGENT: &str =
    "wikicatcheck/0.1.0 (https://github.com/magnusmanske/wikicatcheck)";
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_WIKI_API_URL: &str = "https://{lang}.wikipedia.org/w/api.php";
pub const DEFAULT_WIKI_ARTICLE_URL: &str = "https://{lang}.wikipedia.org/wiki/{title}";
pub const DEFAULT_WIKIDATA_API_URL: &str = "https://www.wikidata.org/w/api.php";

/// URL templates for the remote services. `{lang}` is replaced by the wiki's host
/// language, `{title}` by an encoded page title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub wiki_api: String,
    pub wiki_article: String,
    pub wikidata_api: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            wiki_api: DEFAULT_WIKI_API_URL.to_string(),
            wiki_article: DEFAULT_WIKI_ARTICLE_URL.to_string(),
            wikidata_api: DEFAULT_WIKIDATA_API_URL.to_string(),
        }
    }
}

/// How category listings are fetched.
/// The default is a single `cllimit=max` request without continuation;
/// pages with more categories than one batch holds lose the excess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    pub limit: String,
    pub follow_continuation: bool,
    pub max_batches: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            limit: "max".to_string(),
            follow_continuation: false,
            max_batches: 10,
        }
    }
}

/// Bounds for one memo cache. `None` means unbounded / never expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub max_entries: Option<usize>,
    pub ttl_secs: Option<u64>,
}

impl CacheConfig {
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_secs.map(Duration::from_secs)
    }
}

/// Key used for the category → QID cache.
///
/// `TitleOnly` treats a category title as the same concept on every wiki, so a title
/// first seen on one wiki is reused for another. `TitleAndLanguage` keeps them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheKeying {
    #[default]
    TitleOnly,
    TitleAndLanguage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    pub user_agent: String,
    pub timeout_secs: u64,
    pub endpoints: Endpoints,
    pub listing: ListingConfig,
    pub category_cache_keying: CacheKeying,
    pub category_cache: CacheConfig,
    pub target_cache: CacheConfig,
    pub resolve_concurrency: usize,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            endpoints: Endpoints::default(),
            listing: ListingConfig::default(),
            category_cache_keying: CacheKeying::default(),
            category_cache: CacheConfig::default(),
            target_cache: CacheConfig::default(),
            resolve_concurrency: 1,
        }
    }
}

impl CheckerConfig {
    /// Reads a config from a JSON object. Missing keys fall back to their defaults.
    pub fn from_json(config: &Value) -> Result<Self> {
        if !config.is_object() {
            return Err(anyhow!("CheckerConfig::from_json: config is not an object"));
        }
        let ret: Self = serde_json::from_value(config.to_owned())?;
        ret.validate()?;
        Ok(ret)
    }

    /// Reads a config from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Cannot read config file '{}': {e}", path.display()))?;
        let j: Value = serde_json::from_str(&text)?;
        Self::from_json(&j)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validate(&self) -> Result<()> {
        if !self.endpoints.wiki_api.contains("{lang}") {
            return Err(anyhow!(
                "endpoints.wiki_api must contain a {{lang}} placeholder: '{}'",
                self.endpoints.wiki_api
            ));
        }
        if self.listing.limit.trim().is_empty() {
            return Err(anyhow!("listing.limit must not be empty"));
        }
        Ok(())
    }
}
