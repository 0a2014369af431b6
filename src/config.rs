//! File-based configuration.
//!
//! The engine is driven by a small JSON file (`helicon.json` by default)
//! listing the sites to crawl plus optional tuning knobs. `DATABASE_URL`
//! from the environment overrides the configured database.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{AppError, Result};
use crate::morphology::Language;

pub const DEFAULT_CONFIG_PATH: &str = "helicon.json";

/// One site to crawl and index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    pub url: String,
    pub name: String,
}

/// Tuning knobs for the crawl engine and the indexing store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Concurrent page fetches across all sites
    pub worker_pool_size: usize,
    /// Link batches larger than this are fetched in partitions
    pub batch_split_threshold: usize,
    /// Number of partitions a large batch is split into
    pub batch_partitions: usize,
    pub fetch_timeout_secs: u64,
    /// Buffered pages that trigger a store flush
    pub flush_threshold: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            worker_pool_size: 8,
            batch_split_threshold: 8,
            batch_partitions: 4,
            fetch_timeout_secs: 5,
            flush_threshold: 500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    pub sites: Vec<SiteConfig>,
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub crawl: CrawlConfig,
}

fn default_database_url() -> String {
    "sqlite://helicon.db?mode=rwc".to_string()
}

impl AppConfig {
    /// Load configuration from a JSON file, applying the `DATABASE_URL`
    /// environment override.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| AppError::config(format!("cannot read {}: {}", path.display(), e)))?;
        let mut config: AppConfig = serde_json::from_str(&raw)
            .map_err(|e| AppError::config(format!("cannot parse {}: {}", path.display(), e)))?;
        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.database_url = url;
        }
        Ok(config)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            sites: Vec::new(),
            language: Language::default(),
            crawl: CrawlConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_config() {
        let raw = r#"{
            "sites": [
                { "url": "https://example.com", "name": "Example" }
            ]
        }"#;
        let config: AppConfig = serde_json::from_str(raw).unwrap();

        assert_eq!(config.sites.len(), 1);
        assert_eq!(config.sites[0].url, "https://example.com");
        assert_eq!(config.language, Language::Russian);
        assert_eq!(config.crawl.worker_pool_size, 8);
        assert_eq!(config.crawl.flush_threshold, 500);
    }

    #[test]
    fn parses_overrides() {
        let raw = r#"{
            "database_url": "sqlite::memory:",
            "sites": [],
            "language": "english",
            "crawl": { "worker_pool_size": 2, "flush_threshold": 10 }
        }"#;
        let config: AppConfig = serde_json::from_str(raw).unwrap();

        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.language, Language::English);
        assert_eq!(config.crawl.worker_pool_size, 2);
        assert_eq!(config.crawl.flush_threshold, 10);
        // Unset knobs keep their defaults
        assert_eq!(config.crawl.batch_partitions, 4);
    }
}
