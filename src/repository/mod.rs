use anyhow::Result;
use async_trait::async_trait;

use crate::domain::models::*;
use crate::lemma::FieldWeights;

pub mod sqlite;

#[async_trait]
pub trait SiteRepository: Send + Sync {
    async fn all(&self) -> Result<Vec<Site>>;
    /// Insert the site if it is unknown, otherwise refresh its name.
    async fn ensure(&self, url: &str, name: &str, status: SiteStatus) -> Result<Site>;
    /// Set the status and status time; `error` of `None` clears the last error.
    async fn update_status(&self, site_id: i64, status: SiteStatus, error: Option<&str>)
        -> Result<()>;
}

#[async_trait]
pub trait PageRepository: Send + Sync {
    async fn save_batch(&self, pages: &[Page]) -> Result<()>;
    /// Pages of any site whose index contains the given lemma.
    async fn by_lemma(&self, lemma: &str) -> Result<Vec<Page>>;
    async fn count_by_site(&self, site_id: i64) -> Result<i64>;
    async fn max_id(&self) -> Result<i64>;
    async fn truncate(&self) -> Result<()>;
}

#[async_trait]
pub trait LemmaRepository: Send + Sync {
    async fn save_batch(&self, lemmas: &[Lemma]) -> Result<()>;
    async fn count_by_site(&self, site_id: i64) -> Result<i64>;
    async fn max_id(&self) -> Result<i64>;
    async fn truncate(&self) -> Result<()>;
}

#[async_trait]
pub trait IndexRepository: Send + Sync {
    async fn save_batch(&self, entries: &[IndexEntry]) -> Result<()>;
    async fn max_id(&self) -> Result<i64>;
    async fn truncate(&self) -> Result<()>;
}

#[async_trait]
pub trait FieldRepository: Send + Sync {
    /// Relevance weights keyed by the `search_field` selectors.
    async fn weights(&self) -> Result<FieldWeights>;
}
