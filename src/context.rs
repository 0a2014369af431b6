//! Per-process application context.
//!
//! Every crawl, index and search call receives its collaborators from
//! here; nothing is reached through globals. Built once at startup from
//! the loaded configuration and handed to the service layer.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::AppConfig;
use crate::crawl::{PageClient, UsedLinks};
use crate::db;
use crate::error::Result;
use crate::lemma::LemmaAnalyzer;
use crate::morphology::SnowballMorphology;
use crate::repository::sqlite::{
    SqliteFieldRepository, SqliteIndexRepository, SqliteLemmaRepository, SqlitePageRepository,
    SqliteSiteRepository,
};
use crate::repository::{
    FieldRepository, IndexRepository, LemmaRepository, PageRepository, SiteRepository,
};
use crate::search::SearchEngine;
use crate::store::DocumentStore;

pub struct AppContext {
    pub config: AppConfig,
    pub pool: SqlitePool,
    pub sites: Arc<dyn SiteRepository>,
    pub pages: Arc<dyn PageRepository>,
    pub lemmas: Arc<dyn LemmaRepository>,
    pub index: Arc<dyn IndexRepository>,
    pub fields: Arc<dyn FieldRepository>,
    pub client: Arc<PageClient>,
    pub analyzer: Arc<LemmaAnalyzer>,
    pub store: Arc<DocumentStore>,
    pub used_links: Arc<UsedLinks>,
}

impl AppContext {
    /// Connect to the configured database and assemble the context.
    pub async fn build(config: AppConfig) -> Result<Self> {
        let pool = db::init_db(&config.database_url).await?;
        Self::with_pool(config, pool).await
    }

    /// Assemble the context over an existing pool (migrations already
    /// applied). Used directly by tests.
    pub async fn with_pool(config: AppConfig, pool: SqlitePool) -> Result<Self> {
        let sites: Arc<dyn SiteRepository> = Arc::new(SqliteSiteRepository::new(pool.clone()));
        let pages: Arc<dyn PageRepository> = Arc::new(SqlitePageRepository::new(pool.clone()));
        let lemmas: Arc<dyn LemmaRepository> = Arc::new(SqliteLemmaRepository::new(pool.clone()));
        let index: Arc<dyn IndexRepository> = Arc::new(SqliteIndexRepository::new(pool.clone()));
        let fields: Arc<dyn FieldRepository> = Arc::new(SqliteFieldRepository::new(pool.clone()));

        let analyzer = Arc::new(LemmaAnalyzer::new(Arc::new(SnowballMorphology::new(
            config.language,
        ))));
        let store = Arc::new(DocumentStore::new(
            pages.clone(),
            lemmas.clone(),
            index.clone(),
            analyzer.clone(),
            config.crawl.flush_threshold,
        ));
        // Single-page indexing without a prior reindex must not collide
        // with ids persisted by earlier runs.
        store.seed_counters().await?;

        let client = Arc::new(PageClient::new(config.crawl.fetch_timeout_secs));

        Ok(Self {
            config,
            pool,
            sites,
            pages,
            lemmas,
            index,
            fields,
            client,
            analyzer,
            store,
            used_links: Arc::new(UsedLinks::new()),
        })
    }

    pub fn search_engine(&self) -> SearchEngine {
        SearchEngine::new(self.pages.clone(), self.fields.clone(), self.analyzer.clone())
    }
}
