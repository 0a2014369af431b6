//! Recursive site traversal.
//!
//! One task per discovered URL: fetch it, collect in-scope child links,
//! store each child through a runner step, then fork a child task per
//! link and join them all. Large link batches are stored by partitioned
//! concurrent runners instead of one sequential pass. The semaphore
//! bounds concurrent fetches; permits are held only across the network
//! call, never across child joins.

use std::sync::Arc;

use anyhow::Result;
use futures::future::BoxFuture;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::config::CrawlConfig;
use crate::crawl::client::{FetchedPage, PageClient};
use crate::crawl::links::{extract_links, filter_links};
use crate::crawl::used_links::UsedLinks;
use crate::domain::models::Page;
use crate::store::DocumentStore;

#[derive(Clone)]
pub struct CrawlEngine {
    client: Arc<PageClient>,
    store: Arc<DocumentStore>,
    used: Arc<UsedLinks>,
    fetch_permits: Arc<Semaphore>,
    cancel: CancellationToken,
    batch_split_threshold: usize,
    batch_partitions: usize,
}

impl CrawlEngine {
    pub fn new(
        client: Arc<PageClient>,
        store: Arc<DocumentStore>,
        used: Arc<UsedLinks>,
        fetch_permits: Arc<Semaphore>,
        cancel: CancellationToken,
        crawl: &CrawlConfig,
    ) -> Self {
        Self {
            client,
            store,
            used,
            fetch_permits,
            cancel,
            batch_split_threshold: crawl.batch_split_threshold,
            batch_partitions: crawl.batch_partitions.max(1),
        }
    }

    /// Crawl one site to exhaustion or cancellation. The root is claimed
    /// and stored first, then traversal descends from it.
    pub async fn run(&self, site_id: i64, url: &str) -> Result<()> {
        log::info!("[CRAWL] Crawling {}", url);
        self.used.insert(url);
        self.store_page(site_id, url).await;
        self.visit(site_id, url.to_string()).await?;
        log::info!("[CRAWL] Finished {}", url);
        Ok(())
    }

    fn visit(&self, site_id: i64, url: String) -> BoxFuture<'static, Result<()>> {
        let engine = self.clone();
        Box::pin(async move {
            if engine.cancel.is_cancelled() {
                return Ok(());
            }

            let page = engine.fetch(&url).await;
            if page.is_error() {
                // Childless node; the runner already stored it
                return Ok(());
            }

            let children: Vec<String> =
                filter_links(extract_links(&page.body), &url, &engine.used)
                    .into_iter()
                    .filter(|link| engine.used.insert(link))
                    .collect();
            if children.is_empty() {
                return Ok(());
            }
            log::debug!("[CRAWL] {} -> {} new links", url, children.len());

            engine.store_batch(site_id, &children).await;

            let mut tasks = JoinSet::new();
            for child in children {
                tasks.spawn(engine.visit(site_id, child));
            }
            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => log::warn!("[CRAWL] Branch failed: {:#}", e),
                    Err(e) => log::warn!("[CRAWL] Branch panicked: {}", e),
                }
            }
            Ok(())
        })
    }

    /// Runner step: fetch-and-store every just-discovered link. Batches
    /// over the split threshold are divided into near-equal partitions
    /// stored concurrently; smaller batches run sequentially inline.
    async fn store_batch(&self, site_id: i64, batch: &[String]) {
        if batch.len() > self.batch_split_threshold {
            let chunk_size = batch.len().div_ceil(self.batch_partitions);
            let mut runners = JoinSet::new();
            for part in batch.chunks(chunk_size) {
                let engine = self.clone();
                let part = part.to_vec();
                runners.spawn(async move {
                    for link in &part {
                        engine.store_page(site_id, link).await;
                    }
                });
            }
            while let Some(joined) = runners.join_next().await {
                if let Err(e) = joined {
                    log::warn!("[CRAWL] Runner panicked: {}", e);
                }
            }
        } else {
            for link in batch {
                self.store_page(site_id, link).await;
            }
        }
    }

    /// Fetch one URL and buffer it as a Page; failed fetches keep their
    /// status code and a sentinel content string.
    async fn store_page(&self, site_id: i64, url: &str) {
        if self.cancel.is_cancelled() {
            return;
        }

        let fetched = self.fetch(url).await;
        let content = if fetched.is_error() {
            Page::error_content(fetched.code)
        } else {
            fetched.body
        };
        let page = Page {
            id: self.store.next_page_id(),
            site_id,
            path: url.to_string(),
            code: fetched.code,
            content,
        };
        self.store.add_page(page, &self.cancel).await;
    }

    async fn fetch(&self, url: &str) -> FetchedPage {
        // Permit is held only for the duration of the network call
        let _permit = self.fetch_permits.acquire().await.ok();
        self.client.fetch(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::sqlite::{
        SqliteIndexRepository, SqliteLemmaRepository, SqlitePageRepository, SqliteSiteRepository,
    };
    use crate::repository::SiteRepository;
    use crate::test_utils::{fixtures, mocks};
    use crate::domain::models::SiteStatus;
    use sqlx::SqlitePool;

    fn engine_for(pool: &SqlitePool, cancel: CancellationToken) -> (CrawlEngine, Arc<DocumentStore>) {
        let store = Arc::new(DocumentStore::new(
            Arc::new(SqlitePageRepository::new(pool.clone())),
            Arc::new(SqliteLemmaRepository::new(pool.clone())),
            Arc::new(SqliteIndexRepository::new(pool.clone())),
            Arc::new(fixtures::english_analyzer()),
            500,
        ));
        let crawl = CrawlConfig::default();
        let engine = CrawlEngine::new(
            Arc::new(PageClient::new(crawl.fetch_timeout_secs)),
            store.clone(),
            Arc::new(UsedLinks::new()),
            Arc::new(Semaphore::new(crawl.worker_pool_size)),
            cancel,
            &crawl,
        );
        (engine, store)
    }

    async fn make_site(pool: &SqlitePool, url: &str) -> i64 {
        SqliteSiteRepository::new(pool.clone())
            .ensure(url, "Test site", SiteStatus::Indexing)
            .await
            .expect("Failed to create site")
            .id
    }

    async fn stored_paths(pool: &SqlitePool) -> Vec<String> {
        sqlx::query_scalar("SELECT path FROM page ORDER BY path")
            .fetch_all(pool)
            .await
            .expect("Failed to read pages")
    }

    #[tokio::test]
    async fn crawls_a_cycle_without_refetching() {
        let mut server = mockito::Server::new_async().await;
        let root_url = server.url();

        // Every page is fetched once to store it and once to discover
        // its children; the back-link to the root must not add a third
        let root = server
            .mock("GET", "/")
            .with_header("content-type", "text/html")
            .with_body(mocks::linked_page("Root", "quick brown fox", &["/a"]))
            .expect(2)
            .create_async()
            .await;
        let page_a = server
            .mock("GET", "/a")
            .with_header("content-type", "text/html")
            .with_body(mocks::linked_page("A", "lazy dog", &[&root_url, "/b"]))
            .expect(2)
            .create_async()
            .await;
        let page_b = server
            .mock("GET", "/a/b")
            .with_header("content-type", "text/html")
            .with_body(mocks::html_page("B", "sleepy cat"))
            .expect(2)
            .create_async()
            .await;

        let pool = fixtures::setup_test_db().await;
        let site_id = make_site(&pool, &root_url).await;
        let (engine, store) = engine_for(&pool, CancellationToken::new());

        engine.run(site_id, &root_url).await.expect("Crawl failed");
        store.save_all().await;

        root.assert_async().await;
        page_a.assert_async().await;
        page_b.assert_async().await;

        let paths = stored_paths(&pool).await;
        assert_eq!(
            paths,
            vec![
                root_url.clone(),
                format!("{}/a", root_url),
                format!("{}/a/b", root_url),
            ]
        );
    }

    #[tokio::test]
    async fn error_pages_are_stored_with_sentinel_content() {
        let mut server = mockito::Server::new_async().await;
        let root_url = server.url();

        let _root = server
            .mock("GET", "/")
            .with_header("content-type", "text/html")
            .with_body(mocks::linked_page("Root", "fox", &["/broken"]))
            .expect(2)
            .create_async()
            .await;
        // Stored by the runner, then fetched once more and found to be
        // a childless node
        let broken = server
            .mock("GET", "/broken")
            .with_status(500)
            .with_body("server exploded")
            .expect(2)
            .create_async()
            .await;

        let pool = fixtures::setup_test_db().await;
        let site_id = make_site(&pool, &root_url).await;
        let (engine, store) = engine_for(&pool, CancellationToken::new());

        engine.run(site_id, &root_url).await.expect("Crawl failed");
        store.save_all().await;

        broken.assert_async().await;
        let row: (u16, String) =
            sqlx::query_as("SELECT code, content FROM page WHERE path LIKE '%/broken'")
                .fetch_one(&pool)
                .await
                .expect("Error page missing");
        assert_eq!(row.0, 500);
        assert_eq!(row.1, "NULL. ERROR 500");
    }

    #[tokio::test]
    async fn large_batches_survive_the_partition_split() {
        let mut server = mockito::Server::new_async().await;
        let root_url = server.url();

        let links: Vec<String> = (1..=10).map(|i| format!("/p{}", i)).collect();
        let refs: Vec<&str> = links.iter().map(String::as_str).collect();
        let root = server
            .mock("GET", "/")
            .with_header("content-type", "text/html")
            .with_body(mocks::linked_page("Root", "hub", &refs))
            .expect(2)
            .create_async()
            .await;

        let mut children = Vec::new();
        for link in &links {
            let mock = server
                .mock("GET", link.as_str())
                .with_header("content-type", "text/html")
                .with_body(mocks::html_page("Leaf", "leaf"))
                .expect(2)
                .create_async()
                .await;
            children.push(mock);
        }

        let pool = fixtures::setup_test_db().await;
        let site_id = make_site(&pool, &root_url).await;
        let (engine, store) = engine_for(&pool, CancellationToken::new());

        engine.run(site_id, &root_url).await.expect("Crawl failed");
        store.save_all().await;

        root.assert_async().await;
        for mock in &children {
            mock.assert_async().await;
        }
        assert_eq!(stored_paths(&pool).await.len(), 11);
    }

    #[tokio::test]
    async fn cancelled_run_fetches_nothing() {
        let mut server = mockito::Server::new_async().await;
        let root_url = server.url();

        let root = server.mock("GET", "/").expect(0).create_async().await;

        let pool = fixtures::setup_test_db().await;
        let site_id = make_site(&pool, &root_url).await;
        let cancel = CancellationToken::new();
        cancel.cancel();
        let (engine, store) = engine_for(&pool, cancel);

        engine.run(site_id, &root_url).await.expect("Crawl failed");
        store.save_all().await;

        root.assert_async().await;
        assert!(stored_paths(&pool).await.is_empty());
    }
}
