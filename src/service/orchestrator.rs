//! Crawl orchestration - coordinates engines, store and repositories.
//!
//! One service instance drives the whole pipeline: a full reindex runs
//! one crawl task per configured site plus a supervisor task that joins
//! them, performs the single final drain and writes the terminal site
//! statuses. Stop cancels the shared token, marks every site and drains
//! synchronously before returning, so buffered work is never lost.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::context::AppContext;
use crate::crawl::CrawlEngine;
use crate::domain::models::{
    Page, SearchResult, Site, SiteStatistics, SiteStatus, StatisticsReport, TotalStatistics,
};
use crate::error::{AppError, Result};
use crate::search::SearchEngine;

/// Terminal error text of a run the user stopped; distinguishes it from
/// sites that failed with a system error.
pub const STOPPED_BY_USER: &str = "Stopped by user";

pub struct IndexingService {
    context: Arc<AppContext>,
    search: SearchEngine,
    running: Arc<AtomicBool>,
    /// Token of the current run; replaced on every start under the same
    /// lock stop() cancels through.
    cancel: Mutex<CancellationToken>,
    supervisor: Mutex<Option<JoinHandle<()>>>,
}

impl IndexingService {
    pub fn new(context: Arc<AppContext>) -> Self {
        let search = context.search_engine();
        Self {
            context,
            search,
            running: Arc::new(AtomicBool::new(false)),
            cancel: Mutex::new(CancellationToken::new()),
            supervisor: Mutex::new(None),
        }
    }

    /// Start a full reindex of every configured site. Errors when a run
    /// is already in flight; otherwise returns as soon as the crawl
    /// tasks are spawned.
    pub async fn start_crawl(&self) -> Result<()> {
        let cancel = CancellationToken::new();
        {
            // Installing the fresh token and flipping the running flag
            // happen under the lock stop() takes, so a concurrent stop
            // either misses this run entirely or cancels its token.
            let mut current = self.cancel.lock().await;
            if self.running.swap(true, Ordering::SeqCst) {
                return Err(AppError::AlreadyIndexing);
            }
            *current = cancel.clone();
        }

        let sites = match self.reset_run().await {
            Ok(sites) => sites,
            Err(e) => {
                self.running.store(false, Ordering::SeqCst);
                return Err(e);
            }
        };
        log::info!("[ENGINE] Reindex started for {} sites", sites.len());

        let crawl = &self.context.config.crawl;
        let permits = Arc::new(Semaphore::new(crawl.worker_pool_size));
        let mut site_tasks = Vec::with_capacity(sites.len());
        for site in sites {
            let engine = CrawlEngine::new(
                self.context.client.clone(),
                self.context.store.clone(),
                self.context.used_links.clone(),
                permits.clone(),
                cancel.clone(),
                crawl,
            );
            let url = site.url.clone();
            let site_id = site.id;
            let handle = tokio::spawn(async move { engine.run(site_id, &url).await });
            site_tasks.push((site, handle));
        }

        let store = self.context.store.clone();
        let sites_repo = self.context.sites.clone();
        let running = self.running.clone();
        let supervisor = tokio::spawn(async move {
            let mut outcomes = Vec::with_capacity(site_tasks.len());
            for (site, handle) in site_tasks {
                let outcome = match handle.await {
                    Ok(Ok(())) => None,
                    Ok(Err(e)) => Some(format!("{:#}", e)),
                    Err(e) => Some(format!("Crawl task panicked: {}", e)),
                };
                outcomes.push((site, outcome));
            }

            // The one final drain of this run. After a stop it only
            // picks up whatever trickled in behind stop()'s own drain.
            store.save_all().await;

            if cancel.is_cancelled() {
                log::info!("[ENGINE] Reindex cancelled, site statuses left to stop()");
            } else {
                for (site, outcome) in outcomes {
                    let updated = match &outcome {
                        None => {
                            log::info!("[ENGINE] Indexing of {} completed", site.url);
                            sites_repo
                                .update_status(site.id, SiteStatus::Indexed, None)
                                .await
                        }
                        Some(message) => {
                            log::warn!("[ENGINE] Indexing of {} failed: {}", site.url, message);
                            sites_repo
                                .update_status(site.id, SiteStatus::Failed, Some(message))
                                .await
                        }
                    };
                    if let Err(e) = updated {
                        log::error!("[ENGINE] Failed to update status of {}: {:#}", site.url, e);
                    }
                }
                log::info!("[ENGINE] Reindex finished");
            }
            running.store(false, Ordering::SeqCst);
        });
        *self.supervisor.lock().await = Some(supervisor);
        Ok(())
    }

    /// Clean-rebuild pass before a reindex: clear the dedupe set, drop
    /// all persisted page/lemma/index data, restart the id counters with
    /// this session's field weights, and mark every configured site as
    /// indexing.
    async fn reset_run(&self) -> Result<Vec<Site>> {
        let ctx = &self.context;
        ctx.used_links.clear();
        ctx.index.truncate().await?;
        ctx.lemmas.truncate().await?;
        ctx.pages.truncate().await?;
        let weights = ctx.fields.weights().await?;
        ctx.store.reset(weights).await;

        let mut sites = Vec::with_capacity(ctx.config.sites.len());
        for configured in &ctx.config.sites {
            let site = ctx
                .sites
                .ensure(&configured.url, &configured.name, SiteStatus::Indexing)
                .await?;
            ctx.sites
                .update_status(site.id, SiteStatus::Indexing, None)
                .await?;
            sites.push(Site {
                status: SiteStatus::Indexing,
                last_error: String::new(),
                ..site
            });
        }
        Ok(sites)
    }

    /// Stop the in-flight reindex: cancel the token, mark every site
    /// stopped, then drain all buffered work synchronously. Errors when
    /// nothing is running; safe to call repeatedly while winding down.
    pub async fn stop(&self) -> Result<()> {
        {
            let current = self.cancel.lock().await;
            if !self.running.load(Ordering::SeqCst) {
                return Err(AppError::NotIndexing);
            }
            current.cancel();
        }
        log::info!("[ENGINE] Indexing stopped, saving buffered data");

        match self.context.sites.all().await {
            Ok(sites) => {
                for site in sites {
                    if let Err(e) = self
                        .context
                        .sites
                        .update_status(site.id, SiteStatus::Failed, Some(STOPPED_BY_USER))
                        .await
                    {
                        log::error!("[ENGINE] Failed to mark {} stopped: {:#}", site.url, e);
                    }
                }
            }
            Err(e) => log::error!("[ENGINE] Failed to list sites on stop: {:#}", e),
        }

        self.context.store.save_all().await;
        log::info!("[ENGINE] Indexing stopped, data saved");
        Ok(())
    }

    /// Fetch and index one page. The URL must parse and fall inside a
    /// configured site's scope; the page itself may still answer with an
    /// error status and is then stored with sentinel content. Persists
    /// through a background drain.
    pub async fn index_page(&self, url: &str) -> Result<()> {
        let parsed =
            Url::parse(url).map_err(|e| AppError::InvalidUrl(format!("{}: {}", url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AppError::InvalidUrl(url.to_string()));
        }
        let Some(configured) = self
            .context
            .config
            .sites
            .iter()
            .find(|site| url.contains(&site.url))
        else {
            return Err(AppError::OutOfScope(url.to_string()));
        };
        let site = self
            .context
            .sites
            .ensure(&configured.url, &configured.name, SiteStatus::Indexed)
            .await?;

        let fetched = self.context.client.fetch(url).await;
        let content = if fetched.is_error() {
            Page::error_content(fetched.code)
        } else {
            fetched.body
        };
        let page = Page {
            id: self.context.store.next_page_id(),
            site_id: site.id,
            path: url.to_string(),
            code: fetched.code,
            content,
        };

        // Share the run's token while a crawl is active so a stop also
        // halts this add; otherwise the add must always land.
        let cancel = {
            let current = self.cancel.lock().await;
            if self.running.load(Ordering::SeqCst) {
                current.clone()
            } else {
                CancellationToken::new()
            }
        };
        self.context.store.add_page(page, &cancel).await;
        log::info!("[ENGINE] Single page {} indexed", url);

        let store = self.context.store.clone();
        tokio::spawn(async move { store.save_all().await });
        Ok(())
    }

    /// Ranked search over the persisted index with the boundary
    /// conveniences: optional site filter, 1-based offset and limit
    /// where 0 means unset.
    pub async fn search(
        &self,
        query: &str,
        site: Option<&str>,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        Ok(self.search.search_paged(query, site, offset, limit).await?)
    }

    /// Per-site page/lemma counts and statuses plus the aggregate
    /// totals, including whether any site is currently indexing.
    pub async fn statistics(&self) -> Result<StatisticsReport> {
        let sites = self.context.sites.all().await?;

        let mut total = TotalStatistics {
            sites: sites.len() as i64,
            pages: 0,
            lemmas: 0,
            is_indexing: false,
        };
        let mut detailed = Vec::with_capacity(sites.len());
        for site in sites {
            let pages = self.context.pages.count_by_site(site.id).await?;
            let lemmas = self.context.lemmas.count_by_site(site.id).await?;
            total.pages += pages;
            total.lemmas += lemmas;
            total.is_indexing |= site.status == SiteStatus::Indexing;
            detailed.push(SiteStatistics {
                url: site.url,
                name: site.name,
                status: site.status,
                status_time: site.status_time,
                error: site.last_error,
                pages,
                lemmas,
            });
        }
        Ok(StatisticsReport { total, detailed })
    }

    /// Wait for the current reindex to wind down. Returns immediately
    /// when no run is in flight.
    pub async fn wait_until_idle(&self) {
        let handle = self.supervisor.lock().await.take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                log::error!("[ENGINE] Supervisor task panicked: {}", e);
            }
        }
    }
}
