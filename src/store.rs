//! In-memory aggregation point for an in-flight crawl.
//!
//! Buffers fetched pages and, once the flush threshold is reached, turns
//! them into lemma and index rows before handing all three batches to the
//! repositories. The add-then-maybe-flush sequence runs under one lock so
//! concurrent runners never observe a partially flushed state.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, OnceLock};

use anyhow::Result;
use scraper::{Html, Selector};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::domain::models::{IndexEntry, Lemma, Page};
use crate::lemma::{merge_weighted, FieldWeights, LemmaAnalyzer};
use crate::repository::{IndexRepository, LemmaRepository, PageRepository};

/// Visible `<title>` and `<body>` text of a stored page.
pub fn field_texts(html: &str) -> (String, String) {
    static TITLE: OnceLock<Selector> = OnceLock::new();
    static BODY: OnceLock<Selector> = OnceLock::new();
    let title = TITLE.get_or_init(|| Selector::parse("title").unwrap());
    let body = BODY.get_or_init(|| Selector::parse("body").unwrap());

    let document = Html::parse_document(html);
    let title_text = document
        .select(title)
        .next()
        .map(|el| el.text().collect::<Vec<_>>().join(" "))
        .unwrap_or_default();
    let body_text = document
        .select(body)
        .next()
        .map(|el| el.text().collect::<Vec<_>>().join(" "))
        .unwrap_or_default();

    (title_text, body_text)
}

/// Visible text of the whole document, title included.
pub fn visible_text(html: &str) -> String {
    let (title, body) = field_texts(html);
    if title.is_empty() {
        body
    } else if body.is_empty() {
        title
    } else {
        format!("{} {}", title, body)
    }
}

#[derive(Default)]
struct Buffers {
    pages: Vec<Page>,
    lemmas: HashMap<(i64, String), Lemma>,
    entries: Vec<IndexEntry>,
    weights: FieldWeights,
}

pub struct DocumentStore {
    page_repo: Arc<dyn PageRepository>,
    lemma_repo: Arc<dyn LemmaRepository>,
    index_repo: Arc<dyn IndexRepository>,
    analyzer: Arc<LemmaAnalyzer>,
    buffers: Mutex<Buffers>,
    flush_threshold: usize,
    page_ids: AtomicI64,
    lemma_ids: AtomicI64,
    index_ids: AtomicI64,
    found: AtomicI64,
}

impl DocumentStore {
    pub fn new(
        page_repo: Arc<dyn PageRepository>,
        lemma_repo: Arc<dyn LemmaRepository>,
        index_repo: Arc<dyn IndexRepository>,
        analyzer: Arc<LemmaAnalyzer>,
        flush_threshold: usize,
    ) -> Self {
        Self {
            page_repo,
            lemma_repo,
            index_repo,
            analyzer,
            buffers: Mutex::new(Buffers::default()),
            flush_threshold: flush_threshold.max(1),
            page_ids: AtomicI64::new(0),
            lemma_ids: AtomicI64::new(0),
            index_ids: AtomicI64::new(0),
            found: AtomicI64::new(0),
        }
    }

    /// Ids are assigned up front so a page keeps its identity through
    /// the buffer and into the database.
    pub fn next_page_id(&self) -> i64 {
        self.page_ids.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn next_lemma_id(&self) -> i64 {
        self.lemma_ids.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn next_index_id(&self) -> i64 {
        self.index_ids.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Continue the id sequences from what is already persisted.
    pub async fn seed_counters(&self) -> Result<()> {
        self.page_ids
            .store(self.page_repo.max_id().await?, Ordering::SeqCst);
        self.lemma_ids
            .store(self.lemma_repo.max_id().await?, Ordering::SeqCst);
        self.index_ids
            .store(self.index_repo.max_id().await?, Ordering::SeqCst);
        Ok(())
    }

    /// Fresh-run reset: drop buffered work, restart the id sequences and
    /// install the field weights for the coming session.
    pub async fn reset(&self, weights: FieldWeights) {
        let mut buffers = self.buffers.lock().await;
        buffers.pages.clear();
        buffers.lemmas.clear();
        buffers.entries.clear();
        buffers.weights = weights;
        self.page_ids.store(0, Ordering::SeqCst);
        self.lemma_ids.store(0, Ordering::SeqCst);
        self.index_ids.store(0, Ordering::SeqCst);
        self.found.store(0, Ordering::SeqCst);
    }

    /// Buffer one fetched page; a no-op once `cancel` is set. Crossing
    /// the flush threshold flushes inside the same critical section.
    pub async fn add_page(&self, page: Page, cancel: &CancellationToken) {
        if cancel.is_cancelled() {
            return;
        }
        let mut buffers = self.buffers.lock().await;
        buffers.pages.push(page);

        let found = self.found.fetch_add(1, Ordering::SeqCst) + 1;
        if found % 50 == 0 {
            log::info!("[STORE] Found {} pages", found);
        }

        if buffers.pages.len() >= self.flush_threshold {
            self.flush(&mut buffers).await;
        }
    }

    /// Unconditional final drain. Runs even after cancellation so work
    /// buffered before the stop is not lost.
    pub async fn save_all(&self) {
        let mut buffers = self.buffers.lock().await;
        self.flush(&mut buffers).await;
    }

    async fn flush(&self, buffers: &mut Buffers) {
        if buffers.pages.is_empty() && buffers.lemmas.is_empty() && buffers.entries.is_empty() {
            return;
        }
        self.build_index(buffers);

        let lemmas: Vec<Lemma> = buffers.lemmas.values().cloned().collect();
        if let Err(e) = self.lemma_repo.save_batch(&lemmas).await {
            log::error!(
                "[STORE] Dropping {} lemmas after failed save: {:#}",
                lemmas.len(),
                e
            );
        }
        buffers.lemmas.clear();

        if let Err(e) = self.index_repo.save_batch(&buffers.entries).await {
            log::error!(
                "[STORE] Dropping {} index entries after failed save: {:#}",
                buffers.entries.len(),
                e
            );
        }
        buffers.entries.clear();

        if let Err(e) = self.page_repo.save_batch(&buffers.pages).await {
            log::error!(
                "[STORE] Dropping {} pages after failed save: {:#}",
                buffers.pages.len(),
                e
            );
        }
        buffers.pages.clear();
    }

    /// Turn every buffered page into lemma counts and index entries. A
    /// lemma already seen on the same site keeps its id and accumulates
    /// frequency; the index entry references the surviving id.
    fn build_index(&self, buffers: &mut Buffers) {
        let pages = std::mem::take(&mut buffers.pages);
        let total = pages.len();

        for (count, page) in pages.iter().enumerate() {
            if (count + 1) % 50 == 0 {
                log::info!("[STORE] Processed {} of {} pages", count + 1, total);
            }
            log::debug!("[STORE] {} lemmatized", format_path(&page.path));

            let (title_text, body_text) = field_texts(&page.content);
            let title_counts = self.analyzer.scan(&title_text);
            let body_counts = self.analyzer.scan(&body_text);

            for (lemma, weighted) in merge_weighted(&body_counts, &title_counts, &buffers.weights) {
                let slot = buffers
                    .lemmas
                    .entry((page.site_id, lemma.clone()))
                    .or_insert_with(|| Lemma {
                        id: self.next_lemma_id(),
                        site_id: page.site_id,
                        lemma,
                        frequency: 0,
                    });
                slot.frequency += weighted.frequency as i64;
                let lemma_id = slot.id;

                buffers.entries.push(IndexEntry {
                    id: self.next_index_id(),
                    page_id: page.id,
                    lemma_id,
                    rank: weighted.rank,
                });
            }
        }
        buffers.pages = pages;
    }
}

/// Fixed-width log form of a path: padded to 50 columns, or the last 47
/// chars behind an ellipsis when longer.
fn format_path(path: &str) -> String {
    let count = path.chars().count();
    if count > 50 {
        let tail: String = path.chars().skip(count - 47).collect();
        format!("...{}", tail)
    } else {
        format!("{:<50}", path)
    }
}
