//! Ranked full-text search over the persisted index.
//!
//! Read-only: works entirely against flushed state, so it is safe to
//! call while a crawl is in flight.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;

use crate::domain::models::SearchResult;
use crate::lemma::{merge_weighted, LemmaAnalyzer};
use crate::repository::{FieldRepository, PageRepository};
use crate::store::{field_texts, visible_text};

pub mod snippet;

pub use snippet::SnippetBuilder;

pub struct SearchEngine {
    pages: Arc<dyn PageRepository>,
    fields: Arc<dyn FieldRepository>,
    analyzer: Arc<LemmaAnalyzer>,
    snippets: SnippetBuilder,
}

impl SearchEngine {
    pub fn new(
        pages: Arc<dyn PageRepository>,
        fields: Arc<dyn FieldRepository>,
        analyzer: Arc<LemmaAnalyzer>,
    ) -> Self {
        let snippets = SnippetBuilder::new(analyzer.clone());
        Self {
            pages,
            fields,
            analyzer,
            snippets,
        }
    }

    /// Run the full pipeline: lemmatize the query, intersect candidate
    /// pages across every lemma, score, build snippets and sort by
    /// relative relevance. Candidates whose snippet comes out empty are
    /// dropped even though they passed the intersection.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let lemma_set: HashSet<String> = self.analyzer.scan(query).into_keys().collect();
        if lemma_set.is_empty() {
            return Ok(Vec::new());
        }
        let lemmas: Vec<&String> = lemma_set.iter().collect();
        log::debug!("[SEARCH] Query reduced to {:?}", lemmas);

        // A page must be indexed under every query lemma to stay a
        // candidate; the intersection joins by page path.
        let mut candidates = self.pages.by_lemma(lemmas[0]).await?;
        for lemma in &lemmas[1..] {
            let paths: HashSet<String> = self
                .pages
                .by_lemma(lemma)
                .await?
                .into_iter()
                .map(|page| page.path)
                .collect();
            candidates.retain(|page| paths.contains(&page.path));
        }
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let weights = self.fields.weights().await?;

        let mut results: Vec<SearchResult> = Vec::new();
        let mut max_absolute = 0.0f32;
        for page in candidates {
            let (title_text, body_text) = field_texts(&page.content);
            let ranks = merge_weighted(
                &self.analyzer.scan(&body_text),
                &self.analyzer.scan(&title_text),
                &weights,
            );
            let absolute: f32 = lemma_set
                .iter()
                .filter_map(|lemma| ranks.get(lemma))
                .map(|weighted| weighted.rank)
                .sum();

            let snippet = self
                .snippets
                .build(&visible_text(&page.content), &lemma_set);
            if snippet.is_empty() {
                continue;
            }

            max_absolute = max_absolute.max(absolute);
            results.push(SearchResult {
                page,
                snippet,
                absolute,
                relative: 0.0,
            });
        }

        if max_absolute > 0.0 {
            for result in &mut results {
                result.relative = result.absolute / max_absolute;
            }
        }
        results.sort_by(|a, b| b.relative.total_cmp(&a.relative));

        for result in &results {
            log::debug!(
                "[SEARCH] {} - {:.3} - {:.3}",
                result.page.path,
                result.relative,
                result.absolute
            );
        }
        Ok(results)
    }

    /// Boundary conveniences over [`search`](Self::search): an optional
    /// site filter plus offset/limit slicing. Offset is 1-based and 0
    /// means unset for both values.
    pub async fn search_paged(
        &self,
        query: &str,
        site: Option<&str>,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        let mut results = self.search(query).await?;

        if let Some(site_url) = site {
            results.retain(|result| result.page.path.contains(site_url));
        }
        if offset != 0 {
            results.drain(..(offset - 1).min(results.len()));
        }
        if limit != 0 {
            results.truncate(limit);
        }
        Ok(results)
    }
}
