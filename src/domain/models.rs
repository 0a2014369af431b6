//! Core domain entities.

use chrono::{DateTime, Utc};
use serde::Serialize;

// ====== Enums ======

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SiteStatus {
    Indexing,
    Indexed,
    Failed,
}

impl SiteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SiteStatus::Indexing => "INDEXING",
            SiteStatus::Indexed => "INDEXED",
            SiteStatus::Failed => "FAILED",
        }
    }
}

// ====== Persisted Entities ======

/// A fetched page. Immutable once created; failed fetches carry a
/// sentinel content of the form `NULL. ERROR <code>`.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
pub struct Page {
    pub id: i64,
    pub site_id: i64,
    pub path: String,
    pub code: u16,
    pub content: String,
}

impl Page {
    /// Sentinel content stored for pages that answered with an error
    /// status or could not be fetched at all.
    pub fn error_content(code: u16) -> String {
        format!("NULL. ERROR {}", code)
    }

    pub fn is_error(&self) -> bool {
        self.code >= 400
    }
}

/// A normalized word form aggregated per site. `frequency` counts every
/// observation across the site's pages.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Lemma {
    pub id: i64,
    pub site_id: i64,
    pub lemma: String,
    pub frequency: i64,
}

/// Links one page to one lemma with the weighted occurrence rank.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct IndexEntry {
    pub id: i64,
    pub page_id: i64,
    pub lemma_id: i64,
    pub rank: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Site {
    pub id: i64,
    pub url: String,
    pub name: String,
    pub status: SiteStatus,
    pub status_time: DateTime<Utc>,
    pub last_error: String,
}

// ====== Query-scoped Entities ======

/// One ranked search hit.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub page: Page,
    pub snippet: String,
    /// Sum of the query lemmas' weighted ranks on this page
    pub absolute: f32,
    /// Absolute relevance normalized by the best hit, in [0, 1]
    pub relative: f32,
}

// ====== Statistics ======

#[derive(Debug, Clone, Serialize)]
pub struct SiteStatistics {
    pub url: String,
    pub name: String,
    pub status: SiteStatus,
    pub status_time: DateTime<Utc>,
    pub error: String,
    pub pages: i64,
    pub lemmas: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TotalStatistics {
    pub sites: i64,
    pub pages: i64,
    pub lemmas: i64,
    pub is_indexing: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatisticsReport {
    pub total: TotalStatistics,
    pub detailed: Vec<SiteStatistics>,
}
