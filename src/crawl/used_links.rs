//! Crawl-run-scoped registry of claimed URLs.

use dashmap::DashSet;

/// Concurrent set of every link the current crawl run has claimed.
/// Registration is a single atomic test-and-insert, so two tasks racing
/// on the same link cannot both win it.
#[derive(Debug, Default)]
pub struct UsedLinks {
    links: DashSet<String>,
}

impl UsedLinks {
    pub fn new() -> Self {
        Self {
            links: DashSet::new(),
        }
    }

    /// Claim a link. True when this caller registered it first.
    pub fn insert(&self, link: &str) -> bool {
        self.links.insert(link.to_string())
    }

    pub fn contains(&self, link: &str) -> bool {
        self.links.contains(link)
    }

    pub fn clear(&self) {
        self.links.clear()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn insert_claims_exactly_once() {
        let links = UsedLinks::new();

        assert!(links.insert("https://example.com/a"));
        assert!(!links.insert("https://example.com/a"));
        assert!(links.contains("https://example.com/a"));
        assert_eq!(links.len(), 1);
    }

    #[test]
    fn concurrent_inserts_have_one_winner() {
        let links = Arc::new(UsedLinks::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let links = links.clone();
                std::thread::spawn(move || links.insert("https://example.com/contested"))
            })
            .collect();

        let wins = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();

        assert_eq!(wins, 1);
        assert_eq!(links.len(), 1);
    }

    #[test]
    fn clear_resets_between_runs() {
        let links = UsedLinks::new();
        links.insert("https://example.com/a");
        links.insert("https://example.com/b");

        links.clear();

        assert!(links.is_empty());
        assert!(links.insert("https://example.com/a"));
    }
}
