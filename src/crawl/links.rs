//! Link extraction and the in-scope filter chain.

use scraper::{Html, Selector};
use std::sync::OnceLock;

use crate::crawl::used_links::UsedLinks;

/// Links longer than this are never followed.
const MAX_LINK_LENGTH: usize = 190;

/// Extract raw `href` values of every `<a href="…">` in the document.
/// Values are kept verbatim; resolution happens in [`filter_links`].
pub fn extract_links(html: &str) -> Vec<String> {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    let selector = SELECTOR.get_or_init(|| Selector::parse("a[href]").unwrap());

    Html::parse_document(html)
        .select(selector)
        .filter_map(|a| a.value().attr("href"))
        .map(str::to_string)
        .collect()
}

/// Reduce raw links to the followable children of `url`.
///
/// Applied in order: drop links already used; resolve root-relative
/// links against `url` (registering the relative form); normalize
/// doubled slashes back to a single scheme separator; drop used,
/// self-referencing and out-of-scope links; require an http(s) prefix;
/// exclude `.pdf`/`.svg` and links longer than 190 chars.
pub fn filter_links(raw_links: Vec<String>, url: &str, used: &UsedLinks) -> Vec<String> {
    raw_links
        .into_iter()
        .filter(|l| !used.contains(l))
        .map(|mut l| {
            if l.starts_with('/') {
                used.insert(&l);
                l = format!("{}{}", url, l);
            }
            l.replace("//", "/")
                .replace("https:/", "https://")
                .replace("http:/", "http://")
        })
        .filter(|l| !used.contains(l))
        .filter(|l| l != url)
        .filter(|l| l.contains(url))
        .filter(|l| l.starts_with("https:/") || l.starts_with("http:/"))
        .filter(|l| !l.contains(".pdf"))
        .filter(|l| !l.contains(".svg"))
        .filter(|l| l.get(..url.len()).is_some_and(|prefix| prefix.contains(url)))
        .filter(|l| l.chars().count() <= MAX_LINK_LENGTH)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SITE: &str = "https://example.com";

    fn filter(raw: &[&str]) -> Vec<String> {
        let used = UsedLinks::new();
        filter_links(raw.iter().map(|s| s.to_string()).collect(), SITE, &used)
    }

    #[test]
    fn extracts_href_values_verbatim() {
        let html = r##"
            <html><body>
                <a href="/relative">Relative</a>
                <a href="https://example.com/absolute">Absolute</a>
                <a>No href</a>
                <a href="#fragment">Fragment</a>
            </body></html>
        "##;

        let links = extract_links(html);
        assert_eq!(
            links,
            vec!["/relative", "https://example.com/absolute", "#fragment"]
        );
    }

    #[test]
    fn resolves_root_relative_links() {
        let links = filter(&["/about"]);
        assert_eq!(links, vec!["https://example.com/about"]);
    }

    #[test]
    fn registers_relative_form_as_used() {
        let used = UsedLinks::new();
        let first = filter_links(vec!["/about".to_string()], SITE, &used);
        assert_eq!(first, vec!["https://example.com/about"]);

        // The same relative link from another page is dropped up front
        let second = filter_links(vec!["/about".to_string()], SITE, &used);
        assert!(second.is_empty());
    }

    #[test]
    fn normalizes_doubled_slashes() {
        let links = filter(&["https://example.com//news//latest"]);
        assert_eq!(links, vec!["https://example.com/news/latest"]);
    }

    #[test]
    fn drops_self_and_out_of_scope_links() {
        let links = filter(&[
            "https://example.com",
            "https://other.org/page",
            "mailto:team@example.com",
            "#top",
            "https://example.com/kept",
        ]);
        assert_eq!(links, vec!["https://example.com/kept"]);
    }

    #[test]
    fn drops_documents_and_vector_images() {
        let links = filter(&[
            "https://example.com/report.pdf",
            "https://example.com/logo.svg",
            "https://example.com/article",
        ]);
        assert_eq!(links, vec!["https://example.com/article"]);
    }

    #[test]
    fn drops_links_over_the_length_cap() {
        let long_path = "a".repeat(200);
        let links = filter(&[
            &format!("https://example.com/{}", long_path),
            "https://example.com/short",
        ]);
        assert_eq!(links, vec!["https://example.com/short"]);
    }

    #[test]
    fn drops_previously_used_links() {
        let used = UsedLinks::new();
        used.insert("https://example.com/seen");

        let links = filter_links(
            vec![
                "https://example.com/seen".to_string(),
                "https://example.com/new".to_string(),
            ],
            SITE,
            &used,
        );
        assert_eq!(links, vec!["https://example.com/new"]);
    }

    #[test]
    fn requires_scope_at_the_prefix() {
        // Scope appears only later in the URL: not a child of the site
        let links = filter(&["https://mirror.net/https://example.com/page"]);
        assert!(links.is_empty());
    }
}
