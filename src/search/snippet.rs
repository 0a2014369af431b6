//! Highlighted excerpt construction.
//!
//! A snippet is built in three passes over the page's visible text:
//! locate every query-lemma occurrence, stitch context windows around
//! the first occurrence of each matched word, then pick the densest
//! 200-character stretch of the highlighted excerpt. An empty return
//! value tells the search engine to drop the candidate.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use crate::lemma::LemmaAnalyzer;

/// Context captured before and after a matched word, in chars.
const CONTEXT_BEFORE: usize = 200;
const CONTEXT_AFTER: usize = 250;

/// Width of the final selected window, in chars.
const WINDOW_WIDTH: usize = 200;

pub struct SnippetBuilder {
    analyzer: Arc<LemmaAnalyzer>,
}

impl SnippetBuilder {
    pub fn new(analyzer: Arc<LemmaAnalyzer>) -> Self {
        Self { analyzer }
    }

    /// Build a highlighted excerpt of `source_text` around the words
    /// whose normal forms appear in `query_lemmas`.
    pub fn build(&self, source_text: &str, query_lemmas: &HashSet<String>) -> String {
        if source_text.is_empty() || query_lemmas.is_empty() {
            return String::new();
        }

        let matches = self.locate_matches(source_text, query_lemmas);
        if matches.is_empty() {
            return String::new();
        }

        let excerpt = stitch_windows(source_text, &matches);
        let highlighted = highlight(excerpt, matches.values());
        best_window(&highlighted)
    }

    /// Map each matched word to the char offset of its first occurrence
    /// in the original text. Matching happens on the normalized copy;
    /// offsets are taken case-sensitively first, then against a
    /// char-for-char lowercased shadow of the original.
    fn locate_matches(
        &self,
        source_text: &str,
        query_lemmas: &HashSet<String>,
    ) -> BTreeMap<usize, String> {
        let lowered: String = source_text
            .chars()
            .map(|c| c.to_lowercase().next().unwrap_or(c))
            .collect();

        let mut matched_words: HashSet<String> = HashSet::new();
        let mut matches: BTreeMap<usize, String> = BTreeMap::new();

        for word in LemmaAnalyzer::prepare_text(source_text).split(' ') {
            if word.is_empty() || matched_words.contains(word) {
                continue;
            }
            let is_hit = self
                .analyzer
                .normal_forms(word)
                .iter()
                .any(|form| query_lemmas.contains(form));
            if !is_hit {
                continue;
            }

            let char_offset = match source_text.find(word) {
                Some(byte) => source_text[..byte].chars().count(),
                None => match lowered.find(word) {
                    Some(byte) => lowered[..byte].chars().count(),
                    None => continue,
                },
            };
            matched_words.insert(word.to_string());
            matches.insert(char_offset, word.to_string());
        }
        matches
    }
}

/// Concatenate a context window per matched word, in text order, skipping
/// words an earlier window already covers. The result carries an
/// ellipsis between windows and is lower-cased as a whole.
fn stitch_windows(source_text: &str, matches: &BTreeMap<usize, String>) -> String {
    let chars: Vec<char> = source_text.chars().collect();

    let mut excerpt = String::new();
    for (offset, word) in matches {
        if excerpt.to_lowercase().contains(word.as_str()) {
            continue;
        }
        let start = offset.saturating_sub(CONTEXT_BEFORE);
        let end = (offset + CONTEXT_AFTER).min(chars.len());
        excerpt.extend(&chars[start..end]);
        excerpt.push_str("...");
    }
    format!("...{}", excerpt).to_lowercase()
}

/// Wrap every occurrence of every matched word in bold markers.
fn highlight<'a>(mut excerpt: String, words: impl Iterator<Item = &'a String>) -> String {
    for word in words {
        let mut from = 0;
        while let Some(found) = excerpt[from..].find(word.as_str()) {
            let at = from + found;
            excerpt.insert_str(at + word.len(), "</b>");
            excerpt.insert_str(at, "<b>");
            // continue past both inserted tags
            from = at + word.len() + 7;
        }
    }
    excerpt
}

/// The 200-char stretch with the most complete bold pairs, earliest
/// position winning ties. Excerpts that already fit are returned whole
/// when they carry at least one pair; otherwise empty.
fn best_window(excerpt: &str) -> String {
    let boundaries: Vec<usize> = excerpt
        .char_indices()
        .map(|(i, _)| i)
        .chain([excerpt.len()])
        .collect();
    let total_chars = boundaries.len() - 1;

    if total_chars <= WINDOW_WIDTH {
        return if complete_pairs(excerpt) > 0 {
            excerpt.to_string()
        } else {
            String::new()
        };
    }

    let mut best_start = 0;
    let mut best_count = 0;
    for start in 0..=(total_chars - WINDOW_WIDTH) {
        let window = &excerpt[boundaries[start]..boundaries[start + WINDOW_WIDTH]];
        let count = complete_pairs(window);
        if count > best_count {
            best_count = count;
            best_start = start;
        }
    }
    if best_count == 0 {
        return String::new();
    }
    excerpt[boundaries[best_start]..boundaries[best_start + WINDOW_WIDTH]].to_string()
}

fn complete_pairs(window: &str) -> usize {
    let mut count = 0;
    let mut from = 0;
    while let Some(open) = window[from..].find("<b>") {
        let after_open = from + open + 3;
        match window[after_open..].find("</b>") {
            Some(close) => {
                count += 1;
                from = after_open + close + 4;
            }
            None => break,
        }
    }
    count
}
