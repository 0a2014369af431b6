//! Lemma extraction from free text.
//!
//! `LemmaAnalyzer` turns raw text into a frequency map of normal forms:
//! punctuation and symbols are stripped, everything is lowercased, and
//! tokens tagged as function words (conjunctions, interjections,
//! prepositions, particles, articles) are dropped. Bulk scanning excludes
//! tokens the morphology cannot analyze; single-word lookup falls back to
//! the word itself so query/snippet matching degrades to exact match.

use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use crate::morphology::Morphology;

/// Per-field relevance weights, loaded from the `search_field` table at
/// the start of each session and never changed mid-run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldWeights {
    pub title: f32,
    pub body: f32,
}

impl Default for FieldWeights {
    fn default() -> Self {
        Self {
            title: 1.0,
            body: 0.8,
        }
    }
}

/// Occurrence counts of one lemma on one page, combined across fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedLemma {
    pub frequency: u32,
    pub rank: f32,
}

pub struct LemmaAnalyzer {
    morphology: Arc<dyn Morphology>,
}

impl LemmaAnalyzer {
    pub fn new(morphology: Arc<dyn Morphology>) -> Self {
        Self { morphology }
    }

    /// Strip punctuation and symbols, lowercase, collapse whitespace.
    pub fn prepare_text(text: &str) -> String {
        static STRIP: OnceLock<Regex> = OnceLock::new();
        static SPACES: OnceLock<Regex> = OnceLock::new();
        let strip = STRIP.get_or_init(|| Regex::new(r"[\p{P}\p{S}]").unwrap());
        let spaces = SPACES.get_or_init(|| Regex::new(r"\s+").unwrap());

        let stripped = strip.replace_all(text, "");
        let lowered = stripped.to_lowercase();
        spaces.replace_all(&lowered, " ").trim().to_string()
    }

    /// Count every normal form in `text`. Function words and tokens the
    /// morphology rejects contribute nothing.
    pub fn scan(&self, text: &str) -> HashMap<String, u32> {
        let mut lemmas: HashMap<String, u32> = HashMap::new();
        for word in Self::prepare_text(text).split(' ') {
            if word.is_empty() {
                continue;
            }
            let tags = match self.morphology.classify(word) {
                Ok(tags) => tags,
                Err(_) => continue,
            };
            if tags.iter().any(|tag| tag.is_function_word()) {
                continue;
            }
            let Ok(forms) = self.morphology.normalize(word) else {
                continue;
            };
            for form in forms {
                *lemmas.entry(form).or_insert(0) += 1;
            }
        }
        lemmas
    }

    /// Normal forms of a single word, falling back to the word itself
    /// when the morphology cannot analyze it.
    pub fn normal_forms(&self, word: &str) -> Vec<String> {
        match self.morphology.normalize(word) {
            Ok(forms) if !forms.is_empty() => forms,
            _ => vec![word.to_string()],
        }
    }
}

/// Merge per-field lemma counts into combined frequency and weighted
/// rank. Both the store (while indexing) and the search engine (while
/// scoring) go through here so the math cannot diverge.
pub fn merge_weighted(
    body: &HashMap<String, u32>,
    title: &HashMap<String, u32>,
    weights: &FieldWeights,
) -> HashMap<String, WeightedLemma> {
    let mut merged: HashMap<String, WeightedLemma> = HashMap::new();

    for (lemma, &body_count) in body {
        let entry = match title.get(lemma) {
            Some(&title_count) => WeightedLemma {
                frequency: body_count + title_count,
                rank: body_count as f32 * weights.body + title_count as f32 * weights.title,
            },
            None => WeightedLemma {
                frequency: body_count,
                rank: body_count as f32 * weights.body,
            },
        };
        merged.insert(lemma.clone(), entry);
    }

    for (lemma, &title_count) in title {
        if body.contains_key(lemma) {
            continue;
        }
        merged.insert(
            lemma.clone(),
            WeightedLemma {
                frequency: title_count,
                rank: title_count as f32 * weights.title,
            },
        );
    }

    merged
}
