//! Morphological analysis capability.
//!
//! The lemma analyzer only needs two things from a morphology backend:
//! word-class tags (to drop function words) and normal forms (to fold
//! inflections together). Both are behind the [`Morphology`] trait so the
//! backend can be swapped per language or stubbed out in tests.

mod snowball;

pub use snowball::SnowballMorphology;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Languages the bundled backend supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Russian,
    English,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Russian => "russian",
            Language::English => "english",
        }
    }

    /// True when every character of the (lowercased) token belongs to
    /// this language's alphabet.
    pub fn spans(&self, token: &str) -> bool {
        match self {
            Language::Russian => token.chars().all(|c| ('а'..='я').contains(&c) || c == 'ё'),
            Language::English => token.chars().all(|c| c.is_ascii_lowercase()),
        }
    }
}

/// Word classes the analyzer distinguishes. The bundled backend only
/// tells function words apart from everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartOfSpeech {
    Conjunction,
    Interjection,
    Preposition,
    Particle,
    /// English only; Russian has no articles
    Article,
    /// Content word (noun, verb, adjective, ...) with no dedicated tag
    Content,
}

impl PartOfSpeech {
    /// Function words carry no search meaning and are dropped during
    /// index builds.
    pub fn is_function_word(&self) -> bool {
        !matches!(self, PartOfSpeech::Content)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MorphologyError {
    #[error("empty token")]
    EmptyToken,
    #[error("'{token}' is outside the {language} alphabet")]
    OutsideAlphabet { token: String, language: &'static str },
}

/// A morphology backend for one language.
pub trait Morphology: Send + Sync {
    /// Word-class tags for a token. A token may carry several tags
    /// (homographs); classification fails for tokens the language
    /// cannot analyze.
    fn classify(&self, token: &str) -> Result<Vec<PartOfSpeech>, MorphologyError>;

    /// Normal (dictionary) forms of a token. Homographs may produce
    /// more than one form.
    fn normalize(&self, token: &str) -> Result<Vec<String>, MorphologyError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_alphabet_spans() {
        assert!(Language::Russian.spans("лес"));
        assert!(Language::Russian.spans("ёж"));
        assert!(!Language::Russian.spans("forest"));
        assert!(!Language::Russian.spans("лес2024"));

        assert!(Language::English.spans("forest"));
        assert!(!Language::English.spans("лес"));
        assert!(!Language::English.spans("it's"));
    }

    #[test]
    fn function_word_classes() {
        assert!(PartOfSpeech::Conjunction.is_function_word());
        assert!(PartOfSpeech::Interjection.is_function_word());
        assert!(PartOfSpeech::Preposition.is_function_word());
        assert!(PartOfSpeech::Particle.is_function_word());
        assert!(PartOfSpeech::Article.is_function_word());
        assert!(!PartOfSpeech::Content.is_function_word());
    }
}
