//! Snowball-backed morphology.
//!
//! Normal forms come from the snowball stemmer family; word classes come
//! from per-language function-word lexicons. Tokens with characters
//! outside the language's alphabet are rejected.

use rust_stemmers::{Algorithm, Stemmer};

use super::{Language, Morphology, MorphologyError, PartOfSpeech};

const RUSSIAN_CONJUNCTIONS: &[&str] = &[
    "и", "а", "но", "да", "или", "либо", "что", "чтобы", "если", "когда", "пока", "хотя", "зато",
    "однако", "тоже", "также", "будто", "словно", "ибо", "пусть",
];

const RUSSIAN_PREPOSITIONS: &[&str] = &[
    "в", "во", "на", "с", "со", "к", "ко", "по", "о", "об", "обо", "от", "ото", "до", "за", "из",
    "изо", "у", "при", "про", "для", "без", "безо", "под", "подо", "над", "надо", "перед",
    "передо", "через", "между", "среди", "около", "возле", "вокруг", "после", "кроме", "ради",
    "сквозь", "вдоль", "против",
];

const RUSSIAN_PARTICLES: &[&str] = &[
    "не", "ни", "же", "ж", "бы", "б", "ли", "ль", "уж", "ведь", "вот", "вон", "даже", "лишь",
    "только", "именно", "разве", "неужели", "пускай",
];

const RUSSIAN_INTERJECTIONS: &[&str] = &[
    "ах", "ох", "эх", "ой", "ай", "увы", "ура", "эй", "ну",
];

const ENGLISH_ARTICLES: &[&str] = &["a", "an", "the"];

const ENGLISH_CONJUNCTIONS: &[&str] = &[
    "and", "or", "but", "nor", "so", "yet", "if", "because", "although", "though", "while",
    "whereas", "unless", "until", "than", "whether",
];

const ENGLISH_PREPOSITIONS: &[&str] = &[
    "of", "in", "on", "at", "to", "from", "by", "with", "about", "against", "between", "into",
    "through", "during", "before", "after", "above", "below", "under", "over", "off", "for",
    "near", "per", "via", "upon", "within", "without",
];

const ENGLISH_PARTICLES: &[&str] = &["not"];

const ENGLISH_INTERJECTIONS: &[&str] = &["oh", "ah", "hey", "wow", "ouch", "oops", "hmm"];

/// Morphology backend built on snowball stemming plus a function-word
/// lexicon for the word classes the index excludes.
pub struct SnowballMorphology {
    language: Language,
    stemmer: Stemmer,
}

impl SnowballMorphology {
    pub fn new(language: Language) -> Self {
        let algorithm = match language {
            Language::Russian => Algorithm::Russian,
            Language::English => Algorithm::English,
        };
        Self {
            language,
            stemmer: Stemmer::create(algorithm),
        }
    }

    fn check(&self, token: &str) -> Result<(), MorphologyError> {
        if token.is_empty() {
            return Err(MorphologyError::EmptyToken);
        }
        if !self.language.spans(token) {
            return Err(MorphologyError::OutsideAlphabet {
                token: token.to_string(),
                language: self.language.as_str(),
            });
        }
        Ok(())
    }

    fn lexicon_tag(&self, token: &str) -> Option<PartOfSpeech> {
        let classes: &[(&[&str], PartOfSpeech)] = match self.language {
            Language::Russian => &[
                (RUSSIAN_CONJUNCTIONS, PartOfSpeech::Conjunction),
                (RUSSIAN_PREPOSITIONS, PartOfSpeech::Preposition),
                (RUSSIAN_PARTICLES, PartOfSpeech::Particle),
                (RUSSIAN_INTERJECTIONS, PartOfSpeech::Interjection),
            ],
            Language::English => &[
                (ENGLISH_ARTICLES, PartOfSpeech::Article),
                (ENGLISH_CONJUNCTIONS, PartOfSpeech::Conjunction),
                (ENGLISH_PREPOSITIONS, PartOfSpeech::Preposition),
                (ENGLISH_PARTICLES, PartOfSpeech::Particle),
                (ENGLISH_INTERJECTIONS, PartOfSpeech::Interjection),
            ],
        };
        classes
            .iter()
            .find(|(words, _)| words.contains(&token))
            .map(|(_, tag)| *tag)
    }
}

impl Morphology for SnowballMorphology {
    fn classify(&self, token: &str) -> Result<Vec<PartOfSpeech>, MorphologyError> {
        self.check(token)?;
        match self.lexicon_tag(token) {
            Some(tag) => Ok(vec![tag]),
            None => Ok(vec![PartOfSpeech::Content]),
        }
    }

    fn normalize(&self, token: &str) -> Result<Vec<String>, MorphologyError> {
        self.check(token)?;
        Ok(vec![self.stemmer.stem(token).into_owned()])
    }
}
