//! Text analysis
//!
//! The linguistic seam between raw document text and index terms. Both
//! indexing and retrieval must run the exact same analyzer, otherwise a
//! query word would map to a different term id than it did at build time;
//! the trait keeps the analyzer injectable so tests can supply a
//! deterministic stub.

use ahash::AHashSet;

/// Analyzer trait for pluggable text normalization.
///
/// Implementations must be deterministic: the same input text always yields
/// the same token list, in the same order.
pub trait Analyzer: Send + Sync {
    /// Normalize raw text into index terms.
    fn analyze(&self, text: &str) -> Vec<String>;

    /// Get analyzer name.
    fn name(&self) -> &str;
}

/// Built-in stop words (function words that carry no conjunctive signal).
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is", "it",
    "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there", "these",
    "they", "this", "to", "was", "will", "with",
];

/// Default analyzer: case folding, alphanumeric tokenization, stop-word
/// removal and light suffix stripping.
#[derive(Debug, Clone)]
pub struct StandardAnalyzer {
    case_sensitive: bool,
    min_len: usize,
    max_len: usize,
    strip_suffixes: bool,
    stop_words: AHashSet<String>,
}

impl Default for StandardAnalyzer {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            min_len: 1,
            max_len: 64,
            strip_suffixes: true,
            stop_words: STOP_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }
}

impl StandardAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set case sensitivity.
    pub fn case_sensitive(mut self, sensitive: bool) -> Self {
        self.case_sensitive = sensitive;
        self
    }

    /// Set token length bounds.
    pub fn with_length_range(mut self, min: usize, max: usize) -> Self {
        self.min_len = min;
        self.max_len = max;
        self
    }

    /// Enable or disable suffix stripping.
    pub fn with_suffix_stripping(mut self, enabled: bool) -> Self {
        self.strip_suffixes = enabled;
        self
    }

    /// Replace the stop-word list.
    pub fn with_stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop_words = words.into_iter().map(Into::into).collect();
        self
    }

    /// Light suffix stripping. Folds the common inflections without a full
    /// stemmer; stripping is stable under re-analysis.
    fn stem(token: &str) -> &str {
        if let Some(base) = token.strip_suffix("ing") {
            if base.len() >= 3 {
                return base;
            }
        }
        if let Some(base) = token.strip_suffix("ed") {
            if base.len() >= 3 {
                return base;
            }
        }
        if let Some(base) = token.strip_suffix("es") {
            if base.len() >= 3 {
                return base;
            }
        }
        if let Some(base) = token.strip_suffix('s') {
            if base.len() >= 3 && !base.ends_with('s') {
                return base;
            }
        }
        token
    }
}

impl Analyzer for StandardAnalyzer {
    fn analyze(&self, text: &str) -> Vec<String> {
        let normalized = if self.case_sensitive {
            text.to_string()
        } else {
            text.to_lowercase()
        };

        normalized
            .split(|c: char| !c.is_alphanumeric() && c != '_')
            .filter(|t| t.len() >= self.min_len && t.len() <= self.max_len)
            .filter(|t| !self.stop_words.contains(*t))
            .map(|t| {
                if self.strip_suffixes {
                    Self::stem(t).to_string()
                } else {
                    t.to_string()
                }
            })
            .collect()
    }

    fn name(&self) -> &str {
        "standard"
    }
}
