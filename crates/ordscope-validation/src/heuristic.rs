//! # Heuristic Pre-Filter
//!
//! Cheap synchronous gate consulted before a chunk is judged. A heuristic
//! only changes how many judge calls a scan makes; the classifier's window
//! and memoization contract does not depend on it.

use std::collections::HashSet;

use ordscope_core::KeywordHeuristicConfig;

/// Predicate deciding whether a chunk is worth judging.
pub trait Heuristic: Send + Sync {
    /// `true` if the chunk may be relevant.
    fn check(&self, text: &str) -> bool;
}

/// Defers every decision to the judge.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysPass;

impl Heuristic for AlwaysPass {
    fn check(&self, _text: &str) -> bool {
        true
    }
}

/// Keyword-count heuristic.
///
/// The text is lowercased and stripped of excluded phrases, then scored:
/// one point per keyword found anywhere, one per acronym found as a whole
/// word, and one per phrase whose every word is found. The chunk passes when
/// the score reaches the threshold.
#[derive(Debug, Clone)]
pub struct KeywordHeuristic {
    keywords: Vec<String>,
    acronyms: Vec<String>,
    phrases: Vec<Vec<String>>,
    excluded_phrases: Vec<String>,
    threshold: usize,
}

impl KeywordHeuristic {
    /// Build from configured word lists. Entries are lowercased; blank
    /// entries are dropped.
    pub fn from_config(config: &KeywordHeuristicConfig) -> Self {
        Self {
            keywords: normalized(&config.keywords),
            acronyms: normalized(&config.acronyms),
            phrases: normalized(&config.phrases)
                .into_iter()
                .map(|p| p.split_whitespace().map(str::to_string).collect())
                .collect(),
            excluded_phrases: normalized(&config.excluded_phrases),
            threshold: config.threshold.max(1),
        }
    }

    /// Score a chunk without applying the threshold.
    pub fn score(&self, text: &str) -> usize {
        let mut text = text.to_lowercase();
        for excluded in &self.excluded_phrases {
            text = text.replace(excluded.as_str(), " ");
        }

        let words: HashSet<&str> = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();

        let keyword_hits = self
            .keywords
            .iter()
            .filter(|k| text.contains(k.as_str()))
            .count();
        let acronym_hits = self
            .acronyms
            .iter()
            .filter(|a| words.contains(a.as_str()))
            .count();
        let phrase_hits = self
            .phrases
            .iter()
            .filter(|phrase| phrase.iter().all(|w| text.contains(w.as_str())))
            .count();

        keyword_hits + acronym_hits + phrase_hits
    }
}

impl Heuristic for KeywordHeuristic {
    fn check(&self, text: &str) -> bool {
        let score = self.score(text);
        tracing::trace!(score, threshold = self.threshold, "keyword heuristic");
        score >= self.threshold
    }
}

impl From<&KeywordHeuristicConfig> for KeywordHeuristic {
    fn from(config: &KeywordHeuristicConfig) -> Self {
        Self::from_config(config)
    }
}

fn normalized(entries: &[String]) -> Vec<String> {
    entries
        .iter()
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}
