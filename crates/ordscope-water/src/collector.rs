//! # Water-Rights Text Collection
//!
//! Finds the chunks of a document that carry groundwater district rules or
//! well permitting requirements, and stitches them into one excerpt for
//! downstream extraction.
//!
//! A hit at index `i` stores chunk `i`, the `num_to_recall - 1` chunks
//! before it, and the chunk after it, so rules that straddle a chunk
//! boundary survive. Stored chunks are merged in index order with
//! overlap removal.

use std::collections::BTreeMap;

use async_trait::async_trait;
use ordscope_core::{merge_overlapping_texts, ClassifierError, DEFAULT_OVERLAP_WINDOW};
use ordscope_validation::{ChunkCallback, ChunkClassifier, ChunkJudge, Heuristic};

/// Pre-filter for water-rights documents. Every chunk is judged.
#[derive(Debug, Clone, Copy, Default)]
pub struct WaterRightsHeuristic;

impl Heuristic for WaterRightsHeuristic {
    fn check(&self, _text: &str) -> bool {
        true
    }
}

/// Collects chunks with water-rights ordinance content.
#[derive(Debug, Clone, Default)]
pub struct WaterRightsTextCollector {
    chunks: BTreeMap<usize, String>,
}

impl WaterRightsTextCollector {
    /// Label of the text this collector produces.
    pub const LABEL: &'static str = "relevant_text";

    /// Classifier key for "this chunk has ordinance information".
    pub const KEY: &'static str = "contains_ord_info";

    /// System prompt for a model-backed judge; `{key}` is the classifier key.
    pub const SYSTEM_PROMPT: &'static str = "You extract structured data from text. Return \
        your answer as a JSON object (not markdown) with exactly three keys. The first key is \
        'district_rules', a string summarizing the rules of the groundwater conservation \
        district. The second key is 'well_requirements', a string summarizing what is required \
        to drill a groundwater well. The last key is '{key}', a boolean that is true only if the \
        excerpt gives substantive information about the groundwater conservation district's \
        rules or management plans.";

    /// An empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve [`Self::KEY`] at `index`; on a hit, store the chunk and its
    /// neighbors.
    ///
    /// # Errors
    ///
    /// Propagates classifier errors (out-of-range index, judge failure).
    pub async fn check_chunk<T, J>(
        &mut self,
        classifier: &mut ChunkClassifier<T>,
        index: usize,
        judge: &J,
    ) -> Result<bool, ClassifierError>
    where
        T: AsRef<str> + Sync,
        J: ChunkJudge<T> + ?Sized,
    {
        let contains_ord_info = classifier.resolve(index, Self::KEY, judge).await?;
        if contains_ord_info {
            tracing::debug!(index, "text at index contains water rights ordinance info");
            self.store_neighborhood(classifier, index);
        } else {
            tracing::debug!(index, "text at index does not contain water rights ordinance info");
        }
        Ok(contains_ord_info)
    }

    /// Borrow this collector as a scan callback that judges with `judge`.
    pub fn with_judge<'a, J: ?Sized>(&'a mut self, judge: &'a J) -> CollectorCallback<'a, J> {
        CollectorCallback {
            collector: self,
            judge,
        }
    }

    fn store_neighborhood<T: AsRef<str>>(&mut self, classifier: &ChunkClassifier<T>, index: usize) {
        let first = index.saturating_sub(classifier.num_to_recall() - 1);
        let last = (index + 1).min(classifier.len().saturating_sub(1));
        for position in first..=last {
            self.chunks
                .entry(position)
                .or_insert_with(|| classifier.chunks()[position].as_ref().to_string());
        }
    }

    /// Indices of the stored chunks, ascending.
    pub fn indices(&self) -> Vec<usize> {
        self.chunks.keys().copied().collect()
    }

    /// Stored chunks merged in index order; empty when nothing was found.
    pub fn relevant_text(&self) -> String {
        if self.chunks.is_empty() {
            tracing::debug!("no relevant water rights chunks found in original text");
            return String::new();
        }
        tracing::debug!(
            count = self.chunks.len(),
            indices = ?self.indices(),
            "merging water rights chunks from original text"
        );
        let texts: Vec<&str> = self.chunks.values().map(String::as_str).collect();
        merge_overlapping_texts(&texts, DEFAULT_OVERLAP_WINDOW)
    }
}

/// A [`WaterRightsTextCollector`] paired with its judge, for
/// [`ordscope_validation::scan_with_callbacks`].
pub struct CollectorCallback<'a, J: ?Sized> {
    collector: &'a mut WaterRightsTextCollector,
    judge: &'a J,
}

#[async_trait]
impl<'a, T, J> ChunkCallback<T> for CollectorCallback<'a, J>
where
    T: AsRef<str> + Send + Sync,
    J: ChunkJudge<T> + ?Sized,
{
    async fn on_chunk(
        &mut self,
        classifier: &mut ChunkClassifier<T>,
        index: usize,
    ) -> Result<(), ClassifierError> {
        self.collector
            .check_chunk(classifier, index, self.judge)
            .await
            .map(|_| ())
    }
}
