//! # Water-Rights Document Processing
//!
//! Water-rights documents are district rules and management plans, which
//! rarely read as enacted legal text. They skip the legal-text scan: every
//! chunk the water-rights heuristic passes goes straight to the collector,
//! and the stored chunks are merged for extraction.

use ordscope_core::{merge_overlapping_texts, ClassifierError, DEFAULT_OVERLAP_WINDOW};
use ordscope_validation::{ChunkClassifier, ChunkJudge, Heuristic};

use crate::collector::{WaterRightsHeuristic, WaterRightsTextCollector};

/// Whether water-rights documents are screened for enacted legal text.
pub const CHECK_IF_LEGAL_DOC: bool = false;

/// Merges a document's chunks into one text, with overlap removed.
#[derive(Debug, Clone, Copy, Default)]
pub struct WaterRightsTextExtractor;

impl WaterRightsTextExtractor {
    /// Label of the text this extractor produces.
    pub const LABEL: &'static str = "cleaned_text_for_extraction";

    /// Merge `chunks` in order.
    pub fn parse<S: AsRef<str>>(&self, chunks: &[S]) -> String {
        merge_overlapping_texts(chunks, DEFAULT_OVERLAP_WINDOW)
    }
}

/// Run `collector` over every chunk the water-rights heuristic passes, with
/// no legal-text verdict, and return the merged relevant text.
///
/// # Errors
///
/// Propagates classifier errors from the collector's judge.
pub async fn collect_relevant_text<T, J>(
    classifier: &mut ChunkClassifier<T>,
    collector: &mut WaterRightsTextCollector,
    judge: &J,
) -> Result<String, ClassifierError>
where
    T: AsRef<str> + Sync,
    J: ChunkJudge<T> + ?Sized,
{
    for index in 0..classifier.len() {
        if !WaterRightsHeuristic.check(classifier.chunks()[index].as_ref()) {
            continue;
        }
        collector.check_chunk(classifier, index, judge).await?;
    }
    tracing::info!(
        chunks = classifier.len(),
        stored = collector.indices().len(),
        "collected water rights text without legal check"
    );
    Ok(collector.relevant_text())
}
