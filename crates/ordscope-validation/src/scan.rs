//! # Scan Orchestrator
//!
//! Drives the classifier across a document in chunk order to reach one
//! document-level verdict for a text-kind validator (e.g. "is this enacted
//! legal text?").
//!
//! ## Stopping rules
//!
//! 1. A chunk rejected by the heuristic is skipped without consulting the
//!    classifier, and does not count as examined.
//! 2. The first positive window result ends the scan with `true`.
//! 3. Once `min_chunks_to_process` chunks have been examined without a
//!    positive result, or the chunks run out, the scan ends with `false`.
//!
//! The verdict is recorded on the validator exactly once, and only when the
//! scan terminates cleanly.
//!
//! ## Callbacks
//!
//! [`scan_with_callbacks`] also hands every chunk that passes the heuristic
//! to a list of [`ChunkCallback`]s, in index order, one callback at a time,
//! after the validator has looked at that chunk. Once the verdict is decided
//! (by a hit or by reaching the minimum) the validator stops judging, but the
//! walk continues to the last chunk so callbacks see the whole document.
//! With no callbacks the scan stops as soon as the verdict is decided.

use async_trait::async_trait;
use ordscope_core::ClassifierError;

use crate::classifier::ChunkClassifier;
use crate::heuristic::Heuristic;
use crate::judge::ChunkJudge;

// ---------------------------------------------------------------------------
// Text-kind validators
// ---------------------------------------------------------------------------

/// A document-level question answered by a scan, with a write-once outcome.
pub trait TextKindValidator: Send {
    /// Classifier key under which chunk answers are memoized.
    fn key(&self) -> &str;

    /// The recorded outcome, if the scan has concluded.
    fn outcome(&self) -> Option<bool>;

    /// Record the scan outcome.
    ///
    /// # Errors
    ///
    /// [`ClassifierError::OutcomeAlreadyResolved`] on a second write.
    fn record_outcome(&mut self, outcome: bool) -> Result<(), ClassifierError>;
}

/// Decides whether a document is enacted legal text, as opposed to a draft,
/// a model ordinance, a plan, a permit application, or commentary.
#[derive(Debug, Clone, Default)]
pub struct LegalTextValidator {
    outcome: Option<bool>,
}

impl LegalTextValidator {
    /// Classifier key.
    pub const KEY: &'static str = "legal_text";

    /// Instructions for a model-backed judge. `{key}` names the boolean the
    /// model must return.
    pub const SYSTEM_PROMPT: &'static str = "You are a legal scholar that reads excerpts of \
        documents to decide whether they contain enacted legal text. Return your answer as a \
        JSON object (not markdown) with exactly three keys. The first key is 'summary', a \
        string summarizing the excerpt in one or two sentences. The second key is \
        'type_of_text', a string naming the kind of document the excerpt appears to come \
        from (for example: ordinance, statute, regulation, draft ordinance, model ordinance, \
        comprehensive plan, permit application, meeting minutes, news article). The last key \
        is '{key}', a boolean that is true only if the excerpt is part of an adopted, legally \
        binding ordinance, statute, or regulation. Set '{key}' to false for drafts, model or \
        example ordinances, plans, permits, meeting minutes, and commentary.";

    /// A validator with no outcome yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the scan found legal text. `false` until a scan concludes.
    pub fn is_correct_kind_of_text(&self) -> bool {
        self.outcome.unwrap_or(false)
    }
}

impl TextKindValidator for LegalTextValidator {
    fn key(&self) -> &str {
        Self::KEY
    }

    fn outcome(&self) -> Option<bool> {
        self.outcome
    }

    fn record_outcome(&mut self, outcome: bool) -> Result<(), ClassifierError> {
        if self.outcome.is_some() {
            return Err(ClassifierError::OutcomeAlreadyResolved {
                key: Self::KEY.to_string(),
            });
        }
        self.outcome = Some(outcome);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Chunk callbacks
// ---------------------------------------------------------------------------

/// Per-chunk work that rides along with a scan, such as collecting the
/// chunks that answer a second question.
#[async_trait]
pub trait ChunkCallback<T: Send + Sync>: Send {
    /// Called for each chunk that passes the heuristic.
    ///
    /// # Errors
    ///
    /// Any error aborts the scan; no outcome is recorded.
    async fn on_chunk(
        &mut self,
        classifier: &mut ChunkClassifier<T>,
        index: usize,
    ) -> Result<(), ClassifierError>;
}

// ---------------------------------------------------------------------------
// scan
// ---------------------------------------------------------------------------

/// Scan a document for the validator's question and record the verdict.
///
/// A `min_chunks_to_process` of zero is treated as one, so a negative
/// verdict always rests on at least one judged chunk when any chunk passes
/// the heuristic.
///
/// # Errors
///
/// - [`ClassifierError::OutcomeAlreadyResolved`] if the validator already
///   holds an outcome; no judge is called.
/// - [`ClassifierError::Judge`] if a judge call fails; no outcome is recorded.
pub async fn scan<T, H, V, J>(
    classifier: &mut ChunkClassifier<T>,
    heuristic: &H,
    validator: &mut V,
    judge: &J,
    min_chunks_to_process: usize,
) -> Result<bool, ClassifierError>
where
    T: AsRef<str> + Send + Sync,
    H: Heuristic + ?Sized,
    V: TextKindValidator + ?Sized,
    J: ChunkJudge<T> + ?Sized,
{
    scan_with_callbacks(
        classifier,
        heuristic,
        validator,
        judge,
        &mut [],
        min_chunks_to_process,
    )
    .await
}

/// [`scan`], additionally running `callbacks` on every chunk that passes the
/// heuristic.
///
/// # Errors
///
/// As for [`scan`], plus any error returned by a callback.
pub async fn scan_with_callbacks<T, H, V, J>(
    classifier: &mut ChunkClassifier<T>,
    heuristic: &H,
    validator: &mut V,
    judge: &J,
    callbacks: &mut [&mut dyn ChunkCallback<T>],
    min_chunks_to_process: usize,
) -> Result<bool, ClassifierError>
where
    T: AsRef<str> + Send + Sync,
    H: Heuristic + ?Sized,
    V: TextKindValidator + ?Sized,
    J: ChunkJudge<T> + ?Sized,
{
    if validator.outcome().is_some() {
        return Err(ClassifierError::OutcomeAlreadyResolved {
            key: validator.key().to_string(),
        });
    }

    let min_chunks = min_chunks_to_process.max(1);
    let key = validator.key().to_string();
    let mut examined = 0;
    let mut verdict = None;

    for index in 0..classifier.len() {
        if verdict.is_none() && examined >= min_chunks {
            verdict = Some(false);
        }
        if verdict.is_some() && callbacks.is_empty() {
            break;
        }
        if !heuristic.check(classifier.chunks()[index].as_ref()) {
            tracing::debug!(index, key = %key, "chunk rejected by heuristic");
            continue;
        }

        if verdict.is_none() {
            examined += 1;
            if classifier.resolve(index, &key, judge).await? {
                tracing::debug!(index, key = %key, "text at index satisfies validator");
                verdict = Some(true);
            } else {
                tracing::debug!(index, key = %key, "text at index does not satisfy validator");
            }
        }

        for callback in callbacks.iter_mut() {
            callback.on_chunk(classifier, index).await?;
        }
    }

    let verdict = verdict.unwrap_or(false);
    tracing::info!(key = %key, examined, verdict, "document scan concluded");
    validator.record_outcome(verdict)?;
    Ok(verdict)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use ordscope_core::JudgeError;

    use super::*;
    use crate::heuristic::AlwaysPass;

    /// True for chunks containing "ORDINANCE"; records visited chunks.
    #[derive(Default)]
    struct OrdinanceJudge {
        seen: Mutex<Vec<String>>,
    }

    impl OrdinanceJudge {
        fn seen(&self) -> Vec<String> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChunkJudge<String> for OrdinanceJudge {
        async fn judge(&self, _key: &str, chunk: &String) -> Result<bool, JudgeError> {
            self.seen.lock().unwrap().push(chunk.clone());
            Ok(chunk.contains("ORDINANCE"))
        }
    }

    struct SkipsBoilerplate;

    impl Heuristic for SkipsBoilerplate {
        fn check(&self, text: &str) -> bool {
            !text.starts_with("boilerplate")
        }
    }

    fn doc(chunks: &[&str]) -> ChunkClassifier<String> {
        ChunkClassifier::new(
            chunks.iter().map(|c| c.to_string()).collect::<Vec<_>>(),
            2,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn positive_hit_stops_scan() {
        let mut classifier = doc(&["cover", "ORDINANCE 12", "sec 1", "sec 2"]);
        let mut validator = LegalTextValidator::new();
        let judge = OrdinanceJudge::default();

        let out = scan(&mut classifier, &AlwaysPass, &mut validator, &judge, 3)
            .await
            .unwrap();
        assert!(out);
        assert!(validator.is_correct_kind_of_text());
        assert_eq!(judge.seen(), vec!["cover", "ORDINANCE 12"]);
        assert_eq!(classifier.answer(2, LegalTextValidator::KEY), None);
    }

    #[tokio::test]
    async fn negative_after_minimum_examined() {
        let mut classifier = doc(&["a", "b", "c", "ORDINANCE"]);
        let mut validator = LegalTextValidator::new();
        let judge = OrdinanceJudge::default();

        let out = scan(&mut classifier, &AlwaysPass, &mut validator, &judge, 3)
            .await
            .unwrap();
        assert!(!out);
        assert_eq!(validator.outcome(), Some(false));
        assert_eq!(judge.seen(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn short_document_exhausts() {
        let mut classifier = doc(&["a"]);
        let mut validator = LegalTextValidator::new();
        let judge = OrdinanceJudge::default();
        assert!(!scan(&mut classifier, &AlwaysPass, &mut validator, &judge, 3)
            .await
            .unwrap());
        assert_eq!(validator.outcome(), Some(false));
    }

    #[tokio::test]
    async fn empty_document_is_negative() {
        let mut classifier = doc(&[]);
        let mut validator = LegalTextValidator::new();
        let judge = OrdinanceJudge::default();
        assert!(!scan(&mut classifier, &AlwaysPass, &mut validator, &judge, 3)
            .await
            .unwrap());
        assert!(judge.seen().is_empty());
    }

    #[tokio::test]
    async fn skipped_chunks_do_not_count_toward_minimum() {
        let mut classifier = doc(&[
            "boilerplate 1",
            "boilerplate 2",
            "intro",
            "boilerplate 3",
            "ORDINANCE",
        ]);
        let mut validator = LegalTextValidator::new();
        let judge = OrdinanceJudge::default();

        let out = scan(&mut classifier, &SkipsBoilerplate, &mut validator, &judge, 2)
            .await
            .unwrap();
        // Windows still cover skipped neighbors; only the counter ignores them.
        assert!(out);
        assert_eq!(
            judge.seen(),
            vec!["boilerplate 2", "intro", "boilerplate 3", "ORDINANCE"]
        );
    }

    #[tokio::test]
    async fn zero_minimum_still_examines_one_chunk() {
        let mut classifier = doc(&["ORDINANCE"]);
        let mut validator = LegalTextValidator::new();
        let judge = OrdinanceJudge::default();
        assert!(scan(&mut classifier, &AlwaysPass, &mut validator, &judge, 0)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn outcome_is_written_once() {
        let mut classifier = doc(&["ORDINANCE"]);
        let mut validator = LegalTextValidator::new();
        let judge = OrdinanceJudge::default();
        scan(&mut classifier, &AlwaysPass, &mut validator, &judge, 1)
            .await
            .unwrap();

        let err = scan(&mut classifier, &AlwaysPass, &mut validator, &judge, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, ClassifierError::OutcomeAlreadyResolved { .. }));
        assert_eq!(judge.seen().len(), 1);
    }

    /// Records every index it is handed.
    #[derive(Default)]
    struct Visits(Vec<usize>);

    #[async_trait]
    impl ChunkCallback<String> for Visits {
        async fn on_chunk(
            &mut self,
            _classifier: &mut ChunkClassifier<String>,
            index: usize,
        ) -> Result<(), ClassifierError> {
            self.0.push(index);
            Ok(())
        }
    }

    #[tokio::test]
    async fn callbacks_see_every_passing_chunk_after_a_hit() {
        let mut classifier = doc(&["boilerplate", "ORDINANCE 12", "sec 1", "sec 2"]);
        let mut validator = LegalTextValidator::new();
        let judge = OrdinanceJudge::default();
        let mut visits = Visits::default();

        let out = scan_with_callbacks(
            &mut classifier,
            &SkipsBoilerplate,
            &mut validator,
            &judge,
            &mut [&mut visits],
            3,
        )
        .await
        .unwrap();

        assert!(out);
        assert_eq!(visits.0, vec![1, 2, 3]);
        // The validator stops judging once decided.
        assert_eq!(judge.seen(), vec!["boilerplate", "ORDINANCE 12"]);
        assert_eq!(classifier.answer(2, LegalTextValidator::KEY), None);
    }

    #[tokio::test]
    async fn callbacks_continue_past_the_minimum() {
        let mut classifier = doc(&["a", "b", "c", "ORDINANCE"]);
        let mut validator = LegalTextValidator::new();
        let judge = OrdinanceJudge::default();
        let mut visits = Visits::default();

        let out = scan_with_callbacks(
            &mut classifier,
            &AlwaysPass,
            &mut validator,
            &judge,
            &mut [&mut visits],
            2,
        )
        .await
        .unwrap();

        assert!(!out);
        assert_eq!(visits.0, vec![0, 1, 2, 3]);
        assert_eq!(judge.seen(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn callback_failure_records_nothing() {
        struct Fails;

        #[async_trait]
        impl ChunkCallback<String> for Fails {
            async fn on_chunk(
                &mut self,
                _classifier: &mut ChunkClassifier<String>,
                index: usize,
            ) -> Result<(), ClassifierError> {
                Err(ClassifierError::IndexOutOfRange { index, len: 0 })
            }
        }

        let mut classifier = doc(&["ORDINANCE"]);
        let mut validator = LegalTextValidator::new();
        let judge = OrdinanceJudge::default();
        let err = scan_with_callbacks(
            &mut classifier,
            &AlwaysPass,
            &mut validator,
            &judge,
            &mut [&mut Fails],
            1,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ClassifierError::IndexOutOfRange { .. }));
        assert_eq!(validator.outcome(), None);
    }

    #[tokio::test]
    async fn judge_failure_records_nothing() {
        struct Broken;

        #[async_trait]
        impl ChunkJudge<String> for Broken {
            async fn judge(&self, _key: &str, _chunk: &String) -> Result<bool, JudgeError> {
                Err(JudgeError::Failed("model unavailable".into()))
            }
        }

        let mut classifier = doc(&["a", "b"]);
        let mut validator = LegalTextValidator::new();
        let err = scan(&mut classifier, &AlwaysPass, &mut validator, &Broken, 2)
            .await
            .unwrap_err();
        assert!(matches!(err, ClassifierError::Judge { index: 0, .. }));
        assert_eq!(validator.outcome(), None);
    }
}
