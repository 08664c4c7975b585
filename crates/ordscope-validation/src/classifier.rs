//! # Windowed Memoized Classifier
//!
//! Turns many independent yes/no chunk judgments into windowed answers while
//! calling the judge at most once per (chunk, key) pair.
//!
//! For a query at index `i` with recall size `N`, the active window is
//! `[max(0, i - N + 1), i]`. Every position in the window that has no answer
//! for the key is judged once, in ascending order, and the query answers
//! `true` if any position in the window holds `true`. A hit therefore
//! carries forward to the next `N - 1` indices without fresh judgments.
//!
//! ## Memory
//!
//! One map per chunk from question key to answer. Entries are append-only:
//! an answer is written once, after the judge returns successfully, and is
//! never recomputed or overwritten. Positions outside every queried window
//! stay unresolved.
//!
//! ## Ownership
//!
//! A classifier belongs to one validation of one document. `resolve` takes
//! `&mut self`, so concurrent validations must each build their own.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use ordscope_core::{ChunkStore, ClassifierError};

use crate::judge::ChunkJudge;

/// Per-chunk answers keyed by question.
pub type ChunkMemory = BTreeMap<String, bool>;

/// Windowed, memoized chunk classifier over one document.
#[derive(Debug, Clone)]
pub struct ChunkClassifier<T> {
    chunks: ChunkStore<T>,
    num_to_recall: usize,
    memory: Vec<ChunkMemory>,
}

impl<T> ChunkClassifier<T> {
    /// Build a classifier with an empty memory.
    ///
    /// # Errors
    ///
    /// [`ClassifierError::EmptyRecallWindow`] if `num_to_recall` is zero.
    pub fn new(
        chunks: impl Into<ChunkStore<T>>,
        num_to_recall: usize,
    ) -> Result<Self, ClassifierError> {
        if num_to_recall == 0 {
            return Err(ClassifierError::EmptyRecallWindow);
        }
        let chunks = chunks.into();
        let memory = vec![ChunkMemory::new(); chunks.len()];
        Ok(Self {
            chunks,
            num_to_recall,
            memory,
        })
    }

    /// The chunks being classified.
    pub fn chunks(&self) -> &ChunkStore<T> {
        &self.chunks
    }

    /// Number of chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the document has no chunks.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Recall window size.
    pub fn num_to_recall(&self) -> usize {
        self.num_to_recall
    }

    /// Answers recorded so far, one map per chunk.
    pub fn memory(&self) -> &[ChunkMemory] {
        &self.memory
    }

    /// The recorded answer for `key` at `index`, if any.
    pub fn answer(&self, index: usize, key: &str) -> Option<bool> {
        self.memory.get(index)?.get(key).copied()
    }

    /// The active window for a query at `index`.
    pub fn window(&self, index: usize) -> RangeInclusive<usize> {
        index.saturating_sub(self.num_to_recall - 1)..=index
    }

    /// Whether any chunk in the active window of `index` has a recorded
    /// `true` for `key`. Never calls a judge.
    pub fn recalled(&self, index: usize, key: &str) -> bool {
        self.window(index)
            .any(|p| self.answer(p, key).unwrap_or(false))
    }
}

impl<T: Sync> ChunkClassifier<T> {
    /// Answer `key` at `index` over the active window, judging each
    /// unresolved position exactly once.
    ///
    /// # Errors
    ///
    /// - [`ClassifierError::IndexOutOfRange`] if `index` is past the end.
    /// - [`ClassifierError::Judge`] if the judge fails; answers committed for
    ///   earlier positions in the window are kept, the failing position
    ///   stays unresolved.
    pub async fn resolve<J>(
        &mut self,
        index: usize,
        key: &str,
        judge: &J,
    ) -> Result<bool, ClassifierError>
    where
        J: ChunkJudge<T> + ?Sized,
    {
        if index >= self.chunks.len() {
            return Err(ClassifierError::IndexOutOfRange {
                index,
                len: self.chunks.len(),
            });
        }

        let mut hit = false;
        for position in self.window(index) {
            let answer = match self.answer(position, key) {
                Some(answer) => answer,
                None => {
                    let answer = judge
                        .judge(key, &self.chunks[position])
                        .await
                        .map_err(|source| ClassifierError::Judge {
                            index: position,
                            key: key.to_string(),
                            source,
                        })?;
                    tracing::debug!(index = position, key, answer, "judged chunk");
                    self.memory[position].insert(key.to_string(), answer);
                    answer
                }
            };
            hit |= answer;
        }

        tracing::debug!(index, key, hit, "resolved recall window");
        Ok(hit)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use ordscope_core::JudgeError;

    use super::*;

    /// Records every (key, chunk) it is asked about; true only for chunk 0.
    #[derive(Default)]
    struct RecordingJudge {
        calls: Mutex<Vec<(String, u32)>>,
    }

    impl RecordingJudge {
        fn keys(&self) -> Vec<String> {
            self.calls.lock().unwrap().iter().map(|(k, _)| k.clone()).collect()
        }
    }

    #[async_trait]
    impl ChunkJudge<u32> for RecordingJudge {
        async fn judge(&self, key: &str, chunk: &u32) -> Result<bool, JudgeError> {
            self.calls.lock().unwrap().push((key.to_string(), *chunk));
            Ok(*chunk == 0)
        }
    }

    fn mem(entries: &[Option<bool>]) -> Vec<ChunkMemory> {
        entries
            .iter()
            .map(|e| match e {
                Some(v) => ChunkMemory::from([("test".to_string(), *v)]),
                None => ChunkMemory::new(),
            })
            .collect()
    }

    #[tokio::test]
    async fn seven_chunk_walkthrough() {
        let mut classifier = ChunkClassifier::new((0..7).collect::<Vec<u32>>(), 3).unwrap();
        let judge = RecordingJudge::default();

        assert!(classifier.resolve(0, "test", &judge).await.unwrap());
        assert_eq!(judge.keys(), vec!["test"]);
        assert_eq!(
            classifier.memory(),
            mem(&[Some(true), None, None, None, None, None, None])
        );

        assert!(classifier.resolve(2, "test", &judge).await.unwrap());
        assert_eq!(judge.keys(), vec!["test"; 3]);
        assert_eq!(
            classifier.memory(),
            mem(&[Some(true), Some(false), Some(false), None, None, None, None])
        );

        assert!(!classifier.resolve(6, "test", &judge).await.unwrap());
        assert_eq!(judge.keys(), vec!["test"; 6]);
        assert_eq!(
            classifier.memory(),
            mem(&[
                Some(true),
                Some(false),
                Some(false),
                None,
                Some(false),
                Some(false),
                Some(false)
            ])
        );
    }

    #[tokio::test]
    async fn judges_window_in_ascending_order() {
        let mut classifier = ChunkClassifier::new((0..5).collect::<Vec<u32>>(), 3).unwrap();
        let judge = RecordingJudge::default();
        classifier.resolve(4, "k", &judge).await.unwrap();
        let order: Vec<u32> = judge.calls.lock().unwrap().iter().map(|(_, c)| *c).collect();
        assert_eq!(order, vec![2, 3, 4]);
    }

    #[tokio::test]
    async fn keys_are_memoized_independently() {
        let mut classifier = ChunkClassifier::new(vec![0u32, 1], 2).unwrap();
        let judge = RecordingJudge::default();
        classifier.resolve(1, "a", &judge).await.unwrap();
        classifier.resolve(1, "b", &judge).await.unwrap();
        classifier.resolve(1, "a", &judge).await.unwrap();
        assert_eq!(judge.keys(), vec!["a", "a", "b", "b"]);
        assert_eq!(classifier.answer(0, "b"), Some(true));
        assert_eq!(classifier.answer(1, "a"), Some(false));
    }

    #[tokio::test]
    async fn window_of_one_checks_only_the_index() {
        let mut classifier = ChunkClassifier::new(vec![0u32, 1, 2], 1).unwrap();
        let judge = RecordingJudge::default();
        assert!(!classifier.resolve(1, "k", &judge).await.unwrap());
        assert_eq!(classifier.answer(0, "k"), None);
        assert!(classifier.resolve(0, "k", &judge).await.unwrap());
    }

    #[tokio::test]
    async fn out_of_range_index() {
        let mut classifier = ChunkClassifier::new(vec![0u32], 2).unwrap();
        let judge = RecordingJudge::default();
        let err = classifier.resolve(1, "k", &judge).await.unwrap_err();
        assert!(matches!(err, ClassifierError::IndexOutOfRange { index: 1, len: 1 }));
        assert!(judge.keys().is_empty());
    }

    #[test]
    fn zero_recall_is_rejected() {
        assert!(matches!(
            ChunkClassifier::new(vec![0u32], 0),
            Err(ClassifierError::EmptyRecallWindow)
        ));
    }

    #[tokio::test]
    async fn judge_failure_keeps_committed_answers() {
        struct FailsOnTwo(AtomicUsize);

        #[async_trait]
        impl ChunkJudge<u32> for FailsOnTwo {
            async fn judge(&self, _key: &str, chunk: &u32) -> Result<bool, JudgeError> {
                self.0.fetch_add(1, Ordering::SeqCst);
                if *chunk == 2 {
                    Err(JudgeError::Transport("timeout".into()))
                } else {
                    Ok(false)
                }
            }
        }

        let mut classifier = ChunkClassifier::new(vec![0u32, 1, 2, 3], 3).unwrap();
        let judge = FailsOnTwo(AtomicUsize::new(0));
        let err = classifier.resolve(2, "k", &judge).await.unwrap_err();
        assert!(matches!(err, ClassifierError::Judge { index: 2, .. }));
        assert_eq!(classifier.answer(0, "k"), Some(false));
        assert_eq!(classifier.answer(1, "k"), Some(false));
        assert_eq!(classifier.answer(2, "k"), None);
        assert_eq!(judge.0.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn recalled_reads_memory_only() {
        let mut classifier = ChunkClassifier::new(vec![0u32, 1, 2, 3], 2).unwrap();
        let judge = RecordingJudge::default();
        classifier.resolve(0, "k", &judge).await.unwrap();
        assert!(classifier.recalled(1, "k"));
        assert!(!classifier.recalled(2, "k"));
        assert_eq!(judge.keys().len(), 1);
    }
}
