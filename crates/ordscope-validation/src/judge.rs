//! # Judge Capabilities
//!
//! A judge answers one yes/no question at a time, typically by calling a
//! language model. Two capabilities exist because the two subsystems ask
//! different kinds of questions:
//!
//! - [`ChunkJudge`] answers a keyed question about a single chunk
//!   (`judge(key, chunk) -> bool`) for the windowed classifier.
//! - [`GraphJudge`] answers branch nodes of a verification graph and
//!   produces the structured verdict at its terminal node.
//!
//! Judges are called strictly one at a time by this crate. They must not
//! retry internally on behalf of the caller's policy; failures are returned
//! as [`JudgeError`] and propagate out of the enclosing operation.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use ordscope_core::JudgeError;

use crate::executor::Transcript;
use crate::graph::GraphNode;

// ---------------------------------------------------------------------------
// ChunkJudge
// ---------------------------------------------------------------------------

/// Answers a keyed yes/no question about one chunk.
#[async_trait]
pub trait ChunkJudge<T: ?Sized + Sync>: Send + Sync {
    /// Decide whether `chunk` satisfies the question identified by `key`.
    async fn judge(&self, key: &str, chunk: &T) -> Result<bool, JudgeError>;
}

#[async_trait]
impl<T, J> ChunkJudge<T> for Arc<J>
where
    T: ?Sized + Sync,
    J: ChunkJudge<T> + ?Sized,
{
    async fn judge(&self, key: &str, chunk: &T) -> Result<bool, JudgeError> {
        (**self).judge(key, chunk).await
    }
}

/// Adapts a synchronous closure into a [`ChunkJudge`].
///
/// Useful for rule-based judges and tests.
#[derive(Debug, Clone)]
pub struct FnJudge<F>(pub F);

#[async_trait]
impl<T, F> ChunkJudge<T> for FnJudge<F>
where
    T: ?Sized + Sync,
    F: Fn(&str, &T) -> Result<bool, JudgeError> + Send + Sync,
{
    async fn judge(&self, key: &str, chunk: &T) -> Result<bool, JudgeError> {
        (self.0)(key, chunk)
    }
}

// ---------------------------------------------------------------------------
// GraphJudge
// ---------------------------------------------------------------------------

/// Answers the nodes of a verification graph.
///
/// The transcript holds every node visited before `node`, in order, with the
/// answers given at branch nodes. Judges that keep a conversation with a
/// model replay it; stateless judges may ignore it.
#[async_trait]
pub trait GraphJudge: Send + Sync {
    /// Answer a branch node's yes/no prompt.
    async fn decide(&self, node: &GraphNode, transcript: &Transcript) -> Result<bool, JudgeError>;

    /// Answer the terminal node's aggregation prompt with one boolean per
    /// requested field. Fields absent from the result count as `false`.
    async fn conclude(
        &self,
        node: &GraphNode,
        fields: &[String],
        transcript: &Transcript,
    ) -> Result<BTreeMap<String, bool>, JudgeError>;
}

#[async_trait]
impl<J: GraphJudge + ?Sized> GraphJudge for Arc<J> {
    async fn decide(&self, node: &GraphNode, transcript: &Transcript) -> Result<bool, JudgeError> {
        (**self).decide(node, transcript).await
    }

    async fn conclude(
        &self,
        node: &GraphNode,
        fields: &[String],
        transcript: &Transcript,
    ) -> Result<BTreeMap<String, bool>, JudgeError> {
        (**self).conclude(node, fields, transcript).await
    }
}
