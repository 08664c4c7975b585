//! # Verification Graph Executor
//!
//! Walks a compiled [`VerificationGraph`] from `init` to the terminal node.
//! Branch nodes are answered by the judge, one at a time; unconditional
//! nodes are followed without a judgment and only recorded in the
//! transcript. At the terminal node the judge fills in the graph's verdict
//! fields.
//!
//! A branch answer that routes straight to the terminal node is a structural
//! mismatch (wrong granularity, or the jurisdiction's own tier denied). The
//! terminal judgment still runs so the verdict carries the judge's
//! explanation, but such a verdict never counts as a match.

use std::collections::BTreeMap;

use ordscope_core::GraphError;
use serde::{Deserialize, Serialize};

use crate::graph::{Edge, GraphNode, VerificationGraph, VerificationMode, TERMINAL};
use crate::judge::GraphJudge;

// ---------------------------------------------------------------------------
// Transcript
// ---------------------------------------------------------------------------

/// One visited node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// Node identifier.
    pub node: String,
    /// The node's prompt.
    pub prompt: String,
    /// The judge's answer at a branch node; `None` for unconditional nodes.
    pub answer: Option<bool>,
}

/// Visited nodes in traversal order, excluding the terminal node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    /// An empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a visited node.
    pub fn push(&mut self, node: &GraphNode, answer: Option<bool>) {
        self.entries.push(TranscriptEntry {
            node: node.id.clone(),
            prompt: node.prompt.clone(),
            answer,
        });
    }

    /// Entries in traversal order.
    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Iterate entries in traversal order.
    pub fn iter(&self) -> std::slice::Iter<'_, TranscriptEntry> {
        self.entries.iter()
    }

    /// The answer recorded at `node`, if it was a visited branch.
    pub fn answer(&self, node: &str) -> Option<bool> {
        self.entries
            .iter()
            .find(|e| e.node == node)
            .and_then(|e| e.answer)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been visited.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a TranscriptEntry;
    type IntoIter = std::slice::Iter<'a, TranscriptEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// ---------------------------------------------------------------------------
// Verdict
// ---------------------------------------------------------------------------

/// Outcome of one graph traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JurisdictionVerdict {
    /// Mode of the traversed graph.
    pub mode: VerificationMode,
    /// Node identifiers visited, `init` first and the terminal node last.
    pub path: Vec<String>,
    /// Prompts and branch answers along the path.
    pub transcript: Transcript,
    /// One value per requested verdict field; fields the judge omitted are
    /// `false`.
    pub fields: BTreeMap<String, bool>,
    /// The branch node whose answer routed straight to the terminal node.
    pub short_circuited_at: Option<String>,
}

impl JurisdictionVerdict {
    /// Whether the document (or URL) belongs to the jurisdiction: no
    /// structural mismatch, and every verdict field is true.
    pub fn is_match(&self) -> bool {
        self.short_circuited_at.is_none()
            && !self.fields.is_empty()
            && self.fields.values().all(|v| *v)
    }

    /// Value of one verdict field (`false` if absent).
    pub fn field(&self, name: &str) -> bool {
        self.fields.get(name).copied().unwrap_or(false)
    }
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

/// Traverse `graph`, asking `judge` at each branch and at the terminal node.
///
/// # Errors
///
/// - [`GraphError::Judge`] if a judgment fails; no verdict is produced.
/// - [`GraphError::UnknownNode`] or [`GraphError::StepLimitExceeded`] if the
///   graph is inconsistent, which validated graphs never are.
pub async fn run<J>(graph: &VerificationGraph, judge: &J) -> Result<JurisdictionVerdict, GraphError>
where
    J: GraphJudge + ?Sized,
{
    let limit = graph.len();
    let mut transcript = Transcript::new();
    let mut path = Vec::with_capacity(limit);
    let mut short_circuited_at = None;
    let mut current = graph.init();

    loop {
        if path.len() >= limit {
            return Err(GraphError::StepLimitExceeded { limit });
        }
        path.push(current.id.clone());

        let next = match &current.edge {
            None => break,
            Some(Edge::Unconditional(next)) => {
                transcript.push(current, None);
                next
            }
            Some(Edge::Branch { yes, no }) => {
                let answer = judge
                    .decide(current, &transcript)
                    .await
                    .map_err(|source| GraphError::Judge {
                        node: current.id.clone(),
                        source,
                    })?;
                tracing::debug!(node = %current.id, answer, "graph branch answered");
                transcript.push(current, Some(answer));

                let next = if answer { yes } else { no };
                if next == TERMINAL {
                    short_circuited_at = Some(current.id.clone());
                }
                next
            }
        };
        current = graph
            .node(next)
            .ok_or_else(|| GraphError::UnknownNode(next.clone()))?;
    }

    let returned = judge
        .conclude(current, graph.verdict_fields(), &transcript)
        .await
        .map_err(|source| GraphError::Judge {
            node: current.id.clone(),
            source,
        })?;
    let fields: BTreeMap<String, bool> = graph
        .verdict_fields()
        .iter()
        .map(|f| (f.clone(), returned.get(f).copied().unwrap_or(false)))
        .collect();

    let verdict = JurisdictionVerdict {
        mode: graph.mode(),
        path,
        transcript,
        fields,
        short_circuited_at,
    };
    tracing::info!(
        mode = ?verdict.mode,
        steps = verdict.path.len(),
        short_circuited_at = ?verdict.short_circuited_at,
        is_match = verdict.is_match(),
        "verification graph traversed"
    );
    Ok(verdict)
}
