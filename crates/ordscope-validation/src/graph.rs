//! # Verification Graph
//!
//! An explicit, validated decision graph. Every node has an identifier and a
//! prompt, and at most one outgoing [`Edge`]:
//!
//! - [`Edge::Unconditional`]: follow without asking.
//! - [`Edge::Branch`]: ask the node's yes/no prompt, follow `yes` or `no`.
//! - no edge: the terminal node, whose prompt aggregates the verdict.
//!
//! Graphs are only obtainable through [`GraphBuilder::finish`], which checks
//! that the structure is a DAG rooted at [`INIT`] with the single terminal
//! [`TERMINAL`] and no unreachable nodes. The executor relies on this.

use std::collections::{BTreeMap, BTreeSet};

use ordscope_core::GraphError;
use serde::{Deserialize, Serialize};

/// Identifier of the entry node.
pub const INIT: &str = "init";

/// Identifier of the terminal node.
pub const TERMINAL: &str = "final";

/// What a graph verifies a jurisdiction against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationMode {
    /// The text of a document.
    Content,
    /// The URL a document was retrieved from.
    Url,
}

/// Outgoing edge of a non-terminal node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    /// Follow without consulting the judge.
    Unconditional(String),
    /// Follow `yes` or `no` according to the judge's answer.
    Branch {
        /// Target on a YES answer.
        yes: String,
        /// Target on a NO answer.
        no: String,
    },
}

impl Edge {
    /// Targets in edge order (`yes` before `no`).
    pub fn targets(&self) -> Vec<&str> {
        match self {
            Self::Unconditional(next) => vec![next.as_str()],
            Self::Branch { yes, no } => vec![yes.as_str(), no.as_str()],
        }
    }
}

/// One node of a verification graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Node identifier, unique within the graph.
    pub id: String,
    /// Prompt shown to the judge (context only for `init`).
    pub prompt: String,
    /// Outgoing edge; `None` only for the terminal node.
    pub edge: Option<Edge>,
}

impl GraphNode {
    /// Whether this node asks the judge a yes/no question.
    pub fn is_branch(&self) -> bool {
        matches!(self.edge, Some(Edge::Branch { .. }))
    }

    /// Whether this is the terminal node.
    pub fn is_terminal(&self) -> bool {
        self.edge.is_none()
    }
}

// ---------------------------------------------------------------------------
// VerificationGraph
// ---------------------------------------------------------------------------

/// A validated verification graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationGraph {
    mode: VerificationMode,
    nodes: Vec<GraphNode>,
    index: BTreeMap<String, usize>,
    verdict_fields: Vec<String>,
}

impl VerificationGraph {
    /// Verification mode the graph was compiled for.
    pub fn mode(&self) -> VerificationMode {
        self.mode
    }

    /// Node by identifier.
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// Node identifiers in insertion order.
    pub fn node_ids(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    /// Every `(from, to)` edge, in node insertion order; branch edges list
    /// the YES target first.
    pub fn edges(&self) -> Vec<(&str, &str)> {
        self.nodes
            .iter()
            .flat_map(|node| {
                node.edge
                    .iter()
                    .flat_map(|e| e.targets())
                    .map(move |to| (node.id.as_str(), to))
            })
            .collect()
    }

    /// The entry node.
    pub fn init(&self) -> &GraphNode {
        &self.nodes[self.index[INIT]]
    }

    /// The terminal node.
    pub fn terminal(&self) -> &GraphNode {
        &self.nodes[self.index[TERMINAL]]
    }

    /// Fields the terminal node asks the judge to fill in.
    pub fn verdict_fields(&self) -> &[String] {
        &self.verdict_fields
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`; a valid graph has at least `init` and the terminal.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

// ---------------------------------------------------------------------------
// GraphBuilder
// ---------------------------------------------------------------------------

/// Incremental constructor for [`VerificationGraph`].
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    mode: VerificationMode,
    nodes: Vec<GraphNode>,
    verdict_fields: Vec<String>,
}

impl GraphBuilder {
    /// An empty builder.
    pub fn new(mode: VerificationMode) -> Self {
        Self {
            mode,
            nodes: Vec::new(),
            verdict_fields: Vec::new(),
        }
    }

    /// Add a node that flows to `next` without a judgment.
    pub fn unconditional(
        mut self,
        id: impl Into<String>,
        prompt: impl Into<String>,
        next: impl Into<String>,
    ) -> Self {
        self.nodes.push(GraphNode {
            id: id.into(),
            prompt: prompt.into(),
            edge: Some(Edge::Unconditional(next.into())),
        });
        self
    }

    /// Add a yes/no node.
    pub fn branch(
        mut self,
        id: impl Into<String>,
        prompt: impl Into<String>,
        yes: impl Into<String>,
        no: impl Into<String>,
    ) -> Self {
        self.nodes.push(GraphNode {
            id: id.into(),
            prompt: prompt.into(),
            edge: Some(Edge::Branch {
                yes: yes.into(),
                no: no.into(),
            }),
        });
        self
    }

    /// Add the terminal node with its aggregation prompt and verdict fields.
    pub fn terminal<I, S>(mut self, prompt: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.nodes.push(GraphNode {
            id: TERMINAL.to_string(),
            prompt: prompt.into(),
            edge: None,
        });
        self.verdict_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Validate and freeze the graph.
    ///
    /// # Errors
    ///
    /// [`GraphError::Malformed`] for duplicate ids, a missing `init`, other
    /// than exactly one terminal, dangling edge targets, a branch whose two
    /// targets coincide, cycles, or nodes unreachable from `init`.
    pub fn finish(self) -> Result<VerificationGraph, GraphError> {
        let mut index = BTreeMap::new();
        for (i, node) in self.nodes.iter().enumerate() {
            if index.insert(node.id.clone(), i).is_some() {
                return Err(malformed(format!("duplicate node `{}`", node.id)));
            }
        }
        if !index.contains_key(INIT) {
            return Err(malformed(format!("missing `{INIT}` node")));
        }

        let terminals: Vec<&str> = self
            .nodes
            .iter()
            .filter(|n| n.is_terminal())
            .map(|n| n.id.as_str())
            .collect();
        if terminals != [TERMINAL] {
            return Err(malformed(format!(
                "expected exactly one terminal `{TERMINAL}`, found {terminals:?}"
            )));
        }

        for node in &self.nodes {
            let Some(edge) = &node.edge else { continue };
            for target in edge.targets() {
                if !index.contains_key(target) {
                    return Err(malformed(format!(
                        "edge `{}` -> `{target}` points to no node",
                        node.id
                    )));
                }
            }
            if let Edge::Branch { yes, no } = edge {
                if yes == no {
                    return Err(malformed(format!(
                        "branch `{}` has identical targets",
                        node.id
                    )));
                }
            }
        }

        let graph = VerificationGraph {
            mode: self.mode,
            nodes: self.nodes,
            index,
            verdict_fields: self.verdict_fields,
        };
        check_acyclic_and_reachable(&graph)?;
        Ok(graph)
    }
}

/// Depth-first walk from `init`: a back edge is a cycle, and any node left
/// unvisited is unreachable.
fn check_acyclic_and_reachable(graph: &VerificationGraph) -> Result<(), GraphError> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unseen,
        Open,
        Done,
    }

    let mut marks = vec![Mark::Unseen; graph.nodes.len()];
    // (node, next target position)
    let mut stack = vec![(graph.index[INIT], 0usize)];
    marks[graph.index[INIT]] = Mark::Open;

    while let Some((current, cursor)) = stack.pop() {
        let targets = graph.nodes[current]
            .edge
            .as_ref()
            .map(Edge::targets)
            .unwrap_or_default();
        match targets.get(cursor) {
            Some(target) => {
                stack.push((current, cursor + 1));
                let next = graph.index[*target];
                match marks[next] {
                    Mark::Open => {
                        return Err(malformed(format!(
                            "cycle through `{}` -> `{target}`",
                            graph.nodes[current].id
                        )))
                    }
                    Mark::Unseen => {
                        marks[next] = Mark::Open;
                        stack.push((next, 0));
                    }
                    Mark::Done => {}
                }
            }
            None => marks[current] = Mark::Done,
        }
    }

    let unreachable: BTreeSet<&str> = graph
        .nodes
        .iter()
        .zip(&marks)
        .filter(|(_, m)| **m == Mark::Unseen)
        .map(|(n, _)| n.id.as_str())
        .collect();
    if !unreachable.is_empty() {
        return Err(malformed(format!("unreachable nodes {unreachable:?}")));
    }
    Ok(())
}

fn malformed(reason: String) -> GraphError {
    GraphError::Malformed(reason)
}
