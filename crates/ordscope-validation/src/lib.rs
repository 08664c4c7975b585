//! # ordscope-validation: Document and Jurisdiction Validation
//!
//! Two request-scoped subsystems that decide whether a document is worth
//! extracting from:
//!
//! 1. **Chunk classification.** [`ChunkClassifier`] answers keyed yes/no
//!    questions over a trailing window of chunks, judging each
//!    (chunk, key) pair at most once. [`scan()`] drives it across a document
//!    behind a [`Heuristic`] pre-filter to produce one verdict for a
//!    [`TextKindValidator`], optionally feeding each chunk to
//!    [`ChunkCallback`]s along the way.
//!
//! 2. **Jurisdiction verification.** [`compile_content_graph`] and
//!    [`compile_url_graph`] build a [`VerificationGraph`] of hierarchical
//!    checks (state → county → subdivision) for a jurisdiction, and
//!    [`run()`] walks it with a [`GraphJudge`], short-circuiting on the first
//!    structural mismatch.
//!
//! Judges are supplied by the caller. [`adapters`] bridges both judge
//! capabilities to an external model transport.
//!
//! ## Concurrency
//!
//! Every judgment is awaited before the next is issued. Classifiers and
//! graphs are owned by a single validation; independent validations build
//! their own and may run as unrelated tasks.
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - No `.unwrap()` outside tests.
//! - No retries: judge failures propagate to the caller.

pub mod adapters;
pub mod classifier;
pub mod compile;
pub mod executor;
pub mod graph;
pub mod heuristic;
pub mod judge;
pub mod scan;

pub use adapters::{
    ChatCaller, ChatMessage, ChatRole, ConversationJudge, PromptJudge, StructuredCaller,
};
pub use classifier::{ChunkClassifier, ChunkMemory};
pub use compile::{compile_content_graph, compile_url_graph, CORRECT_JURISDICTION};
pub use executor::{run, JurisdictionVerdict, Transcript, TranscriptEntry};
pub use graph::{Edge, GraphBuilder, GraphNode, VerificationGraph, VerificationMode};
pub use heuristic::{AlwaysPass, Heuristic, KeywordHeuristic};
pub use judge::{ChunkJudge, FnJudge, GraphJudge};
pub use scan::{
    scan, scan_with_callbacks, ChunkCallback, LegalTextValidator, TextKindValidator,
};
