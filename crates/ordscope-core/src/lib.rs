//! # ordscope-core: Foundational Types
//!
//! Types shared by every ordscope crate: the jurisdiction model with its
//! naming phrases, the immutable chunk store, validation configuration, text
//! merging, and the structured error hierarchy. Depends on nothing internal.
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Values are immutable after construction; jurisdictions are validated
//!   on every construction path, including deserialization.

pub mod chunk;
pub mod config;
pub mod error;
pub mod jurisdiction;
pub mod text;

pub use chunk::ChunkStore;
pub use config::{KeywordHeuristicConfig, ValidationConfig};
pub use error::{
    ClassifierError, ConfigError, GraphError, JudgeError, JurisdictionError, OrdscopeError,
};
pub use jurisdiction::{Jurisdiction, JurisdictionRecord, JurisdictionType, Tier};
pub use text::{merge_overlapping_texts, DEFAULT_OVERLAP_WINDOW};
