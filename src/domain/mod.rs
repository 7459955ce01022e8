//! Domain types for clause analysis.
//!
//! This module contains the core data structures:
//! - Clause: chunks, the clause-type catalog, risk levels
//! - Entity: typed spans found in clause text
//! - Anomaly: findings over a set of classified chunks
//! - Degradation: stages that fell back to a local default
//! - Document: title, type and metadata of a whole document
//! - Report: the final analysis result

pub mod anomaly;
pub mod clause;
pub mod degradation;
pub mod document;
pub mod entity;
pub mod report;

// Re-export commonly used types
pub use anomaly::{Anomaly, AnomalyDetail};
pub use clause::{
    candidate_labels, clause_types, ChunkInput, ClassifiedChunk, ClauseChunk, PreprocessedChunk,
    RiskLevel, SectionType, CLAUSE_CATALOG, REQUIRED_CLAUSES,
};
pub use degradation::{Degradation, FallbackReason, Stage};
pub use document::{
    DefinedTerm, DefinitionStyle, DocumentMetadata, DocumentProfile, DocumentStatistics,
    KeyDates, TermInfo,
};
pub use entity::{Entity, EntityKind};
pub use report::{DocumentReport, DocumentSummary};
