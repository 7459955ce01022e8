//! Core analysis logic.
//!
//! This module contains:
//! - Normalizer: rule-table text cleanup
//! - Segmenter: header detection and sentence packing into chunks
//! - Classifier: pattern tier with zero-shot model fallback
//! - Entities / Risk: lexical evidence and the per-clause risk score
//! - Anomalies: document-wide outlier and compliance checks
//! - Summarizer: clause and document summaries, the report narrative
//! - Metadata: document title, type and key terms
//! - Orchestrator: the pipeline that runs all of the above

pub mod anomalies;
pub mod classifier;
pub mod entities;
pub mod error;
pub mod metadata;
pub mod normalizer;
pub mod orchestrator;
pub mod outcome;
pub mod risk;
pub mod segmenter;
pub mod sentences;
pub mod summarizer;

// Re-export commonly used types
pub use anomalies::detect_anomalies;
pub use classifier::{classify, classify_by_patterns, normalize_label};
pub use entities::extract_entities;
pub use error::{AnalysisError, ValidationError};
pub use metadata::profile_document;
pub use normalizer::normalize;
pub use orchestrator::{Pipeline, Preprocessed};
pub use outcome::{Degradation, FallbackReason, Outcome, Stage};
pub use risk::score_risk;
pub use segmenter::Segmenter;
pub use summarizer::{compute_document_summary, SummaryBudget};
