//! clauselens - clause-level risk analysis for legal documents
//!
//! Turns contract text into a structured report: clauses with types,
//! risk scores and summaries, document-wide anomalies, and a narrative.
//!
//! # Pipeline
//!
//! normalize → segment → classify → score → summarize → detect anomalies
//!
//! Classification and summarization prefer local rules and use hosted
//! models only where the rules give no answer. A model that is missing,
//! slow or unreadable never fails a request; the stage degrades to its
//! local fallback and the report records why.
//!
//! # Modules
//!
//! - `adapters`: External capabilities (zero-shot model, summarizer, text extraction, forensics)
//! - `api`: Request/response contract with JSON envelopes
//! - `core`: Pipeline stages and the orchestrator
//! - `domain`: Data structures (ClauseChunk, Anomaly, DocumentReport)
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Segment and classify
//! clauselens preprocess --input contract.txt
//!
//! # Full analysis without calling any model
//! cat contract.txt | clauselens analyze --offline
//!
//! # Analyse chunks saved from an earlier preprocess run
//! clauselens analyze --chunks chunks.json
//! ```

pub mod adapters;
pub mod api;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;

// Re-export main types at crate root for convenience
pub use crate::config::Settings;
pub use crate::core::{AnalysisError, Pipeline, Preprocessed, ValidationError};
pub use domain::{Anomaly, ChunkInput, ClassifiedChunk, ClauseChunk, DocumentReport};
