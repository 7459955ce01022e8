//! Clause chunks and the clause-type catalog.

use serde::{Deserialize, Serialize};

use super::{Anomaly, Entity};

/// Structural role of a section within a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionType {
    #[default]
    Standard,
    Preamble,
    Definitions,
    Exhibit,
    Signature,
}

/// Clause-type labels understood by the classifier and risk model.
pub mod clause_types {
    pub const CONFIDENTIALITY: &str = "Confidentiality";
    pub const TERMINATION: &str = "Termination";
    pub const PAYMENT: &str = "Payment";
    pub const LIABILITY: &str = "Liability";
    pub const INDEMNIFICATION: &str = "Indemnification";
    pub const GOVERNING_LAW: &str = "Governing Law";
    pub const FORCE_MAJEURE: &str = "Force Majeure";
    pub const INTRODUCTION: &str = "Introduction";
    pub const DEFINITIONS: &str = "Definitions";
    pub const SCOPE: &str = "Scope";
    pub const WARRANTIES: &str = "Warranties";
    pub const REPRESENTATIONS: &str = "Representations";
    pub const COVENANTS: &str = "Covenants";
    pub const CONDITIONS: &str = "Conditions";
    pub const DISPUTE_RESOLUTION: &str = "Dispute Resolution";
    pub const INTELLECTUAL_PROPERTY: &str = "Intellectual Property";
    pub const NON_COMPETE: &str = "Non-Compete";
    pub const SEVERABILITY: &str = "Severability";
    pub const ENTIRE_AGREEMENT: &str = "Entire Agreement";
    pub const AMENDMENT: &str = "Amendment";
    pub const ASSIGNMENT: &str = "Assignment";
    pub const NOTICE: &str = "Notice";
    pub const WAIVER: &str = "Waiver";
    pub const GENERAL: &str = "General";
}

use clause_types::*;

/// Every label in the catalog, `General` last.
pub const CLAUSE_CATALOG: [&str; 24] = [
    CONFIDENTIALITY,
    TERMINATION,
    PAYMENT,
    LIABILITY,
    INDEMNIFICATION,
    GOVERNING_LAW,
    FORCE_MAJEURE,
    INTRODUCTION,
    DEFINITIONS,
    SCOPE,
    WARRANTIES,
    REPRESENTATIONS,
    COVENANTS,
    CONDITIONS,
    DISPUTE_RESOLUTION,
    INTELLECTUAL_PROPERTY,
    NON_COMPETE,
    SEVERABILITY,
    ENTIRE_AGREEMENT,
    AMENDMENT,
    ASSIGNMENT,
    NOTICE,
    WAIVER,
    GENERAL,
];

/// Clause types every contract is expected to contain.
pub const REQUIRED_CLAUSES: [&str; 6] = [
    CONFIDENTIALITY,
    TERMINATION,
    PAYMENT,
    LIABILITY,
    GOVERNING_LAW,
    FORCE_MAJEURE,
];

/// Candidate labels offered to the zero-shot model (catalog minus `General`).
pub fn candidate_labels() -> Vec<String> {
    CLAUSE_CATALOG
        .iter()
        .filter(|label| **label != GENERAL)
        .map(|label| label.to_string())
        .collect()
}

/// A contiguous run of normalized text belonging to one section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClauseChunk {
    /// Zero-based position in the document, contiguous
    pub index: usize,

    /// Header that opened the section ("1.2 Payment Terms", "PREAMBLE", ...)
    pub section_title: String,

    pub section_type: SectionType,

    /// Enclosing top-level section, when the header was nested
    #[serde(default)]
    pub parent_section: Option<String>,

    pub text: String,
}

/// A chunk after preprocessing: segmented and given a preliminary clause type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreprocessedChunk {
    #[serde(flatten)]
    pub chunk: ClauseChunk,
    pub clause_type: String,
}

/// A chunk as accepted by the analysis entry point.
///
/// Only `text` is required. Both camelCase and snake_case field names are
/// accepted so output from older preprocessors can be fed back in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkInput {
    #[serde(default, alias = "chunk_index")]
    pub index: Option<usize>,

    pub text: String,

    #[serde(default, alias = "section_title")]
    pub section_title: Option<String>,

    #[serde(default, alias = "section_type")]
    pub section_type: Option<SectionType>,

    #[serde(default, alias = "parent_section")]
    pub parent_section: Option<String>,

    /// Clause type from an earlier classification pass; `General` or absent
    /// means "classify again"
    #[serde(default, alias = "clause_type")]
    pub clause_type: Option<String>,
}

impl ChunkInput {
    /// Bare text chunk with no structural hints
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            index: None,
            text: text.into(),
            section_title: None,
            section_type: None,
            parent_section: None,
            clause_type: None,
        }
    }
}

impl From<PreprocessedChunk> for ChunkInput {
    fn from(pre: PreprocessedChunk) -> Self {
        Self {
            index: Some(pre.chunk.index),
            text: pre.chunk.text,
            section_title: Some(pre.chunk.section_title),
            section_type: Some(pre.chunk.section_type),
            parent_section: pre.chunk.parent_section,
            clause_type: Some(pre.clause_type),
        }
    }
}

/// Qualitative band for a risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    /// `>= 0.8` is High, `>= 0.6` Moderate, anything else Low
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            RiskLevel::High
        } else if score >= 0.6 {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RiskLevel::Low => "Low",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::High => "High",
        };
        f.write_str(label)
    }
}

/// A chunk after semantic analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedChunk {
    #[serde(flatten)]
    pub chunk: ClauseChunk,

    /// Catalog label, or a title-cased model label outside the catalog
    pub clause_type: String,

    /// In [0, 1], rounded to two decimals
    pub risk_score: f64,

    pub risk_level: RiskLevel,

    pub summary: String,

    #[serde(default)]
    pub entities: Vec<Entity>,

    /// Other clause families the text touches on
    #[serde(default)]
    pub related_clause_types: Vec<String>,

    /// Human-readable descriptions of the anomalies raised for this chunk
    #[serde(default)]
    pub anomalies: Vec<String>,
}

impl ClassifiedChunk {
    /// Chunk with a clause type and score and nothing else filled in.
    ///
    /// Handy for feeding the aggregation stages directly.
    pub fn scored(chunk: ClauseChunk, clause_type: impl Into<String>, risk_score: f64) -> Self {
        Self {
            chunk,
            clause_type: clause_type.into(),
            risk_score,
            risk_level: RiskLevel::from_score(risk_score),
            summary: String::new(),
            entities: Vec::new(),
            related_clause_types: Vec::new(),
            anomalies: Vec::new(),
        }
    }

    pub fn index(&self) -> usize {
        self.chunk.index
    }

    pub fn text(&self) -> &str {
        &self.chunk.text
    }

    /// Attach the descriptions of anomalies that point at this chunk
    pub fn attach_anomalies(&mut self, anomalies: &[Anomaly]) {
        self.anomalies = anomalies
            .iter()
            .filter(|a| a.chunk_index == Some(self.chunk.index))
            .map(Anomaly::describe)
            .collect();
    }
}
