//! Document-level profile: title, type and extracted metadata.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// What the preprocessor learned about the document as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentProfile {
    pub title: String,
    pub document_type: String,
    pub metadata: DocumentMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    /// Contracting parties, formal names before aliases
    pub parties: Vec<String>,
    pub dates: KeyDates,
    /// Governing-law, venue and arbitration seats, deduplicated
    pub jurisdiction: Vec<String>,
    /// Monetary amounts as written
    pub amounts: Vec<String>,
    pub term: Option<TermInfo>,
    pub governing_law: Option<String>,
    pub definitions: Vec<DefinedTerm>,
    pub statistics: DocumentStatistics,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyDates {
    pub effective_date: Option<NaiveDate>,
    pub execution_date: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>,
    /// Every recognisable date, in order of first appearance
    pub all_dates: Vec<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermInfo {
    pub duration: Option<String>,
    pub renewal_clause: Option<String>,
    pub termination_notice: Option<String>,
}

impl TermInfo {
    pub fn is_empty(&self) -> bool {
        self.duration.is_none() && self.renewal_clause.is_none() && self.termination_notice.is_none()
    }
}

/// How a defined term was introduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionStyle {
    /// `"Acme Holdings" ("Acme")`
    Parenthetical,
    /// `"Services" means ...` inside a definitions section
    Explicit,
    /// `("Effective Date")` with no stated meaning
    Referenced,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefinedTerm {
    pub term: String,
    pub definition: Option<String>,
    #[serde(rename = "type")]
    pub style: DefinitionStyle,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStatistics {
    pub total_characters: usize,
    pub total_clauses: usize,
    /// At 3000 characters per page
    pub estimated_pages: usize,
    pub defined_terms_count: usize,
}
