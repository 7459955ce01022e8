//! The final, immutable analysis report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Anomaly, ClassifiedChunk, Degradation, DocumentProfile, RiskLevel};

/// Risk aggregate over all classified chunks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    /// Mean chunk risk, two decimals; 0.0 for an empty document
    pub overall_risk_score: f64,
    /// Required clause types absent from the document, in catalog order
    pub missing_clauses: Vec<String>,
}

/// Result of analysing one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentReport {
    pub request_id: Uuid,
    pub generated_at: DateTime<Utc>,

    /// Analysed chunks in input order
    pub clauses: Vec<ClassifiedChunk>,

    /// Narrative combining the abstractive summary with risk findings
    pub document_summary: String,

    pub overall_risk_score: f64,
    pub overall_risk_level: RiskLevel,
    pub missing_clauses: Vec<String>,
    pub anomalies: Vec<Anomaly>,

    /// Title, type and metadata, when the report was built from raw text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<DocumentProfile>,

    /// Stages that fell back to a local default
    #[serde(default)]
    pub degradations: Vec<Degradation>,
}

impl DocumentReport {
    /// Clauses at or above the High band
    pub fn high_risk_clauses(&self) -> impl Iterator<Item = &ClassifiedChunk> {
        self.clauses
            .iter()
            .filter(|c| c.risk_level == RiskLevel::High)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ClauseChunk, SectionType};

    fn clause(index: usize, risk_score: f64) -> ClassifiedChunk {
        ClassifiedChunk::scored(
            ClauseChunk {
                index,
                section_title: format!("{}. Section", index + 1),
                section_type: SectionType::Standard,
                parent_section: None,
                text: "The parties agree.".to_string(),
            },
            crate::domain::clause_types::GENERAL,
            risk_score,
        )
    }

    #[test]
    fn test_high_risk_clauses() {
        let report = DocumentReport {
            request_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            clauses: vec![clause(0, 0.2), clause(1, 0.8), clause(2, 0.79), clause(3, 0.95)],
            document_summary: String::new(),
            overall_risk_score: 0.69,
            overall_risk_level: RiskLevel::Moderate,
            missing_clauses: Vec::new(),
            anomalies: Vec::new(),
            document: None,
            degradations: Vec::new(),
        };

        let high: Vec<usize> = report.high_risk_clauses().map(|c| c.index()).collect();
        assert_eq!(high, vec![1, 3]);
    }
}
