//! Anomaly records raised over a set of classified chunks.

use serde::{Deserialize, Serialize};

/// A notable pattern in one chunk, or in the document as a whole.
///
/// `chunk_index` is `None` only for document-level findings
/// (`missing_required_clause`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Anomaly {
    pub chunk_index: Option<usize>,
    pub reason: String,
    #[serde(flatten)]
    pub detail: AnomalyDetail,
}

/// Type-specific payload; the tag is emitted as `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnomalyDetail {
    HighRiskClause {
        clause_type: String,
        risk_score: f64,
        threshold: f64,
    },
    RareClauseType {
        clause_type: String,
        frequency: String,
    },
    ComplianceAnomaly {
        clause_type: String,
        risk_score: f64,
    },
    MissingRequiredClause {
        missing_clauses: Vec<String>,
    },
    ShortNoticePeriod {
        clause_type: String,
        notice_period: String,
    },
    HighPenaltyRate {
        clause_type: String,
        penalty_rate: String,
    },
}

impl Anomaly {
    /// Wire name of the anomaly kind
    pub fn kind(&self) -> &'static str {
        match self.detail {
            AnomalyDetail::HighRiskClause { .. } => "high_risk_clause",
            AnomalyDetail::RareClauseType { .. } => "rare_clause_type",
            AnomalyDetail::ComplianceAnomaly { .. } => "compliance_anomaly",
            AnomalyDetail::MissingRequiredClause { .. } => "missing_required_clause",
            AnomalyDetail::ShortNoticePeriod { .. } => "short_notice_period",
            AnomalyDetail::HighPenaltyRate { .. } => "high_penalty_rate",
        }
    }

    pub fn is_document_level(&self) -> bool {
        self.chunk_index.is_none()
    }

    /// One-line description shown next to a clause or in the narrative
    pub fn describe(&self) -> String {
        match &self.detail {
            AnomalyDetail::HighRiskClause { risk_score, .. } => {
                format!("High risk clause (risk score: {})", risk_score)
            }
            AnomalyDetail::RareClauseType { frequency, .. } => {
                format!("Rare clause type (frequency: {})", frequency)
            }
            AnomalyDetail::ComplianceAnomaly { .. } => self.reason.clone(),
            AnomalyDetail::MissingRequiredClause { missing_clauses } => {
                format!("Missing required clauses: {}", missing_clauses.join(", "))
            }
            AnomalyDetail::ShortNoticePeriod { notice_period, .. } => {
                format!("Short notice period: {}", notice_period)
            }
            AnomalyDetail::HighPenaltyRate { penalty_rate, .. } => {
                format!("High penalty rate: {}", penalty_rate)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_shape() {
        let anomaly = Anomaly {
            chunk_index: Some(2),
            reason: "Notice period of 5 days is unusually short (recommended: 30+ days)".into(),
            detail: AnomalyDetail::ShortNoticePeriod {
                clause_type: "Termination".into(),
                notice_period: "5 days".into(),
            },
        };

        let json = serde_json::to_value(&anomaly).unwrap();
        assert_eq!(json["type"], "short_notice_period");
        assert_eq!(json["chunkIndex"], 2);
        assert_eq!(json["notice_period"], "5 days");
        assert_eq!(json["clause_type"], "Termination");

        let back: Anomaly = serde_json::from_value(json).unwrap();
        assert_eq!(back, anomaly);
    }

    #[test]
    fn test_document_level_has_null_index() {
        let anomaly = Anomaly {
            chunk_index: None,
            reason: "Required clauses not found in document".into(),
            detail: AnomalyDetail::MissingRequiredClause {
                missing_clauses: vec!["Payment".into(), "Liability".into()],
            },
        };
        let json = serde_json::to_value(&anomaly).unwrap();
        assert!(json["chunkIndex"].is_null());
        assert!(anomaly.is_document_level());
        assert_eq!(anomaly.describe(), "Missing required clauses: Payment, Liability");
    }

    #[test]
    fn test_describe_formats_scores_compactly() {
        let anomaly = Anomaly {
            chunk_index: Some(0),
            reason: String::new(),
            detail: AnomalyDetail::HighRiskClause {
                clause_type: "Liability".into(),
                risk_score: 1.0,
                threshold: 0.66,
            },
        };
        assert_eq!(anomaly.describe(), "High risk clause (risk score: 1)");
        assert_eq!(anomaly.kind(), "high_risk_clause");
    }
}
