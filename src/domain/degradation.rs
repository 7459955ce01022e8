//! Records of stages that fell back to a local default.

use serde::{Deserialize, Serialize};

/// Why a stage fell back to its local default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// No capability configured (offline mode, missing credentials)
    NotConfigured,
    /// The capability did not answer within its time budget
    Timeout,
    /// Network failure or non-success HTTP status
    Unavailable,
    /// The response matched none of the known shapes
    UnrecognizedResponse,
    /// The capability answered with nothing usable
    EmptyResult,
}

/// Pipeline stage that can degrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Classification,
    ClauseSummary,
    DocumentSummary,
}

/// Record of one degraded stage, reported alongside the analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Degradation {
    pub stage: Stage,
    /// Chunk the stage ran for; `None` for document-level stages
    pub chunk_index: Option<usize>,
    pub reason: FallbackReason,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degradation_json() {
        let degradation = Degradation {
            stage: Stage::ClauseSummary,
            chunk_index: Some(2),
            reason: FallbackReason::NotConfigured,
        };
        let json = serde_json::to_value(&degradation).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "stage": "clause_summary",
                "chunkIndex": 2,
                "reason": "not_configured"
            })
        );
    }
}
