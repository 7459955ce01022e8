//! Error taxonomy for the analysis pipeline.
//!
//! Three kinds reach the caller:
//! - `Validation`: malformed or empty input (400)
//! - `Upstream`: a required external service is unavailable (503)
//! - `Internal`: anything unexpected (500)
//!
//! Capability failures inside classification and summarization never show
//! up here; they degrade to local fallbacks instead.

use thiserror::Error;

use crate::adapters::CapabilityError;

/// Input that cannot be analysed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid request: text field is required and must be a non-empty string")]
    EmptyText,

    #[error("Invalid request: text contains no readable content")]
    NoContent,

    #[error("Invalid request: input too large: {actual} bytes > {limit} bytes")]
    TooLarge { actual: usize, limit: usize },

    #[error("Invalid request: chunks field is required and must be a non-empty array")]
    NoChunks,

    #[error("Invalid chunk at index {index}: text field is required and must be a string")]
    InvalidChunk { index: usize },

    #[error("Invalid request: no clauses could be segmented from the text")]
    NoClauses,
}

/// Error returned by pipeline entry points
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{service} is unavailable: {source}")]
    Upstream {
        service: &'static str,
        #[source]
        source: CapabilityError,
    },

    #[error("internal error: {0}")]
    Internal(String),
}

impl AnalysisError {
    pub fn upstream(service: &'static str, source: CapabilityError) -> Self {
        AnalysisError::Upstream { service, source }
    }

    /// HTTP status the error maps to
    pub fn status_code(&self) -> u16 {
        match self {
            AnalysisError::Validation(_) => 400,
            AnalysisError::Upstream { .. } => 503,
            AnalysisError::Internal(_) => 500,
        }
    }

    /// Short label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::Validation(_) => "validation",
            AnalysisError::Upstream { .. } => "upstream",
            AnalysisError::Internal(_) => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AnalysisError::from(ValidationError::EmptyText).status_code(), 400);
        assert_eq!(
            AnalysisError::upstream("text extraction", CapabilityError::EmptyResult).status_code(),
            503
        );
        assert_eq!(AnalysisError::Internal("boom".into()).status_code(), 500);
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ValidationError::InvalidChunk { index: 2 }.to_string(),
            "Invalid chunk at index 2: text field is required and must be a string"
        );
        let err = AnalysisError::upstream(
            "text extraction",
            CapabilityError::Http {
                status: 502,
                body: "bad gateway".into(),
            },
        );
        assert_eq!(
            err.to_string(),
            "text extraction is unavailable: capability returned HTTP 502: bad gateway"
        );
        assert_eq!(err.kind(), "upstream");
    }
}
