//! Request/response contract for the analysis endpoints.
//!
//! Handlers take the parsed JSON request body and return an `ApiReply`:
//! an HTTP status plus the JSON envelope
//! - success: `{ "success": true, "message": ..., "data": ... }`
//! - failure: `{ "success": false, "message": ..., "error": ... }`
//!
//! No transport is bound here; the CLI prints replies and any HTTP layer
//! can forward them verbatim.

use std::path::Path;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::adapters::TextExtractor;
use crate::core::{AnalysisError, Pipeline, ValidationError};
use crate::domain::ChunkInput;

/// Status code and JSON body of one response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiReply {
    pub status: u16,
    pub body: Value,
}

impl ApiReply {
    pub fn ok(message: &str, data: impl Serialize) -> Self {
        match serde_json::to_value(data) {
            Ok(data) => Self {
                status: 200,
                body: json!({ "success": true, "message": message, "data": data }),
            },
            Err(e) => Self::failure(500, "Internal server error", &e.to_string()),
        }
    }

    pub fn failure(status: u16, message: &str, error: &str) -> Self {
        Self {
            status,
            body: json!({ "success": false, "message": message, "error": error }),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Short machine-facing description of a validation failure
fn validation_detail(err: &ValidationError) -> String {
    match err {
        ValidationError::EmptyText => "Missing or empty text field".to_string(),
        ValidationError::NoContent => "Text is empty after normalization".to_string(),
        ValidationError::TooLarge { .. } => "Input too large".to_string(),
        ValidationError::NoChunks => "Missing or empty chunks array".to_string(),
        ValidationError::InvalidChunk { index } => {
            format!("Invalid chunk structure at index {}", index)
        }
        ValidationError::NoClauses => "No clauses found".to_string(),
    }
}

/// Map a pipeline error to a reply; `operation` names the failed step
fn error_reply(err: &AnalysisError, operation: &str) -> ApiReply {
    match err {
        AnalysisError::Validation(v) => {
            warn!(error = %v, %operation, "Rejected request");
            ApiReply::failure(400, &v.to_string(), &validation_detail(v))
        }
        AnalysisError::Upstream { .. } => {
            warn!(error = %err, %operation, "Upstream service unavailable");
            ApiReply::failure(503, "External service unavailable", &err.to_string())
        }
        AnalysisError::Internal(detail) => {
            error!(error = %detail, %operation, "Internal error");
            ApiReply::failure(
                500,
                &format!("Internal server error during {}", operation),
                detail,
            )
        }
    }
}

/// Non-blank string field of a request body
fn text_field<'a>(body: &'a Value, key: &str) -> Option<&'a str> {
    body.get(key)
        .and_then(Value::as_str)
        .filter(|text| !text.trim().is_empty())
}

/// `POST /preprocess` with `{ "text": ... }`
///
/// Answers 400 for missing, oversized or unsegmentable text and 500 for
/// unexpected failures. An unreachable classifier never produces 503 here:
/// the affected chunks fall back to the pattern tier and are listed under
/// `degradations` in a 200 reply.
pub async fn handle_preprocess(pipeline: &Pipeline, body: &Value) -> ApiReply {
    let Some(text) = text_field(body, "text") else {
        return error_reply(&ValidationError::EmptyText.into(), "preprocessing");
    };

    match pipeline.preprocess(text).await {
        Ok(pre) => {
            info!(chunks = pre.chunks.len(), "Preprocess request served");
            ApiReply::ok("Preprocessing completed successfully", pre)
        }
        Err(e) => error_reply(&e, "preprocessing"),
    }
}

/// Validate and decode the `chunks` array of an analysis request
fn parse_chunks(chunks: &Value) -> Result<Vec<ChunkInput>, ValidationError> {
    let items = chunks
        .as_array()
        .filter(|items| !items.is_empty())
        .ok_or(ValidationError::NoChunks)?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            if text_field(item, "text").is_none() {
                return Err(ValidationError::InvalidChunk { index });
            }
            serde_json::from_value(item.clone())
                .map_err(|_| ValidationError::InvalidChunk { index })
        })
        .collect()
}

/// `POST /analyze` with `{ "chunks": [...] }`, or `{ "text": ... }` for the
/// single-shot variant
pub async fn handle_analyze(pipeline: &Pipeline, body: &Value) -> ApiReply {
    let result = if let Some(chunks) = body.get("chunks") {
        match parse_chunks(chunks) {
            Ok(inputs) => pipeline.analyze_chunks(inputs).await,
            Err(e) => Err(e.into()),
        }
    } else if let Some(text) = text_field(body, "text") {
        pipeline.analyze_text(text).await
    } else {
        Err(ValidationError::NoChunks.into())
    };

    match result {
        Ok(report) => {
            info!(
                request_id = %report.request_id,
                clauses = report.clauses.len(),
                high_risk = report.high_risk_clauses().count(),
                "Analysis request served"
            );
            ApiReply::ok("Semantic analysis completed successfully", report)
        }
        Err(e) => error_reply(&e, "semantic analysis"),
    }
}

/// Extract text from an uploaded file; failures are upstream errors
pub async fn extract_document(
    extractor: &dyn TextExtractor,
    path: &Path,
) -> Result<String, AnalysisError> {
    extractor
        .extract(path)
        .await
        .map_err(|e| AnalysisError::upstream("text extraction", e))
}

/// `POST /extract` with an uploaded file
pub async fn handle_extract(extractor: &dyn TextExtractor, path: &Path) -> ApiReply {
    match extract_document(extractor, path).await {
        Ok(text) => ApiReply::ok("Data extracted successfully", json!({ "text": text })),
        Err(e) => error_reply(&e, "text extraction"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::Disabled;
    use crate::config::AnalysisSettings;

    fn pipeline() -> Pipeline {
        Pipeline::offline(AnalysisSettings::default())
    }

    #[tokio::test]
    async fn test_preprocess_requires_text() {
        for body in [json!({}), json!({"text": ""}), json!({"text": 42})] {
            let reply = handle_preprocess(&pipeline(), &body).await;
            assert_eq!(reply.status, 400);
            assert_eq!(reply.body["success"], false);
            assert_eq!(
                reply.body["message"],
                "Invalid request: text field is required and must be a non-empty string"
            );
        }
    }

    #[tokio::test]
    async fn test_preprocess_envelope() {
        let body = json!({"text": "PAYMENT TERMS. Invoices are payable within 30 days."});
        let reply = handle_preprocess(&pipeline(), &body).await;
        assert!(reply.is_success());
        assert_eq!(reply.body["message"], "Preprocessing completed successfully");
        assert_eq!(reply.body["data"]["chunks"][0]["clauseType"], "Payment");
        assert_eq!(reply.body["data"]["chunks"][0]["index"], 0);
    }

    #[tokio::test]
    async fn test_analyze_rejects_bad_chunks() {
        let reply = handle_analyze(&pipeline(), &json!({"chunks": []})).await;
        assert_eq!(reply.status, 400);
        assert_eq!(reply.body["error"], "Missing or empty chunks array");

        let reply = handle_analyze(&pipeline(), &json!({"chunks": "nope"})).await;
        assert_eq!(reply.status, 400);

        let body = json!({"chunks": [{"text": "Fine."}, {"clause_type": "Payment"}]});
        let reply = handle_analyze(&pipeline(), &body).await;
        assert_eq!(reply.status, 400);
        assert_eq!(
            reply.body["message"],
            "Invalid chunk at index 1: text field is required and must be a string"
        );
    }

    #[tokio::test]
    async fn test_analyze_accepts_text_variant() {
        let body = json!({"text": "TERMINATION. Either party may terminate this agreement upon 5 days written notice."});
        let reply = handle_analyze(&pipeline(), &body).await;
        assert!(reply.is_success());
        let data = &reply.body["data"];
        assert_eq!(data["clauses"][0]["clauseType"], "Termination");
        assert!(data["documentSummary"].as_str().unwrap().contains("Overall risk level"));
    }

    #[tokio::test]
    async fn test_extraction_failure_is_503() {
        let reply = handle_extract(&Disabled, Path::new("contract.pdf")).await;
        assert_eq!(reply.status, 503);
        assert_eq!(reply.body["message"], "External service unavailable");
    }
}
