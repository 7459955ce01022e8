//! Clause and document summaries.
//!
//! Abstractive summaries come from the `Summarizer` capability within a
//! length budget derived from the input size. When the capability is off,
//! slow or returns nothing, an extractive summary (leading sentences) is
//! used instead and the outcome is marked degraded.
//!
//! This module also aggregates the document-level risk figures and writes
//! the narrative shown at the top of a report.

use std::collections::HashSet;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::adapters::{CapabilityError, Summarizer};
use crate::domain::clause_types::GENERAL;
use crate::domain::{Anomaly, ClassifiedChunk, DocumentSummary, RiskLevel};

use super::anomalies::missing_required;
use super::outcome::{FallbackReason, Outcome};
use super::risk::round2;

/// Summary of blank input
pub const NO_CONTENT_SUMMARY: &str = "No content available for summarization.";

/// Narrative used when nothing else can be said
pub const EMPTY_NARRATIVE: &str = "Document analysis completed.";

/// Clause types listed by name in the narrative
const KEY_CLAUSES_SHOWN: usize = 5;

static SENTENCE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+").expect("valid sentence end regex"));

/// Length bounds for one summary and the matching extractive fallback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryBudget {
    /// Model token bounds
    pub max_length: usize,
    pub min_length: usize,
    /// Share of sentences kept by the extractive fallback
    extract_share: f64,
    max_sentences: usize,
    /// Prefix length used when no sentence survives
    fallback_chars: usize,
}

impl SummaryBudget {
    /// Budget for a whole document of `text_len` characters
    pub fn document(text_len: usize) -> Self {
        let max_length = (text_len / 20).clamp(50, 200);
        Self {
            max_length,
            min_length: (max_length / 3).clamp(10, 30),
            extract_share: 0.2,
            max_sentences: 5,
            fallback_chars: 200,
        }
    }

    /// Budget for a single clause of `text_len` characters
    pub fn clause(text_len: usize) -> Self {
        let max_length = (text_len / 10).clamp(30, 100);
        Self {
            max_length,
            min_length: (max_length / 3).clamp(10, 20),
            extract_share: 0.3,
            max_sentences: 3,
            fallback_chars: 150,
        }
    }
}

/// Leading sentences of `text`, sized by the budget.
///
/// Never empty for non-blank input.
pub fn extractive_summary(text: &str, budget: &SummaryBudget) -> String {
    let text = text.trim();
    if text.is_empty() {
        return NO_CONTENT_SUMMARY.to_string();
    }

    let sentences: Vec<&str> = SENTENCE_END
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if sentences.is_empty() {
        return text.chars().take(budget.fallback_chars).collect();
    }

    let wanted = (sentences.len() as f64 * budget.extract_share).ceil() as usize;
    let count = wanted.clamp(1, budget.max_sentences);
    format!("{}.", sentences[..count.min(sentences.len())].join(". "))
}

async fn summarize_with_model(
    model: &dyn Summarizer,
    text: &str,
    budget: &SummaryBudget,
    timeout: Duration,
) -> Result<String, CapabilityError> {
    let summary = tokio::time::timeout(
        timeout,
        model.summarize(text, budget.max_length, budget.min_length),
    )
    .await
    .map_err(|_| CapabilityError::Timeout { after: timeout })??;

    let summary = summary.trim();
    if summary.is_empty() {
        return Err(CapabilityError::EmptyResult);
    }
    Ok(summary.to_string())
}

/// Summarize `text`, falling back to an extractive summary
pub async fn summarize(
    model: &dyn Summarizer,
    text: &str,
    budget: SummaryBudget,
    timeout: Duration,
) -> Outcome<String> {
    if text.trim().is_empty() {
        return Outcome::Ok(NO_CONTENT_SUMMARY.to_string());
    }

    match summarize_with_model(model, text, &budget, timeout).await {
        Ok(summary) => Outcome::Ok(summary),
        Err(e) => {
            let reason = FallbackReason::from(&e);
            if reason == FallbackReason::NotConfigured {
                debug!("Summarizer not configured, using extractive summary");
            } else {
                warn!(model = model.name(), error = %e, "Summarization failed, using extractive summary");
            }
            Outcome::degraded(extractive_summary(text, &budget), reason)
        }
    }
}

/// Mean risk and missing required clauses over the classified chunks
pub fn compute_document_summary(chunks: &[ClassifiedChunk]) -> DocumentSummary {
    if chunks.is_empty() {
        return DocumentSummary {
            overall_risk_score: 0.0,
            missing_clauses: missing_required(chunks),
        };
    }

    let mean = chunks.iter().map(|c| c.risk_score).sum::<f64>() / chunks.len() as f64;
    DocumentSummary {
        overall_risk_score: round2(mean).clamp(0.0, 1.0),
        missing_clauses: missing_required(chunks),
    }
}

/// Human-readable narrative for the top of a report.
///
/// Parts, in order: the abstractive summary, the key clause types, the
/// overall risk level, the high-risk clause count, missing clauses and
/// document-level issues.
pub fn compose_narrative(
    summary_text: &str,
    chunks: &[ClassifiedChunk],
    summary: &DocumentSummary,
    anomalies: &[Anomaly],
) -> String {
    let mut parts: Vec<String> = Vec::new();

    let summary_text = summary_text.trim();
    if !summary_text.is_empty() {
        parts.push(summary_text.to_string());
    }

    let mut seen = HashSet::new();
    let key_types: Vec<&str> = chunks
        .iter()
        .map(|c| c.clause_type.as_str())
        .filter(|t| *t != GENERAL && seen.insert(*t))
        .collect();
    if !key_types.is_empty() {
        let shown = key_types[..key_types.len().min(KEY_CLAUSES_SHOWN)].join(", ");
        let more = if key_types.len() > KEY_CLAUSES_SHOWN { "..." } else { "" };
        parts.push(format!("Key clauses identified: {}{}.", shown, more));
    }

    parts.push(format!(
        "Overall risk level: {}.",
        RiskLevel::from_score(summary.overall_risk_score)
    ));

    let high = chunks
        .iter()
        .filter(|c| c.risk_level == RiskLevel::High)
        .count();
    if high > 0 {
        let noun = if high > 1 { "clauses" } else { "clause" };
        parts.push(format!("{} high-risk {} detected.", high, noun));
    }

    if !summary.missing_clauses.is_empty() {
        parts.push(format!(
            "Missing required clauses: {}.",
            summary.missing_clauses.join(", ")
        ));
    }

    let issues: Vec<String> = anomalies
        .iter()
        .filter(|a| a.is_document_level())
        .map(Anomaly::describe)
        .collect();
    if !issues.is_empty() {
        parts.push(format!("Potential issues: {}.", issues.join("; ")));
    }

    let narrative = parts.join(" ");
    if narrative.trim().is_empty() {
        EMPTY_NARRATIVE.to_string()
    } else {
        narrative
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::Disabled;
    use crate::domain::clause_types::*;
    use crate::domain::{AnomalyDetail, ClauseChunk, SectionType};
    use async_trait::async_trait;

    const BUDGET: Duration = Duration::from_secs(1);

    struct Echo(&'static str);

    #[async_trait]
    impl Summarizer for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        async fn summarize(
            &self,
            _text: &str,
            _max_length: usize,
            _min_length: usize,
        ) -> Result<String, CapabilityError> {
            Ok(self.0.to_string())
        }
    }

    fn chunk(index: usize, clause_type: &str, risk_score: f64) -> ClassifiedChunk {
        ClassifiedChunk::scored(
            ClauseChunk {
                index,
                section_title: "PREAMBLE".to_string(),
                section_type: SectionType::Preamble,
                parent_section: None,
                text: "Text.".to_string(),
            },
            clause_type,
            risk_score,
        )
    }

    #[test]
    fn test_budgets() {
        assert_eq!(SummaryBudget::document(100).max_length, 50);
        assert_eq!(SummaryBudget::document(100).min_length, 16);
        assert_eq!(SummaryBudget::document(100_000).max_length, 200);
        assert_eq!(SummaryBudget::document(100_000).min_length, 30);
        assert_eq!(SummaryBudget::clause(50).max_length, 30);
        assert_eq!(SummaryBudget::clause(50).min_length, 10);
        assert_eq!(SummaryBudget::clause(5_000).min_length, 20);
    }

    #[test]
    fn test_extractive_summary() {
        let text = "One. Two. Three. Four. Five. Six. Seven.";
        // 30% of 7 rounds up to 3
        assert_eq!(extractive_summary(text, &SummaryBudget::clause(text.len())), "One. Two. Three.");
        // 20% of 7 rounds up to 2
        assert_eq!(extractive_summary(text, &SummaryBudget::document(text.len())), "One. Two.");
        assert_eq!(extractive_summary("Only one", &SummaryBudget::clause(8)), "Only one.");
        assert_eq!(extractive_summary("...", &SummaryBudget::clause(3)), "...");
        assert_eq!(extractive_summary(" ", &SummaryBudget::clause(1)), NO_CONTENT_SUMMARY);
    }

    #[tokio::test]
    async fn test_summarize_prefers_model() {
        let model = Echo("  A short summary. ");
        let outcome = summarize(&model, "Long text here.", SummaryBudget::clause(15), BUDGET).await;
        assert_eq!(outcome, Outcome::Ok("A short summary.".to_string()));
    }

    #[tokio::test]
    async fn test_summarize_falls_back() {
        let text = "First point. Second point.";
        let outcome = summarize(&Disabled, text, SummaryBudget::clause(text.len()), BUDGET).await;
        assert_eq!(
            outcome,
            Outcome::degraded("First point.".to_string(), FallbackReason::NotConfigured)
        );

        let outcome = summarize(&Echo("   "), text, SummaryBudget::clause(text.len()), BUDGET).await;
        assert_eq!(outcome.reason(), Some(FallbackReason::EmptyResult));
    }

    #[test]
    fn test_document_summary() {
        let chunks = vec![chunk(0, TERMINATION, 0.6), chunk(1, PAYMENT, 0.3)];
        let summary = compute_document_summary(&chunks);
        assert_eq!(summary.overall_risk_score, 0.45);
        assert_eq!(
            summary.missing_clauses,
            vec![CONFIDENTIALITY, LIABILITY, GOVERNING_LAW, FORCE_MAJEURE]
        );

        let empty = compute_document_summary(&[]);
        assert_eq!(empty.overall_risk_score, 0.0);
        assert_eq!(empty.missing_clauses.len(), crate::domain::REQUIRED_CLAUSES.len());
    }

    #[test]
    fn test_narrative() {
        let chunks = vec![chunk(0, TERMINATION, 1.0)];
        let summary = DocumentSummary {
            overall_risk_score: 1.0,
            missing_clauses: vec![PAYMENT.to_string(), LIABILITY.to_string()],
        };
        let anomalies = vec![Anomaly {
            chunk_index: None,
            reason: "Required clauses not found in document".to_string(),
            detail: AnomalyDetail::MissingRequiredClause {
                missing_clauses: summary.missing_clauses.clone(),
            },
        }];

        let narrative = compose_narrative("Either party may end it.", &chunks, &summary, &anomalies);
        assert_eq!(
            narrative,
            "Either party may end it. Key clauses identified: Termination. \
             Overall risk level: High. 1 high-risk clause detected. \
             Missing required clauses: Payment, Liability. \
             Potential issues: Missing required clauses: Payment, Liability."
        );
    }

    #[test]
    fn test_narrative_truncates_key_clauses() {
        let types = [SCOPE, NOTICE, WAIVER, AMENDMENT, ASSIGNMENT, SEVERABILITY, GENERAL];
        let chunks: Vec<ClassifiedChunk> = types
            .iter()
            .enumerate()
            .map(|(i, t)| chunk(i, t, 0.1))
            .collect();
        let narrative = compose_narrative("", &chunks, &DocumentSummary::default(), &[]);
        assert_eq!(
            narrative,
            "Key clauses identified: Scope, Notice, Waiver, Amendment, Assignment.... \
             Overall risk level: Low."
        );
    }
}
