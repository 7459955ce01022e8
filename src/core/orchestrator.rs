//! Pipeline orchestration.
//!
//! Sequences the stages for one document:
//! normalize → segment → classify → extract entities → score risk →
//! summarize clauses → detect anomalies → summarize document → narrative.
//!
//! Each invocation is independent. Capability calls for different chunks
//! run concurrently up to `max_concurrency`; results are reassembled in
//! input order.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::adapters::{Disabled, HuggingFaceClient, Summarizer, ZeroShotClassifier};
use crate::config::{AnalysisSettings, Settings};
use crate::domain::clause_types::GENERAL;
use crate::domain::{
    ChunkInput, ClassifiedChunk, ClauseChunk, DocumentProfile, DocumentReport, PreprocessedChunk,
    RiskLevel, SectionType,
};

use super::anomalies::detect_anomalies;
use super::classifier::{classify, related_clause_types};
use super::entities::extract_entities;
use super::error::{AnalysisError, ValidationError};
use super::metadata::profile_document;
use super::normalizer::normalize;
use super::outcome::{Degradation, Outcome, Stage};
use super::risk::score_risk;
use super::segmenter::Segmenter;
use super::summarizer::{compose_narrative, compute_document_summary, summarize, SummaryBudget};

/// Section title for chunks submitted without one
const UNTITLED_SECTION: &str = "UNTITLED";

/// Output of the preprocessing stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preprocessed {
    pub document: DocumentProfile,
    pub chunks: Vec<PreprocessedChunk>,
    #[serde(default)]
    pub degradations: Vec<Degradation>,
}

/// The analysis pipeline with its injected capabilities.
pub struct Pipeline {
    classifier: Arc<dyn ZeroShotClassifier>,
    summarizer: Arc<dyn Summarizer>,
    segmenter: Segmenter,
    analysis: AnalysisSettings,
    /// Budget for every single capability call
    call_timeout: Duration,
}

impl Pipeline {
    pub fn new(
        classifier: Arc<dyn ZeroShotClassifier>,
        summarizer: Arc<dyn Summarizer>,
        analysis: AnalysisSettings,
        call_timeout: Duration,
    ) -> Self {
        Self {
            classifier,
            summarizer,
            segmenter: Segmenter::new(analysis.max_tokens_per_chunk),
            analysis,
            call_timeout,
        }
    }

    /// Pipeline with no model capabilities; every model stage falls back
    pub fn offline(analysis: AnalysisSettings) -> Self {
        Self::new(
            Arc::new(Disabled),
            Arc::new(Disabled),
            analysis,
            Duration::from_secs(1),
        )
    }

    /// Build the pipeline from resolved settings.
    ///
    /// Without a token (or with `offline`) the model stages are disabled
    /// and the pipeline runs on patterns and extractive summaries alone.
    pub fn from_settings(settings: &Settings, offline: bool) -> Self {
        let timeout = settings.inference.timeout;

        if offline {
            info!("Offline mode, model capabilities disabled");
            return Self::offline(settings.analysis.clone());
        }

        if settings.inference.api_token.is_none() {
            info!("No inference token configured, model capabilities disabled");
            return Self::offline(settings.analysis.clone());
        }

        match HuggingFaceClient::new(&settings.inference) {
            Ok(client) => {
                let client = Arc::new(client);
                Self::new(client.clone(), client, settings.analysis.clone(), timeout)
            }
            Err(e) => {
                warn!(error = %e, "Inference client unavailable, model capabilities disabled");
                Self::offline(settings.analysis.clone())
            }
        }
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.analysis
    }

    fn check_size(&self, text: &str) -> Result<(), ValidationError> {
        if text.len() > self.analysis.max_input_bytes {
            return Err(ValidationError::TooLarge {
                actual: text.len(),
                limit: self.analysis.max_input_bytes,
            });
        }
        Ok(())
    }

    /// Normalize, segment and classify raw document text.
    #[instrument(skip(self, raw), fields(bytes = raw.len()))]
    pub async fn preprocess(&self, raw: &str) -> Result<Preprocessed, AnalysisError> {
        self.check_size(raw)?;
        let text = normalize(raw)?;

        let chunks = self.segmenter.segment(&text);
        if chunks.is_empty() {
            return Err(ValidationError::NoClauses.into());
        }
        debug!(chunks = chunks.len(), "Segmented document");

        let document = profile_document(&text, chunks.len());

        let classified: Vec<(PreprocessedChunk, Option<Degradation>)> = stream::iter(chunks)
            .map(|chunk| async move {
                let outcome = classify(self.classifier.as_ref(), &chunk.text, self.call_timeout).await;
                let degradation = outcome.reason().map(|reason| Degradation {
                    stage: Stage::Classification,
                    chunk_index: Some(chunk.index),
                    reason,
                });
                let pre = PreprocessedChunk {
                    chunk,
                    clause_type: outcome.into_value(),
                };
                (pre, degradation)
            })
            .buffered(self.concurrency())
            .collect()
            .await;

        let mut chunks = Vec::with_capacity(classified.len());
        let mut degradations = Vec::new();
        for (chunk, degradation) in classified {
            chunks.push(chunk);
            degradations.extend(degradation);
        }

        info!(
            title = %document.title,
            document_type = %document.document_type,
            chunks = chunks.len(),
            "Preprocessing complete"
        );

        Ok(Preprocessed {
            document,
            chunks,
            degradations,
        })
    }

    /// Full analysis of raw document text
    #[instrument(skip(self, raw), fields(bytes = raw.len()))]
    pub async fn analyze_text(&self, raw: &str) -> Result<DocumentReport, AnalysisError> {
        let pre = self.preprocess(raw).await?;
        let inputs = pre.chunks.into_iter().map(ChunkInput::from).collect();

        // preprocessing already classified every chunk, General included
        let mut report = self.analyze_inputs(inputs, true).await?;
        report.document = Some(pre.document);

        let mut degradations = pre.degradations;
        degradations.append(&mut report.degradations);
        report.degradations = degradations;
        Ok(report)
    }

    /// Semantic analysis of already segmented chunks.
    ///
    /// A chunk's clause type is reused when it is set to anything other
    /// than `General`; otherwise the chunk is classified again.
    #[instrument(skip(self, inputs), fields(chunks = inputs.len()))]
    pub async fn analyze_chunks(
        &self,
        inputs: Vec<ChunkInput>,
    ) -> Result<DocumentReport, AnalysisError> {
        self.analyze_inputs(inputs, false).await
    }

    async fn analyze_inputs(
        &self,
        inputs: Vec<ChunkInput>,
        trust_general: bool,
    ) -> Result<DocumentReport, AnalysisError> {
        if inputs.is_empty() {
            return Err(ValidationError::NoChunks.into());
        }
        for (position, input) in inputs.iter().enumerate() {
            if input.text.trim().is_empty() {
                return Err(ValidationError::InvalidChunk { index: position }.into());
            }
        }
        let total: usize = inputs.iter().map(|i| i.text.len()).sum();
        if total > self.analysis.max_input_bytes {
            return Err(ValidationError::TooLarge {
                actual: total,
                limit: self.analysis.max_input_bytes,
            }
            .into());
        }

        let request_id = Uuid::new_v4();
        info!(%request_id, "Starting semantic analysis");

        let analysed: Vec<(ClassifiedChunk, Vec<Degradation>)> = stream::iter(inputs.into_iter().enumerate())
            .map(|(position, input)| self.analyze_chunk(position, input, trust_general))
            .buffered(self.concurrency())
            .collect()
            .await;

        let mut clauses = Vec::with_capacity(analysed.len());
        let mut degradations = Vec::new();
        for (clause, mut chunk_degradations) in analysed {
            clauses.push(clause);
            degradations.append(&mut chunk_degradations);
        }

        let anomalies = detect_anomalies(&clauses);
        for clause in &mut clauses {
            clause.attach_anomalies(&anomalies);
        }

        let summary = compute_document_summary(&clauses);

        let joined = clauses
            .iter()
            .map(|c| c.text())
            .collect::<Vec<_>>()
            .join(" ");
        let budget = SummaryBudget::document(joined.chars().count());
        let document_summary =
            summarize(self.summarizer.as_ref(), &joined, budget, self.call_timeout).await;
        if let Some(reason) = document_summary.reason() {
            degradations.push(Degradation {
                stage: Stage::DocumentSummary,
                chunk_index: None,
                reason,
            });
        }

        let narrative = compose_narrative(
            document_summary.value(),
            &clauses,
            &summary,
            &anomalies,
        );

        info!(
            %request_id,
            clauses = clauses.len(),
            anomalies = anomalies.len(),
            overall_risk = summary.overall_risk_score,
            degraded = degradations.len(),
            "Semantic analysis complete"
        );

        Ok(DocumentReport {
            request_id,
            generated_at: chrono::Utc::now(),
            clauses,
            document_summary: narrative,
            overall_risk_score: summary.overall_risk_score,
            overall_risk_level: RiskLevel::from_score(summary.overall_risk_score),
            missing_clauses: summary.missing_clauses,
            anomalies,
            document: None,
            degradations,
        })
    }

    async fn analyze_chunk(
        &self,
        position: usize,
        input: ChunkInput,
        trust_general: bool,
    ) -> (ClassifiedChunk, Vec<Degradation>) {
        let index = input.index.unwrap_or(position);
        let mut degradations = Vec::new();

        let clause_type = match input.clause_type.as_deref().map(str::trim) {
            Some(known) if !known.is_empty() && (trust_general || known != GENERAL) => {
                Outcome::Ok(known.to_string())
            }
            _ => classify(self.classifier.as_ref(), &input.text, self.call_timeout).await,
        };
        if let Some(reason) = clause_type.reason() {
            degradations.push(Degradation {
                stage: Stage::Classification,
                chunk_index: Some(index),
                reason,
            });
        }
        let clause_type = clause_type.into_value();

        let entities = extract_entities(&input.text);
        let risk_score = score_risk(&clause_type, &input.text, &entities);
        let related_clause_types = related_clause_types(&input.text, &clause_type);

        let budget = SummaryBudget::clause(input.text.chars().count());
        let summary = summarize(self.summarizer.as_ref(), &input.text, budget, self.call_timeout).await;
        if let Some(reason) = summary.reason() {
            degradations.push(Degradation {
                stage: Stage::ClauseSummary,
                chunk_index: Some(index),
                reason,
            });
        }

        let chunk = ClauseChunk {
            index,
            section_title: input
                .section_title
                .unwrap_or_else(|| UNTITLED_SECTION.to_string()),
            section_type: input.section_type.unwrap_or(SectionType::Standard),
            parent_section: input.parent_section,
            text: input.text,
        };

        let clause = ClassifiedChunk {
            chunk,
            clause_type,
            risk_score,
            risk_level: RiskLevel::from_score(risk_score),
            summary: summary.into_value(),
            entities,
            related_clause_types,
            anomalies: Vec::new(),
        };
        (clause, degradations)
    }

    fn concurrency(&self) -> usize {
        self.analysis.max_concurrency.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{CapabilityError, LabelScore};
    use crate::core::outcome::FallbackReason;
    use crate::domain::clause_types::*;
    use async_trait::async_trait;

    struct FixedLabel(&'static str);

    #[async_trait]
    impl ZeroShotClassifier for FixedLabel {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn classify(
            &self,
            _text: &str,
            _labels: &[String],
        ) -> Result<Vec<LabelScore>, CapabilityError> {
            Ok(vec![LabelScore::new(self.0, 0.9)])
        }
    }

    struct Constant(&'static str);

    #[async_trait]
    impl Summarizer for Constant {
        fn name(&self) -> &str {
            "constant"
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

    fn offline() -> Pipeline {
        Pipeline::offline(AnalysisSettings::default())
    }

    #[tokio::test]
    async fn test_preprocess_rejects_blank_text() {
        let err = offline().preprocess("   \n ").await.unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(matches!(
            err,
            AnalysisError::Validation(ValidationError::EmptyText)
        ));
    }

    #[tokio::test]
    async fn test_preprocess_rejects_oversized_input() {
        let pipeline = Pipeline::offline(AnalysisSettings {
            max_input_bytes: 10,
            ..AnalysisSettings::default()
        });
        let err = pipeline.preprocess("TERMINATION. Far too long.").await.unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Validation(ValidationError::TooLarge { limit: 10, .. })
        ));
    }

    #[tokio::test]
    async fn test_preprocess_classifies_by_pattern() {
        let pre = offline()
            .preprocess("TERMINATION. Either party may terminate this agreement upon 5 days written notice.")
            .await
            .unwrap();
        assert_eq!(pre.chunks.len(), 1);
        assert_eq!(pre.chunks[0].clause_type, TERMINATION);
        assert!(pre.degradations.is_empty());
    }

    #[tokio::test]
    async fn test_analyze_chunks_validates_input() {
        let err = offline().analyze_chunks(Vec::new()).await.unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Validation(ValidationError::NoChunks)
        ));

        let err = offline()
            .analyze_chunks(vec![ChunkInput::from_text("Fine."), ChunkInput::from_text(" ")])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Validation(ValidationError::InvalidChunk { index: 1 })
        ));
    }

    #[tokio::test]
    async fn test_trusted_clause_type_skips_classification() {
        let pipeline = Pipeline::new(
            Arc::new(FixedLabel("Waiver")),
            Arc::new(Constant("Short.")),
            AnalysisSettings::default(),
            Duration::from_secs(1),
        );
        let mut input = ChunkInput::from_text("The parties agree on the following.");
        input.clause_type = Some(PAYMENT.to_string());

        let report = pipeline.analyze_chunks(vec![input]).await.unwrap();
        assert_eq!(report.clauses[0].clause_type, PAYMENT);
        assert_eq!(report.clauses[0].summary, "Short.");
        assert!(report.degradations.is_empty());
    }

    #[tokio::test]
    async fn test_general_chunks_go_to_the_model() {
        let pipeline = Pipeline::new(
            Arc::new(FixedLabel("preamble")),
            Arc::new(Constant("Short.")),
            AnalysisSettings::default(),
            Duration::from_secs(1),
        );
        let mut input = ChunkInput::from_text("The parties agree on the following.");
        input.clause_type = Some(GENERAL.to_string());

        let report = pipeline.analyze_chunks(vec![input]).await.unwrap();
        assert_eq!(report.clauses[0].clause_type, INTRODUCTION);
    }

    #[tokio::test]
    async fn test_offline_analysis_records_degradations() {
        let report = offline()
            .analyze_chunks(vec![ChunkInput::from_text("The parties agree on the following.")])
            .await
            .unwrap();

        assert_eq!(report.clauses[0].clause_type, GENERAL);
        let stages: Vec<Stage> = report.degradations.iter().map(|d| d.stage).collect();
        assert_eq!(
            stages,
            vec![Stage::Classification, Stage::ClauseSummary, Stage::DocumentSummary]
        );
        assert!(report
            .degradations
            .iter()
            .all(|d| d.reason == FallbackReason::NotConfigured));
    }

    #[tokio::test]
    async fn test_index_defaults_to_position() {
        let mut second = ChunkInput::from_text("Payment is due monthly.");
        second.index = Some(7);
        let report = offline()
            .analyze_chunks(vec![ChunkInput::from_text("Confidential information stays secret."), second])
            .await
            .unwrap();
        let indices: Vec<usize> = report.clauses.iter().map(|c| c.index()).collect();
        assert_eq!(indices, vec![0, 7]);
        assert_eq!(report.clauses[0].chunk.section_title, UNTITLED_SECTION);
    }

    #[tokio::test]
    async fn test_analyze_text_attaches_profile() {
        let report = offline()
            .analyze_text("SERVICE AGREEMENT\nCONFIDENTIALITY. All information shall be kept confidential.")
            .await
            .unwrap();
        let document = report.document.as_ref().unwrap();
        assert_eq!(document.title, "SERVICE AGREEMENT");
        assert!(report
            .clauses
            .iter()
            .any(|c| c.clause_type == CONFIDENTIALITY));
    }

    #[tokio::test]
    async fn test_analyze_text_classifies_once() {
        let report = offline()
            .analyze_text("The parties agree on the following.")
            .await
            .unwrap();
        let stages: Vec<Stage> = report.degradations.iter().map(|d| d.stage).collect();
        assert_eq!(
            stages,
            vec![Stage::Classification, Stage::ClauseSummary, Stage::DocumentSummary]
        );
    }
}
