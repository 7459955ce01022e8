//! Adapter interfaces for external capabilities.
//!
//! The pipeline consumes three capabilities through traits so it never
//! depends on a concrete transport:
//! - `ZeroShotClassifier`: ranks candidate labels for a text
//! - `Summarizer`: abstractive summary within a length budget
//! - `TextExtractor`: plain text from an uploaded document
//!
//! Fraud screening is a separate path (`forensics`) and does not touch the
//! analysis pipeline.

pub mod extraction;
pub mod forensics;
pub mod huggingface;
pub mod shapes;

#[cfg(test)]
mod stalled_server;

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use extraction::{extractor_for, HttpTextExtractor, PlainTextExtractor};
pub use forensics::{ForensicsClient, ForensicsError, ScreeningReport};
pub use huggingface::HuggingFaceClient;

/// Failure of an external capability call.
#[derive(Debug, Error)]
pub enum CapabilityError {
    #[error("{0} is not configured")]
    NotConfigured(String),

    #[error("capability call timed out after {after:?}")]
    Timeout { after: Duration },

    #[error("capability returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("capability transport error: {0}")]
    Transport(String),

    #[error("unrecognized capability response: {0}")]
    MalformedResponse(String),

    #[error("capability returned an empty result")]
    EmptyResult,
}

impl From<reqwest::Error> for CapabilityError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            // reqwest does not expose the configured budget on the error
            CapabilityError::Timeout {
                after: Duration::ZERO,
            }
        } else if let Some(status) = err.status() {
            CapabilityError::Http {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else {
            CapabilityError::Transport(err.to_string())
        }
    }
}

/// One candidate label with the model's confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

impl LabelScore {
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Zero-shot text classification
#[async_trait]
pub trait ZeroShotClassifier: Send + Sync {
    /// Human-readable capability name
    fn name(&self) -> &str;

    /// Rank `labels` for `text`, best first
    async fn classify(
        &self,
        text: &str,
        labels: &[String],
    ) -> Result<Vec<LabelScore>, CapabilityError>;
}

/// Abstractive summarization
#[async_trait]
pub trait Summarizer: Send + Sync {
    fn name(&self) -> &str;

    /// Summarize `text`; lengths are the model's token bounds
    async fn summarize(
        &self,
        text: &str,
        max_length: usize,
        min_length: usize,
    ) -> Result<String, CapabilityError>;
}

/// Plain-text extraction from documents (PDF, images, text files)
#[async_trait]
pub trait TextExtractor: Send + Sync {
    fn name(&self) -> &str;

    async fn extract(&self, path: &Path) -> Result<String, CapabilityError>;
}

/// Stand-in for a capability that is switched off (offline mode, no token).
///
/// Every call fails with `NotConfigured`, which the pipeline turns into
/// its local fallback.
#[derive(Debug, Clone, Default)]
pub struct Disabled;

#[async_trait]
impl ZeroShotClassifier for Disabled {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn classify(
        &self,
        _text: &str,
        _labels: &[String],
    ) -> Result<Vec<LabelScore>, CapabilityError> {
        Err(CapabilityError::NotConfigured("zero-shot classifier".into()))
    }
}

#[async_trait]
impl Summarizer for Disabled {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn summarize(
        &self,
        _text: &str,
        _max_length: usize,
        _min_length: usize,
    ) -> Result<String, CapabilityError> {
        Err(CapabilityError::NotConfigured("summarizer".into()))
    }
}

#[async_trait]
impl TextExtractor for Disabled {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn extract(&self, _path: &Path) -> Result<String, CapabilityError> {
        Err(CapabilityError::NotConfigured("text extractor".into()))
    }
}
