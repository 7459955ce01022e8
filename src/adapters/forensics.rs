//! Fraud screening through a remote forensic-analysis API.
//!
//! Uploads PDFs and images together with a fixed examiner prompt. The
//! remote service has been inconsistent about the multipart layout it
//! accepts, so the client walks an ordered list of payload variants and
//! returns the first 2xx answer. Credential errors stop the walk early.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::config::ForensicsSettings;

use super::extraction::mime_for_path;

/// Largest accepted upload, per file
pub const MAX_FILE_BYTES: u64 = 200 * 1024 * 1024;

/// MIME types the forensic service accepts
pub const ALLOWED_MIME_TYPES: [&str; 6] = [
    "application/pdf",
    "image/jpeg",
    "image/png",
    "image/tiff",
    "image/webp",
    "image/bmp",
];

/// Multipart field names tried for the files, in order
const FILE_FIELDS: [&str; 9] = [
    "file",
    "files[]",
    "files",
    "document",
    "documents",
    "attachment",
    "attachments",
    "uploads",
    "upload",
];

/// Response fragments that mean retrying other layouts is pointless
const CREDENTIAL_ERRORS: [&str; 3] = [
    "invalid api key",
    "missing api key",
    "user data is required",
];

/// Examiner instructions sent with every screening request
pub const EXAMINER_PROMPT: &str = "\
Important: Make sure all JSON keys are in lower case and use underscores instead of spaces!

Objective:
Act as a specialized forensic document examiner. Analyze the provided document(s) for any indicators of fraud, forgery, tampering, or misrepresentation, considering visual, structural, content-based and (if possible) metadata-level evidence.

Categorize each indicator as High, Medium, or Low risk, and explain what the indicator is, where it was found, and why it is suspicious.

High-Risk Indicators:
1. Critical internal contradictions: totals that do not sum, out-of-order sequential numbering, impossible dates.
2. Cross-document contradictions: names, amounts, dates or addresses that disagree between related documents.
3. Evidence of digital tampering: misaligned text, white-out boxes, inconsistent compression, metadata inconsistent with the document's timeline.
4. Forged authenticity markers: pixelated or distorted logos and seals, pasted or unnatural signatures.

Medium-Risk Indicators:
1. Visual and formatting anomalies: font mismatches, uneven spacing or margins, inconsistent colors, broken borders.
2. Content and language anomalies: spelling or grammar errors, awkward phrasing, 'O' used for '0', generic descriptions.
3. Suspicious data patterns: excess round numbers, unusual dates or times, non-sequential identifiers.

Low-Risk Indicators:
1. Minor quality issues: degraded copies, low resolution in specific areas.
2. Vague or missing non-critical information: missing phone numbers, department names, printed names.
3. Unusual but plausible elements: outdated logos, unconventional layouts.

Required Output Format:
For each indicator give Risk Level, Fraud Category, Specific Finding, and Location & Explanation, grouped under High-Risk, Medium-Risk and Low-Risk Indicators.";

/// Failures of a screening request
#[derive(Debug, Error)]
pub enum ForensicsError {
    #[error("no files to screen")]
    NoFiles,

    #[error("forensic screening is not configured: {0} missing")]
    NotConfigured(&'static str),

    #[error("unsupported file type: {}", .0.display())]
    UnsupportedFile(PathBuf),

    #[error("{} is too large: {size} bytes > {limit} bytes", path.display())]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("remote API rejected the credentials (HTTP {status})")]
    Credentials { status: u16, body: Value },

    #[error("all {attempts} payload variants were rejected by the remote API")]
    AllVariantsRejected {
        attempts: usize,
        last_error: Option<String>,
    },
}

impl ForensicsError {
    /// HTTP status the error maps to
    pub fn status_code(&self) -> u16 {
        match self {
            ForensicsError::NoFiles
            | ForensicsError::UnsupportedFile(_)
            | ForensicsError::TooLarge { .. }
            | ForensicsError::Io { .. } => 400,
            ForensicsError::NotConfigured(_) => 500,
            ForensicsError::Credentials { .. } | ForensicsError::AllVariantsRejected { .. } => 502,
        }
    }
}

/// Successful screening answer, passed through as received
#[derive(Debug, Clone, Serialize)]
pub struct ScreeningReport {
    pub status: u16,
    /// Payload variant that was accepted (1-based)
    pub attempt: usize,
    pub body: Value,
}

/// One multipart layout
#[derive(Debug, Clone, PartialEq)]
struct PayloadVariant {
    file_field: &'static str,
    include_account_name: bool,
    include_model_type: bool,
}

/// Every layout, most likely first
fn payload_variants() -> Vec<PayloadVariant> {
    let mut variants = Vec::new();
    for file_field in FILE_FIELDS {
        for include_account_name in [true, false] {
            for include_model_type in [true, false] {
                variants.push(PayloadVariant {
                    file_field,
                    include_account_name,
                    include_model_type,
                });
            }
        }
    }
    variants
}

/// A file read into memory and checked against the upload rules
#[derive(Debug, Clone)]
struct Upload {
    file_name: String,
    mime: &'static str,
    bytes: Vec<u8>,
}

async fn load_upload(path: &Path) -> Result<Upload, ForensicsError> {
    let mime = mime_for_path(path)
        .filter(|mime| ALLOWED_MIME_TYPES.contains(mime))
        .ok_or_else(|| ForensicsError::UnsupportedFile(path.to_path_buf()))?;

    let io_error = |source| ForensicsError::Io {
        path: path.to_path_buf(),
        source,
    };
    let size = tokio::fs::metadata(path).await.map_err(io_error)?.len();
    if size > MAX_FILE_BYTES {
        return Err(ForensicsError::TooLarge {
            path: path.to_path_buf(),
            size,
            limit: MAX_FILE_BYTES,
        });
    }
    let bytes = tokio::fs::read(path).await.map_err(io_error)?;

    Ok(Upload {
        file_name: path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload".to_string()),
        mime,
        bytes,
    })
}

fn is_credential_error(body: &Value) -> bool {
    let lower = body.to_string().to_lowercase();
    CREDENTIAL_ERRORS.iter().any(|fragment| lower.contains(fragment))
}

/// Forensic screening client
pub struct ForensicsClient {
    url: String,
    api_key: String,
    account_name: String,
    model_type: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl ForensicsClient {
    pub fn new(settings: &ForensicsSettings) -> Result<Self, ForensicsError> {
        let url = settings
            .url
            .clone()
            .ok_or(ForensicsError::NotConfigured("service URL"))?;
        let api_key = settings
            .api_key
            .clone()
            .ok_or(ForensicsError::NotConfigured("API key"))?;

        Ok(Self {
            url,
            api_key,
            account_name: settings.account_name.clone(),
            model_type: settings.model_type.clone(),
            timeout: settings.timeout,
            client: reqwest::Client::new(),
        })
    }

    fn build_form(
        &self,
        uploads: &[Upload],
        variant: &PayloadVariant,
    ) -> Result<Form, reqwest::Error> {
        let mut form = Form::new();
        for upload in uploads {
            let part = Part::bytes(upload.bytes.clone())
                .file_name(upload.file_name.clone())
                .mime_str(upload.mime)?;
            form = form.part(variant.file_field, part);
        }

        form = form.text("user", json!({ "key": self.api_key }).to_string());
        if variant.include_account_name {
            form = form.text("accountName", self.account_name.clone());
        }
        form = form.text("textQuery", EXAMINER_PROMPT);
        if variant.include_model_type {
            form = form.text("modelType", self.model_type.clone());
        }
        Ok(form)
    }

    /// Screen the files, trying payload variants until one is accepted
    #[instrument(skip(self, paths), fields(files = paths.len()))]
    pub async fn screen(&self, paths: &[PathBuf]) -> Result<ScreeningReport, ForensicsError> {
        if paths.is_empty() {
            return Err(ForensicsError::NoFiles);
        }

        let mut uploads = Vec::with_capacity(paths.len());
        for path in paths {
            uploads.push(load_upload(path).await?);
        }

        let variants = payload_variants();
        let mut last_error = None;

        for (i, variant) in variants.iter().enumerate() {
            let attempt = i + 1;
            let form = match self.build_form(&uploads, variant) {
                Ok(form) => form,
                Err(e) => {
                    last_error = Some(e.to_string());
                    continue;
                }
            };

            // Each attempt gets one budget covering the upload and the answer
            let exchange = async {
                let response = self.client.post(&self.url).multipart(form).send().await?;
                let status = response.status().as_u16();
                let text = response.text().await?;
                Ok::<_, reqwest::Error>((status, text))
            };

            let (status, text) = match tokio::time::timeout(self.timeout, exchange).await {
                Ok(Ok(answer)) => answer,
                Ok(Err(e)) => {
                    debug!(attempt, error = %e, "Screening request failed");
                    last_error = Some(e.to_string());
                    continue;
                }
                Err(_) => {
                    debug!(attempt, "Screening request timed out");
                    last_error = Some(format!("timed out after {:?}", self.timeout));
                    continue;
                }
            };
            let body = serde_json::from_str(&text).unwrap_or(Value::String(text));

            if (200..300).contains(&status) {
                info!(attempt, field = variant.file_field, "Screening accepted");
                return Ok(ScreeningReport {
                    status,
                    attempt,
                    body,
                });
            }

            if is_credential_error(&body) {
                warn!(attempt, status, "Screening aborted on credential error");
                return Err(ForensicsError::Credentials { status, body });
            }

            debug!(attempt, status, field = variant.file_field, "Payload variant rejected");
            last_error = Some(format!("HTTP {}: {}", status, body));
        }

        Err(ForensicsError::AllVariantsRejected {
            attempts: variants.len(),
            last_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn settings() -> ForensicsSettings {
        ForensicsSettings {
            url: Some("https://forensics.example/api".into()),
            api_key: Some("key".into()),
            ..ForensicsSettings::default()
        }
    }

    #[test]
    fn test_requires_url_and_key() {
        let err = ForensicsClient::new(&ForensicsSettings::default()).err().unwrap();
        assert!(matches!(err, ForensicsError::NotConfigured("service URL")));

        let no_key = ForensicsSettings {
            api_key: None,
            ..settings()
        };
        let err = ForensicsClient::new(&no_key).err().unwrap();
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_variant_order() {
        let variants = payload_variants();
        assert_eq!(variants.len(), FILE_FIELDS.len() * 4);
        assert_eq!(
            variants[0],
            PayloadVariant {
                file_field: "file",
                include_account_name: true,
                include_model_type: true,
            }
        );
        assert_eq!(variants[4].file_field, "files[]");
    }

    #[test]
    fn test_credential_errors() {
        assert!(is_credential_error(&json!({"error": "Invalid API key"})));
        assert!(is_credential_error(&json!("User data is required")));
        assert!(!is_credential_error(&json!({"error": "Unexpected field"})));
    }

    #[tokio::test]
    async fn test_upload_rules() {
        let client = ForensicsClient::new(&settings()).unwrap();

        let err = client.screen(&[]).await.unwrap_err();
        assert!(matches!(err, ForensicsError::NoFiles));

        let mut text = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        write!(text, "not a scan").unwrap();
        let err = client.screen(&[text.path().to_path_buf()]).await.unwrap_err();
        assert!(matches!(err, ForensicsError::UnsupportedFile(_)));
        assert_eq!(err.status_code(), 400);

        let err = client
            .screen(&[PathBuf::from("/nonexistent/scan.pdf")])
            .await
            .unwrap_err();
        assert!(matches!(err, ForensicsError::Io { .. }));
    }

    #[tokio::test]
    async fn test_stalled_answers_exhaust_variants() {
        let addr = crate::adapters::stalled_server::spawn().await;
        let client = ForensicsClient::new(&ForensicsSettings {
            url: Some(format!("http://{}/analyze", addr)),
            timeout: Duration::from_millis(50),
            ..settings()
        })
        .unwrap();

        let mut scan = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        write!(scan, "%PDF-1.4").unwrap();

        let err = tokio::time::timeout(
            Duration::from_secs(30),
            client.screen(&[scan.path().to_path_buf()]),
        )
        .await
        .expect("screening should give up on its own")
        .unwrap_err();

        match err {
            ForensicsError::AllVariantsRejected {
                attempts,
                last_error: Some(last_error),
            } => {
                assert_eq!(attempts, FILE_FIELDS.len() * 4);
                assert!(last_error.starts_with("timed out"), "{}", last_error);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
