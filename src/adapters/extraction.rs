//! Document text extraction.
//!
//! Text files are read locally. Everything else (PDF, scans) is posted to
//! an extraction service that answers either `{"text": ...}` or a list of
//! detected blocks, of which the `LINE` blocks are joined.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::config::ExtractionSettings;

use super::{CapabilityError, Disabled, TextExtractor};

/// Extensions read directly from disk
const PLAIN_TEXT_EXTENSIONS: [&str; 3] = ["txt", "md", "text"];

/// MIME type for a document path, by extension
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    let mime = match ext.as_str() {
        "pdf" => "application/pdf",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "tif" | "tiff" => "image/tiff",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "txt" | "text" => "text/plain",
        "md" => "text/markdown",
        _ => return None,
    };
    Some(mime)
}

fn is_plain_text(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| PLAIN_TEXT_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Pick the extractor for a file: local for text, the service otherwise
pub fn extractor_for(path: &Path, settings: &ExtractionSettings) -> Box<dyn TextExtractor> {
    if is_plain_text(path) {
        return Box::new(PlainTextExtractor);
    }
    match HttpTextExtractor::new(settings) {
        Some(extractor) => Box::new(extractor),
        None => Box::new(Disabled),
    }
}

/// Reads `.txt` / `.md` files from disk
#[derive(Debug, Clone, Default)]
pub struct PlainTextExtractor;

#[async_trait]
impl TextExtractor for PlainTextExtractor {
    fn name(&self) -> &str {
        "plain text"
    }

    async fn extract(&self, path: &Path) -> Result<String, CapabilityError> {
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| CapabilityError::Transport(format!("failed to read {}: {}", path.display(), e)))
    }
}

/// Posts documents to a remote extraction service
pub struct HttpTextExtractor {
    url: String,
    api_token: Option<String>,
    timeout: Duration,
    client: reqwest::Client,
}

impl HttpTextExtractor {
    /// `None` when no service URL is configured
    pub fn new(settings: &ExtractionSettings) -> Option<Self> {
        let url = settings.url.clone()?;
        Some(Self {
            url,
            api_token: settings.api_token.clone(),
            timeout: settings.timeout,
            client: reqwest::Client::new(),
        })
    }
}

#[async_trait]
impl TextExtractor for HttpTextExtractor {
    fn name(&self) -> &str {
        "extraction service"
    }

    #[instrument(skip(self), fields(service = %self.url))]
    async fn extract(&self, path: &Path) -> Result<String, CapabilityError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| CapabilityError::Transport(format!("failed to read {}: {}", path.display(), e)))?;

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload".to_string());
        let mime = mime_for_path(path).unwrap_or("application/octet-stream");
        debug!(%file_name, %mime, bytes = bytes.len(), "Uploading document for extraction");

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime)
            .map_err(|e| CapabilityError::Transport(e.to_string()))?;
        let form = Form::new().part("file", part);

        let mut request = self.client.post(&self.url).multipart(form);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        // One budget for the whole exchange, body included
        let exchange = async {
            let response = request.send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(CapabilityError::Http {
                    status: status.as_u16(),
                    body: response.text().await.unwrap_or_default(),
                });
            }
            response
                .json::<Value>()
                .await
                .map_err(|e| CapabilityError::MalformedResponse(e.to_string()))
        };
        let value = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| CapabilityError::Timeout { after: self.timeout })??;

        let text = extracted_text(&value)
            .ok_or_else(|| CapabilityError::MalformedResponse("no text or LINE blocks".into()))?;
        if text.trim().is_empty() {
            return Err(CapabilityError::EmptyResult);
        }

        info!(chars = text.len(), "Extracted document text");
        Ok(text)
    }
}

/// Text from an extraction response: `{"text"}`, else joined `LINE` blocks
pub fn extracted_text(value: &Value) -> Option<String> {
    if let Some(text) = value.get("text").and_then(Value::as_str) {
        return Some(text.to_string());
    }

    let blocks = value.get("Blocks").and_then(Value::as_array)?;
    let lines: Vec<&str> = blocks
        .iter()
        .filter(|block| block.get("BlockType").and_then(Value::as_str) == Some("LINE"))
        .filter_map(|block| block.get("Text").and_then(Value::as_str))
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    Some(lines.join(" "))
}
