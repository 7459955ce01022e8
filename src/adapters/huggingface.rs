//! Hugging Face inference client.
//!
//! One client serves both model capabilities. Requests go to
//! `{base_url}/{model}` with a bearer token; responses are read through
//! the shape table in `shapes`.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::InferenceSettings;

use super::shapes::{parse_classification, parse_summary};
use super::{CapabilityError, LabelScore, Summarizer, ZeroShotClassifier};

/// Longest error body kept in a `CapabilityError::Http`
const ERROR_BODY_LIMIT: usize = 300;

/// Hosted inference client
pub struct HuggingFaceClient {
    base_url: String,
    api_token: String,
    zero_shot_model: String,
    summarization_model: String,
    client: reqwest::Client,
}

impl HuggingFaceClient {
    /// Create a client from resolved settings; fails without a token
    pub fn new(settings: &InferenceSettings) -> Result<Self, CapabilityError> {
        let api_token = settings
            .api_token
            .clone()
            .ok_or_else(|| CapabilityError::NotConfigured("inference token".into()))?;

        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| CapabilityError::Transport(e.to_string()))?;

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_token,
            zero_shot_model: settings.zero_shot_model.clone(),
            summarization_model: settings.summarization_model.clone(),
            client,
        })
    }

    /// Build the endpoint URL for a model
    fn model_url(&self, model: &str) -> String {
        format!("{}/{}", self.base_url, model)
    }

    async fn post(&self, model: &str, payload: Value) -> Result<Value, CapabilityError> {
        let url = self.model_url(model);
        debug!(%model, "Calling inference endpoint");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CapabilityError::Http {
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| CapabilityError::MalformedResponse(e.to_string()))
    }
}

#[async_trait]
impl ZeroShotClassifier for HuggingFaceClient {
    fn name(&self) -> &str {
        &self.zero_shot_model
    }

    async fn classify(
        &self,
        text: &str,
        labels: &[String],
    ) -> Result<Vec<LabelScore>, CapabilityError> {
        let payload = json!({
            "inputs": text,
            "parameters": { "candidate_labels": labels },
        });
        let value = self.post(&self.zero_shot_model, payload).await?;

        let ranked = parse_classification(&value);
        if ranked.is_empty() {
            return Err(CapabilityError::MalformedResponse(shape_hint(&value)));
        }
        Ok(ranked)
    }
}

#[async_trait]
impl Summarizer for HuggingFaceClient {
    fn name(&self) -> &str {
        &self.summarization_model
    }

    async fn summarize(
        &self,
        text: &str,
        max_length: usize,
        min_length: usize,
    ) -> Result<String, CapabilityError> {
        let payload = json!({
            "inputs": text,
            "parameters": { "max_length": max_length, "min_length": min_length },
        });
        let value = self.post(&self.summarization_model, payload).await?;

        parse_summary(&value).ok_or_else(|| CapabilityError::MalformedResponse(shape_hint(&value)))
    }
}

/// Short description of an unrecognized response for logs
fn shape_hint(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let keys: Vec<&str> = map.keys().map(String::as_str).collect();
            format!("object with keys [{}]", keys.join(", "))
        }
        Value::Array(items) => format!("array of {} items", items.len()),
        Value::String(_) => "string".to_string(),
        Value::Number(_) => "number".to_string(),
        Value::Bool(_) => "bool".to_string(),
        Value::Null => "null".to_string(),
    }
}
