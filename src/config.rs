//! Configuration for clauselens.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (HF_TOKEN, CLAUSELENS_*)
//! 2. Config file (.clauselens/config.yaml)
//! 3. Built-in defaults
//!
//! Config file discovery:
//! - An explicit path (`--config`) wins
//! - Otherwise searches the current directory and parents for .clauselens/config.yaml
//! - Falls back to ~/.clauselens/config.yaml
//!
//! The result is an immutable `Settings` value built once at startup and
//! handed to whatever needs it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Default inference endpoint (model id is appended)
pub const DEFAULT_INFERENCE_URL: &str = "https://router.huggingface.co/hf-inference/models";
pub const DEFAULT_ZERO_SHOT_MODEL: &str = "MoritzLaurer/deberta-v3-large-zeroshot-v1";
pub const DEFAULT_SUMMARIZATION_MODEL: &str = "facebook/bart-large-cnn";

/// Environment variables checked for the inference token, in order
const TOKEN_VARS: [&str; 3] = ["HF_API_KEY", "HF_TOKEN", "HUGGINGFACE_API_TOKEN"];

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub inference: InferenceConfig,
    #[serde(default)]
    pub extraction: EndpointConfig,
    #[serde(default)]
    pub forensics: ForensicsConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisConfig {
    pub max_tokens_per_chunk: Option<usize>,
    pub max_input_bytes: Option<usize>,
    pub max_concurrency: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InferenceConfig {
    pub base_url: Option<String>,
    /// Name of the environment variable holding the token (never the token itself)
    pub token_env: Option<String>,
    pub zero_shot_model: Option<String>,
    pub summarization_model: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EndpointConfig {
    pub url: Option<String>,
    pub token_env: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForensicsConfig {
    pub url: Option<String>,
    pub api_key_env: Option<String>,
    pub account_name: Option<String>,
    pub model_type: Option<String>,
    pub timeout_seconds: Option<u64>,
}

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct Settings {
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    pub analysis: AnalysisSettings,
    pub inference: InferenceSettings,
    pub extraction: ExtractionSettings,
    pub forensics: ForensicsSettings,
}

#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    /// Chunk budget in estimated tokens (4 characters each)
    pub max_tokens_per_chunk: usize,
    /// Largest accepted raw input
    pub max_input_bytes: usize,
    /// Concurrent capability calls per request
    pub max_concurrency: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            max_tokens_per_chunk: 500,
            max_input_bytes: 10 * 1024 * 1024, // 10MB
            max_concurrency: 4,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InferenceSettings {
    pub base_url: String,
    pub api_token: Option<String>,
    pub zero_shot_model: String,
    pub summarization_model: String,
    pub timeout: Duration,
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_INFERENCE_URL.to_string(),
            api_token: None,
            zero_shot_model: DEFAULT_ZERO_SHOT_MODEL.to_string(),
            summarization_model: DEFAULT_SUMMARIZATION_MODEL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExtractionSettings {
    pub url: Option<String>,
    pub api_token: Option<String>,
    pub timeout: Duration,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            url: None,
            api_token: None,
            timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ForensicsSettings {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub account_name: String,
    pub model_type: String,
    pub timeout: Duration,
}

impl Default for ForensicsSettings {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            account_name: "workflow 1".to_string(),
            model_type: "smart".to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config_file: None,
            analysis: AnalysisSettings::default(),
            inference: InferenceSettings::default(),
            extraction: ExtractionSettings::default(),
            forensics: ForensicsSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from the discovered (or given) config file and the
    /// process environment.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config_file = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => find_config_file(),
        };

        let file = match config_file {
            Some(ref path) => load_config_file(path)?,
            None => ConfigFile::default(),
        };

        Ok(Self::resolve(file, config_file, |key| std::env::var(key).ok()))
    }

    /// Merge a parsed config file with an environment lookup.
    ///
    /// The lookup is injected so resolution can be tested without touching
    /// the process environment.
    pub fn resolve(
        file: ConfigFile,
        config_file: Option<PathBuf>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let defaults = Settings::default();
        let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let analysis = AnalysisSettings {
            max_tokens_per_chunk: non_empty("CLAUSELENS_MAX_TOKENS_PER_CHUNK")
                .and_then(|v| v.parse().ok())
                .or(file.analysis.max_tokens_per_chunk)
                .filter(|n| *n > 0)
                .unwrap_or(defaults.analysis.max_tokens_per_chunk),
            max_input_bytes: file
                .analysis
                .max_input_bytes
                .unwrap_or(defaults.analysis.max_input_bytes),
            max_concurrency: file
                .analysis
                .max_concurrency
                .filter(|n| *n > 0)
                .unwrap_or(defaults.analysis.max_concurrency),
        };

        let api_token = match file.inference.token_env {
            Some(ref var) => non_empty(var),
            None => TOKEN_VARS.iter().find_map(|var| non_empty(*var)),
        };

        let inference = InferenceSettings {
            base_url: non_empty("CLAUSELENS_INFERENCE_URL")
                .or(file.inference.base_url)
                .unwrap_or(defaults.inference.base_url),
            api_token,
            zero_shot_model: non_empty("CLAUSELENS_ZERO_SHOT_MODEL")
                .or(file.inference.zero_shot_model)
                .unwrap_or(defaults.inference.zero_shot_model),
            summarization_model: non_empty("CLAUSELENS_SUMMARIZATION_MODEL")
                .or(file.inference.summarization_model)
                .unwrap_or(defaults.inference.summarization_model),
            timeout: file
                .inference
                .timeout_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.inference.timeout),
        };

        let extraction = ExtractionSettings {
            url: non_empty("CLAUSELENS_EXTRACTION_URL").or(file.extraction.url),
            api_token: file.extraction.token_env.as_deref().and_then(non_empty),
            timeout: file
                .extraction
                .timeout_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.extraction.timeout),
        };

        let api_key_var = file
            .forensics
            .api_key_env
            .clone()
            .unwrap_or_else(|| "CLAUSELENS_FORENSICS_API_KEY".to_string());

        let forensics = ForensicsSettings {
            url: non_empty("CLAUSELENS_FORENSICS_URL").or(file.forensics.url),
            api_key: non_empty(&api_key_var),
            account_name: file
                .forensics
                .account_name
                .unwrap_or(defaults.forensics.account_name),
            model_type: file
                .forensics
                .model_type
                .unwrap_or(defaults.forensics.model_type),
            timeout: file
                .forensics
                .timeout_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.forensics.timeout),
        };

        Self {
            config_file,
            analysis,
            inference,
            extraction,
            forensics,
        }
    }
}

/// Find config file by searching current directory and parents, then home
fn find_config_file() -> Option<PathBuf> {
    if let Ok(mut current) = std::env::current_dir() {
        loop {
            let config_path = current.join(".clauselens").join("config.yaml");
            if config_path.exists() {
                return Some(config_path);
            }

            if !current.pop() {
                break;
            }
        }
    }

    let home_config = dirs::home_dir()?.join(".clauselens").join("config.yaml");
    home_config.exists().then_some(home_config)
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}
