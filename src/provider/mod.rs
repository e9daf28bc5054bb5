//! AI provider adapters.
//!
//! `set_provider` turns a [`ProviderSettings`] record into a client handle, and
//! [`generate_text`] / [`generate_speech`] forward normalized chat and speech
//! requests to whichever vendor that handle wraps.
//!
//! # Providers
//!
//! - **OpenAI-compatible**: `openai`, `lmstudio`, `ollama`, `groq`, `custom`
//! - **Azure OpenAI**: chat and speech against a deployment
//! - **Google**: Gemini `generateContent` (text only)
//! - **ElevenLabs**: speech only

mod azure;
mod elevenlabs;
mod google;
mod openai_compat;

pub use azure::AzureProvider;
pub use elevenlabs::ElevenLabsProvider;
pub use google::GoogleProvider;
pub use openai_compat::OpenAiCompatProvider;

use crate::audio::AudioFormat;
use crate::config::{ProviderKind, ProviderSettings};
use crate::error::{PdfcastError, Result};
use crate::openai::{http_client, DEFAULT_TIMEOUT_SECS};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

const OPENAI_BASE: &str = "https://api.openai.com/v1";
const LMSTUDIO_BASE: &str = "http://localhost:1234/v1";
const OLLAMA_BASE: &str = "http://localhost:11434/v1";
const GROQ_BASE: &str = "https://api.groq.com/openai/v1";

/// Chat message role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A normalized chat completion request.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for ChatRequest {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: 512,
            temperature: 0.7,
        }
    }
}

/// A normalized speech synthesis request.
#[derive(Debug, Clone)]
pub struct SpeechRequest {
    pub text: String,
    pub voice: String,
    pub model: String,
    pub response_format: AudioFormat,
}

impl Default for SpeechRequest {
    fn default() -> Self {
        Self {
            text: String::new(),
            voice: "alloy".to_string(),
            model: "tts-1".to_string(),
            response_format: AudioFormat::Wav,
        }
    }
}

/// A configured AI provider.
///
/// Vendors that do not offer an operation keep the default implementation,
/// which reports [`PdfcastError::UnsupportedOperation`].
#[async_trait]
pub trait Provider: Send + Sync {
    /// Which provider this handle talks to.
    fn kind(&self) -> ProviderKind;

    /// Run a chat completion and return the reply text.
    async fn generate_text(&self, _request: &ChatRequest) -> Result<String> {
        Err(PdfcastError::UnsupportedOperation {
            provider: self.kind().to_string(),
            operation: "text generation",
        })
    }

    /// Synthesize speech and return the encoded audio.
    async fn generate_speech(&self, _request: &SpeechRequest) -> Result<Vec<u8>> {
        Err(PdfcastError::UnsupportedOperation {
            provider: self.kind().to_string(),
            operation: "speech synthesis",
        })
    }
}

/// Build a provider client from settings, with the default request timeout.
pub fn set_provider(settings: &ProviderSettings) -> Result<Arc<dyn Provider>> {
    set_provider_with_timeout(settings, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
}

/// Build a provider client from settings.
///
/// The API key is taken from the settings, or from the provider's
/// conventional environment variable.
pub fn set_provider_with_timeout(
    settings: &ProviderSettings,
    timeout: Duration,
) -> Result<Arc<dyn Provider>> {
    build_provider(settings, settings.resolve_key(), timeout)
}

fn build_provider(
    settings: &ProviderSettings,
    key: Option<String>,
    timeout: Duration,
) -> Result<Arc<dyn Provider>> {
    let kind = settings.name.ok_or_else(|| {
        PdfcastError::Config(
            "Provider name must be specified either directly or in config.".to_string(),
        )
    })?;

    let endpoint = settings
        .endpoint
        .as_deref()
        .map(normalize_endpoint)
        .transpose()?;

    let http = http_client(timeout)?;

    let provider: Arc<dyn Provider> = match kind {
        ProviderKind::Openai => {
            let key = require(key, "API key is required for OpenAI provider.")?;
            Arc::new(OpenAiCompatProvider::new(
                kind,
                endpoint.as_deref().unwrap_or(OPENAI_BASE),
                Some(key),
                http,
            ))
        }
        ProviderKind::Lmstudio => Arc::new(OpenAiCompatProvider::new(
            kind,
            endpoint.as_deref().unwrap_or(LMSTUDIO_BASE),
            key,
            http,
        )),
        ProviderKind::Ollama => Arc::new(OpenAiCompatProvider::new(
            kind,
            endpoint.as_deref().unwrap_or(OLLAMA_BASE),
            key,
            http,
        )),
        ProviderKind::Groq => Arc::new(OpenAiCompatProvider::new(
            kind,
            endpoint.as_deref().unwrap_or(GROQ_BASE),
            key,
            http,
        )),
        ProviderKind::Azure => {
            let endpoint = require(endpoint, "Base URL is required for AzureOpenAI provider.")?;
            let version = require(
                settings.version.clone().filter(|v| !v.is_empty()),
                "Version is required for AzureOpenAI provider.",
            )?;
            let key = require(key, "Key is required for AzureOpenAI provider.")?;
            Arc::new(AzureProvider::new(&endpoint, &version, &key, http))
        }
        ProviderKind::Google => {
            let key = require(key, "API key is required for Google provider.")?;
            Arc::new(GoogleProvider::new(endpoint.as_deref(), &key, http))
        }
        ProviderKind::Elevenlabs => {
            let key = require(key, "API key is required for ElevenLabs provider.")?;
            Arc::new(ElevenLabsProvider::new(endpoint.as_deref(), &key, http))
        }
        ProviderKind::Custom => {
            let endpoint = require(endpoint, "Base URL is required for custom provider.")?;
            Arc::new(OpenAiCompatProvider::new(kind, &endpoint, key, http))
        }
    };

    info!("Configured {} provider", kind);
    Ok(provider)
}

fn require<T>(value: Option<T>, message: &str) -> Result<T> {
    value.ok_or_else(|| PdfcastError::Config(message.to_string()))
}

/// Validate an endpoint URL and strip any trailing slash.
pub fn normalize_endpoint(endpoint: &str) -> Result<String> {
    let parsed = url::Url::parse(endpoint)
        .map_err(|e| PdfcastError::Config(format!("Invalid endpoint '{}': {}", endpoint, e)))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(PdfcastError::Config(format!(
            "Endpoint must use HTTP or HTTPS: {}",
            endpoint
        )));
    }

    Ok(endpoint.trim_end_matches('/').to_string())
}

/// Send a chat request to a provider and return the reply text.
#[instrument(skip(provider, messages), fields(provider = %provider.kind(), model = %model))]
pub async fn generate_text(
    provider: &dyn Provider,
    messages: Vec<ChatMessage>,
    model: &str,
    max_tokens: u32,
    temperature: f32,
) -> Result<String> {
    if messages.is_empty() {
        return Err(PdfcastError::InvalidInput("Messages are required".to_string()));
    }

    let request = ChatRequest {
        messages,
        model: model.to_string(),
        max_tokens,
        temperature,
    };

    let text = provider.generate_text(&request).await?;
    debug!("Generated {} characters", text.len());
    Ok(text)
}

/// Synthesize `text` and save the audio to `output_path`.
#[instrument(skip(provider, text), fields(provider = %provider.kind(), voice = %voice))]
pub async fn generate_speech(
    provider: &dyn Provider,
    text: &str,
    voice: &str,
    model: &str,
    response_format: AudioFormat,
    output_path: &Path,
) -> Result<PathBuf> {
    if text.trim().is_empty() {
        return Err(PdfcastError::InvalidInput("Text is required".to_string()));
    }

    let request = SpeechRequest {
        text: text.to_string(),
        voice: voice.to_string(),
        model: model.to_string(),
        response_format,
    };

    let audio = provider.generate_speech(&request).await?;
    if audio.is_empty() {
        return Err(PdfcastError::Provider(format!(
            "{} returned no audio",
            provider.kind()
        )));
    }

    if let Some(parent) = output_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(output_path, &audio).await?;

    debug!("Wrote {} bytes to {}", audio.len(), output_path.display());
    Ok(output_path.to_path_buf())
}

/// Turn a non-success HTTP response into a provider error.
pub(crate) async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or(body);
    Err(PdfcastError::Provider(format!("HTTP {}: {}", status, message)))
}

/// Pull the human readable message out of a vendor error body.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;

    let candidates = [
        value.pointer("/error/message"),
        value.pointer("/detail/message"),
        value.get("detail"),
        value.get("message"),
    ];

    let message = candidates
        .into_iter()
        .flatten()
        .find_map(|v| v.as_str().map(str::to_string));
    message
}
