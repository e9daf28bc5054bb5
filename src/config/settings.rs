//! Configuration settings for pdfcast.

use crate::error::{PdfcastError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    #[serde(alias = "Small-Text-Model")]
    pub small_text_model: ModelSettings,
    #[serde(alias = "Big-Text-Model")]
    pub big_text_model: ModelSettings,
    #[serde(alias = "Text-To-Speech-Model")]
    pub text_to_speech_model: SpeechModelSettings,
    pub voices: VoiceSettings,
    #[serde(alias = "Step1")]
    pub step1: CleanupStepSettings,
    #[serde(alias = "Step2")]
    pub step2: GenerationStepSettings,
    #[serde(alias = "Step3")]
    pub step3: GenerationStepSettings,
    pub prompts: PromptSettings,

    /// Host voice in the legacy flat layout.
    #[serde(rename = "Host-Speaker-Voice", skip_serializing, default)]
    legacy_host_voice: Option<String>,
    /// Co-host voice in the legacy flat layout.
    #[serde(rename = "Co-Host-Speaker-Voice", skip_serializing, default)]
    legacy_co_host_voice: Option<String>,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory that receives the per-step outputs and the final audio.
    pub output_dir: String,
    /// Pause between pipeline steps, in seconds.
    pub step_delay_seconds: f64,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Timeout applied to every provider request, in seconds.
    pub request_timeout_seconds: u64,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            output_dir: "./output".to_string(),
            step_delay_seconds: 2.0,
            log_level: "warn".to_string(),
            request_timeout_seconds: crate::openai::DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Supported AI providers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI hosted API.
    Openai,
    /// LM Studio local server.
    Lmstudio,
    /// Ollama local server.
    Ollama,
    /// Groq OpenAI-compatible API.
    Groq,
    /// Azure OpenAI deployment.
    Azure,
    /// Google generative language API.
    Google,
    /// ElevenLabs speech synthesis.
    Elevenlabs,
    /// Any other OpenAI-compatible endpoint.
    Custom,
}

impl ProviderKind {
    /// All supported providers, in display order.
    pub const ALL: [ProviderKind; 8] = [
        ProviderKind::Openai,
        ProviderKind::Lmstudio,
        ProviderKind::Ollama,
        ProviderKind::Groq,
        ProviderKind::Azure,
        ProviderKind::Google,
        ProviderKind::Elevenlabs,
        ProviderKind::Custom,
    ];

    /// Environment variables consulted when no key is configured.
    pub fn key_env_vars(&self) -> &'static [&'static str] {
        match self {
            ProviderKind::Openai => &["OPENAI_API_KEY"],
            ProviderKind::Groq => &["GROQ_API_KEY"],
            ProviderKind::Azure => &["AZURE_OPENAI_API_KEY"],
            ProviderKind::Google => &["GEMINI_API_KEY", "GOOGLE_API_KEY"],
            ProviderKind::Elevenlabs => &["ELEVENLABS_API_KEY"],
            ProviderKind::Lmstudio | ProviderKind::Ollama | ProviderKind::Custom => &[],
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(ProviderKind::Openai),
            "lmstudio" => Ok(ProviderKind::Lmstudio),
            "ollama" => Ok(ProviderKind::Ollama),
            "groq" => Ok(ProviderKind::Groq),
            "azure" => Ok(ProviderKind::Azure),
            "google" | "gemini" => Ok(ProviderKind::Google),
            "elevenlabs" => Ok(ProviderKind::Elevenlabs),
            "custom" => Ok(ProviderKind::Custom),
            _ => Err(format!("Unsupported provider: {}", s)),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ProviderKind::Openai => "openai",
            ProviderKind::Lmstudio => "lmstudio",
            ProviderKind::Ollama => "ollama",
            ProviderKind::Groq => "groq",
            ProviderKind::Azure => "azure",
            ProviderKind::Google => "google",
            ProviderKind::Elevenlabs => "elevenlabs",
            ProviderKind::Custom => "custom",
        };
        write!(f, "{}", name)
    }
}

/// Provider selection and credentials.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ProviderSettings {
    /// Provider name. `None` when a provider table omits it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<ProviderKind>,
    /// API key. Falls back to the provider's environment variable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Base URL override (required for azure and custom).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// API version (azure only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl ProviderSettings {
    /// Settings for a provider with no credentials.
    pub fn named(kind: ProviderKind) -> Self {
        Self {
            name: Some(kind),
            ..Default::default()
        }
    }

    /// Resolve the API key from config, then from the environment.
    pub fn resolve_key(&self) -> Option<String> {
        if let Some(key) = self.key.as_ref().filter(|k| !k.is_empty()) {
            return Some(key.clone());
        }

        let kind = self.name?;
        kind.key_env_vars()
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|value| !value.is_empty())
    }
}

/// A text model and the provider serving it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    pub provider: ProviderSettings,
    pub model: String,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            provider: ProviderSettings::named(ProviderKind::Openai),
            model: "gpt-4o-mini".to_string(),
        }
    }
}

impl ModelSettings {
    fn big_default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            ..Default::default()
        }
    }
}

/// The speech model and the provider serving it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechModelSettings {
    pub provider: ProviderSettings,
    pub model: String,
    /// Audio container requested from the provider (wav, mp3, ...).
    pub audio_format: String,
}

impl Default for SpeechModelSettings {
    fn default() -> Self {
        Self {
            provider: ProviderSettings::named(ProviderKind::Openai),
            model: "tts-1".to_string(),
            audio_format: "wav".to_string(),
        }
    }
}

/// Voices assigned to transcript speakers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceSettings {
    /// Voice for `Speaker 1`.
    pub host: String,
    /// Voice for `Speaker 2`.
    pub co_host: String,
    /// Voices for `Speaker 3` onwards.
    pub extra: Vec<String>,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            host: "alloy".to_string(),
            co_host: "echo".to_string(),
            extra: Vec::new(),
        }
    }
}

impl VoiceSettings {
    /// Voice for a 1-based speaker index.
    ///
    /// Speakers past the configured extras alternate between host and co-host.
    pub fn voice_for(&self, speaker: usize) -> &str {
        match speaker {
            0 | 1 => &self.host,
            2 => &self.co_host,
            n => match self.extra.get(n - 3) {
                Some(voice) => voice,
                None if n % 2 == 1 => &self.host,
                None => &self.co_host,
            },
        }
    }
}

/// Settings for the PDF cleanup step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupStepSettings {
    pub max_tokens: u32,
    pub temperature: f32,
    /// Maximum characters per cleanup request.
    pub chunk_size: usize,
    /// Maximum characters read from the PDF.
    pub max_chars: usize,
}

impl Default for CleanupStepSettings {
    fn default() -> Self {
        Self {
            max_tokens: 512,
            temperature: 0.7,
            chunk_size: 1000,
            max_chars: 100_000,
        }
    }
}

/// Settings for the transcript generation and rewrite steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationStepSettings {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationStepSettings {
    fn default() -> Self {
        Self {
            max_tokens: 8126,
            temperature: 1.0,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            general: GeneralSettings::default(),
            small_text_model: ModelSettings::default(),
            big_text_model: ModelSettings::big_default(),
            text_to_speech_model: SpeechModelSettings::default(),
            voices: VoiceSettings::default(),
            step1: CleanupStepSettings::default(),
            step2: GenerationStepSettings::default(),
            step3: GenerationStepSettings::default(),
            prompts: PromptSettings::default(),
            legacy_host_voice: None,
            legacy_co_host_voice: None,
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        let path = Self::default_config_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load settings from a specific TOML or JSON file.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PdfcastError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, path.extension().and_then(|e| e.to_str()))
    }

    /// Parse settings text. `.json` files use JSON, everything else TOML.
    pub fn parse(content: &str, extension: Option<&str>) -> Result<Self> {
        let mut settings: Settings = match extension {
            Some(ext) if ext.eq_ignore_ascii_case("json") => serde_json::from_str(content)?,
            _ => toml::from_str(content)?,
        };

        if let Some(host) = settings.legacy_host_voice.take() {
            settings.voices.host = host;
        }
        if let Some(co_host) = settings.legacy_co_host_voice.take() {
            settings.voices.co_host = co_host;
        }

        Ok(settings)
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| PdfcastError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pdfcast")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded output directory path.
    pub fn output_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.output_dir)
    }

    /// Request timeout for provider clients.
    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.general.request_timeout_seconds)
    }
}
