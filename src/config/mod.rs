//! Configuration module for pdfcast.
//!
//! Handles loading settings, prompt templates and the content parameters
//! (format, length, style) that shape a run.

mod content;
mod prompts;
mod settings;

pub use content::{ContentFormat, ContentLength, ContentStyle};
pub use prompts::{CleanupPrompts, Prompts, RewritePrompts, TranscriptPrompts};
pub use settings::{
    CleanupStepSettings, GeneralSettings, GenerationStepSettings, ModelSettings,
    PromptSettings, ProviderKind, ProviderSettings, Settings, SpeechModelSettings,
    VoiceSettings,
};
