//! Pre-flight checks before expensive operations.
//!
//! Validates inputs and provider configuration before a run spends tokens
//! on steps that would otherwise fail midway.

use crate::audio::AudioFormat;
use crate::config::{ProviderSettings, Settings};
use crate::error::{PdfcastError, Result};
use crate::provider::set_provider_with_timeout;
use std::path::Path;

/// Run pre-flight checks for `generate`.
///
/// The orchestrator builds all three providers up front, so all three are
/// checked even when earlier steps are skipped.
pub fn check_generate(settings: &Settings, pdf: Option<&Path>, first_step: u8) -> Result<()> {
    if first_step <= 1 {
        check_pdf(pdf)?;
    }
    check_provider("Small text model", &settings.small_text_model.provider, settings)?;
    check_provider("Big text model", &settings.big_text_model.provider, settings)?;
    check_provider(
        "Text-to-speech model",
        &settings.text_to_speech_model.provider,
        settings,
    )?;
    settings
        .text_to_speech_model
        .audio_format
        .parse::<AudioFormat>()
        .map_err(PdfcastError::Config)?;
    Ok(())
}

fn check_pdf(pdf: Option<&Path>) -> Result<()> {
    let pdf = pdf.ok_or_else(|| {
        PdfcastError::InvalidInput("--pdf is required unless --skip-to is 2 or later".to_string())
    })?;
    if !pdf.is_file() {
        return Err(PdfcastError::InvalidInput(format!(
            "PDF not found: {}",
            pdf.display()
        )));
    }
    Ok(())
}

/// Construct the provider without contacting it.
fn check_provider(label: &str, provider: &ProviderSettings, settings: &Settings) -> Result<()> {
    set_provider_with_timeout(provider, settings.request_timeout())
        .map(|_| ())
        .map_err(|e| PdfcastError::Config(format!("{}: {}", label, e)))
}
