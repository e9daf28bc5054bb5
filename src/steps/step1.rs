//! Step 1: extract and clean the PDF text.

use super::progress_bar;
use crate::config::{Prompts, Settings};
use crate::error::{PdfcastError, Result};
use crate::pdf::{extract_text, normalize_text, word_bounded_chunks};
use crate::provider::{generate_text, ChatMessage, Provider};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Extract text from `pdf_path`, clean it chunk by chunk with the small text
/// model and write `clean_<stem>.txt` into `output_dir`.
#[instrument(skip_all, fields(pdf = %pdf_path.display()))]
pub async fn step1(
    provider: &dyn Provider,
    settings: &Settings,
    prompts: &Prompts,
    pdf_path: &Path,
    output_dir: &Path,
) -> Result<PathBuf> {
    let raw = extract_text(pdf_path, settings.step1.max_chars).await?;
    let cleaned = clean_text(provider, settings, prompts, &normalize_text(&raw)).await?;

    let stem = pdf_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string());
    let output_path = output_dir.join(format!("clean_{}.txt", stem));

    tokio::fs::create_dir_all(output_dir).await?;
    tokio::fs::write(&output_path, &cleaned).await?;

    info!("Cleaned text written to {}", output_path.display());
    Ok(output_path)
}

/// Clean normalized text in word-bounded chunks.
pub async fn clean_text(
    provider: &dyn Provider,
    settings: &Settings,
    prompts: &Prompts,
    text: &str,
) -> Result<String> {
    let chunks = word_bounded_chunks(text, settings.step1.chunk_size);
    if chunks.is_empty() {
        return Err(PdfcastError::Pdf("No text to clean".to_string()));
    }
    info!("Cleaning {} chunks", chunks.len());

    let system = prompts.render_with_custom(&prompts.cleanup.system, &HashMap::new());
    let pb = progress_bar(chunks.len(), "Cleaning");

    let mut cleaned = String::new();
    for chunk in &chunks {
        let messages = vec![ChatMessage::system(system.clone()), ChatMessage::user(chunk)];
        let result = generate_text(
            provider,
            messages,
            &settings.small_text_model.model,
            settings.step1.max_tokens,
            settings.step1.temperature,
        )
        .await;

        let text = match result {
            Ok(text) => text,
            Err(e) => {
                pb.finish_and_clear();
                return Err(e);
            }
        };

        cleaned.push_str(text.trim());
        cleaned.push('\n');
        pb.inc(1);
    }
    pb.finish_and_clear();

    Ok(cleaned)
}
