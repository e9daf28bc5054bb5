//! Step 2: write a speaker-attributed transcript from the cleaned text.

use crate::config::{ContentFormat, ContentLength, ContentStyle, Prompts, Settings};
use crate::error::{PdfcastError, Result};
use crate::provider::{generate_text, ChatMessage, Provider};
use crate::transcript::Transcript;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// Generate `transcript.txt` and `transcript.json` in `output_dir` from the
/// cleaned text in `input_file`.
#[allow(clippy::too_many_arguments)]
#[instrument(skip_all, fields(input = %input_file.display(), format = %format, length = %length, style = %style))]
pub async fn step2(
    provider: &dyn Provider,
    settings: &Settings,
    prompts: &Prompts,
    input_file: &Path,
    output_dir: &Path,
    format: ContentFormat,
    length: ContentLength,
    style: ContentStyle,
) -> Result<(Transcript, PathBuf)> {
    let text = tokio::fs::read_to_string(input_file).await?;
    if text.trim().is_empty() {
        return Err(PdfcastError::InvalidInput(format!(
            "{} is empty",
            input_file.display()
        )));
    }

    let vars = prompt_variables(format, length, style, &text);
    let messages = vec![
        ChatMessage::system(prompts.render_with_custom(&prompts.transcript.system, &vars)),
        ChatMessage::user(prompts.render_with_custom(&prompts.transcript.user, &vars)),
    ];

    let output = generate_text(
        provider,
        messages,
        &settings.big_text_model.model,
        settings.step2.max_tokens,
        settings.step2.temperature,
    )
    .await?;

    let transcript = Transcript::parse(&output)?;
    if transcript.speaker_count() > format.speaker_count() {
        warn!(
            "Transcript uses {} speakers, {} expects {}",
            transcript.speaker_count(),
            format,
            format.speaker_count()
        );
    }

    tokio::fs::create_dir_all(output_dir).await?;
    let text_path = output_dir.join("transcript.txt");
    tokio::fs::write(&text_path, transcript.to_text()).await?;
    transcript.save_json(&output_dir.join("transcript.json"))?;

    info!("Transcript with {} lines written to {}", transcript.len(), text_path.display());
    Ok((transcript, text_path))
}

fn prompt_variables(
    format: ContentFormat,
    length: ContentLength,
    style: ContentStyle,
    text: &str,
) -> HashMap<String, String> {
    let speakers = (1..=format.speaker_count())
        .map(|n| format!("Speaker {}", n))
        .collect::<Vec<_>>()
        .join(", ");

    HashMap::from([
        ("format".to_string(), format.to_string().replace('-', " ")),
        ("format_instructions".to_string(), format.instructions().to_string()),
        ("length".to_string(), length.description()),
        ("style".to_string(), style.description().to_string()),
        ("speaker_count".to_string(), format.speaker_count().to_string()),
        ("speakers".to_string(), speakers),
        ("text".to_string(), text.to_string()),
    ])
}
