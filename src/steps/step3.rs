//! Step 3: rewrite the transcript for speech synthesis.

use super::load_transcript;
use crate::config::{Prompts, Settings};
use crate::error::Result;
use crate::provider::{generate_text, ChatMessage, Provider};
use crate::transcript::Transcript;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// Rewrite the transcript in `input_file` and write `podcast_ready.txt` and
/// `podcast_ready.json` into `output_dir`.
#[instrument(skip_all, fields(input = %input_file.display()))]
pub async fn step3(
    provider: &dyn Provider,
    settings: &Settings,
    prompts: &Prompts,
    input_file: &Path,
    output_dir: &Path,
    preference: Option<&str>,
) -> Result<(Transcript, PathBuf)> {
    let source = load_transcript(input_file)?;

    let pairs: Vec<(&str, &str)> = source
        .lines
        .iter()
        .map(|l| (l.speaker.as_str(), l.text.as_str()))
        .collect();

    let preference = match preference.map(str::trim) {
        Some(p) if !p.is_empty() => format!("\nListener preference to honor while rewriting: {}", p),
        _ => String::new(),
    };

    let vars = HashMap::from([
        ("transcript".to_string(), serde_json::to_string_pretty(&pairs)?),
        ("preference".to_string(), preference),
    ]);
    let messages = vec![
        ChatMessage::system(prompts.render_with_custom(&prompts.rewrite.system, &vars)),
        ChatMessage::user(prompts.render_with_custom(&prompts.rewrite.user, &vars)),
    ];

    let output = generate_text(
        provider,
        messages,
        &settings.big_text_model.model,
        settings.step3.max_tokens,
        settings.step3.temperature,
    )
    .await?;

    let rewritten = Transcript::parse(&output)?;
    if rewritten.len() < source.len() / 2 {
        warn!(
            "Rewrite shrank the transcript from {} to {} lines",
            source.len(),
            rewritten.len()
        );
    }

    tokio::fs::create_dir_all(output_dir).await?;
    let text_path = output_dir.join("podcast_ready.txt");
    tokio::fs::write(&text_path, rewritten.to_text()).await?;
    rewritten.save_json(&output_dir.join("podcast_ready.json"))?;

    info!("TTS-ready transcript written to {}", text_path.display());
    Ok((rewritten, text_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PdfcastError;
    use crate::provider::testing::ScriptedProvider;
    use crate::transcript::TranscriptLine;

    fn write_source(dir: &Path) -> PathBuf {
        let step2 = dir.join("step2");
        std::fs::create_dir_all(&step2).unwrap();
        let transcript = Transcript::new(vec![
            TranscriptLine::new("Speaker 1", "GPT-4 scored 86.4% on MMLU."),
            TranscriptLine::new("Speaker 2", "Wow."),
        ]);
        let path = step2.join("transcript.txt");
        std::fs::write(&path, transcript.to_text()).unwrap();
        transcript.save_json(&step2.join("transcript.json")).unwrap();
        path
    }

    #[tokio::test]
    async fn test_step3_rewrites_and_saves() {
        let provider = ScriptedProvider::new(&[
            r#"[["Speaker 1", "G P T four scored eighty six point four percent on M M L U."], ["Speaker 2", "Wow, hmm."]]"#,
        ]);
        let dir = tempfile::tempdir().unwrap();
        let input = write_source(dir.path());
        let out = dir.path().join("step3");

        let (transcript, path) = step3(
            &provider,
            &Settings::default(),
            &Prompts::default(),
            &input,
            &out,
            Some("keep it under five minutes"),
        )
        .await
        .unwrap();

        assert_eq!(path, out.join("podcast_ready.txt"));
        assert_eq!(transcript.lines[1].text, "Wow, hmm.");
        assert_eq!(Transcript::load_json(&out.join("podcast_ready.json")).unwrap(), transcript);

        let chats = provider.chats.lock().unwrap();
        let user = &chats[0].messages[1].content;
        assert!(user.contains(r#""GPT-4 scored 86.4% on MMLU.""#));
        assert!(user.contains("keep it under five minutes"));
        assert_eq!(chats[0].temperature, 1.0);
    }

    #[tokio::test]
    async fn test_step3_without_preference() {
        let provider = ScriptedProvider::new(&["Speaker 1: Hello.\nSpeaker 2: Hi."]);
        let dir = tempfile::tempdir().unwrap();
        let input = write_source(dir.path());

        step3(
            &provider,
            &Settings::default(),
            &Prompts::default(),
            &input,
            dir.path(),
            Some("   "),
        )
        .await
        .unwrap();

        let chats = provider.chats.lock().unwrap();
        assert!(!chats[0].messages[1].content.contains("preference"));
        assert!(!chats[0].messages[1].content.contains("{{"));
    }

    #[tokio::test]
    async fn test_step3_missing_input() {
        let provider = ScriptedProvider::new(&[]);
        let dir = tempfile::tempdir().unwrap();
        let result = step3(
            &provider,
            &Settings::default(),
            &Prompts::default(),
            &dir.path().join("transcript.txt"),
            dir.path(),
            None,
        )
        .await;
        assert!(matches!(result, Err(PdfcastError::Io(_))));
    }
}
