//! Step 4: render the TTS-ready transcript to audio.

use super::{load_transcript, progress_bar};
use crate::audio::{concatenate, AudioFormat};
use crate::config::Settings;
use crate::error::{PdfcastError, Result};
use crate::provider::{generate_speech, Provider};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Synthesize every line of the step 3 transcript and join the segments.
///
/// Segments are written to `<output_dir>/step4/segment_NNN.<ext>`; the joined
/// episode goes to `<output_dir>/podcast.<ext>`.
#[instrument(skip_all, fields(input = %step3_dir.display()))]
pub async fn step4(
    provider: &dyn Provider,
    settings: &Settings,
    step3_dir: &Path,
    output_dir: &Path,
) -> Result<PathBuf> {
    let format: AudioFormat = settings
        .text_to_speech_model
        .audio_format
        .parse()
        .map_err(PdfcastError::Config)?;

    let json = step3_dir.join("podcast_ready.json");
    let input = if json.exists() {
        json
    } else {
        step3_dir.join("podcast_ready.txt")
    };
    if !input.exists() {
        return Err(PdfcastError::Pipeline(format!(
            "No TTS-ready transcript found in {}",
            step3_dir.display()
        )));
    }
    let transcript = load_transcript(&input)?;

    if transcript.len() > 1 && !format.can_concatenate() {
        return Err(PdfcastError::Config(format!(
            "Audio format {} cannot be joined; use wav or mp3",
            format
        )));
    }

    let segment_dir = output_dir.join("step4");
    tokio::fs::create_dir_all(&segment_dir).await?;

    info!("Synthesizing {} lines as {}", transcript.len(), format);
    let pb = progress_bar(transcript.len(), "Speech");
    let mut segments = Vec::with_capacity(transcript.len());

    for (index, line) in transcript.lines.iter().enumerate() {
        let speaker = line.speaker_index().unwrap_or(index % 2 + 1);
        let voice = settings.voices.voice_for(speaker);
        let path = segment_dir.join(format!("segment_{:03}.{}", index, format.extension()));
        debug!("{} -> {} ({})", line.speaker, path.display(), voice);

        let result = generate_speech(
            provider,
            &line.text,
            voice,
            &settings.text_to_speech_model.model,
            format,
            &path,
        )
        .await;

        match result {
            Ok(path) => segments.push(path),
            Err(e) => {
                pb.finish_and_clear();
                return Err(e);
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    let final_path = output_dir.join(format!("podcast.{}", format.extension()));
    if segments.len() == 1 {
        tokio::fs::copy(&segments[0], &final_path).await?;
        return Ok(final_path);
    }

    let output = final_path.clone();
    tokio::task::spawn_blocking(move || concatenate(&segments, format, &output))
        .await
        .map_err(|e| PdfcastError::Audio(format!("Joining segments aborted: {}", e)))??;

    Ok(final_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::pcm_to_wav;
    use crate::provider::testing::ScriptedProvider;
    use crate::transcript::{Transcript, TranscriptLine};

    fn write_ready(dir: &Path, lines: Vec<TranscriptLine>) -> PathBuf {
        let step3 = dir.join("step3");
        std::fs::create_dir_all(&step3).unwrap();
        Transcript::new(lines)
            .save_json(&step3.join("podcast_ready.json"))
            .unwrap();
        step3
    }

    fn wav_of(samples: usize) -> Vec<u8> {
        let pcm: Vec<u8> = (0..samples as i16).flat_map(|s| s.to_le_bytes()).collect();
        pcm_to_wav(&pcm, 24_000, 1).unwrap()
    }

    #[tokio::test]
    async fn test_step4_assigns_voices_and_joins() {
        let dir = tempfile::tempdir().unwrap();
        let step3 = write_ready(
            dir.path(),
            vec![
                TranscriptLine::new("Speaker 1", "Welcome."),
                TranscriptLine::new("Speaker 2", "Thanks."),
                TranscriptLine::new("Speaker 1", "Let's start."),
            ],
        );
        let provider = ScriptedProvider::new(&[]).with_audio(wav_of(100));

        let path = step4(&provider, &Settings::default(), &step3, dir.path())
            .await
            .unwrap();
        assert_eq!(path, dir.path().join("podcast.wav"));
        assert!(dir.path().join("step4").join("segment_002.wav").exists());

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.len(), 300);

        let speeches = provider.speeches.lock().unwrap();
        let voices: Vec<&str> = speeches.iter().map(|s| s.voice.as_str()).collect();
        assert_eq!(voices, vec!["alloy", "echo", "alloy"]);
        assert_eq!(speeches[0].model, "tts-1");
        assert_eq!(speeches[1].text, "Thanks.");
    }

    #[tokio::test]
    async fn test_step4_single_line_is_copied() {
        let dir = tempfile::tempdir().unwrap();
        let step3 = write_ready(dir.path(), vec![TranscriptLine::new("Speaker 1", "Solo.")]);
        let provider = ScriptedProvider::new(&[]).with_audio(b"OggS-data".to_vec());
        let mut settings = Settings::default();
        settings.text_to_speech_model.audio_format = "opus".to_string();

        let path = step4(&provider, &settings, &step3, dir.path()).await.unwrap();
        assert_eq!(path, dir.path().join("podcast.opus"));
        assert_eq!(std::fs::read(&path).unwrap(), b"OggS-data");
    }

    #[tokio::test]
    async fn test_step4_rejects_unjoinable_format_before_synthesis() {
        let dir = tempfile::tempdir().unwrap();
        let step3 = write_ready(
            dir.path(),
            vec![
                TranscriptLine::new("Speaker 1", "One."),
                TranscriptLine::new("Speaker 2", "Two."),
            ],
        );
        let provider = ScriptedProvider::new(&[]).with_audio(vec![1, 2, 3]);
        let mut settings = Settings::default();
        settings.text_to_speech_model.audio_format = "flac".to_string();

        let result = step4(&provider, &settings, &step3, dir.path()).await;
        assert!(matches!(result, Err(PdfcastError::Config(_))));
        assert!(provider.speeches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_step4_missing_transcript() {
        let dir = tempfile::tempdir().unwrap();
        let provider = ScriptedProvider::new(&[]);
        let result = step4(&provider, &Settings::default(), dir.path(), dir.path()).await;
        assert!(matches!(result, Err(PdfcastError::Pipeline(_))));
    }
}
