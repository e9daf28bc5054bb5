//! Pipeline orchestrator for pdfcast.
//!
//! Runs the four steps in order, resuming from an earlier run's files when
//! asked to skip ahead.

use crate::config::{ContentFormat, ContentLength, ContentStyle, Prompts, Settings};
use crate::error::{PdfcastError, Result};
use crate::provider::{set_provider_with_timeout, Provider};
use crate::steps::{self, latest_output, wait_for_next_step};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument};

/// Parameters of a single podcast run.
#[derive(Debug, Clone, Default)]
pub struct PodcastRequest {
    /// Source PDF. Required unless step 1 is skipped.
    pub pdf: Option<PathBuf>,
    pub format: ContentFormat,
    pub length: ContentLength,
    pub style: ContentStyle,
    /// Free-form guidance for the TTS rewrite.
    pub preference: Option<String>,
    /// First step to execute (1-4).
    pub skip_to: Option<u8>,
}

/// Record of a finished run, saved as `run.json` in the output directory.
#[derive(Debug, Clone, Serialize)]
pub struct PodcastRun {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub pdf: Option<PathBuf>,
    pub format: ContentFormat,
    pub length: ContentLength,
    pub style: ContentStyle,
    pub preference: Option<String>,
    pub first_step: u8,
    pub cleaned_text: PathBuf,
    pub transcript: PathBuf,
    pub podcast_ready: PathBuf,
    pub audio: PathBuf,
    pub manifest: PathBuf,
}

/// The main orchestrator for the pdfcast pipeline.
pub struct Orchestrator {
    settings: Settings,
    prompts: Prompts,
    small_text: Arc<dyn Provider>,
    big_text: Arc<dyn Provider>,
    speech: Arc<dyn Provider>,
    output_dir: PathBuf,
}

impl Orchestrator {
    /// Create an orchestrator with providers built from the settings.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let timeout = settings.request_timeout();
        let small_text = set_provider_with_timeout(&settings.small_text_model.provider, timeout)?;
        let big_text = set_provider_with_timeout(&settings.big_text_model.provider, timeout)?;
        let speech = set_provider_with_timeout(&settings.text_to_speech_model.provider, timeout)?;

        info!(
            "Providers: small={} ({}), big={} ({}), speech={} ({})",
            small_text.kind(),
            settings.small_text_model.model,
            big_text.kind(),
            settings.big_text_model.model,
            speech.kind(),
            settings.text_to_speech_model.model
        );

        Ok(Self::with_components(settings, prompts, small_text, big_text, speech))
    }

    /// Create an orchestrator with custom providers.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        small_text: Arc<dyn Provider>,
        big_text: Arc<dyn Provider>,
        speech: Arc<dyn Provider>,
    ) -> Self {
        let output_dir = settings.output_dir();
        Self {
            settings,
            prompts,
            small_text,
            big_text,
            speech,
            output_dir,
        }
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Root directory for step outputs and the final episode.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Directory holding the files of step `n`.
    pub fn step_dir(&self, n: u8) -> PathBuf {
        self.output_dir.join(format!("step{}", n))
    }

    /// Run the pipeline from `request.skip_to` (default 1) through step 4.
    #[instrument(skip(self, request), fields(format = %request.format, skip_to = ?request.skip_to))]
    pub async fn run(&self, request: &PodcastRequest) -> Result<PodcastRun> {
        let first_step = request.skip_to.unwrap_or(1);
        if !(1..=4).contains(&first_step) {
            return Err(PdfcastError::InvalidInput(format!(
                "Step to skip to must be between 1 and 4, got {}",
                first_step
            )));
        }

        for n in 1..=4 {
            tokio::fs::create_dir_all(self.step_dir(n)).await?;
        }

        let started_at = Utc::now();
        let delay = self.settings.general.step_delay_seconds;

        let cleaned_text = if first_step <= 1 {
            let pdf = request.pdf.as_deref().ok_or_else(|| {
                PdfcastError::InvalidInput("A PDF file is required to run step 1".to_string())
            })?;
            eprintln!("  Step 1: cleaning {}...", pdf.display());
            let path = steps::step1(
                self.small_text.as_ref(),
                &self.settings,
                &self.prompts,
                pdf,
                &self.step_dir(1),
            )
            .await?;
            wait_for_next_step(delay).await;
            path
        } else {
            self.previous_output(1)?
        };

        let transcript = if first_step <= 2 {
            eprintln!("  Step 2: writing {} transcript...", request.format);
            let (transcript, path) = steps::step2(
                self.big_text.as_ref(),
                &self.settings,
                &self.prompts,
                &cleaned_text,
                &self.step_dir(2),
                request.format,
                request.length,
                request.style,
            )
            .await?;
            eprintln!("  Transcript has {} lines", transcript.len());
            wait_for_next_step(delay).await;
            path
        } else {
            self.previous_output(2)?
        };

        let podcast_ready = if first_step <= 3 {
            eprintln!("  Step 3: rewriting for speech...");
            let (_, path) = steps::step3(
                self.big_text.as_ref(),
                &self.settings,
                &self.prompts,
                &transcript,
                &self.step_dir(3),
                request.preference.as_deref(),
            )
            .await?;
            wait_for_next_step(delay).await;
            path
        } else {
            info!("Skipping step 3, using files in {}", self.step_dir(3).display());
            self.step_dir(3).join("podcast_ready.txt")
        };

        eprintln!("  Step 4: synthesizing audio...");
        let audio = steps::step4(
            self.speech.as_ref(),
            &self.settings,
            &self.step_dir(3),
            &self.output_dir,
        )
        .await?;

        let run = PodcastRun {
            started_at,
            finished_at: Utc::now(),
            pdf: request.pdf.clone(),
            format: request.format,
            length: request.length,
            style: request.style,
            preference: request.preference.clone(),
            first_step,
            cleaned_text,
            transcript,
            podcast_ready,
            audio,
            manifest: self.output_dir.join("run.json"),
        };
        tokio::fs::write(&run.manifest, serde_json::to_string_pretty(&run)?).await?;

        info!("Podcast written to {}", run.audio.display());
        Ok(run)
    }

    /// Output of an earlier run of step `n`, used when skipping it.
    fn previous_output(&self, n: u8) -> Result<PathBuf> {
        let path = latest_output(&self.step_dir(n), "txt").ok_or_else(|| {
            PdfcastError::Pipeline(format!(
                "No output files found from Step {}. Cannot skip this step.",
                n
            ))
        })?;
        info!("Skipping step {}, using {}", n, path.display());
        Ok(path)
    }
}
