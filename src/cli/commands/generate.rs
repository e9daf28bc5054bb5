//! Generate command implementation.

use crate::cli::preflight;
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::{Orchestrator, PodcastRequest};
use anyhow::Result;

/// Run the generate command.
pub async fn run_generate(
    request: PodcastRequest,
    output_dir: Option<String>,
    mut settings: Settings,
) -> Result<()> {
    if let Some(dir) = output_dir {
        settings.general.output_dir = dir;
    }

    let first_step = request.skip_to.unwrap_or(1);
    if let Err(e) = preflight::check_generate(&settings, request.pdf.as_deref(), first_step) {
        Output::error(&format!("{}", e));
        Output::info("Run 'pdfcast doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;

    Output::header("Generating audio");
    if let Some(pdf) = &request.pdf {
        Output::kv("PDF", &pdf.display().to_string());
    }
    Output::kv("Format", &request.format.to_string());
    Output::kv("Length", &request.length.to_string());
    Output::kv("Style", &request.style.to_string());
    if first_step > 1 {
        Output::kv("Starting at", &format!("step {}", first_step));
    }
    Output::kv("Output", &orchestrator.output_dir().display().to_string());
    println!();

    match orchestrator.run(&request).await {
        Ok(run) => {
            println!();
            Output::success(&format!("Audio saved to {}", run.audio.display()));
            Output::kv("Transcript", &run.podcast_ready.display().to_string());
            Output::kv("Run record", &run.manifest.display().to_string());
            Output::kv(
                "Elapsed",
                &format_elapsed((run.finished_at - run.started_at).num_seconds()),
            );
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Generation failed: {}", e));
            Err(e.into())
        }
    }
}

/// Format elapsed seconds as a short human-readable string.
fn format_elapsed(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let minutes = seconds / 60;
    let secs = seconds % 60;

    if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}
