//! The four pipeline steps.
//!
//! Each step reads the file written by the previous one and writes its own
//! output into a per-step directory, so a run can resume from any step.

mod step1;
mod step2;
mod step3;
mod step4;

pub use step1::{clean_text, step1};
pub use step2::step2;
pub use step3::step3;
pub use step4::step4;

use crate::error::Result;
use crate::transcript::Transcript;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Pause between steps to stay clear of provider rate limits.
pub async fn wait_for_next_step(seconds: f64) {
    if seconds <= 0.0 || !seconds.is_finite() {
        return;
    }
    info!("Waiting {:.1}s before the next step", seconds);
    tokio::time::sleep(Duration::from_secs_f64(seconds)).await;
}

/// Most recently modified file with `extension` in `dir`.
pub fn latest_output(dir: &Path, extension: &str) -> Option<PathBuf> {
    std::fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
        })
        .filter_map(|path| {
            let modified = path.metadata().and_then(|m| m.modified()).ok()?;
            Some((modified, path))
        })
        .max_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)))
        .map(|(_, path)| path)
}

/// Load a transcript, preferring the structured JSON written next to a text file.
pub fn load_transcript(path: &Path) -> Result<Transcript> {
    if path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
    {
        return Transcript::load_json(path);
    }

    let json = path.with_extension("json");
    if json.exists() {
        return Transcript::load_json(&json);
    }

    Transcript::load_text(path)
}

fn progress_bar(len: usize, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    let template = format!("  {{spinner:.green}} {:<9} [{{bar:30.cyan/blue}}] {{pos}}/{{len}}", label);
    pb.set_style(
        ProgressStyle::with_template(&template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );
    pb
}
