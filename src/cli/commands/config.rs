//! Config command implementation.

use super::doctor::mask_key;
use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::Result;
use std::path::Path;

/// Run the config command.
///
/// `config_path` is the file `init` writes to: the `--config` path when given,
/// otherwise the default location.
pub fn run_config(action: &ConfigAction, settings: &Settings, config_path: &Path) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&redacted(settings))
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Path => {
            println!("{}", config_path.display());
        }

        ConfigAction::Init { force } => {
            write_default_config(config_path, *force)?;
            Output::success(&format!("Wrote default config to {}", config_path.display()));
            Output::info("Add provider keys there, or export OPENAI_API_KEY and friends.");
        }
    }

    Ok(())
}

/// Copy of `settings` with provider keys masked for display.
fn redacted(settings: &Settings) -> Settings {
    let mut shown = settings.clone();
    for provider in [
        &mut shown.small_text_model.provider,
        &mut shown.big_text_model.provider,
        &mut shown.text_to_speech_model.provider,
    ] {
        if let Some(key) = provider.key.as_mut() {
            *key = mask_key(key);
        }
    }
    shown
}

fn write_default_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    Settings::default().save_to(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_loadable_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pdfcast").join("config.toml");

        write_default_config(&path, false).unwrap();
        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded.big_text_model.model, "gpt-4o");
    }

    #[test]
    fn test_show_masks_keys() {
        let mut settings = Settings::default();
        settings.big_text_model.provider.key = Some("sk-proj-1234567890abcdef".to_string());

        let shown = toml::to_string_pretty(&redacted(&settings)).unwrap();
        assert!(shown.contains("sk-p...cdef"));
        assert!(!shown.contains("1234567890"));
        assert_eq!(
            settings.big_text_model.provider.key.as_deref(),
            Some("sk-proj-1234567890abcdef")
        );
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[general]\nstep_delay_seconds = 0.5\n").unwrap();

        assert!(write_default_config(&path, false).is_err());
        assert_eq!(
            Settings::load_from(&path).unwrap().general.step_delay_seconds,
            0.5
        );

        write_default_config(&path, true).unwrap();
        assert_eq!(
            Settings::load_from(&path).unwrap().general.step_delay_seconds,
            2.0
        );
    }
}
