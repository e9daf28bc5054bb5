//! Doctor command - verify providers and configuration without network calls.

use crate::audio::AudioFormat;
use crate::cli::Output;
use crate::config::{ProviderKind, ProviderSettings, Settings};
use crate::provider::{normalize_endpoint, set_provider_with_timeout};
use console::style;
use std::path::Path;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings, config_path: &Path) -> anyhow::Result<()> {
    Output::header("pdfcast doctor");
    println!();

    let sections = collect_checks(settings, config_path);
    for (title, checks) in &sections {
        println!("{}", style(title).bold());
        for check in checks {
            check.print();
        }
        println!();
    }

    let all = sections.iter().flat_map(|(_, checks)| checks.iter());
    let errors = all.clone().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = all.filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before generating audio.",
            errors
        ));
        anyhow::bail!("doctor found {} error(s)", errors);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! pdfcast is ready to use.");
    }

    Ok(())
}

/// Gather every check, grouped by section title.
fn collect_checks(settings: &Settings, config_path: &Path) -> Vec<(&'static str, Vec<CheckResult>)> {
    let timeout = settings.request_timeout();

    let mut providers = Vec::new();
    for (label, provider) in [
        ("Small text model", &settings.small_text_model.provider),
        ("Big text model", &settings.big_text_model.provider),
        ("Text-to-speech model", &settings.text_to_speech_model.provider),
    ] {
        let checks = check_provider(label, provider);
        let reported = checks.iter().any(|c| c.status == CheckStatus::Error);
        providers.extend(checks);
        if reported {
            continue;
        }
        if let Err(e) = set_provider_with_timeout(provider, timeout) {
            providers.push(CheckResult::error(
                label,
                &e.to_string(),
                "Fix the provider table in the config file",
            ));
        }
    }

    let speech = vec![
        check_audio_format(&settings.text_to_speech_model.audio_format),
        CheckResult::ok(
            "Voices",
            &format!(
                "host={}, co-host={}{}",
                settings.voices.host,
                settings.voices.co_host,
                if settings.voices.extra.is_empty() {
                    String::new()
                } else {
                    format!(", extra={}", settings.voices.extra.join("/"))
                }
            ),
        ),
    ];

    let mut files = vec![check_config_file(config_path), check_output_dir(settings)];
    if let Some(dir) = &settings.prompts.custom_dir {
        let path = Settings::expand_path(dir);
        files.push(if path.is_dir() {
            CheckResult::ok("Custom prompts", &path.display().to_string())
        } else {
            CheckResult::warning(
                "Custom prompts",
                &format!("{} not found", path.display()),
                "Built-in prompts will be used",
            )
        });
    }

    vec![
        ("Providers", providers),
        ("Speech", speech),
        ("Files", files),
    ]
}

/// Name, credentials and endpoint of one provider role.
fn check_provider(label: &str, provider: &ProviderSettings) -> Vec<CheckResult> {
    let Some(kind) = provider.name else {
        let names: Vec<String> = ProviderKind::ALL.iter().map(|k| k.to_string()).collect();
        return vec![CheckResult::error(
            label,
            "no provider name",
            &format!("Set name to one of: {}", names.join(", ")),
        )];
    };

    let mut results = Vec::new();

    let credentials = match provider.resolve_key() {
        Some(key) => format!("key {}", mask_key(&key)),
        None if kind.key_env_vars().is_empty() => "no key needed".to_string(),
        None => format!("no key (set {})", kind.key_env_vars().join(" or ")),
    };

    let endpoint = match provider.endpoint.as_deref() {
        Some(endpoint) => match normalize_endpoint(endpoint) {
            Ok(url) => url,
            Err(e) => {
                results.push(CheckResult::error(
                    label,
                    &e.to_string(),
                    "Endpoints must be http(s) URLs",
                ));
                return results;
            }
        },
        None => "default endpoint".to_string(),
    };

    results.push(CheckResult::ok(
        label,
        &format!("{} ({}, {})", kind, endpoint, credentials),
    ));

    if matches!(kind, ProviderKind::Lmstudio | ProviderKind::Ollama) && provider.endpoint.is_none() {
        results.push(CheckResult::warning(
            label,
            "uses a local server",
            "Make sure it is running before generating",
        ));
    }

    results
}

fn check_audio_format(format: &str) -> CheckResult {
    match format.parse::<AudioFormat>() {
        Ok(f) if f.can_concatenate() => CheckResult::ok("Audio format", f.as_str()),
        Ok(f) => CheckResult::warning(
            "Audio format",
            &format!("{} segments cannot be joined", f),
            "Use wav or mp3 for multi-line transcripts",
        ),
        Err(e) => CheckResult::error("Audio format", &e, "Use wav, mp3, opus, aac, flac or pcm"),
    }
}

/// Check if config file exists.
fn check_config_file(config_path: &Path) -> CheckResult {
    if config_path.exists() {
        CheckResult::ok("Config file", &config_path.display().to_string())
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: pdfcast config init",
        )
    }
}

fn check_output_dir(settings: &Settings) -> CheckResult {
    let dir = settings.output_dir();
    if dir.is_dir() {
        CheckResult::ok("Output directory", &dir.display().to_string())
    } else {
        CheckResult::warning(
            "Output directory",
            &format!("{} (will be created)", dir.display()),
            "Directory will be created on first run",
        )
    }
}

/// Show only the ends of a secret.
pub(crate) fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 12 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
