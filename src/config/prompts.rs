//! Prompt templates for pdfcast.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Prompts {
    /// Prompts for cleaning raw PDF text.
    pub cleanup: CleanupPrompts,
    /// Prompts for writing the transcript.
    pub transcript: TranscriptPrompts,
    /// Prompts for rewriting the transcript for speech synthesis.
    pub rewrite: RewritePrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompts for PDF text cleanup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupPrompts {
    pub system: String,
}

impl Default for CleanupPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a world class text pre-processor. Here is the raw data from a PDF, please parse and return it in a way that is crispy and usable to send to a podcast writer.

The raw data is messed up with new lines, LaTeX math and you will see fluff that we can remove completely. Basically take away any details that you think might be useless in a podcast author's transcript.

Remember, the podcast could be on any topic whatsoever so the issues listed above are not exhaustive.

Please be smart with what you remove and be creative.

Be very smart and aggressive with removing details. You will get a running portion of the text, keep returning the processed text.

PLEASE DO NOT ADD MARKDOWN FORMATTING, STOP ADDING SPECIAL CHARACTERS THAT MARKDOWN CAPITALISATION ETC LIKES.

ALWAYS start your response directly with processed text and NO ACKNOWLEDGEMENTS about my questions ok?"#
                .to_string(),
        }
    }
}

/// Prompts for transcript generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptPrompts {
    pub system: String,
    pub user: String,
}

impl Default for TranscriptPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a world-class writer of spoken audio content. You turn written material into scripts that sound natural when read aloud.

Format: {{format}}
{{format_instructions}}

Length: aim for {{length}}.
Style: use {{style}}.
Speakers: exactly {{speaker_count}}, labelled {{speakers}}.

Rules:
- Stay faithful to the source material; never invent facts
- Each turn must be spoken text only, with no stage directions or markdown
- Use the speaker labels exactly as given

Respond ONLY with a JSON array of [speaker, text] pairs, for example:
[["Speaker 1", "Welcome! Today we are looking at..."], ["Speaker 2", "Thanks, I've been curious about this."]]"#
                .to_string(),

            user: r#"Here is the source material:

{{text}}"#
                .to_string(),
        }
    }
}

/// Prompts for the text-to-speech rewrite.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RewritePrompts {
    pub system: String,
    pub user: String,
}

impl Default for RewritePrompts {
    fn default() -> Self {
        Self {
            system: r#"You are an international award-winning script editor preparing transcripts for a text-to-speech engine.

Rewrite the transcript you are given so that it sounds natural when synthesized:
- Spell out abbreviations, symbols, numbers and units the way a person would say them
- Remove anything that cannot be spoken: markdown, URLs, citations, brackets, emojis
- Break very long turns into shorter sentences without changing their meaning
- Keep natural fillers such as "hmm" or "right" sparingly for the listening speakers
- Keep every speaker label exactly as it appears and keep the order of turns

Respond ONLY with a JSON array of [speaker, text] pairs in the same shape as the input."#
                .to_string(),

            user: r#"Here is the transcript to rewrite:

{{transcript}}
{{preference}}"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let cleanup_path = custom_path.join("cleanup.toml");
            if cleanup_path.exists() {
                let content = std::fs::read_to_string(&cleanup_path)?;
                prompts.cleanup = toml::from_str(&content)?;
            }

            let transcript_path = custom_path.join("transcript.toml");
            if transcript_path.exists() {
                let content = std::fs::read_to_string(&transcript_path)?;
                prompts.transcript = toml::from_str(&content)?;
            }

            let rewrite_path = custom_path.join("rewrite.toml");
            if rewrite_path.exists() {
                let content = std::fs::read_to_string(&rewrite_path)?;
                prompts.rewrite = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}
