//! Speaker-attributed transcripts exchanged between pipeline steps.

use crate::error::{PdfcastError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

/// One spoken turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptLine {
    pub speaker: String,
    pub text: String,
}

impl TranscriptLine {
    pub fn new(speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            text: text.into(),
        }
    }

    /// 1-based speaker number parsed from labels like `Speaker 2` or `Speaker2`.
    pub fn speaker_index(&self) -> Option<usize> {
        self.speaker
            .trim()
            .trim_start_matches(|c: char| !c.is_ascii_digit())
            .parse()
            .ok()
    }
}

/// An ordered list of turns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    pub lines: Vec<TranscriptLine>,
}

/// Shapes a model may use for a single turn.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawLine {
    Pair(String, String),
    Object { speaker: String, text: String },
}

impl From<RawLine> for TranscriptLine {
    fn from(raw: RawLine) -> Self {
        match raw {
            RawLine::Pair(speaker, text) | RawLine::Object { speaker, text } => {
                TranscriptLine::new(speaker.trim(), text.trim())
            }
        }
    }
}

fn tuple_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"\(\s*["']([^"']+)["']\s*,\s*(?:"((?:[^"\\]|\\.)*)"|'((?:[^'\\]|\\.)*)')\s*\)"#)
            .expect("Invalid regex")
    })
}

fn label_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*\**\s*Speaker\s*(\d+)\s*\**\s*:\s*\**\s*(.+)$").expect("Invalid regex")
    })
}

impl Transcript {
    pub fn new(lines: Vec<TranscriptLine>) -> Self {
        Self { lines }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Parse model output into a transcript.
    ///
    /// Accepts, in order of preference: a JSON array of `[speaker, text]`
    /// pairs or `{speaker, text}` objects, a Python-style list of tuples, or
    /// plain `Speaker N: text` lines. Surrounding prose and code fences are
    /// ignored.
    pub fn parse(output: &str) -> Result<Self> {
        let lines = Self::parse_json(output)
            .or_else(|| Self::parse_tuples(output))
            .unwrap_or_else(|| Self::parse_labels(output));

        let lines: Vec<TranscriptLine> = lines
            .into_iter()
            .filter(|l| !l.speaker.is_empty() && !l.text.is_empty())
            .collect();

        if lines.is_empty() {
            return Err(PdfcastError::Transcript(format!(
                "No speaker turns found in model output: {}",
                preview(output, 300)
            )));
        }

        Ok(Self { lines })
    }

    /// First non-empty JSON array of turns, ignoring brackets in prose.
    fn parse_json(output: &str) -> Option<Vec<TranscriptLine>> {
        output.match_indices('[').find_map(|(start, _)| {
            let raw = serde_json::Deserializer::from_str(&output[start..])
                .into_iter::<Vec<RawLine>>()
                .next()?
                .ok()?;
            if raw.is_empty() {
                None
            } else {
                Some(raw.into_iter().map(TranscriptLine::from).collect())
            }
        })
    }

    fn parse_tuples(output: &str) -> Option<Vec<TranscriptLine>> {
        let lines: Vec<TranscriptLine> = tuple_pattern()
            .captures_iter(output)
            .filter_map(|caps| {
                let speaker = caps.get(1)?.as_str();
                let text = caps.get(2).or_else(|| caps.get(3))?.as_str();
                Some(TranscriptLine::new(speaker.trim(), unescape(text).trim()))
            })
            .collect();

        if lines.is_empty() {
            None
        } else {
            Some(lines)
        }
    }

    fn parse_labels(output: &str) -> Vec<TranscriptLine> {
        let mut lines: Vec<TranscriptLine> = Vec::new();

        for raw in output.lines() {
            if let Some(caps) = label_pattern().captures(raw) {
                let speaker = format!("Speaker {}", &caps[1]);
                lines.push(TranscriptLine::new(speaker, caps[2].trim()));
            } else if let Some(last) = lines.last_mut() {
                // Continuation of the previous turn.
                let text = raw.trim();
                if !text.is_empty() {
                    last.text.push(' ');
                    last.text.push_str(text);
                }
            }
        }

        lines
    }

    /// Render as one `Speaker: text` line per turn.
    pub fn to_text(&self) -> String {
        self.lines
            .iter()
            .map(|l| format!("{}: {}", l.speaker, l.text))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Number of distinct speakers.
    pub fn speaker_count(&self) -> usize {
        let mut speakers: Vec<&str> = self.lines.iter().map(|l| l.speaker.as_str()).collect();
        speakers.sort_unstable();
        speakers.dedup();
        speakers.len()
    }

    /// Save as pretty JSON.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Load a transcript saved with [`Transcript::save_json`].
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Load from a text file written by [`Transcript::to_text`] or raw model output.
    pub fn load_text(path: &Path) -> Result<Self> {
        Self::parse(&std::fs::read_to_string(path)?)
    }
}

fn unescape(text: &str) -> String {
    text.replace("\\n", " ")
        .replace("\\\"", "\"")
        .replace("\\'", "'")
        .replace("\\\\", "\\")
}

fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_pairs_inside_fence() {
        let output = r#"Here you go:
```json
[["Speaker 1", "Welcome to the show."], ["Speaker 2", "Glad to be here!"]]
```"#;
        let transcript = Transcript::parse(output).unwrap();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.lines[1], TranscriptLine::new("Speaker 2", "Glad to be here!"));
    }

    #[test]
    fn test_parse_json_objects() {
        let output = r#"[{"speaker": "Speaker 1", "text": " Hello "}]"#;
        let transcript = Transcript::parse(output).unwrap();
        assert_eq!(transcript.lines[0].text, "Hello");
    }

    #[test]
    fn test_parse_json_with_brackets_in_prose() {
        let leading = r#"Sure [draft v2]: [["Speaker 1", "Welcome."], ["Speaker 2", "Hi."]]"#;
        let trailing = "[[\"Speaker 1\",\"Welcome.\"],[\"Speaker 2\",\"Hi.\"]]\n\n[Note: kept under 5 minutes]";

        for output in [leading, trailing] {
            let transcript = Transcript::parse(output).unwrap();
            assert_eq!(
                transcript.lines,
                vec![
                    TranscriptLine::new("Speaker 1", "Welcome."),
                    TranscriptLine::new("Speaker 2", "Hi."),
                ]
            );
        }
    }

    #[test]
    fn test_parse_python_tuples() {
        let output = r#"[
    ("Speaker 1", "It's a big day, isn't it?"),
    ('Speaker 2', 'Sure is. She said \'wow\'.'),
]"#;
        let transcript = Transcript::parse(output).unwrap();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.lines[0].text, "It's a big day, isn't it?");
        assert_eq!(transcript.lines[1].text, "Sure is. She said 'wow'.");
    }

    #[test]
    fn test_parse_labelled_lines() {
        let output = "**Speaker 1:** Let's begin.\nThis continues the turn.\n\nSpeaker 2: Okay!";
        let transcript = Transcript::parse(output).unwrap();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.lines[0].speaker, "Speaker 1");
        assert_eq!(transcript.lines[0].text, "Let's begin. This continues the turn.");
        assert_eq!(transcript.lines[1].text, "Okay!");
    }

    #[test]
    fn test_parse_rejects_prose() {
        let err = Transcript::parse("I'm sorry, I can't help with that.").unwrap_err();
        assert!(matches!(err, PdfcastError::Transcript(_)));
    }

    #[test]
    fn test_text_round_trip() {
        let transcript = Transcript::new(vec![
            TranscriptLine::new("Speaker 1", "One."),
            TranscriptLine::new("Speaker 2", "Two."),
            TranscriptLine::new("Speaker 1", "Three."),
        ]);
        assert_eq!(transcript.to_text(), "Speaker 1: One.\nSpeaker 2: Two.\nSpeaker 1: Three.");
        assert_eq!(Transcript::parse(&transcript.to_text()).unwrap(), transcript);
        assert_eq!(transcript.speaker_count(), 2);
    }

    #[test]
    fn test_speaker_index() {
        assert_eq!(TranscriptLine::new("Speaker 2", "x").speaker_index(), Some(2));
        assert_eq!(TranscriptLine::new("Speaker3", "x").speaker_index(), Some(3));
        assert_eq!(TranscriptLine::new("Host", "x").speaker_index(), None);
    }

    #[test]
    fn test_unspaced_labels_keep_their_speaker() {
        let transcript = Transcript::parse("Speaker1: One.\nSpeaker1: Two.\nSpeaker2: Three.").unwrap();
        let speakers: Vec<&str> = transcript.lines.iter().map(|l| l.speaker.as_str()).collect();
        assert_eq!(speakers, vec!["Speaker 1", "Speaker 1", "Speaker 2"]);
        let indices: Vec<Option<usize>> = transcript.lines.iter().map(|l| l.speaker_index()).collect();
        assert_eq!(indices, vec![Some(1), Some(1), Some(2)]);
    }

    #[test]
    fn test_json_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.json");
        let transcript = Transcript::new(vec![TranscriptLine::new("Speaker 1", "Hi")]);
        transcript.save_json(&path).unwrap();
        assert_eq!(Transcript::load_json(&path).unwrap(), transcript);
    }
}
