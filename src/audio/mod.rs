//! Audio formats and segment assembly.
//!
//! Speech providers return one file per transcript line; this module joins
//! those segments into the final episode.

mod concat;

pub use concat::{concatenate, pcm_to_wav};

use serde::{Deserialize, Serialize};

/// Audio container requested from speech providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    #[default]
    Wav,
    Mp3,
    Opus,
    Aac,
    Flac,
    Pcm,
}

impl AudioFormat {
    /// Name used in provider requests.
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioFormat::Wav => "wav",
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Opus => "opus",
            AudioFormat::Aac => "aac",
            AudioFormat::Flac => "flac",
            AudioFormat::Pcm => "pcm",
        }
    }

    /// File extension for saved segments.
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }

    /// Whether segments in this format can be joined into one file.
    pub fn can_concatenate(&self) -> bool {
        matches!(self, AudioFormat::Wav | AudioFormat::Mp3 | AudioFormat::Pcm)
    }
}

impl std::str::FromStr for AudioFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "wav" => Ok(AudioFormat::Wav),
            "mp3" => Ok(AudioFormat::Mp3),
            "opus" => Ok(AudioFormat::Opus),
            "aac" => Ok(AudioFormat::Aac),
            "flac" => Ok(AudioFormat::Flac),
            "pcm" => Ok(AudioFormat::Pcm),
            _ => Err(format!("Unknown audio format: {}", s)),
        }
    }
}

impl std::fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
