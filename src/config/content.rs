//! Content parameters that shape the generated transcript.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Output format of the generated transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ContentFormat {
    Podcast,
    Interview,
    PanelDiscussion,
    Debate,
    #[default]
    Summary,
    Narration,
    Storytelling,
    Explainer,
    Lecture,
    Tutorial,
    QAndA,
    NewsReport,
    ExecutiveBrief,
    #[value(alias = "meeting")]
    #[serde(alias = "meeting")]
    MeetingMinutes,
    Analysis,
}

impl ContentFormat {
    /// Number of distinct speakers the format calls for.
    pub fn speaker_count(&self) -> usize {
        match self {
            ContentFormat::PanelDiscussion => 3,
            ContentFormat::Podcast
            | ContentFormat::Interview
            | ContentFormat::Debate
            | ContentFormat::QAndA
            | ContentFormat::MeetingMinutes => 2,
            _ => 1,
        }
    }

    /// Whether a single narrator delivers the content.
    pub fn is_single_speaker(&self) -> bool {
        self.speaker_count() == 1
    }

    /// Format-specific instructions for the transcript writer.
    pub fn instructions(&self) -> &'static str {
        match self {
            ContentFormat::Podcast => {
                "Write a lively podcast conversation. Speaker 1 is the host who leads the \
                 discussion and explains the material with anecdotes and analogies. Speaker 2 \
                 is a curious co-host who asks follow-up questions, reacts naturally and \
                 occasionally goes on tangents."
            }
            ContentFormat::Interview => {
                "Write an interview. Speaker 1 is the interviewer asking focused, probing \
                 questions. Speaker 2 is the expert answering in depth, drawing directly on \
                 the source material."
            }
            ContentFormat::PanelDiscussion => {
                "Write a panel discussion. Speaker 1 moderates, introduces topics and keeps \
                 the conversation moving. Speaker 2 and Speaker 3 are panelists with \
                 distinct perspectives who build on and challenge each other."
            }
            ContentFormat::Debate => {
                "Write a debate. Speaker 1 argues in favour of the main claims of the \
                 material and Speaker 2 argues against them. Each side rebuts the other \
                 with evidence and the debate ends with brief closing statements."
            }
            ContentFormat::Summary => {
                "Write a concise spoken summary of the key points, delivered by a single \
                 narrator (Speaker 1)."
            }
            ContentFormat::Narration => {
                "Write a flowing narration of the material, delivered by a single narrator \
                 (Speaker 1) as if reading an audiobook."
            }
            ContentFormat::Storytelling => {
                "Retell the material as an engaging story with a clear beginning, middle \
                 and end, delivered by a single storyteller (Speaker 1)."
            }
            ContentFormat::Explainer => {
                "Write an explainer that breaks the topic down step by step for a newcomer, \
                 delivered by a single presenter (Speaker 1)."
            }
            ContentFormat::Lecture => {
                "Write a structured lecture with an introduction, main sections and a \
                 recap, delivered by a single lecturer (Speaker 1)."
            }
            ContentFormat::Tutorial => {
                "Write a practical tutorial that walks the listener through the material \
                 as actionable steps, delivered by a single instructor (Speaker 1)."
            }
            ContentFormat::QAndA => {
                "Write a question-and-answer session. Speaker 1 asks the questions a \
                 listener would have and Speaker 2 answers them clearly."
            }
            ContentFormat::NewsReport => {
                "Write a news report presenting the material as current news, delivered by \
                 a single anchor (Speaker 1)."
            }
            ContentFormat::ExecutiveBrief => {
                "Write a short executive briefing focused on conclusions, implications and \
                 recommended actions, delivered by a single presenter (Speaker 1)."
            }
            ContentFormat::MeetingMinutes => {
                "Write a meeting between two colleagues reviewing the material. Speaker 1 \
                 chairs the meeting and Speaker 2 contributes, and the meeting closes with \
                 agreed action items."
            }
            ContentFormat::Analysis => {
                "Write a critical analysis of the material covering strengths, weaknesses \
                 and open questions, delivered by a single analyst (Speaker 1)."
            }
        }
    }
}

/// Target length of the generated transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ContentLength {
    Short,
    #[default]
    Medium,
    Long,
    VeryLong,
}

impl ContentLength {
    /// Approximate word count to aim for.
    pub fn target_words(&self) -> u32 {
        match self {
            ContentLength::Short => 750,
            ContentLength::Medium => 1500,
            ContentLength::Long => 3000,
            ContentLength::VeryLong => 4500,
        }
    }

    /// Human readable description for prompts.
    pub fn description(&self) -> String {
        let minutes = match self {
            ContentLength::Short => "about 5 minutes",
            ContentLength::Medium => "about 10 minutes",
            ContentLength::Long => "about 20 minutes",
            ContentLength::VeryLong => "30 minutes or more",
        };
        format!("{} of audio, roughly {} words", minutes, self.target_words())
    }
}

/// Tone of the generated transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ContentStyle {
    #[default]
    Normal,
    Friendly,
    Professional,
    Academic,
    Casual,
    Technical,
    GenZ,
    Funny,
}

impl ContentStyle {
    /// Description of the tone for prompts.
    pub fn description(&self) -> &'static str {
        match self {
            ContentStyle::Normal => "a natural, balanced tone",
            ContentStyle::Friendly => "a warm, friendly and welcoming tone",
            ContentStyle::Professional => "a polished, professional tone",
            ContentStyle::Academic => "a rigorous academic tone that cites the material precisely",
            ContentStyle::Casual => "a relaxed, conversational tone",
            ContentStyle::Technical => "a precise technical tone that keeps domain terminology",
            ContentStyle::GenZ => "a playful Gen Z tone with current slang, without losing accuracy",
            ContentStyle::Funny => "a humorous tone with light jokes, without losing accuracy",
        }
    }
}

macro_rules! value_enum_str {
    ($($ty:ty),*) => {
        $(
            impl std::str::FromStr for $ty {
                type Err = String;

                fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                    <$ty as ValueEnum>::from_str(s, true).map_err(|_| {
                        let accepted: Vec<String> = <$ty as ValueEnum>::value_variants()
                            .iter()
                            .filter_map(|v| v.to_possible_value())
                            .map(|v| v.get_name().to_string())
                            .collect();
                        format!("Unknown value '{}'. Accepted: {}", s, accepted.join(", "))
                    })
                }
            }

            impl std::fmt::Display for $ty {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    match self.to_possible_value() {
                        Some(value) => write!(f, "{}", value.get_name()),
                        None => write!(f, "{:?}", self),
                    }
                }
            }
        )*
    };
}

value_enum_str!(ContentFormat, ContentLength, ContentStyle);
