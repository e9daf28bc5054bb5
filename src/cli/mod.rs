//! CLI module for pdfcast.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use crate::config::{ContentFormat, ContentLength, ContentStyle};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// pdfcast - turn PDF documents into spoken audio
///
/// Cleans the text of a PDF, writes a transcript in the chosen format,
/// rewrites it for speech and renders it with a text-to-speech provider.
#[derive(Parser, Debug)]
#[command(name = "pdfcast")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate audio from a PDF
    Generate {
        /// PDF file to convert (not needed when skipping step 1)
        #[arg(short, long)]
        pdf: Option<PathBuf>,

        /// Output format of the transcript
        #[arg(short, long, value_enum, default_value_t = ContentFormat::Summary)]
        format: ContentFormat,

        /// Target length of the audio
        #[arg(short, long, value_enum, default_value_t = ContentLength::Medium)]
        length: ContentLength,

        /// Tone of the transcript
        #[arg(short, long, value_enum, default_value_t = ContentStyle::Normal)]
        style: ContentStyle,

        /// Extra guidance for the speech rewrite (e.g. "slow pace, no jargon")
        #[arg(long)]
        preference: Option<String>,

        /// Directory for step outputs and the final audio (overrides config)
        #[arg(short, long)]
        output_dir: Option<String>,

        /// Resume from this step using files from an earlier run
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=4))]
        skip_to: Option<u8>,
    },

    /// Check providers and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_defaults() {
        let cli = Cli::try_parse_from(["pdfcast", "generate", "--pdf", "paper.pdf"]).unwrap();
        match cli.command {
            Commands::Generate {
                pdf,
                format,
                length,
                style,
                skip_to,
                ..
            } => {
                assert_eq!(pdf, Some(PathBuf::from("paper.pdf")));
                assert_eq!(format, ContentFormat::Summary);
                assert_eq!(length, ContentLength::Medium);
                assert_eq!(style, ContentStyle::Normal);
                assert_eq!(skip_to, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_generate_options() {
        let cli = Cli::try_parse_from([
            "pdfcast", "-vv", "generate", "--format", "meeting", "--length", "very-long",
            "--style", "gen-z", "--skip-to", "3",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Generate {
                format,
                length,
                style,
                skip_to,
                ..
            } => {
                assert_eq!(format, ContentFormat::MeetingMinutes);
                assert_eq!(length, ContentLength::VeryLong);
                assert_eq!(style, ContentStyle::GenZ);
                assert_eq!(skip_to, Some(3));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(Cli::try_parse_from(["pdfcast", "generate", "--skip-to", "5"]).is_err());
        assert!(Cli::try_parse_from(["pdfcast", "generate", "--format", "sonnet"]).is_err());
    }
}
