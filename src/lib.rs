//! pdfcast - PDF to podcast pipeline
//!
//! Turns a PDF document into spoken audio with interchangeable AI providers.
//!
//! # Overview
//!
//! A run executes four steps in order, each reading the previous step's file:
//!
//! 1. Extract the PDF text and clean it with a small text model
//! 2. Write a speaker-attributed transcript in the chosen format, length and style
//! 3. Rewrite the transcript so it reads well when synthesized
//! 4. Synthesize every line and join the segments into one audio file
//!
//! # Architecture
//!
//! - `config` - Settings, prompt templates and content parameters
//! - `provider` - Provider construction and chat/speech request adapters
//! - `pdf` - Text extraction and chunking
//! - `transcript` - Transcript model and parsing of model output
//! - `audio` - Audio formats and segment concatenation
//! - `steps` - The four pipeline steps
//! - `orchestrator` - Pipeline coordination and resuming
//!
//! # Example
//!
//! ```rust,no_run
//! use pdfcast::config::{ContentFormat, Settings};
//! use pdfcast::orchestrator::{Orchestrator, PodcastRequest};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let request = PodcastRequest {
//!         pdf: Some("paper.pdf".into()),
//!         format: ContentFormat::Podcast,
//!         ..Default::default()
//!     };
//!     let run = orchestrator.run(&request).await?;
//!     println!("Audio saved to {}", run.audio.display());
//!
//!     Ok(())
//! }
//! ```

pub mod audio;
pub mod cli;
pub mod config;
pub mod error;
pub mod openai;
pub mod orchestrator;
pub mod pdf;
pub mod provider;
pub mod steps;
pub mod transcript;

pub use error::{PdfcastError, Result};
