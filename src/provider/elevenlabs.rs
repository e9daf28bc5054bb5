//! ElevenLabs speech provider.

use super::{check_response, Provider, SpeechRequest};
use crate::audio::{pcm_to_wav, AudioFormat};
use crate::config::ProviderKind;
use crate::error::{PdfcastError, Result};
use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, instrument};

const ELEVENLABS_BASE: &str = "https://api.elevenlabs.io";

/// Sample rate requested when raw PCM is needed.
const PCM_SAMPLE_RATE: u32 = 24_000;

/// ElevenLabs text-to-speech client. The request voice is an ElevenLabs voice id.
pub struct ElevenLabsProvider {
    api_base: String,
    api_key: String,
    http: reqwest::Client,
}

impl ElevenLabsProvider {
    pub fn new(api_base: Option<&str>, api_key: &str, http: reqwest::Client) -> Self {
        Self {
            api_base: api_base
                .unwrap_or(ELEVENLABS_BASE)
                .trim_end_matches('/')
                .to_string(),
            api_key: api_key.to_string(),
            http,
        }
    }

    /// ElevenLabs `output_format` for the requested container.
    fn output_format(format: AudioFormat) -> Result<&'static str> {
        match format {
            AudioFormat::Mp3 => Ok("mp3_44100_128"),
            AudioFormat::Wav | AudioFormat::Pcm => Ok("pcm_24000"),
            AudioFormat::Opus => Ok("opus_48000_64"),
            other => Err(PdfcastError::Audio(format!(
                "ElevenLabs cannot produce {} audio",
                other
            ))),
        }
    }
}

#[derive(Debug, Serialize)]
struct TextToSpeechBody<'a> {
    text: &'a str,
    model_id: &'a str,
}

#[async_trait]
impl Provider for ElevenLabsProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Elevenlabs
    }

    #[instrument(skip(self, request), fields(model = %request.model, voice = %request.voice))]
    async fn generate_speech(&self, request: &SpeechRequest) -> Result<Vec<u8>> {
        let output_format = Self::output_format(request.response_format)?;
        let url = format!("{}/v1/text-to-speech/{}", self.api_base, request.voice);

        let response = self
            .http
            .post(url)
            .query(&[("output_format", output_format)])
            .header("xi-api-key", &self.api_key)
            .json(&TextToSpeechBody {
                text: &request.text,
                model_id: &request.model,
            })
            .send()
            .await?;
        let audio = check_response(response).await?.bytes().await?.to_vec();
        debug!("ElevenLabs returned {} bytes", audio.len());

        match request.response_format {
            AudioFormat::Wav => pcm_to_wav(&audio, PCM_SAMPLE_RATE, 1),
            _ => Ok(audio),
        }
    }
}
