//! OpenAI-compatible provider (OpenAI, LM Studio, Ollama, Groq, custom servers).

use super::{check_response, ChatMessage, ChatRequest, Provider, Role, SpeechRequest};
use crate::config::ProviderKind;
use crate::error::{PdfcastError, Result};
use crate::openai::create_client;
use async_openai::config::{Config, OpenAIConfig};
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, instrument};

/// Provider speaking the OpenAI REST dialect at a configurable base URL.
pub struct OpenAiCompatProvider {
    kind: ProviderKind,
    api_base: String,
    api_key: Option<String>,
    client: Client<OpenAIConfig>,
    http: reqwest::Client,
}

impl OpenAiCompatProvider {
    pub fn new(
        kind: ProviderKind,
        api_base: &str,
        api_key: Option<String>,
        http: reqwest::Client,
    ) -> Self {
        let api_base = api_base.trim_end_matches('/').to_string();
        Self {
            kind,
            client: create_client(&api_base, api_key.as_deref(), http.clone()),
            api_base,
            api_key,
            http,
        }
    }

    /// Base URL requests are sent to.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }
}

#[async_trait]
impl Provider for OpenAiCompatProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn generate_text(&self, request: &ChatRequest) -> Result<String> {
        chat_completion(&self.client, request).await
    }

    #[instrument(skip(self, request), fields(model = %request.model, voice = %request.voice))]
    async fn generate_speech(&self, request: &SpeechRequest) -> Result<Vec<u8>> {
        let mut builder = self.http.post(format!("{}/audio/speech", self.api_base));
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        send_speech(builder, request).await
    }
}

/// Convert normalized messages into async-openai request messages.
pub(super) fn to_openai_messages(
    messages: &[ChatMessage],
) -> Result<Vec<ChatCompletionRequestMessage>> {
    messages
        .iter()
        .map(|message| {
            let converted: ChatCompletionRequestMessage = match message.role {
                Role::System => ChatCompletionRequestSystemMessageArgs::default()
                    .content(message.content.clone())
                    .build()
                    .map_err(|e| PdfcastError::Provider(e.to_string()))?
                    .into(),
                Role::User => ChatCompletionRequestUserMessageArgs::default()
                    .content(message.content.clone())
                    .build()
                    .map_err(|e| PdfcastError::Provider(e.to_string()))?
                    .into(),
                Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                    .content(message.content.clone())
                    .build()
                    .map_err(|e| PdfcastError::Provider(e.to_string()))?
                    .into(),
            };
            Ok(converted)
        })
        .collect()
}

/// Run a chat completion on any async-openai client and return the first choice.
#[allow(deprecated)]
pub(super) async fn chat_completion<C: Config>(
    client: &Client<C>,
    request: &ChatRequest,
) -> Result<String> {
    let messages = to_openai_messages(&request.messages)?;

    // Local OpenAI-compatible servers only understand `max_tokens`.
    let chat_request = CreateChatCompletionRequestArgs::default()
        .model(&request.model)
        .messages(messages)
        .max_tokens(request.max_tokens)
        .temperature(request.temperature)
        .build()
        .map_err(|e| PdfcastError::Provider(e.to_string()))?;

    let response = client
        .chat()
        .create(chat_request)
        .await
        .map_err(|e| PdfcastError::OpenAI(format!("Chat completion failed: {}", e)))?;

    let text = response
        .choices
        .first()
        .and_then(|c| c.message.content.as_ref())
        .ok_or_else(|| PdfcastError::Provider("Empty response from LLM".to_string()))?
        .clone();

    debug!("Chat completion returned {} characters", text.len());
    Ok(text)
}

/// OpenAI speech request body.
#[derive(Debug, Serialize)]
struct SpeechBody<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'a str,
}

/// POST an OpenAI-shaped speech request and return the audio bytes.
pub(super) async fn send_speech(
    builder: reqwest::RequestBuilder,
    request: &SpeechRequest,
) -> Result<Vec<u8>> {
    let body = SpeechBody {
        model: &request.model,
        input: &request.text,
        voice: &request.voice,
        response_format: request.response_format.as_str(),
    };

    let response = check_response(builder.json(&body).send().await?).await?;
    let bytes = response.bytes().await?;
    Ok(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioFormat;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer, key: Option<&str>) -> OpenAiCompatProvider {
        let http = crate::openai::http_client(Duration::from_secs(5)).unwrap();
        OpenAiCompatProvider::new(
            ProviderKind::Custom,
            &format!("{}/v1/", server.uri()),
            key.map(str::to_string),
            http,
        )
    }

    #[test]
    fn test_message_conversion_keeps_roles() {
        let messages = vec![
            ChatMessage::system("s"),
            ChatMessage::user("u"),
            ChatMessage::assistant("a"),
        ];
        let converted = to_openai_messages(&messages).unwrap();
        assert!(matches!(converted[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(converted[1], ChatCompletionRequestMessage::User(_)));
        assert!(matches!(converted[2], ChatCompletionRequestMessage::Assistant(_)));
    }

    #[tokio::test]
    async fn test_chat_completion() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4o-mini",
                "max_tokens": 128
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-1",
                "object": "chat.completion",
                "created": 1700000000,
                "model": "gpt-4o-mini",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": "Clean text."},
                    "finish_reason": "stop"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server, Some("sk-test"));
        assert_eq!(provider.api_base(), format!("{}/v1", server.uri()));

        let request = ChatRequest {
            messages: vec![ChatMessage::user("Dirty text")],
            max_tokens: 128,
            ..Default::default()
        };
        let text = provider.generate_text(&request).await.unwrap();
        assert_eq!(text, "Clean text.");
    }

    #[tokio::test]
    async fn test_speech_request_shape() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/audio/speech"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({
                "model": "tts-1",
                "input": "Hello there",
                "voice": "nova",
                "response_format": "mp3"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![7u8; 64]))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server, Some("sk-test"));
        let request = SpeechRequest {
            text: "Hello there".to_string(),
            voice: "nova".to_string(),
            response_format: AudioFormat::Mp3,
            ..Default::default()
        };
        let audio = provider.generate_speech(&request).await.unwrap();
        assert_eq!(audio.len(), 64);
    }

    #[tokio::test]
    async fn test_speech_error_surfaces_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/audio/speech"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {"message": "Unknown voice", "type": "invalid_request_error"}
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server, None);
        let request = SpeechRequest {
            text: "Hi".to_string(),
            ..Default::default()
        };
        let err = provider.generate_speech(&request).await.unwrap_err();
        assert!(err.to_string().contains("Unknown voice"));
        assert!(err.to_string().contains("400"));
    }
}
