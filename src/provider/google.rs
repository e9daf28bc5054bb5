//! Google Gemini provider (generative language API).

use super::{check_response, ChatRequest, Provider, Role};
use crate::config::ProviderKind;
use crate::error::{PdfcastError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

const GOOGLE_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini text generation client.
pub struct GoogleProvider {
    api_base: String,
    api_key: String,
    http: reqwest::Client,
}

impl GoogleProvider {
    pub fn new(api_base: Option<&str>, api_key: &str, http: reqwest::Client) -> Self {
        Self {
            api_base: api_base
                .unwrap_or(GOOGLE_BASE)
                .trim_end_matches('/')
                .to_string(),
            api_key: api_key.to_string(),
            http,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// Map chat messages onto Gemini's system instruction and turn roles.
fn build_request(request: &ChatRequest) -> Result<GenerateContentRequest> {
    let mut system_parts = Vec::new();
    let mut contents = Vec::new();

    for message in &request.messages {
        let role = match message.role {
            Role::System => {
                system_parts.push(Part {
                    text: message.content.clone(),
                });
                continue;
            }
            Role::User => "user",
            Role::Assistant => "model",
        };
        contents.push(Content {
            role: Some(role.to_string()),
            parts: vec![Part {
                text: message.content.clone(),
            }],
        });
    }

    if contents.is_empty() {
        return Err(PdfcastError::InvalidInput(
            "Google requires at least one user or assistant message".to_string(),
        ));
    }

    let system_instruction = if system_parts.is_empty() {
        None
    } else {
        Some(Content {
            role: None,
            parts: system_parts,
        })
    };

    Ok(GenerateContentRequest {
        system_instruction,
        contents,
        generation_config: GenerationConfig {
            max_output_tokens: request.max_tokens,
            temperature: request.temperature,
        },
    })
}

#[async_trait]
impl Provider for GoogleProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Google
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn generate_text(&self, request: &ChatRequest) -> Result<String> {
        let body = build_request(request)?;
        let url = format!("{}/models/{}:generateContent", self.api_base, request.model);

        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;
        let response: GenerateContentResponse = check_response(response).await?.json().await?;

        let text: String = response
            .candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|c| c.parts.iter())
            .map(|p| p.text.as_str())
            .collect();

        if text.is_empty() {
            let reason = response
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "no candidates returned".to_string());
            return Err(PdfcastError::Provider(format!(
                "Google returned no text: {}",
                reason
            )));
        }

        debug!("Gemini returned {} characters", text.len());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{ChatMessage, SpeechRequest};
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> GoogleProvider {
        let http = crate::openai::http_client(Duration::from_secs(5)).unwrap();
        GoogleProvider::new(Some(&server.uri()), "g-key", http)
    }

    #[test]
    fn test_build_request_maps_roles() {
        let request = ChatRequest {
            messages: vec![
                ChatMessage::system("Be brief."),
                ChatMessage::user("Hi"),
                ChatMessage::assistant("Hello"),
                ChatMessage::user("Summarize"),
            ],
            max_tokens: 100,
            temperature: 0.3,
            ..Default::default()
        };

        let body = serde_json::to_value(build_request(&request).unwrap()).unwrap();
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "Be brief.");
        assert!(body["systemInstruction"].get("role").is_none());
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(body["contents"].as_array().unwrap().len(), 3);
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 100);
    }

    #[test]
    fn test_system_only_is_rejected() {
        let request = ChatRequest {
            messages: vec![ChatMessage::system("alone")],
            ..Default::default()
        };
        assert!(build_request(&request).is_err());
    }

    #[tokio::test]
    async fn test_generate_content() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/gemini-2.0-flash:generateContent"))
            .and(header("x-goog-api-key", "g-key"))
            .and(body_partial_json(serde_json::json!({
                "generationConfig": {"maxOutputTokens": 512}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "Part one. "}, {"text": "Part two."}]},
                    "finishReason": "STOP"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let request = ChatRequest {
            messages: vec![ChatMessage::system("sys"), ChatMessage::user("go")],
            model: "gemini-2.0-flash".to_string(),
            ..Default::default()
        };
        let text = provider.generate_text(&request).await.unwrap();
        assert_eq!(text, "Part one. Part two.");
    }

    #[tokio::test]
    async fn test_blocked_prompt() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "promptFeedback": {"blockReason": "SAFETY"}
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let request = ChatRequest {
            messages: vec![ChatMessage::user("go")],
            ..Default::default()
        };
        let err = provider.generate_text(&request).await.unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[tokio::test]
    async fn test_speech_is_unsupported() {
        let server = MockServer::start().await;
        let provider = provider_for(&server);
        let err = provider
            .generate_speech(&SpeechRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PdfcastError::UnsupportedOperation { .. }));
    }
}
