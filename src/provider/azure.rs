//! Azure OpenAI provider.
//!
//! Azure routes requests by deployment, so the request's model name is used as
//! the deployment id.

use super::openai_compat::{chat_completion, send_speech};
use super::{ChatRequest, Provider, SpeechRequest};
use crate::config::ProviderKind;
use crate::error::Result;
use crate::openai::create_azure_client;
use async_trait::async_trait;
use tracing::instrument;

/// Azure OpenAI resource.
pub struct AzureProvider {
    endpoint: String,
    api_version: String,
    api_key: String,
    http: reqwest::Client,
}

impl AzureProvider {
    pub fn new(endpoint: &str, api_version: &str, api_key: &str, http: reqwest::Client) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_version: api_version.to_string(),
            api_key: api_key.to_string(),
            http,
        }
    }

    fn speech_url(&self, deployment: &str) -> String {
        format!(
            "{}/openai/deployments/{}/audio/speech",
            self.endpoint, deployment
        )
    }
}

#[async_trait]
impl Provider for AzureProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Azure
    }

    #[instrument(skip(self, request), fields(deployment = %request.model))]
    async fn generate_text(&self, request: &ChatRequest) -> Result<String> {
        let client = create_azure_client(
            &self.endpoint,
            &self.api_version,
            &request.model,
            &self.api_key,
            self.http.clone(),
        );
        chat_completion(&client, request).await
    }

    #[instrument(skip(self, request), fields(deployment = %request.model))]
    async fn generate_speech(&self, request: &SpeechRequest) -> Result<Vec<u8>> {
        let builder = self
            .http
            .post(self.speech_url(&request.model))
            .query(&[("api-version", self.api_version.as_str())])
            .header("api-key", &self.api_key);
        send_speech(builder, request).await
    }
}
