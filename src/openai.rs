//! HTTP and OpenAI client construction with sensible defaults.

use crate::error::{PdfcastError, Result};
use async_openai::config::{AzureConfig, OpenAIConfig};
use async_openai::Client;
use std::time::Duration;

/// Default timeout for provider requests (5 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Build a reqwest client with the given timeout.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| PdfcastError::Config(format!("Failed to create HTTP client: {}", e)))
}

/// Create an OpenAI-compatible client pointed at `api_base`.
///
/// Local servers (LM Studio, Ollama) accept any key, so a missing key is sent
/// as an empty bearer token.
pub fn create_client(
    api_base: &str,
    api_key: Option<&str>,
    http: reqwest::Client,
) -> Client<OpenAIConfig> {
    let config = OpenAIConfig::new()
        .with_api_base(api_base)
        .with_api_key(api_key.unwrap_or_default());

    Client::with_config(config).with_http_client(http)
}

/// Create an Azure OpenAI client for a single deployment.
pub fn create_azure_client(
    endpoint: &str,
    api_version: &str,
    deployment: &str,
    api_key: &str,
    http: reqwest::Client,
) -> Client<AzureConfig> {
    let config = AzureConfig::new()
        .with_api_base(endpoint)
        .with_api_version(api_version)
        .with_deployment_id(deployment)
        .with_api_key(api_key);

    Client::with_config(config).with_http_client(http)
}
