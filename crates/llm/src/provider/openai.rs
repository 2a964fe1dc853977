mod input;
mod output;

use async_trait::async_trait;
use config::UpstreamConfig;
use reqwest::{Client, header::AUTHORIZATION};
use secrecy::{ExposeSecret, SecretString};

use self::{input::OpenAIRequest, output::OpenAIResponse};

use crate::{
    error::UpstreamError,
    messages::{CompletionRequest, CompletionResult},
    provider::Provider,
};

/// Provider for any API speaking the OpenAI Chat Completions protocol (Groq, OpenAI, vLLM, ...).
pub(crate) struct OpenAIProvider {
    client: Client,
    url: String,
    name: String,
    model: String,
    api_key: Option<SecretString>,
}

impl OpenAIProvider {
    pub fn new(config: UpstreamConfig) -> anyhow::Result<Self> {
        let UpstreamConfig {
            provider,
            base_url,
            model,
            api_key,
            ..
        } = config;

        let client = Client::builder()
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client for provider {provider}: {e}"))?;

        let url = format!("{}/chat/completions", base_url.trim_end_matches('/'));
        let api_key = api_key.filter(|key| !key.expose_secret().trim().is_empty());

        Ok(Self {
            client,
            url,
            name: provider,
            model,
            api_key,
        })
    }
}

#[async_trait]
impl Provider for OpenAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResult, UpstreamError> {
        let Some(api_key) = self
            .api_key
            .as_ref()
            .map(|key| key.expose_secret().trim())
            .filter(|key| !key.is_empty())
        else {
            return Err(UpstreamError::MissingCredential);
        };

        let CompletionRequest {
            prompt,
            temperature,
            timeout,
        } = request;

        let body = OpenAIRequest::user_prompt(&self.model, &prompt, temperature);

        log::debug!("Sending completion request to {} with model {}", self.url, self.model);

        // The timeout covers connecting, sending and reading the whole body. When it fires
        // reqwest drops the connection.
        let response = self
            .client
            .post(&self.url)
            .header(AUTHORIZATION, format!("Bearer {api_key}"))
            .timeout(timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(e, timeout))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();

            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| UpstreamError::from_reqwest(e, timeout))?;

        let parsed: OpenAIResponse = sonic_rs::from_str(&response_text).map_err(|e| {
            log::debug!("Raw response that failed to parse: {response_text}");
            UpstreamError::MalformedResponse(e.to_string())
        })?;

        let (content, usage) = parsed.into_parts();

        let Some(content) = content else {
            return Err(UpstreamError::MalformedResponse(
                "response contains no completion choice".to_string(),
            ));
        };

        Ok(CompletionResult {
            content,
            usage,
            provider: self.name.clone(),
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}
