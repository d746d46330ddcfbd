use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error, instrument};

use super::cleanup::clean_output;
use super::directive::{system_directive, BUILD_INSTRUCTION};
use super::wire::{LLMRequest, LLMResponse, Message};
use super::{Generation, Generator, ProviderError};
use crate::config::{ProviderConfig, TAILWIND_CDN};
use crate::types::{CompiledPrompt, RawArtifact};

/// reqwest-backed client for an OpenAI-compatible chat endpoint.
#[derive(Clone)]
pub struct ProviderClient {
    http: Client,
    config: ProviderConfig,
    framework_url: String,
}

impl ProviderClient {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ProviderError::ClientBuild(e.to_string()))?;
        Ok(Self {
            http,
            config,
            framework_url: TAILWIND_CDN.to_string(),
        })
    }

    /// Framework the fallback page includes.
    pub fn with_framework_url(mut self, url: impl Into<String>) -> Self {
        self.framework_url = url.into();
        self
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn build_request(&self, prompt: &CompiledPrompt, category: &str, style: &str) -> LLMRequest {
        LLMRequest {
            model: self.config.model.clone(),
            messages: vec![
                Message::system(system_directive(prompt, category, style)),
                Message::user(BUILD_INSTRUCTION),
            ],
            temperature: Some(self.config.temperature),
            max_tokens: Some(self.config.max_tokens),
        }
    }

    /// One POST to the provider; returns the first choice's text.
    pub async fn request(&self, body: &LLMRequest) -> Result<String, ProviderError> {
        let mut builder = self
            .http
            .post(&self.config.api_url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json");
        if let Some(referer) = &self.config.referer {
            builder = builder.header("HTTP-Referer", referer);
        }
        if let Some(title) = &self.config.app_title {
            builder = builder.header("X-Title", title);
        }

        let response = builder.json(body).send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout
            } else if e.is_connect() {
                ProviderError::Connect(e.to_string())
            } else {
                ProviderError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProviderError::from_status(status.as_u16(), body));
        }

        let llm_response: LLMResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout
            } else {
                ProviderError::Decode(e.to_string())
            }
        })?;

        if llm_response.choices.is_empty() {
            return Err(ProviderError::EmptyChoices);
        }

        match llm_response.first_content() {
            Some(content) if !content.trim().is_empty() => Ok(content.to_string()),
            _ => Err(ProviderError::EmptyContent),
        }
    }
}

#[async_trait]
impl Generator for ProviderClient {
    #[instrument(skip(self, prompt), fields(model = %self.config.model, prompt_chars = prompt.char_len()))]
    async fn generate(&self, prompt: &CompiledPrompt, category: &str, style: &str) -> Generation {
        debug!("Preparing provider request");
        let body = self.build_request(prompt, category, style);

        let outcome = self.request(&body).await.and_then(|content| {
            let cleaned = clean_output(&content);
            if cleaned.is_empty() {
                Err(ProviderError::EmptyContent)
            } else {
                Ok(cleaned)
            }
        });

        match outcome {
            Ok(html) => {
                debug!(chars = html.len(), "Provider content received");
                Generation::Completed(RawArtifact::new(html))
            }
            Err(cause) => {
                error!(error = %cause, "Provider call failed, serving fallback page");
                Generation::fallback(prompt, &self.framework_url, cause)
            }
        }
    }
}
