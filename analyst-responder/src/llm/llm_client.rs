use analyst_core::AnalystError;
use anyhow::{anyhow, Result};
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessage,
        ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest,
    },
    Client as OpenAiClient,
};
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

/// Sampling parameters sent with every generation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub repetition_penalty: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_new_tokens: 150,
            temperature: 0.6,
            top_p: 0.85,
            repetition_penalty: 1.5,
        }
    }
}

/// Text-generation service.
///
/// Returns the raw model output, which may echo the prompt. Any failure
/// (transport, timeout, empty output) is `GenerationUnavailable`.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> analyst_core::Result<String>;
}

/// Configuration for the LLM client
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub model: String,
    /// Override for the provider endpoint (OpenAI-compatible API base or TGI server URL)
    pub base_url: Option<String>,
    pub requests_per_minute: u32,
    pub timeout_seconds: u64,
    /// Total attempts per request; 1 means no retry
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::OpenAI,
            model: "gpt-4o-mini".to_string(),
            base_url: None,
            requests_per_minute: 30,
            timeout_seconds: 60,
            max_retries: 1,
        }
    }
}

/// Supported LLM providers
#[derive(Debug, Clone, PartialEq)]
pub enum LlmProvider {
    OpenAI,
    /// Hugging Face text-generation-inference server (`POST /generate`)
    TextGenerationInference,
}

/// Response from the LLM with metadata
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub raw_response: String,
    pub model: String,
    pub tokens_used: Option<u32>,
    pub provider: LlmProvider,
}

#[derive(Serialize)]
struct TgiRequest<'a> {
    inputs: &'a str,
    parameters: TgiParameters,
}

#[derive(Serialize)]
struct TgiParameters {
    max_new_tokens: u32,
    temperature: f32,
    top_p: f32,
    repetition_penalty: f32,
    do_sample: bool,
    return_full_text: bool,
}

#[derive(Deserialize)]
struct TgiResponse {
    generated_text: String,
}

/// LLM client with rate limiting and optional retries
pub struct LlmClient {
    openai_client: Option<OpenAiClient<OpenAIConfig>>,
    http_client: reqwest::Client,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
    config: LlmConfig,
}

impl LlmClient {
    /// Create a new LLM client from configuration
    ///
    /// # Arguments
    /// * `config` - LLM configuration
    /// * `api_key` - API key for the provider (unused by TGI servers without auth)
    pub fn new(config: LlmConfig, api_key: String) -> Result<Self> {
        tracing::info!(
            "Initializing LLM client: provider={:?}, model={}, rate_limit={}/min",
            config.provider,
            config.model,
            config.requests_per_minute
        );

        let openai_client = match config.provider {
            LlmProvider::OpenAI => {
                let mut openai_config = OpenAIConfig::new().with_api_key(api_key);
                if let Some(base) = &config.base_url {
                    openai_config = openai_config.with_api_base(base);
                }
                Some(OpenAiClient::with_config(openai_config))
            }
            LlmProvider::TextGenerationInference => {
                if config.base_url.is_none() {
                    return Err(anyhow!("base_url is required for text-generation-inference"));
                }
                None
            }
        };

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        let requests_per_minute = NonZeroU32::new(config.requests_per_minute)
            .ok_or_else(|| anyhow!("requests_per_minute must be > 0"))?;
        if config.max_retries == 0 {
            return Err(anyhow!("max_retries must be > 0"));
        }

        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_minute(requests_per_minute)));

        tracing::info!("LLM client initialized successfully");

        Ok(Self {
            openai_client,
            http_client,
            rate_limiter,
            config,
        })
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Send a prompt to the model
    ///
    /// This method:
    /// 1. Rate limits the request
    /// 2. Calls the provider, retrying up to `max_retries` attempts
    /// 3. Returns the raw output with metadata
    pub async fn complete(&self, prompt: &str, params: &GenerationParams) -> Result<LlmResponse> {
        self.rate_limiter.until_ready().await;

        tracing::debug!("Sending prompt to LLM (length: {} chars)", prompt.len());

        let mut last_error = None;

        for attempt in 0..self.config.max_retries {
            match self.call_llm(prompt, params).await {
                Ok(response) => {
                    tracing::info!(
                        "LLM response received: model={}, tokens={:?}, length={} chars",
                        response.model,
                        response.tokens_used,
                        response.raw_response.len()
                    );
                    return Ok(response);
                }
                Err(e) => {
                    if attempt + 1 < self.config.max_retries {
                        let backoff_ms = 2_u64.pow(attempt) * 1000; // Exponential backoff
                        tracing::warn!(
                            "LLM call failed (attempt {}/{}), retrying in {}ms: {}",
                            attempt + 1,
                            self.config.max_retries,
                            backoff_ms,
                            e
                        );
                        sleep(Duration::from_millis(backoff_ms)).await;
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow!("All retry attempts failed")))
    }

    async fn call_llm(&self, prompt: &str, params: &GenerationParams) -> Result<LlmResponse> {
        match self.config.provider {
            LlmProvider::OpenAI => self.call_openai(prompt, params).await,
            LlmProvider::TextGenerationInference => self.call_tgi(prompt, params).await,
        }
    }

    /// Call the OpenAI chat completions API
    async fn call_openai(&self, prompt: &str, params: &GenerationParams) -> Result<LlmResponse> {
        let client = self
            .openai_client
            .as_ref()
            .ok_or_else(|| anyhow!("OpenAI client not initialized"))?;

        tracing::debug!(
            "repetition_penalty={} not supported by chat completions, ignoring",
            params.repetition_penalty
        );

        let request = CreateChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessage {
                    content: ChatCompletionRequestUserMessageContent::Text(prompt.to_string()),
                    name: None,
                },
            )],
            max_tokens: Some(params.max_new_tokens),
            temperature: Some(params.temperature),
            top_p: Some(params.top_p),
            ..Default::default()
        };

        let response = tokio::time::timeout(
            Duration::from_secs(self.config.timeout_seconds),
            client.chat().create(request),
        )
        .await
        .map_err(|_| anyhow!("LLM request timed out after {}s", self.config.timeout_seconds))?
        .map_err(|e| anyhow!("OpenAI API error: {}", e))?;

        let response_text = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| anyhow!("Empty response from LLM"))?;

        Ok(LlmResponse {
            raw_response: response_text,
            model: response.model.clone(),
            tokens_used: response.usage.map(|u| u.total_tokens),
            provider: LlmProvider::OpenAI,
        })
    }

    /// Call a text-generation-inference server
    async fn call_tgi(&self, prompt: &str, params: &GenerationParams) -> Result<LlmResponse> {
        let base = self
            .config
            .base_url
            .as_deref()
            .ok_or_else(|| anyhow!("TGI base_url not configured"))?;
        let url = format!("{}/generate", base.trim_end_matches('/'));

        let body = TgiRequest {
            inputs: prompt,
            parameters: TgiParameters {
                max_new_tokens: params.max_new_tokens,
                temperature: params.temperature,
                top_p: params.top_p,
                repetition_penalty: params.repetition_penalty,
                do_sample: true,
                return_full_text: true,
            },
        };

        let response = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| anyhow!("TGI request to {} failed: {}", url, e))?
            .error_for_status()
            .map_err(|e| anyhow!("TGI error: {}", e))?
            .json::<TgiResponse>()
            .await
            .map_err(|e| anyhow!("Invalid TGI response: {}", e))?;

        Ok(LlmResponse {
            raw_response: response.generated_text,
            model: self.config.model.clone(),
            tokens_used: None,
            provider: LlmProvider::TextGenerationInference,
        })
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> analyst_core::Result<String> {
        self.complete(prompt, params)
            .await
            .map(|r| r.raw_response)
            .map_err(|e| AnalystError::GenerationUnavailable(e.to_string()))
    }
}
