//! Azure OpenAI Provider Implementation
//!
//! Calls the chat-completions endpoint of an Azure OpenAI deployment. The
//! extraction pipeline sends one user message per call and reads back the
//! first choice.

use crate::http::{block_on, build_client, send_with_retry};
use crate::LlmError;
use bandi_domain::traits::LlmProvider as LlmProviderTrait;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Environment variable holding the API key
pub const ENV_API_KEY: &str = "AZURE_API_KEY";
/// Environment variable holding the resource endpoint
pub const ENV_API_BASE: &str = "AZURE_API_BASE";
/// Environment variable holding the API version
pub const ENV_API_VERSION: &str = "AZURE_API_VERSION";
/// Environment variable holding the deployment name
pub const ENV_LLM_MODEL: &str = "AZURE_LLM_MODEL";

const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_TEMPERATURE: f32 = 0.1;
const DEFAULT_MAX_TOKENS: u32 = 4000;

/// Provider for an Azure OpenAI chat deployment
pub struct AzureOpenAiProvider {
    endpoint: String,
    deployment: String,
    api_version: String,
    api_key: String,
    client: reqwest::Client,
    max_retries: u32,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl AzureOpenAiProvider {
    /// Create a provider for one deployment
    pub fn new(
        endpoint: impl Into<String>,
        deployment: impl Into<String>,
        api_version: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            deployment: deployment.into(),
            api_version: api_version.into(),
            api_key: api_key.into(),
            client: build_client(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            max_retries: DEFAULT_MAX_RETRIES,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Build a provider from the `AZURE_*` environment variables
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Config` naming every missing variable.
    pub fn from_env() -> Result<Self, LlmError> {
        let read = |name: &str| env::var(name).ok().filter(|value| !value.trim().is_empty());

        let values = [ENV_API_BASE, ENV_LLM_MODEL, ENV_API_VERSION, ENV_API_KEY].map(read);
        let missing: Vec<&str> = [ENV_API_BASE, ENV_LLM_MODEL, ENV_API_VERSION, ENV_API_KEY]
            .iter()
            .zip(values.iter())
            .filter(|(_, value)| value.is_none())
            .map(|(name, _)| *name)
            .collect();

        match values {
            [Some(endpoint), Some(deployment), Some(api_version), Some(api_key)] => {
                Ok(Self::new(endpoint, deployment, api_version, api_key))
            }
            _ => Err(LlmError::Config(format!(
                "missing environment variables: {}",
                missing.join(", ")
            ))),
        }
    }

    /// Set the maximum number of retry attempts
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the completion token budget
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint, self.deployment, self.api_version
        )
    }

    /// Generate a completion for a single user message
    pub async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let url = self.url();
        let request_body = ChatRequest {
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response: ChatResponse = send_with_retry(
            || {
                self.client
                    .post(&url)
                    .header("api-key", &self.api_key)
                    .json(&request_body)
            },
            self.max_retries,
            &self.deployment,
        )
        .await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("response contained no choices".to_string()))
    }
}

impl LlmProviderTrait for AzureOpenAiProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        block_on(AzureOpenAiProvider::generate(self, prompt))
    }

    fn model_name(&self) -> &str {
        &self.deployment
    }
}
