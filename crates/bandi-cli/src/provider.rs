//! Provider selection from the active profile.

use crate::config::{Profile, ProviderKind};
use crate::error::Result;
use bandi_domain::traits::LlmProvider;
use bandi_domain::UNSPECIFIED;
use bandi_llm::{AzureOpenAiProvider, LlmError, MockProvider, OllamaProvider};
use std::time::Duration;

/// The LLM backend a profile selects.
pub enum Provider {
    /// Local Ollama server
    Ollama(OllamaProvider),
    /// Azure OpenAI deployment
    Azure(AzureOpenAiProvider),
    /// Offline provider that answers every prompt with the sentinel
    Mock(MockProvider),
}

impl Provider {
    /// Build the provider for `profile`.
    ///
    /// Azure credentials are read from the `AZURE_*` environment variables.
    pub fn from_profile(profile: &Profile, request_timeout: Duration) -> Result<Self> {
        let provider = match profile.provider {
            ProviderKind::Ollama => {
                let ollama = match &profile.endpoint {
                    Some(endpoint) => OllamaProvider::new(endpoint.as_str(), profile.model.as_str()),
                    None => OllamaProvider::default_endpoint(profile.model.as_str()),
                };
                Provider::Ollama(ollama.with_timeout(request_timeout))
            }
            ProviderKind::Azure => Provider::Azure(AzureOpenAiProvider::from_env()?),
            ProviderKind::Mock => Provider::Mock(MockProvider::new(UNSPECIFIED)),
        };
        Ok(provider)
    }
}

impl LlmProvider for Provider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> std::result::Result<String, Self::Error> {
        match self {
            Provider::Ollama(provider) => LlmProvider::generate(provider, prompt),
            Provider::Azure(provider) => LlmProvider::generate(provider, prompt),
            Provider::Mock(provider) => LlmProvider::generate(provider, prompt),
        }
    }

    fn model_name(&self) -> &str {
        match self {
            Provider::Ollama(provider) => LlmProvider::model_name(provider),
            Provider::Azure(provider) => LlmProvider::model_name(provider),
            Provider::Mock(provider) => LlmProvider::model_name(provider),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(provider: ProviderKind, endpoint: Option<&str>) -> Profile {
        Profile {
            provider,
            endpoint: endpoint.map(str::to_string),
            model: "mistral".to_string(),
            index_path: "corpus.json".to_string(),
            output_dir: "out".to_string(),
        }
    }

    #[test]
    fn test_ollama_profile() {
        let provider = Provider::from_profile(
            &profile(ProviderKind::Ollama, Some("http://gpu-box:11434")),
            Duration::from_secs(10),
        )
        .unwrap();
        assert!(matches!(provider, Provider::Ollama(_)));
        assert_eq!(provider.model_name(), "mistral");
    }

    #[test]
    fn test_mock_profile_answers_sentinel() {
        let provider =
            Provider::from_profile(&profile(ProviderKind::Mock, None), Duration::from_secs(10))
                .unwrap();
        assert_eq!(provider.generate("Chi eroga il bando?").unwrap(), UNSPECIFIED);
    }
}
