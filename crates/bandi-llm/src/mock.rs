//! Deterministic provider for tests

use crate::LlmError;
use bandi_domain::traits::LlmProvider as LlmProviderTrait;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    Error(String),
}

#[derive(Debug, Default)]
struct MockState {
    rules: Vec<(String, Reply)>,
    prompts: Vec<String>,
}

/// Mock LLM provider for deterministic testing
///
/// Prompts in this workspace are long templates, so responses are scripted
/// by substring: the first rule whose needle occurs in the prompt wins, and
/// the default response is returned when no rule matches.
///
/// # Examples
///
/// ```
/// use bandi_llm::MockProvider;
/// use bandi_domain::traits::LlmProvider;
///
/// // Simple fixed response
/// let provider = MockProvider::new("Fixed response");
/// assert_eq!(provider.generate("any prompt").unwrap(), "Fixed response");
///
/// // Scripted responses
/// let mut provider = MockProvider::default();
/// provider.add_response("data di apertura", "15/01/2024");
/// provider.add_error("parole chiave");
/// assert_eq!(provider.generate("estrai la data di apertura").unwrap(), "15/01/2024");
/// assert!(provider.generate("Estrai 5-7 parole chiave").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_reply: Reply,
    state: Arc<Mutex<MockState>>,
    model_name: String,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self::with_default(Reply::Text(response.into()))
    }

    /// Create a provider whose every call fails
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_default(Reply::Error(message.into()))
    }

    fn with_default(default_reply: Reply) -> Self {
        Self {
            default_reply,
            state: Arc::new(Mutex::new(MockState::default())),
            model_name: "mock".to_string(),
        }
    }

    /// Respond with `response` to any prompt containing `needle`
    pub fn add_response(&mut self, needle: impl Into<String>, response: impl Into<String>) {
        self.state()
            .rules
            .push((needle.into(), Reply::Text(response.into())));
    }

    /// Fail any prompt containing `needle`
    pub fn add_error(&mut self, needle: impl Into<String>) {
        self.state()
            .rules
            .push((needle.into(), Reply::Error("Mock error".to_string())));
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        self.state().prompts.len()
    }

    /// Every prompt received so far, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.state().prompts.clone()
    }

    /// Reset the call log
    pub fn reset_call_count(&self) {
        self.state().prompts.clear();
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl LlmProviderTrait for MockProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        let mut state = self.state();
        state.prompts.push(prompt.to_string());

        let reply = state
            .rules
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| self.default_reply.clone());

        match reply {
            Reply::Text(text) => Ok(text),
            Reply::Error(message) => Err(LlmError::Other(message)),
        }
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
