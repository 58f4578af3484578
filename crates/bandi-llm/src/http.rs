//! Shared HTTP plumbing for the remote providers

use crate::LlmError;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Send a JSON request, retrying transient failures with exponential backoff
///
/// `build` is called once per attempt. 404 maps to `ModelNotAvailable`,
/// 429 is retried and reported as `RateLimitExceeded` when attempts run out.
pub(crate) async fn send_with_retry<R, F>(
    build: F,
    max_retries: u32,
    model: &str,
) -> Result<R, LlmError>
where
    R: DeserializeOwned,
    F: Fn() -> reqwest::RequestBuilder,
{
    let attempts_allowed = max_retries.max(1);
    let mut attempts = 0;
    let mut last_error = None;

    while attempts < attempts_allowed {
        match build().send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    return response.json::<R>().await.map_err(|e| {
                        LlmError::InvalidResponse(format!("Failed to parse response: {}", e))
                    });
                } else if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(LlmError::ModelNotAvailable(model.to_string()));
                } else if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    last_error = Some(LlmError::RateLimitExceeded);
                } else {
                    let error_text = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown error".to_string());
                    last_error = Some(LlmError::Communication(format!(
                        "HTTP {}: {}",
                        status, error_text
                    )));
                }
            }
            Err(e) => {
                last_error = Some(LlmError::Communication(format!("Request failed: {}", e)));
            }
        }

        attempts += 1;
        if attempts < attempts_allowed {
            // Exponential backoff: 1s, 2s, 4s, etc.
            let delay = Duration::from_secs(2u64.pow(attempts - 1));
            warn!("LLM request attempt {} failed, retrying in {:?}", attempts, delay);
            tokio::time::sleep(delay).await;
        }
    }

    Err(last_error.unwrap_or_else(|| LlmError::Communication("Max retries exceeded".to_string())))
}

/// Drive an async request from the synchronous `LlmProvider` interface
///
/// Works both from a plain thread and from a tokio blocking-pool thread,
/// which is where the extractor calls providers from.
pub(crate) fn block_on<T, Fut>(future: Fut) -> Result<T, LlmError>
where
    Fut: Future<Output = Result<T, LlmError>>,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            debug!("Reusing ambient tokio runtime for blocking LLM call");
            handle.block_on(future)
        }
        Err(_) => tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to start runtime: {}", e)))?
            .block_on(future),
    }
}

/// Build a client with the given request timeout
pub(crate) fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}
