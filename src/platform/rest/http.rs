use std::time::Duration;

use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::platform::base::StoreError;

const INITIAL_RETRY_DELAY_MS: u64 = 100;

const MAX_RETRY_DELAY_MS: u64 = 10000;

/// Shared HTTP client for the platform REST APIs.
///
/// Centralizes the bearer credential and the retry discipline: bounded
/// attempts with exponential backoff, capped delay, and an immediate return
/// for responses that retrying cannot fix (404 and other 4xx).
pub struct RestClient {
    client: Client,
    max_retries: u32,
    service_token: Option<String>,
}

impl RestClient {
    pub fn new(timeout_secs: u64, max_retries: u32, service_token: Option<String>) -> Self {
        info!(
            "RestClient created (timeout={}s, retries={}, authenticated={})",
            timeout_secs,
            max_retries,
            service_token.is_some()
        );
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .expect("Failed to create HTTP client"),
            max_retries: max_retries.max(1),
            service_token,
        }
    }

    /// Sends a JSON request, retrying transient failures.
    ///
    /// Returns the parsed response body, or `Value::Null` for empty bodies.
    /// `label` names the call in logs.
    pub async fn request(
        &self,
        label: &str,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<Value, StoreError> {
        let mut last_error = None;
        let mut delay = Duration::from_millis(INITIAL_RETRY_DELAY_MS);

        for attempt in 1..=self.max_retries {
            debug!("{} {} (attempt {})", label, url, attempt);

            let mut request = self.client.request(method.clone(), url);
            if let Some(token) = &self.service_token {
                request = request.bearer_auth(token);
            }
            if let Some(body) = body {
                request = request.json(body);
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        if attempt > 1 {
                            debug!("{} succeeded on attempt {}", label, attempt);
                        }
                        let text = response.text().await?;
                        if text.trim().is_empty() {
                            return Ok(Value::Null);
                        }
                        return Ok(serde_json::from_str(&text)?);
                    }

                    if status == StatusCode::NOT_FOUND {
                        debug!("{} returned 404 (expected for missing resources)", label);
                        return Err(StoreError::NotFound(url.to_string()));
                    }

                    let detail = response.text().await.unwrap_or_default();
                    if status.is_client_error() {
                        // 4xx other than 404 will not get better on retry.
                        return Err(StoreError::Backend(format!("{}: {}", status, detail)));
                    }

                    debug!("{} failed with {} (attempt {})", label, status, attempt);
                    last_error = Some(format!("{}: {}", status, detail));
                }
                Err(e) => {
                    debug!("{} transport error (attempt {}): {}", label, attempt, e);
                    last_error = Some(e.to_string());
                }
            }

            if attempt < self.max_retries {
                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(Duration::from_millis(MAX_RETRY_DELAY_MS));
            }
        }

        warn!("{} exhausted {} attempts", label, self.max_retries);
        Err(StoreError::RetryExhausted(
            self.max_retries,
            last_error.unwrap_or_else(|| "unknown error".to_string()),
        ))
    }
}
