//! LLM chat-completion client with exponential backoff retry logic.
//!
//! Used by the social-search sensor and the Product Hunt reviews. The
//! endpoint is any OpenAI-compatible `chat/completions` URL (xAI by default).
//!
//! # Architecture
//!
//! - [`AskAsync`]: core trait defining async LLM interaction
//! - [`ChatClient`]: one HTTP call to the chat endpoint
//! - [`RetryAsk`]: decorator that adds retry logic to any `AskAsync` implementation
//!
//! # Retry Strategy
//!
//! - Exponential backoff from a configurable base delay, capped at 30 seconds
//! - Random jitter (0-250ms) added to every delay

use crate::config::LlmConfig;
use crate::error::{FetchError, Result};
use rand::{Rng, rng};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{error, instrument, warn};

/// Trait for async LLM interaction.
pub trait AskAsync {
    /// The type of response returned by the LLM.
    type Response;

    /// Send a prompt to the LLM and receive a response.
    async fn ask(&self, text: &str) -> Result<Self::Response>;
}

/// Wrapper that adds exponential backoff retry logic to any [`AskAsync`] implementation.
///
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryAsk<T> {
    inner: T,
    max_retries: usize,
    base_delay: StdDuration,
    max_delay: StdDuration,
}

impl<T> RetryAsk<T>
where
    T: AskAsync,
{
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
        }
    }
}

impl<T> fmt::Debug for RetryAsk<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryAsk")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> AskAsync for RetryAsk<T>
where
    T: AskAsync + fmt::Debug,
{
    type Response = T::Response;

    #[instrument(level = "info", skip_all)]
    async fn ask(&self, text: &str) -> Result<Self::Response> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            let err = match self.inner.ask(text).await {
                Ok(resp) => return Ok(resp),
                Err(e) => e,
            };
            attempt += 1;
            let attempt_dt = attempt_t0.elapsed();
            let total_dt = total_t0.elapsed();

            if attempt > self.max_retries {
                error!(
                    attempt,
                    max = self.max_retries,
                    elapsed_ms_attempt = attempt_dt.as_millis(),
                    elapsed_ms_total = total_dt.as_millis(),
                    error = %err,
                    "ask() exhausted retries"
                );
                return Err(err);
            }

            let mut delay = self.base_delay.saturating_mul(1 << (attempt - 1).min(16));
            if delay > self.max_delay {
                delay = self.max_delay;
            }
            let jitter_ms: u64 = rng().random_range(0..=250);
            let delay = delay + StdDuration::from_millis(jitter_ms);

            warn!(
                attempt,
                max = self.max_retries,
                elapsed_ms_attempt = attempt_dt.as_millis(),
                ?delay,
                error = %err,
                "ask() attempt failed; backing off"
            );
            drop(err);
            sleep(delay).await;
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// One request to an OpenAI-compatible chat endpoint.
pub struct ChatClient {
    client: Client,
    config: LlmConfig,
    system_prompt: String,
}

impl ChatClient {
    /// Returns `None` when no API key is configured.
    pub fn new(client: Client, config: &LlmConfig, system_prompt: impl Into<String>) -> Option<Self> {
        if !config.has_credentials() {
            return None;
        }
        Some(Self {
            client,
            config: config.clone(),
            system_prompt: system_prompt.into(),
        })
    }
}

impl fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatClient")
            .field("base_url", &self.config.base_url)
            .field("model", &self.config.model)
            .finish()
    }
}

impl AskAsync for ChatClient {
    type Response = String;

    #[instrument(level = "info", skip_all, fields(model = %self.config.model))]
    async fn ask(&self, text: &str) -> Result<Self::Response> {
        let t0 = Instant::now();
        let api_key = self.config.api_key.as_deref().unwrap_or_default();
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &self.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
            temperature: 0.3,
        };

        let response = self
            .client
            .post(&self.config.base_url)
            .bearer_auth(api_key)
            .timeout(StdDuration::from_secs(self.config.timeout_secs))
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            warn!(elapsed_ms = t0.elapsed().as_millis(), status = status.as_u16(), "LLM call failed");
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: self.config.base_url.clone(),
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&response.text().await?)?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| FetchError::Llm("empty completion".to_string()))
    }
}

/// The chat client wrapped in the retry decorator.
pub type LlmClient = RetryAsk<ChatClient>;

/// Build the retrying client when credentials are present.
pub fn llm_client(client: Client, config: &LlmConfig, system_prompt: &str) -> Option<LlmClient> {
    ChatClient::new(client, config, system_prompt).map(|chat| {
        RetryAsk::new(
            chat,
            config.max_retries,
            StdDuration::from_millis(config.retry_base_delay_ms),
        )
    })
}

/// Whether an answer is an error report rather than content: blank, or
/// mentioning `Error` anywhere.
pub fn is_error_marked(answer: &str) -> bool {
    answer.trim().is_empty() || answer.contains("Error")
}
