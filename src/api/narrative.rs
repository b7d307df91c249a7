//! Chat-completions client for generating report narrative text.

use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::types::{ChatMessage, ChatRequest, ChatResponse};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-4.1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// OpenAI-compatible chat-completions client.
pub struct NarrativeClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl NarrativeClient {
    /// Configure from the environment: `OPENAI_API_KEY` (required),
    /// `OPENAI_BASE_URL` and `SECTORFOLIO_MODEL` (optional).
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .context("OPENAI_API_KEY is not set; narrative generation needs it")?;
        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model =
            std::env::var("SECTORFOLIO_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url,
            api_key,
            model,
        })
    }

    /// Send a prompt as a single user message and return the generated text.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        debug!(model = %self.model, prompt_len = prompt.len(), "Requesting narrative");
        let started = std::time::Instant::now();

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to reach chat-completions endpoint")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Chat completion failed: {} - {}", status, body);
        }

        let body: ChatResponse = response
            .json()
            .await
            .context("Failed to parse chat-completions response")?;

        debug!(elapsed_ms = started.elapsed().as_millis() as u64, "Narrative received");

        let choice = body
            .choices
            .into_iter()
            .next()
            .context("Chat completion returned no choices")?;

        Ok(choice.message.content)
    }
}
