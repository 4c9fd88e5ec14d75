//! Text-generation collaborator.
//!
//! Calls never fail outward: every problem is folded into
//! [`NarrativeOutcome::Unavailable`] so the caller can substitute templates.

use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::NarrativeConfig;
use crate::constants::{NARRATIVE_MAX_TOKENS, NARRATIVE_SYSTEM_PROMPT, NARRATIVE_TEMPERATURE, USER_AGENT};
use crate::models::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};

/// Why no generated text is available.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NarrativeFailure {
    #[error("no API credential configured")]
    MissingCredential,
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("service responded with status {0}")]
    Status(u16),
    #[error("response contained no text")]
    EmptyResponse,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NarrativeOutcome {
    Generated(String),
    Unavailable(NarrativeFailure),
}

#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> NarrativeOutcome;
}

/// Used when no credential is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledNarrator;

#[async_trait]
impl NarrativeGenerator for DisabledNarrator {
    async fn generate(&self, _prompt: &str) -> NarrativeOutcome {
        NarrativeOutcome::Unavailable(NarrativeFailure::MissingCredential)
    }
}

/// OpenAI-compatible chat completions client.
#[derive(Clone)]
pub struct ChatCompletionNarrator {
    client: Arc<Client>,
    api_key: String,
    api_base: String,
    model: String,
    timeout: Duration,
}

impl ChatCompletionNarrator {
    pub fn new(api_key: String, config: &NarrativeConfig) -> anyhow::Result<Self> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            client: Arc::new(client),
            api_key,
            api_base: config.api_base.clone(),
            model: config.model.clone(),
            timeout: config.timeout,
        })
    }

    async fn request_completion(&self, prompt: &str) -> Result<String, NarrativeFailure> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: NARRATIVE_SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: NARRATIVE_TEMPERATURE,
            max_tokens: NARRATIVE_MAX_TOKENS,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| NarrativeFailure::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(NarrativeFailure::Status(response.status().as_u16()));
        }

        let completion = response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|e| NarrativeFailure::Transport(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or(NarrativeFailure::EmptyResponse)
    }
}

#[async_trait]
impl NarrativeGenerator for ChatCompletionNarrator {
    async fn generate(&self, prompt: &str) -> NarrativeOutcome {
        tracing::info!(model = %self.model, "Requesting generated forecast");

        match tokio::time::timeout(self.timeout, self.request_completion(prompt)).await {
            Ok(Ok(text)) => NarrativeOutcome::Generated(text),
            Ok(Err(failure)) => NarrativeOutcome::Unavailable(failure),
            Err(_) => NarrativeOutcome::Unavailable(NarrativeFailure::Timeout(self.timeout)),
        }
    }
}

/// Picks the generator matching the configured credential.
pub fn narrator_from_config(config: &NarrativeConfig) -> anyhow::Result<Arc<dyn NarrativeGenerator>> {
    match &config.api_key {
        Some(key) => Ok(Arc::new(ChatCompletionNarrator::new(key.clone(), config)?)),
        None => {
            tracing::info!("OPENAI_API_KEY not set, forecasts will use templates");
            Ok(Arc::new(DisabledNarrator))
        }
    }
}
