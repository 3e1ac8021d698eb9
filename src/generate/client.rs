//! Chat-completions client for the OpenAI API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::CodeGenerator;
use super::prompts::{build_system_prompt, build_user_prompt, extract_code};
use crate::config::GenerationConfig;
use crate::errors::GenerateError;

/// Production generator backed by the chat-completions endpoint.
pub struct OpenAiGenerator {
    client: reqwest::Client,
    config: GenerationConfig,
    api_key: String,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f64,
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
    content: Option<String>,
}

impl OpenAiGenerator {
    /// Build a generator, reading the API key from `OPENAI_API_KEY`.
    pub fn from_env(config: GenerationConfig) -> Result<Self, GenerateError> {
        let api_key = crate::config::RexecConfig::api_key().ok_or(GenerateError::MissingApiKey)?;
        Ok(Self {
            client: reqwest::Client::new(),
            config,
            api_key,
        })
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.api_base.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl CodeGenerator for OpenAiGenerator {
    async fn generate(
        &self,
        prompt: &str,
        previous_error: Option<&str>,
    ) -> Result<String, GenerateError> {
        let system = build_system_prompt();
        let user = build_user_prompt(prompt, previous_error);

        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &system,
                },
                ChatMessage {
                    role: "user",
                    content: &user,
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        debug!(model = %self.config.model, retry = previous_error.is_some(), "requesting completion");

        let resp = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(GenerateError::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(500).collect();
            return Err(GenerateError::ProviderStatus {
                status: status.as_u16(),
                body: snippet,
            });
        }

        let parsed: ChatResponse = resp
            .json()
            .await
            .map_err(|e| GenerateError::MalformedResponse(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        let code = extract_code(&content);
        if code.is_empty() {
            return Err(GenerateError::EmptyCompletion);
        }
        Ok(code)
    }
}
