//! HTTP response generator for `generateMessage`-style model endpoints.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::api::{GenerateMessageRequest, GenerateMessageResponse, MessagePrompt, PromptMessage};
use crate::core::config::SessionConfig;
use crate::core::errors::GenerationError;
use crate::core::message::{Turn, TurnRole, TurnStatus};
use crate::generator::ResponseGenerator;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct HttpGenerator {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpGenerator {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_timeout(client, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(client: reqwest::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

/// System turns become the prompt context; user and assistant turns become
/// the message list. Pending and error turns never reach the wire.
fn build_prompt(turns: &[Turn]) -> MessagePrompt {
    let mut context_parts: Vec<&str> = Vec::new();
    let mut messages = Vec::new();

    for turn in turns {
        if turn.status != TurnStatus::Normal {
            continue;
        }
        match turn.role {
            TurnRole::System => context_parts.push(turn.content.as_str()),
            TurnRole::User | TurnRole::Assistant => messages.push(PromptMessage {
                author: turn.role.as_str().to_string(),
                content: turn.content.clone(),
            }),
        }
    }

    MessagePrompt {
        context: if context_parts.is_empty() {
            None
        } else {
            Some(context_parts.join("\n\n"))
        },
        messages,
    }
}

fn request_url(config: &SessionConfig) -> String {
    format!(
        "{}:generateMessage?key={}",
        config.endpoint.trim_end_matches('/'),
        config.api_key
    )
}

/// Pull a short human-readable summary out of an error body. Falls back to
/// the trimmed body itself, truncated so a giant HTML page cannot flood the
/// error message.
fn summarize_error_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        let summary = value
            .pointer("/error/message")
            .and_then(|v| v.as_str())
            .map(str::to_owned)
            .or_else(|| {
                value.get("error").and_then(|v| match v {
                    serde_json::Value::String(s) => Some(s.to_string()),
                    _ => None,
                })
            })
            .or_else(|| {
                value
                    .get("message")
                    .and_then(|v| v.as_str().map(str::to_owned))
            });
        if let Some(summary) = summary {
            let collapsed = summary.split_whitespace().collect::<Vec<_>>().join(" ");
            if !collapsed.is_empty() {
                return collapsed;
            }
        }
    }

    let collapsed = trimmed.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() > 200 {
        let truncated: String = collapsed.chars().take(200).collect();
        format!("{truncated}…")
    } else {
        collapsed
    }
}

#[async_trait]
impl ResponseGenerator for HttpGenerator {
    async fn generate(
        &self,
        turns: &[Turn],
        config: &SessionConfig,
    ) -> Result<String, GenerationError> {
        let request = GenerateMessageRequest {
            prompt: build_prompt(turns),
            temperature: config.temperature,
            top_k: config.top_k,
            top_p: config.top_p,
            candidate_count: 1,
        };

        debug!(endpoint = %config.endpoint, "sending generate request");

        let response = tokio::time::timeout(
            self.timeout,
            self.client
                .post(request_url(config))
                .header("Content-Type", "application/json")
                .json(&request)
                .send(),
        )
        .await
        .map_err(|_| GenerationError::new("generate request timed out"))?
        .map_err(|e| GenerationError::with_source("generate request failed", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(GenerationError::new(format!(
                "model endpoint returned {status}: {}",
                summarize_error_body(&body)
            )));
        }

        let reply = response
            .json::<GenerateMessageResponse>()
            .await
            .map_err(|e| GenerationError::with_source("invalid generate response", e))?;

        reply
            .candidates
            .into_iter()
            .map(|candidate| candidate.content)
            .find(|content| !content.trim().is_empty())
            .ok_or_else(|| GenerationError::new("model returned no candidates"))
    }
}
