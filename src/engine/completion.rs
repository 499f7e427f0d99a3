// Seraph Server — Completion Client
// Minimal OpenAI-compatible chat client for the locally hosted model.
// One POST, no streaming, no retries: a transport error surfaces to the
// caller, a reply without the expected shape degrades to a fixed French
// apology so the HTTP surface still answers 200.

use log::{info, warn};
use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;

use crate::atoms::constants::APOLOGY_REPLY;
use crate::atoms::error::ServerResult;

const MAX_TOKENS: u32 = 1024;
const TEMPERATURE: f32 = 0.7;

/// One chat turn as the completion API expects it.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        ChatMessage {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage {
            role: "user".into(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        ChatMessage {
            role: "assistant".into(),
            content: content.into(),
        }
    }
}

#[derive(Clone)]
pub struct CompletionClient {
    client: Client,
    base_url: String,
    model: String,
}

impl CompletionClient {
    pub fn new(base_url: &str, model: &str, timeout_secs: u64) -> Self {
        CompletionClient {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    /// Submit the full message list and return the first choice's text.
    pub async fn complete(&self, messages: &[ChatMessage]) -> ServerResult<String> {
        let payload = json!({
            "model": self.model,
            "messages": messages,
            "max_tokens": MAX_TOKENS,
            "temperature": TEMPERATURE,
        });

        info!(
            "[completion] {} messages -> {}/v1/chat/completions",
            messages.len(),
            self.base_url
        );

        let resp = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(&payload)
            .send()
            .await?;
        let body: Value = resp.json().await?;

        Ok(extract_reply(&body))
    }
}

/// First choice's message content, or the fixed apology when the reply does
/// not carry one.
fn extract_reply(body: &Value) -> String {
    match body["choices"][0]["message"]["content"].as_str() {
        Some(text) => text.to_string(),
        None => {
            warn!("[completion] Malformed reply: {}", body);
            APOLOGY_REPLY.to_string()
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────
