use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;

use super::base::{Provider, Usage};
use super::configs::AnthropicProviderConfig;
use super::utils::{
    anthropic_response_to_message, messages_to_anthropic_spec, tools_to_anthropic_spec,
};
use crate::models::message::Message;
use crate::models::tool::Tool;

pub const ANTHROPIC_HOST: &str = "https://api.anthropic.com";
pub const ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// One model turn must complete within this bound; the iteration cap alone
/// does not bound wall-clock time if a single call hangs.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const MAX_RETRIES: u32 = 2;

pub struct AnthropicProvider {
    client: Client,
    config: AnthropicProviderConfig,
}

impl AnthropicProvider {
    pub fn new(config: AnthropicProviderConfig) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self { client, config })
    }

    fn get_usage(data: &Value) -> Usage {
        let usage = match data.get("usage") {
            Some(usage) => usage,
            None => return Usage::default(),
        };

        let input_tokens = usage
            .get("input_tokens")
            .and_then(|v| v.as_i64())
            .map(|v| v as i32);
        let output_tokens = usage
            .get("output_tokens")
            .and_then(|v| v.as_i64())
            .map(|v| v as i32);
        let total_tokens = match (input_tokens, output_tokens) {
            (Some(input), Some(output)) => Some(input + output),
            _ => None,
        };

        Usage::new(input_tokens, output_tokens, total_tokens)
    }

    async fn post(&self, payload: Value) -> Result<Value> {
        let url = format!("{}/v1/messages", self.config.host.trim_end_matches('/'));

        let mut attempts = 0;
        let mut delay = Duration::from_millis(500);
        loop {
            let response = self
                .client
                .post(&url)
                .header("x-api-key", &self.config.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json(&payload)
                .send()
                .await?;

            match response.status() {
                StatusCode::OK => return Ok(response.json().await?),
                status if status == StatusCode::TOO_MANY_REQUESTS || status.as_u16() >= 500 => {
                    // Transient upstream fault, retry with backoff
                    attempts += 1;
                    if attempts > MAX_RETRIES {
                        return Err(anyhow!("Server error: {}", status));
                    }
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
                _ => {
                    let status = response.status();
                    let error_text = response.text().await?;
                    return Err(anyhow!("Request failed: {} - {}", status, error_text));
                }
            }
        }
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    fn mode(&self) -> &'static str {
        "anthropic-claude"
    }

    async fn complete(
        &self,
        system: &str,
        messages: &[Message],
        tools: &[Tool],
    ) -> Result<(Message, Usage)> {
        let mut payload = json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "system": system,
            "messages": messages_to_anthropic_spec(messages),
        });

        let tools_spec = tools_to_anthropic_spec(tools)?;
        if !tools_spec.is_empty() {
            payload
                .as_object_mut()
                .unwrap()
                .insert("tools".to_string(), json!(tools_spec));
        }

        let response = self.post(payload).await?;

        let message = anthropic_response_to_message(&response)?;
        let usage = Self::get_usage(&response);

        Ok((message, usage))
    }
}
