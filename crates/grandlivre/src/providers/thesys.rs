use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;

use super::base::{Provider, Usage};
use super::configs::ThesysProviderConfig;
use super::utils::{messages_to_openai_spec, openai_response_to_message, tools_to_openai_spec};
use crate::models::message::Message;
use crate::models::tool::Tool;

pub const THESYS_HOST: &str = "https://api.thesys.dev/v1/embed";
pub const THESYS_MODEL: &str = "c1/anthropic/claude-sonnet-4/v-20250815";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const MAX_RETRIES: u32 = 2;

/// Thesys C1 speaks the OpenAI chat completions wire format and renders
/// structured UI payloads from the assistant's replies.
pub struct ThesysProvider {
    client: Client,
    config: ThesysProviderConfig,
}

impl ThesysProvider {
    pub fn new(config: ThesysProviderConfig) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self { client, config })
    }

    fn get_usage(data: &Value) -> Usage {
        let usage = match data.get("usage") {
            Some(usage) => usage,
            None => return Usage::default(),
        };

        let input_tokens = usage
            .get("prompt_tokens")
            .and_then(|v| v.as_i64())
            .map(|v| v as i32);
        let output_tokens = usage
            .get("completion_tokens")
            .and_then(|v| v.as_i64())
            .map(|v| v as i32);
        let total_tokens = usage
            .get("total_tokens")
            .and_then(|v| v.as_i64())
            .map(|v| v as i32)
            .or_else(|| match (input_tokens, output_tokens) {
                (Some(input), Some(output)) => Some(input + output),
                _ => None,
            });

        Usage::new(input_tokens, output_tokens, total_tokens)
    }

    async fn post(&self, payload: Value) -> Result<Value> {
        let url = format!(
            "{}/chat/completions",
            self.config.host.trim_end_matches('/')
        );

        let mut attempts = 0;
        let mut delay = Duration::from_millis(500);
        loop {
            let response = self
                .client
                .post(&url)
                .header("Authorization", format!("Bearer {}", self.config.api_key))
                .json(&payload)
                .send()
                .await?;

            match response.status() {
                StatusCode::OK => return Ok(response.json().await?),
                status if status == StatusCode::TOO_MANY_REQUESTS || status.as_u16() >= 500 => {
                    attempts += 1;
                    if attempts > MAX_RETRIES {
                        return Err(anyhow!("Server error: {}", status));
                    }
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
                status => return Err(anyhow!("Request failed: {}", status)),
            }
        }
    }
}

#[async_trait]
impl Provider for ThesysProvider {
    fn mode(&self) -> &'static str {
        "thesys-c1"
    }

    fn generative_ui(&self) -> bool {
        true
    }

    async fn complete(
        &self,
        system: &str,
        messages: &[Message],
        tools: &[Tool],
    ) -> Result<(Message, Usage)> {
        let system_message = json!({
            "role": "system",
            "content": system
        });

        let mut messages_array = vec![system_message];
        messages_array.extend(messages_to_openai_spec(messages));

        let mut payload = json!({
            "model": self.config.model,
            "messages": messages_array,
            "max_tokens": self.config.max_tokens,
        });

        let tools_spec = tools_to_openai_spec(tools)?;
        if !tools_spec.is_empty() {
            payload
                .as_object_mut()
                .unwrap()
                .insert("tools".to_string(), json!(tools_spec));
        }

        let response = self.post(payload).await?;

        if let Some(error) = response.get("error") {
            return Err(anyhow!("Thesys API error: {}", error));
        }

        let message = openai_response_to_message(&response)?;
        let usage = Self::get_usage(&response);

        Ok((message, usage))
    }
}
