use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::message::Message;
use crate::models::tool::Tool;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: Option<i32>,
    pub output_tokens: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<i32>,
}

impl Usage {
    pub fn new(
        input_tokens: Option<i32>,
        output_tokens: Option<i32>,
        total_tokens: Option<i32>,
    ) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens,
        }
    }
}

/// Base trait for the model backends (Anthropic, Thesys C1).
///
/// Each backend speaks its own wire format for messages, tool declarations
/// and tool calls; implementations normalize both directions so that nothing
/// outside this module ever branches on which backend is active.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Wire identifier reported to clients in the chat envelope
    fn mode(&self) -> &'static str;

    /// Whether the backend renders structured UI payloads from its replies
    fn generative_ui(&self) -> bool {
        false
    }

    /// Generate the next assistant message for the given history
    async fn complete(
        &self,
        system: &str,
        messages: &[Message],
        tools: &[Tool],
    ) -> Result<(Message, Usage)>;
}
