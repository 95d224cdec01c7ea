use serde::Serialize;
use tracing::debug;

use crate::errors::AgentError;
use crate::models::message::{Message, MessageContent, ToolRequest};
use crate::models::tool::Tool;
use crate::prompt;
use crate::providers::base::{Provider, Usage};
use crate::tools::{registry, ToolExecutor};

/// Nothing stops a model from requesting tools forever; the cap turns that
/// liveness risk into a reported, user-visible outcome.
pub const MAX_ITERATIONS: u32 = 10;

const FALLBACK_REPLY: &str = "Désolé, je n'ai pas pu générer de réponse.";
const EXHAUSTED_REPLY: &str = "Nombre maximum d'itérations atteint.";

/// Terminal result of one chat exchange, serialized as-is to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct ChatOutcome {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    pub iterations: u32,
    pub mode: String,
}

/// Agent integrates a model backend with the accounting data tools.
///
/// All state is per-call: each reply() builds a fresh history and iteration
/// counter, so concurrent exchanges share nothing.
pub struct Agent {
    provider: Box<dyn Provider>,
    executor: ToolExecutor,
    tools: Vec<Tool>,
    max_iterations: u32,
}

impl Agent {
    /// Create a new Agent with the specified provider and tool executor
    pub fn new(provider: Box<dyn Provider>, executor: ToolExecutor) -> Self {
        Self {
            provider,
            executor,
            tools: registry::definitions(),
            max_iterations: MAX_ITERATIONS,
        }
    }

    pub fn mode(&self) -> &'static str {
        self.provider.mode()
    }

    /// Run one bounded chat exchange over the supplied history.
    ///
    /// The iteration counter advances only when the model requests tools.
    /// A final answer terminates the loop; a tool-call response past the cap
    /// terminates it as a reported exhaustion, not an error.
    pub async fn reply(
        &self,
        messages: Vec<Message>,
        user_id: Option<&str>,
        company_id: Option<&str>,
    ) -> Result<ChatOutcome, AgentError> {
        let system = prompt::system_prompt(user_id, company_id, self.provider.generative_ui());

        let mut history = messages;
        let mut iterations: u32 = 0;

        loop {
            let (response, usage) = self
                .provider
                .complete(&system, &history, &self.tools)
                .await
                .map_err(|e| AgentError::Provider(e.to_string()))?;

            let requests: Vec<ToolRequest> = response
                .content
                .iter()
                .filter_map(MessageContent::as_tool_request)
                .cloned()
                .collect();

            if requests.is_empty() {
                return Ok(self.outcome(true, final_text(&response), Some(usage), iterations));
            }

            if iterations == self.max_iterations {
                // Still asking for tools past the cap: report, don't crash.
                return Ok(self.outcome(false, EXHAUSTED_REPLY.to_string(), None, iterations));
            }
            iterations += 1;
            debug!(iterations, calls = requests.len(), "tool calls requested");

            // The assistant turn is echoed before its results so each backend
            // sees the call/result pairing it requires.
            history.push(response);

            // Sequential on purpose: the history is one ordered log and every
            // result must land under its call id before the next model turn.
            for request in &requests {
                let result = match &request.tool_call {
                    Ok(call) => self.executor.execute(call).await,
                    Err(e) => crate::tools::failure(e.to_string()),
                };
                history.push(Message::user().with_tool_response(request.id.clone(), result));
            }
        }
    }

    fn outcome(
        &self,
        success: bool,
        message: String,
        usage: Option<Usage>,
        iterations: u32,
    ) -> ChatOutcome {
        ChatOutcome {
            success,
            message,
            usage,
            iterations,
            mode: self.provider.mode().to_string(),
        }
    }
}

fn final_text(message: &Message) -> String {
    let text = message
        .content
        .iter()
        .filter_map(MessageContent::as_text)
        .collect::<Vec<_>>()
        .join("\n");
    if text.trim().is_empty() {
        FALLBACK_REPLY.to_string()
    } else {
        text
    }
}
