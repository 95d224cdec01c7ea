use anyhow::{anyhow, Result};
use regex::Regex;
use serde_json::{json, Value};

use crate::errors::AgentError;
use crate::models::message::{Message, MessageContent};
use crate::models::role::Role;
use crate::models::tool::{Tool, ToolCall};

/// Convert internal messages to the Anthropic messages API specification.
///
/// Tool requests become `tool_use` content blocks and tool responses become
/// `tool_result` blocks in a user turn, which is the assistant-echo format
/// this backend requires before it accepts tool results.
pub fn messages_to_anthropic_spec(messages: &[Message]) -> Vec<Value> {
    let mut messages_spec = Vec::new();

    for message in messages {
        let role = match message.role {
            Role::User => "user",
            Role::Assistant => "assistant",
        };

        let mut blocks = Vec::new();
        for content in &message.content {
            match content {
                MessageContent::Text(text) => {
                    if !text.is_empty() {
                        blocks.push(json!({"type": "text", "text": text}));
                    }
                }
                MessageContent::ToolRequest(request) => match &request.tool_call {
                    Ok(tool_call) => blocks.push(json!({
                        "type": "tool_use",
                        "id": request.id,
                        "name": tool_call.name,
                        "input": tool_call.arguments,
                    })),
                    // The invalid call still has to appear in the echo so the
                    // paired tool_result id resolves.
                    Err(_) => blocks.push(json!({
                        "type": "tool_use",
                        "id": request.id,
                        "name": "invalid",
                        "input": {},
                    })),
                },
                MessageContent::ToolResponse(response) => blocks.push(json!({
                    "type": "tool_result",
                    "tool_use_id": response.id,
                    "content": response.result.to_string(),
                })),
            }
        }

        if blocks.is_empty() {
            continue;
        }

        // A lone text block collapses to the plain-string form
        if blocks.len() == 1 && blocks[0]["type"] == "text" {
            messages_spec.push(json!({"role": role, "content": blocks[0]["text"]}));
        } else {
            messages_spec.push(json!({"role": role, "content": blocks}));
        }
    }

    messages_spec
}

/// Convert internal messages to the OpenAI-style chat completions
/// specification used by Thesys C1.
pub fn messages_to_openai_spec(messages: &[Message]) -> Vec<Value> {
    let mut messages_spec = Vec::new();

    for message in messages {
        let mut converted = json!({
            "role": message.role
        });

        let mut output = Vec::new();

        for content in &message.content {
            match content {
                MessageContent::Text(text) => {
                    if !text.is_empty() {
                        converted["content"] = json!(text);
                    }
                }
                MessageContent::ToolRequest(request) => {
                    let entry = match &request.tool_call {
                        Ok(tool_call) => json!({
                            "id": request.id,
                            "type": "function",
                            "function": {
                                "name": sanitize_function_name(&tool_call.name),
                                "arguments": tool_call.arguments.to_string(),
                            }
                        }),
                        Err(_) => json!({
                            "id": request.id,
                            "type": "function",
                            "function": {"name": "invalid", "arguments": "{}"}
                        }),
                    };
                    let tool_calls = converted
                        .as_object_mut()
                        .unwrap()
                        .entry("tool_calls")
                        .or_insert(json!([]));
                    tool_calls.as_array_mut().unwrap().push(entry);
                }
                MessageContent::ToolResponse(response) => {
                    output.push(json!({
                        "role": "tool",
                        "content": response.result.to_string(),
                        "tool_call_id": response.id
                    }));
                }
            }
        }

        if converted.get("content").is_some() || converted.get("tool_calls").is_some() {
            output.insert(0, converted);
        }
        messages_spec.extend(output);
    }

    messages_spec
}

/// Encode tool declarations in the Anthropic wire shape.
pub fn tools_to_anthropic_spec(tools: &[Tool]) -> Result<Vec<Value>> {
    let mut tool_names = std::collections::HashSet::new();
    let mut result = Vec::new();

    for tool in tools {
        if !tool_names.insert(&tool.name) {
            return Err(anyhow!("Duplicate tool name: {}", tool.name));
        }

        result.push(json!({
            "name": tool.name,
            "description": tool.description,
            "input_schema": tool.input_schema,
        }));
    }

    Ok(result)
}

/// Encode tool declarations in the OpenAI function-calling wire shape.
pub fn tools_to_openai_spec(tools: &[Tool]) -> Result<Vec<Value>> {
    let mut tool_names = std::collections::HashSet::new();
    let mut result = Vec::new();

    for tool in tools {
        if !tool_names.insert(&tool.name) {
            return Err(anyhow!("Duplicate tool name: {}", tool.name));
        }

        result.push(json!({
            "type": "function",
            "function": {
                "name": tool.name,
                "description": tool.description,
                "parameters": tool.input_schema,
            }
        }));
    }

    Ok(result)
}

/// Convert an Anthropic messages API response into an internal message.
///
/// Text blocks are collected as text content; every `tool_use` block becomes
/// a tool request. A response that carries neither yields an empty message,
/// which the agent loop treats as a final answer rather than looping.
pub fn anthropic_response_to_message(response: &Value) -> Result<Message> {
    let blocks = response
        .get("content")
        .and_then(|c| c.as_array())
        .ok_or_else(|| anyhow!("Invalid response format from Anthropic API"))?;

    let mut content = Vec::new();
    for block in blocks {
        match block.get("type").and_then(|t| t.as_str()) {
            Some("text") => {
                if let Some(text) = block.get("text").and_then(|t| t.as_str()) {
                    content.push(MessageContent::text(text));
                }
            }
            Some("tool_use") => {
                let id = block["id"].as_str().unwrap_or_default().to_string();
                let name = block["name"].as_str().unwrap_or_default().to_string();
                let input = block.get("input").cloned().unwrap_or_else(|| json!({}));

                if !is_valid_function_name(&name) {
                    let error = AgentError::ToolNotFound(format!(
                        "The provided function name '{}' had invalid characters, it must match this regex [a-zA-Z0-9_-]+",
                        name
                    ));
                    content.push(MessageContent::tool_request(id, Err(error)));
                } else {
                    content.push(MessageContent::tool_request(id, Ok(ToolCall::new(name, input))));
                }
            }
            _ => {}
        }
    }

    Ok(Message {
        role: Role::Assistant,
        created: chrono::Utc::now().timestamp(),
        content,
    })
}

/// Convert an OpenAI-style chat completions response into an internal message.
pub fn openai_response_to_message(response: &Value) -> Result<Message> {
    let original = response["choices"][0]["message"].clone();
    let mut content = Vec::new();

    if let Some(text) = original.get("content") {
        if let Some(text_str) = text.as_str() {
            content.push(MessageContent::text(text_str));
        }
    }

    if let Some(tool_calls) = original.get("tool_calls") {
        if let Some(tool_calls_array) = tool_calls.as_array() {
            for tool_call in tool_calls_array {
                let id = tool_call["id"].as_str().unwrap_or_default().to_string();
                let function_name = tool_call["function"]["name"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string();
                let arguments = tool_call["function"]["arguments"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string();

                if !is_valid_function_name(&function_name) {
                    let error = AgentError::ToolNotFound(format!(
                        "The provided function name '{}' had invalid characters, it must match this regex [a-zA-Z0-9_-]+",
                        function_name
                    ));
                    content.push(MessageContent::tool_request(id, Err(error)));
                } else {
                    match serde_json::from_str::<Value>(&arguments) {
                        Ok(params) => {
                            content.push(MessageContent::tool_request(
                                id,
                                Ok(ToolCall::new(&function_name, params)),
                            ));
                        }
                        Err(e) => {
                            let error = AgentError::InvalidParameters(format!(
                                "Could not interpret tool use parameters for id {}: {}",
                                id, e
                            ));
                            content.push(MessageContent::tool_request(id, Err(error)));
                        }
                    }
                }
            }
        }
    }

    Ok(Message {
        role: Role::Assistant,
        created: chrono::Utc::now().timestamp(),
        content,
    })
}

fn sanitize_function_name(name: &str) -> String {
    let re = Regex::new(r"[^a-zA-Z0-9_-]").unwrap();
    re.replace_all(name, "_").to_string()
}

fn is_valid_function_name(name: &str) -> bool {
    let re = Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
    re.is_match(name)
}
