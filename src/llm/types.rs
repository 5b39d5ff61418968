// ABOUTME: Core types for LLM communication - messages, tool definitions,
// ABOUTME: requests, and the normalized tool-calling response.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::tool::ToolCall;

/// Role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A provider-agnostic conversation message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Create a system message.
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: text.into(),
        }
    }

    /// Create a user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: text.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: text.into(),
        }
    }
}

/// Definition of a tool for the LLM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Request to create a completion.
#[derive(Debug, Clone, Default)]
pub struct Request {
    pub model: String,
    pub messages: Vec<Message>,
    pub tools: Vec<ToolDefinition>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
}

impl Request {
    /// Create a new request with the given model.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Add a message to the request.
    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Add messages to the request.
    pub fn messages(mut self, messages: impl IntoIterator<Item = Message>) -> Self {
        self.messages.extend(messages);
        self
    }

    /// Add a tool definition.
    pub fn tool(mut self, tool: ToolDefinition) -> Self {
        self.tools.push(tool);
        self
    }

    /// Add tool definitions.
    pub fn tools(mut self, tools: impl IntoIterator<Item = ToolDefinition>) -> Self {
        self.tools.extend(tools);
        self
    }

    /// Put a system message at the front of the conversation.
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.messages.insert(0, Message::system(system));
        self
    }

    /// Set max tokens.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set temperature.
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// All system messages joined, for vendors that take instructions separately.
    pub fn system_prompt(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("\n\n"))
        }
    }

    /// User and assistant messages, in order.
    pub fn conversation(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| m.role != Role::System)
    }
}

/// A model turn, normalized across vendors.
///
/// `raw_assistant_message` is the vendor's own representation of the turn. It
/// must go back into the next request unchanged, so nothing outside the
/// adapter that produced it should look inside.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCompletionResponse {
    /// Text the model produced this turn, if any.
    pub text: Option<String>,

    /// Tool calls in the order the model made them.
    pub tool_calls: Vec<ToolCall>,

    pub raw_assistant_message: Value,
}

impl ToolCompletionResponse {
    /// True when the model asked for at least one tool.
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Tool results rendered as provider-native history turns.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolResultTurns {
    /// One turn per result.
    Many(Vec<Value>),

    /// All results aggregated into a single turn.
    One(Value),
}

impl ToolResultTurns {
    /// Append the turns to a raw history.
    pub fn append_to(self, history: &mut Vec<Value>) {
        match self {
            ToolResultTurns::Many(turns) => history.extend(turns),
            ToolResultTurns::One(turn) => history.push(turn),
        }
    }
}

/// Collect non-empty text fragments into an optional string.
pub(crate) fn join_text<'a>(parts: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let text: String = parts.into_iter().collect();
    if text.is_empty() { None } else { Some(text) }
}
