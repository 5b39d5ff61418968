// ABOUTME: Anthropic Claude API client implementation.
// ABOUTME: Messages API with tool use; tool results go back as one user turn.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::client::{check_status, key_accepted, text_deltas};
use super::types::join_text;
use super::{
    LlmClient, Request, Role, TextStream, ToolCalling, ToolCompletionResponse, ToolDefinition,
    ToolResultTurns,
};
use crate::error::LlmError;
use crate::tool::{ToolCall, ToolResult};

const ANTHROPIC_DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Anthropic API request format.
#[derive(Debug, Serialize)]
pub struct AnthropicRequest {
    pub model: String,
    pub messages: Vec<Value>,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<AnthropicTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

/// Anthropic content block, as far as the agent needs to understand it.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnthropicContent {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        #[serde(default)]
        input: Value,
    },
    #[serde(other)]
    Other,
}

/// Anthropic tool definition.
#[derive(Debug, Serialize)]
pub struct AnthropicTool {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Anthropic API response format. Content blocks stay raw for replay.
#[derive(Debug, Deserialize)]
pub struct AnthropicResponse {
    #[serde(default)]
    pub content: Vec<Value>,
    pub stop_reason: Option<String>,
}

/// Client for the Anthropic API.
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    api_key: String,
    base_url: String,
    http: reqwest::Client,
}

impl AnthropicClient {
    /// Create a new Anthropic client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: ANTHROPIC_DEFAULT_BASE_URL.to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Create a new Anthropic client from the ANTHROPIC_API_KEY environment variable.
    pub fn from_env() -> Result<Self, LlmError> {
        let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| {
            LlmError::Configuration("ANTHROPIC_API_KEY environment variable not set".to_string())
        })?;
        Ok(Self::new(api_key))
    }

    /// Point the client at a different server.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
    }

    fn post(&self, body: &AnthropicRequest) -> reqwest::RequestBuilder {
        self.authorized(self.http.post(format!("{}/messages", self.base_url)))
            .json(body)
    }

    async fn send(&self, body: &AnthropicRequest) -> Result<AnthropicResponse, LlmError> {
        let response = check_status(self.post(body).send().await?).await?;
        Ok(response.json().await?)
    }
}

impl From<&ToolDefinition> for AnthropicTool {
    fn from(tool: &ToolDefinition) -> Self {
        AnthropicTool {
            name: tool.name.clone(),
            description: tool.description.clone(),
            input_schema: tool.input_schema.clone(),
        }
    }
}

impl From<&Request> for AnthropicRequest {
    fn from(req: &Request) -> Self {
        let messages = req
            .conversation()
            .map(|m| {
                let role = if m.role == Role::Assistant {
                    "assistant"
                } else {
                    "user"
                };
                json!({"role": role, "content": m.content})
            })
            .collect();

        AnthropicRequest {
            model: req.model.clone(),
            messages,
            max_tokens: req.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            system: req.system_prompt(),
            temperature: req.temperature,
            tools: req.tools.iter().map(AnthropicTool::from).collect(),
            stream: None,
        }
    }
}

fn parse_blocks(blocks: &[Value]) -> Vec<AnthropicContent> {
    blocks
        .iter()
        .map(|b| serde_json::from_value(b.clone()).unwrap_or(AnthropicContent::Other))
        .collect()
}

/// Normalize a Messages API response into a tool-calling turn.
pub fn parse_anthropic_tool_response(resp: AnthropicResponse) -> ToolCompletionResponse {
    let blocks = parse_blocks(&resp.content);

    let text = join_text(blocks.iter().filter_map(|b| match b {
        AnthropicContent::Text { text } => Some(text.as_str()),
        _ => None,
    }));

    let tool_calls = blocks
        .into_iter()
        .filter_map(|b| match b {
            AnthropicContent::ToolUse { id, name, input } => Some(ToolCall::new(id, name, input)),
            _ => None,
        })
        .collect();

    ToolCompletionResponse {
        text,
        tool_calls,
        raw_assistant_message: json!({"role": "assistant", "content": resp.content}),
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn complete(&self, req: &Request) -> Result<String, LlmError> {
        let mut body = AnthropicRequest::from(req);
        body.tools.clear();

        let resp = self.send(&body).await?;
        Ok(parse_anthropic_tool_response(resp).text.unwrap_or_default())
    }

    fn complete_stream(&self, req: &Request) -> TextStream {
        let mut body = AnthropicRequest::from(req);
        body.tools.clear();
        body.stream = Some(true);

        text_deltas(self.post(&body), |event| {
            if event.get("type").and_then(Value::as_str) != Some("content_block_delta") {
                return None;
            }
            event
                .pointer("/delta/text")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
    }

    async fn validate_key(&self) -> Result<bool, LlmError> {
        let response = self
            .authorized(self.http.get(format!("{}/models", self.base_url)))
            .send()
            .await?;
        key_accepted(response, &[401, 403]).await
    }

    fn as_tool_calling(&self) -> Option<&dyn ToolCalling> {
        Some(self)
    }
}

#[async_trait]
impl ToolCalling for AnthropicClient {
    async fn generate_with_tools(
        &self,
        req: &Request,
        history: &[Value],
    ) -> Result<ToolCompletionResponse, LlmError> {
        let mut body = AnthropicRequest::from(req);
        body.messages.extend(history.iter().cloned());
        Ok(parse_anthropic_tool_response(self.send(&body).await?))
    }

    fn format_tool_results(&self, results: &[ToolResult]) -> ToolResultTurns {
        let blocks: Vec<Value> = results
            .iter()
            .map(|r| {
                json!({
                    "type": "tool_result",
                    "tool_use_id": r.tool_call_id,
                    "content": r.content,
                })
            })
            .collect();
        ToolResultTurns::One(json!({"role": "user", "content": blocks}))
    }
}
