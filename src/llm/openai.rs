// ABOUTME: OpenAI API client implementation.
// ABOUTME: Chat completions with function calling; one history turn per tool result.

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

const OPENAI_DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI API request format.
#[derive(Debug, Serialize)]
pub struct OpenAIRequest {
    pub model: String,
    pub messages: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<OpenAITool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

/// OpenAI tool definition.
#[derive(Debug, Serialize)]
pub struct OpenAITool {
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: OpenAIFunction,
}

/// OpenAI function definition.
#[derive(Debug, Serialize)]
pub struct OpenAIFunction {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// OpenAI API response format.
#[derive(Debug, Deserialize)]
pub struct OpenAIResponse {
    #[serde(default)]
    pub choices: Vec<OpenAIChoice>,
}

/// OpenAI response choice. The message stays raw so it can be replayed.
#[derive(Debug, Deserialize)]
pub struct OpenAIChoice {
    pub message: Value,
    pub finish_reason: Option<String>,
}

/// The fields of an assistant message the agent needs.
#[derive(Debug, Default, Deserialize)]
pub struct OpenAIResponseMessage {
    pub content: Option<String>,
    /// Compatible servers send `null` here on plain answers.
    pub tool_calls: Option<Vec<OpenAIToolCall>>,
}

/// OpenAI tool call in a response.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIToolCall {
    pub id: String,
    pub function: OpenAIFunctionCall,
}

/// OpenAI function call details. Arguments arrive as a JSON string.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIFunctionCall {
    pub name: String,
    pub arguments: Option<String>,
}

/// Client for the OpenAI API.
#[derive(Debug, Clone)]
pub struct OpenAIClient {
    api_key: String,
    base_url: String,
    http: reqwest::Client,
}

impl OpenAIClient {
    /// Create a new OpenAI client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: OPENAI_DEFAULT_BASE_URL.to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Create a new OpenAI client from the OPENAI_API_KEY environment variable.
    pub fn from_env() -> Result<Self, LlmError> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            LlmError::Configuration("OPENAI_API_KEY environment variable not set".to_string())
        })?;
        Ok(Self::new(api_key))
    }

    /// Point the client at a different server (proxies, compatible APIs, tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn post(&self, body: &OpenAIRequest) -> reqwest::RequestBuilder {
        self.http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(body)
    }

    async fn send(&self, body: &OpenAIRequest) -> Result<OpenAIResponse, LlmError> {
        let response = check_status(self.post(body).send().await?).await?;
        Ok(response.json().await?)
    }
}

impl From<&ToolDefinition> for OpenAITool {
    fn from(tool: &ToolDefinition) -> Self {
        OpenAITool {
            tool_type: "function".to_string(),
            function: OpenAIFunction {
                name: tool.name.clone(),
                description: tool.description.clone(),
                parameters: tool.input_schema.clone(),
            },
        }
    }
}

impl From<&Request> for OpenAIRequest {
    fn from(req: &Request) -> Self {
        let messages = req
            .messages
            .iter()
            .map(|m| {
                let role = match m.role {
                    Role::System => "system",
                    Role::User => "user",
                    Role::Assistant => "assistant",
                };
                json!({"role": role, "content": m.content})
            })
            .collect();

        OpenAIRequest {
            model: req.model.clone(),
            messages,
            max_tokens: req.max_tokens,
            temperature: req.temperature,
            tools: req.tools.iter().map(OpenAITool::from).collect(),
            stream: None,
        }
    }
}

/// Normalize a chat completion into a tool-calling turn.
pub fn parse_openai_tool_response(
    resp: OpenAIResponse,
) -> Result<ToolCompletionResponse, LlmError> {
    let choice = resp
        .choices
        .into_iter()
        .next()
        .ok_or(LlmError::EmptyResponse)?;
    let message: OpenAIResponseMessage = serde_json::from_value(choice.message.clone())?;

    let tool_calls = message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|call| {
            let arguments = call.function.arguments.unwrap_or_default();
            ToolCall::from_json_str(call.id, call.function.name, &arguments)
        })
        .collect();

    Ok(ToolCompletionResponse {
        text: join_text(message.content.as_deref()),
        tool_calls,
        raw_assistant_message: choice.message,
    })
}

#[async_trait]
impl LlmClient for OpenAIClient {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, req: &Request) -> Result<String, LlmError> {
        let mut body = OpenAIRequest::from(req);
        body.tools.clear();

        let resp = self.send(&body).await?;
        let choice = resp
            .choices
            .into_iter()
            .next()
            .ok_or(LlmError::EmptyResponse)?;
        Ok(choice
            .message
            .get("content")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string())
    }

    fn complete_stream(&self, req: &Request) -> TextStream {
        let mut body = OpenAIRequest::from(req);
        body.tools.clear();
        body.stream = Some(true);

        text_deltas(self.post(&body), |event| {
            event
                .pointer("/choices/0/delta/content")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
    }

    async fn validate_key(&self) -> Result<bool, LlmError> {
        let response = self
            .http
            .get(format!("{}/models", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        key_accepted(response, &[401, 403]).await
    }

    fn as_tool_calling(&self) -> Option<&dyn ToolCalling> {
        Some(self)
    }
}

#[async_trait]
impl ToolCalling for OpenAIClient {
    async fn generate_with_tools(
        &self,
        req: &Request,
        history: &[Value],
    ) -> Result<ToolCompletionResponse, LlmError> {
        let mut body = OpenAIRequest::from(req);
        body.messages.extend(history.iter().cloned());
        parse_openai_tool_response(self.send(&body).await?)
    }

    fn format_tool_results(&self, results: &[ToolResult]) -> ToolResultTurns {
        ToolResultTurns::Many(
            results
                .iter()
                .map(|r| {
                    json!({
                        "role": "tool",
                        "tool_call_id": r.tool_call_id,
                        "content": r.content,
                    })
                })
                .collect(),
        )
    }
}
