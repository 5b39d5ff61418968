// ABOUTME: Google Gemini API client implementation.
// ABOUTME: generateContent with function calling; call ids are synthesized locally.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use super::client::{check_status, key_accepted, text_deltas};
use super::types::join_text;
use super::{
    LlmClient, Request, Role, TextStream, ToolCalling, ToolCompletionResponse, ToolDefinition,
    ToolResultTurns,
};
use crate::error::LlmError;
use crate::tool::{ToolCall, ToolResult};

const GEMINI_DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini API request format.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    pub contents: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GeminiGenerationConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<GeminiTool>,
}

/// Gemini generation config.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

/// Gemini tool definition.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiTool {
    pub function_declarations: Vec<GeminiFunctionDeclaration>,
}

/// Gemini function declaration.
#[derive(Debug, Serialize)]
pub struct GeminiFunctionDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Gemini API response format.
#[derive(Debug, Deserialize)]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
}

/// Gemini response candidate. Content stays raw for replay.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiCandidate {
    #[serde(default)]
    pub content: Value,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Gemini content part, as far as the agent needs to understand it.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiPart {
    pub text: Option<String>,
    pub function_call: Option<GeminiFunctionCall>,
    #[serde(default)]
    pub thought: bool,
}

/// Gemini function call.
#[derive(Debug, Deserialize)]
pub struct GeminiFunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: Value,
}

/// Client for the Google Gemini API.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    http: reqwest::Client,
}

impl GeminiClient {
    /// Create a new Gemini client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: GEMINI_DEFAULT_BASE_URL.to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Create a new Gemini client from GEMINI_API_KEY, falling back to GOOGLE_API_KEY.
    pub fn from_env() -> Result<Self, LlmError> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("GOOGLE_API_KEY"))
            .map_err(|_| {
                LlmError::Configuration(
                    "GEMINI_API_KEY or GOOGLE_API_KEY environment variable not set".to_string(),
                )
            })?;
        Ok(Self::new(api_key))
    }

    /// Point the client at a different server.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self, model: &str, method: &str) -> String {
        format!("{}/models/{}:{}", self.base_url, model, method)
    }

    fn post(&self, url: String, body: &GeminiRequest) -> reqwest::RequestBuilder {
        self.http
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
    }

    async fn send(&self, model: &str, body: &GeminiRequest) -> Result<GeminiResponse, LlmError> {
        let request = self.post(self.endpoint(model, "generateContent"), body);
        let response = check_status(request.send().await?).await?;
        Ok(response.json().await?)
    }
}

impl From<&ToolDefinition> for GeminiFunctionDeclaration {
    fn from(tool: &ToolDefinition) -> Self {
        GeminiFunctionDeclaration {
            name: tool.name.clone(),
            description: tool.description.clone(),
            parameters: tool.input_schema.clone(),
        }
    }
}

impl From<&Request> for GeminiRequest {
    fn from(req: &Request) -> Self {
        let contents = req
            .conversation()
            .map(|m| {
                let role = if m.role == Role::Assistant {
                    "model"
                } else {
                    "user"
                };
                json!({"role": role, "parts": [{"text": m.content}]})
            })
            .collect();

        let system_instruction = req
            .system_prompt()
            .map(|text| json!({"parts": [{"text": text}]}));

        let generation_config = if req.max_tokens.is_some() || req.temperature.is_some() {
            Some(GeminiGenerationConfig {
                max_output_tokens: req.max_tokens,
                temperature: req.temperature,
            })
        } else {
            None
        };

        let tools = if req.tools.is_empty() {
            Vec::new()
        } else {
            vec![GeminiTool {
                function_declarations: req
                    .tools
                    .iter()
                    .map(GeminiFunctionDeclaration::from)
                    .collect(),
            }]
        };

        GeminiRequest {
            contents,
            system_instruction,
            generation_config,
            tools,
        }
    }
}

fn parts_of(content: &Value) -> Vec<GeminiPart> {
    content
        .get("parts")
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .map(|p| serde_json::from_value(p.clone()).unwrap_or_default())
                .collect()
        })
        .unwrap_or_default()
}

fn visible_text(content: &Value) -> Option<String> {
    let parts = parts_of(content);
    join_text(
        parts
            .iter()
            .filter(|p| !p.thought)
            .filter_map(|p| p.text.as_deref()),
    )
}

/// Normalize a generateContent response into a tool-calling turn.
///
/// Gemini does not identify function calls, so each call gets a fresh id.
pub fn parse_gemini_tool_response(
    resp: GeminiResponse,
) -> Result<ToolCompletionResponse, LlmError> {
    let candidate = resp
        .candidates
        .into_iter()
        .next()
        .ok_or(LlmError::EmptyResponse)?;

    let mut raw = candidate.content;
    if raw.is_null() {
        raw = json!({"role": "model", "parts": []});
    }

    let tool_calls = parts_of(&raw)
        .into_iter()
        .filter_map(|p| p.function_call)
        .map(|call| {
            let id = format!("call_{}", Uuid::new_v4().simple());
            ToolCall::new(id, call.name, call.args)
        })
        .collect();

    Ok(ToolCompletionResponse {
        text: visible_text(&raw),
        tool_calls,
        raw_assistant_message: raw,
    })
}

#[async_trait]
impl LlmClient for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn complete(&self, req: &Request) -> Result<String, LlmError> {
        let mut body = GeminiRequest::from(req);
        body.tools.clear();

        let resp = self.send(&req.model, &body).await?;
        let candidate = resp
            .candidates
            .into_iter()
            .next()
            .ok_or(LlmError::EmptyResponse)?;
        Ok(visible_text(&candidate.content).unwrap_or_default())
    }

    fn complete_stream(&self, req: &Request) -> TextStream {
        let mut body = GeminiRequest::from(req);
        body.tools.clear();
        let url = format!(
            "{}?alt=sse",
            self.endpoint(&req.model, "streamGenerateContent")
        );

        text_deltas(self.post(url, &body), |event| {
            event
                .pointer("/candidates/0/content")
                .and_then(visible_text)
        })
    }

    async fn validate_key(&self) -> Result<bool, LlmError> {
        let response = self
            .http
            .get(format!("{}/models", self.base_url))
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await?;
        // An unknown key is reported as 400 INVALID_ARGUMENT.
        key_accepted(response, &[400, 401, 403]).await
    }

    fn as_tool_calling(&self) -> Option<&dyn ToolCalling> {
        Some(self)
    }
}

#[async_trait]
impl ToolCalling for GeminiClient {
    async fn generate_with_tools(
        &self,
        req: &Request,
        history: &[Value],
    ) -> Result<ToolCompletionResponse, LlmError> {
        let mut body = GeminiRequest::from(req);
        body.contents.extend(history.iter().cloned());
        parse_gemini_tool_response(self.send(&req.model, &body).await?)
    }

    fn format_tool_results(&self, results: &[ToolResult]) -> ToolResultTurns {
        let parts: Vec<Value> = results
            .iter()
            .map(|r| {
                json!({
                    "functionResponse": {
                        "name": r.name,
                        "response": {"result": r.content},
                    }
                })
            })
            .collect();
        ToolResultTurns::One(json!({"role": "user", "parts": parts}))
    }
}
