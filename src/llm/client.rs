// ABOUTME: Defines the LlmClient trait and the optional ToolCalling capability,
// ABOUTME: plus the HTTP helpers the vendor adapters share.

use std::pin::Pin;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use serde_json::Value;

use super::{Request, ToolCompletionResponse, ToolResultTurns};
use crate::error::LlmError;
use crate::tool::ToolResult;

/// A stream of text deltas.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send + 'static>>;

/// Trait for LLM client implementations.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Short provider name, used in errors and logs.
    fn name(&self) -> &str;

    /// Plain text completion (non-streaming).
    async fn complete(&self, req: &Request) -> Result<String, LlmError>;

    /// Plain text completion as a stream of deltas.
    fn complete_stream(&self, req: &Request) -> TextStream;

    /// Check whether the configured key is accepted.
    ///
    /// A rejected key is `Ok(false)`; transport failures are errors.
    async fn validate_key(&self) -> Result<bool, LlmError>;

    /// The tool-calling capability, when the provider has one.
    fn as_tool_calling(&self) -> Option<&dyn ToolCalling> {
        None
    }
}

/// Tool-calling capability of a provider.
#[async_trait]
pub trait ToolCalling: Send + Sync {
    /// Send the request plus the raw history; returns the model's next turn.
    ///
    /// `history` holds turns this same provider produced earlier in the run,
    /// in its own format, and is sent after `req.messages` unchanged.
    async fn generate_with_tools(
        &self,
        req: &Request,
        history: &[Value],
    ) -> Result<ToolCompletionResponse, LlmError>;

    /// Render tool results as history turns in this provider's format.
    fn format_tool_results(&self, results: &[ToolResult]) -> ToolResultTurns;
}

/// Turn a non-success response into an API error.
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, LlmError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or(body);

    Err(LlmError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Interpret a key-validation response: rejected statuses are `false`.
pub(crate) async fn key_accepted(
    response: reqwest::Response,
    rejected: &[u16],
) -> Result<bool, LlmError> {
    let status = response.status().as_u16();
    if rejected.contains(&status) {
        tracing::warn!(status, "API key rejected");
        return Ok(false);
    }
    check_status(response).await.map(|_| true)
}

/// Yield the `data:` payloads of a server-sent event stream.
pub(crate) fn sse_data(
    response: reqwest::Response,
) -> Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send + 'static>> {
    Box::pin(async_stream::try_stream! {
        let mut bytes = response.bytes_stream();
        let mut buffer: Vec<u8> = Vec::new();

        while let Some(chunk) = bytes.next().await {
            buffer.extend_from_slice(&chunk?);

            while let Some(pos) = buffer.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=pos).collect();
                let line = String::from_utf8_lossy(&line);
                if let Some(data) = line.trim().strip_prefix("data:") {
                    let data = data.trim();
                    if !data.is_empty() && data != "[DONE]" {
                        yield data.to_string();
                    }
                }
            }
        }
    })
}

/// Stream text deltas from an SSE response, picking text out of each event.
pub(crate) fn text_deltas(
    request: reqwest::RequestBuilder,
    extract: fn(&Value) -> Option<String>,
) -> TextStream {
    Box::pin(async_stream::try_stream! {
        let response = check_status(request.send().await?).await?;
        let mut events = sse_data(response);

        while let Some(data) = events.next().await {
            let event: Value = serde_json::from_str(&data?)?;
            if let Some(text) = extract(&event) {
                if !text.is_empty() {
                    yield text;
                }
            }
        }
    })
}
