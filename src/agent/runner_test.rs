// ABOUTME: Tests for the agent loop using scripted providers and a
// ABOUTME: recording executor; covers termination, ordering, and history shape.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio_test::{assert_err, assert_ok};
use tokio_util::sync::CancellationToken;

use super::*;
use crate::error::{AgentError, LlmError};
use crate::llm::{
    LlmClient, Message, Request, TextStream, ToolCalling, ToolCompletionResponse, ToolResultTurns,
};
use crate::tool::{ToolCall, ToolExecutor, ToolResult};

fn tool_turn(calls: Vec<ToolCall>) -> ToolCompletionResponse {
    let ids: Vec<&str> = calls.iter().map(|c| c.id.as_str()).collect();
    ToolCompletionResponse {
        text: None,
        raw_assistant_message: json!({"role": "assistant", "calls": ids}),
        tool_calls: calls,
    }
}

fn text_turn(text: &str) -> ToolCompletionResponse {
    ToolCompletionResponse {
        text: Some(text.to_string()),
        tool_calls: vec![],
        raw_assistant_message: json!({"role": "assistant", "content": text}),
    }
}

/// Replays scripted turns, then keeps asking for a tool forever.
#[derive(Default)]
struct ScriptedProvider {
    script: Mutex<VecDeque<ToolCompletionResponse>>,
    calls: AtomicUsize,
    histories: Mutex<Vec<Vec<Value>>>,
    aggregate_results: bool,
}

impl ScriptedProvider {
    fn new(script: Vec<ToolCompletionResponse>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            ..Default::default()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmClient for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, _req: &Request) -> Result<String, LlmError> {
        Ok(String::new())
    }

    fn complete_stream(&self, _req: &Request) -> TextStream {
        Box::pin(futures::stream::empty())
    }

    async fn validate_key(&self) -> Result<bool, LlmError> {
        Ok(true)
    }

    fn as_tool_calling(&self) -> Option<&dyn ToolCalling> {
        Some(self)
    }
}

#[async_trait]
impl ToolCalling for ScriptedProvider {
    async fn generate_with_tools(
        &self,
        _req: &Request,
        history: &[Value],
    ) -> Result<ToolCompletionResponse, LlmError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.histories.lock().unwrap().push(history.to_vec());
        let next = self.script.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| {
            tool_turn(vec![ToolCall::new(
                format!("loop_{}", n),
                "read_document",
                json!({}),
            )])
        }))
    }

    fn format_tool_results(&self, results: &[ToolResult]) -> ToolResultTurns {
        let turns: Vec<Value> = results
            .iter()
            .map(|r| json!({"role": "tool", "id": r.tool_call_id, "content": r.content}))
            .collect();
        if self.aggregate_results {
            ToolResultTurns::One(json!({"role": "user", "results": turns}))
        } else {
            ToolResultTurns::Many(turns)
        }
    }
}

/// A provider with no tool calling capability.
struct TextOnlyProvider;

#[async_trait]
impl LlmClient for TextOnlyProvider {
    fn name(&self) -> &str {
        "text-only"
    }

    async fn complete(&self, _req: &Request) -> Result<String, LlmError> {
        Ok("plain".to_string())
    }

    fn complete_stream(&self, _req: &Request) -> TextStream {
        Box::pin(futures::stream::empty())
    }

    async fn validate_key(&self) -> Result<bool, LlmError> {
        Ok(true)
    }
}

/// A provider whose model call never completes.
struct StalledProvider;

#[async_trait]
impl LlmClient for StalledProvider {
    fn name(&self) -> &str {
        "stalled"
    }

    async fn complete(&self, _req: &Request) -> Result<String, LlmError> {
        Ok(String::new())
    }

    fn complete_stream(&self, _req: &Request) -> TextStream {
        Box::pin(futures::stream::pending())
    }

    async fn validate_key(&self) -> Result<bool, LlmError> {
        Ok(true)
    }

    fn as_tool_calling(&self) -> Option<&dyn ToolCalling> {
        Some(self)
    }
}

#[async_trait]
impl ToolCalling for StalledProvider {
    async fn generate_with_tools(
        &self,
        _req: &Request,
        _history: &[Value],
    ) -> Result<ToolCompletionResponse, LlmError> {
        futures::future::pending().await
    }

    fn format_tool_results(&self, _results: &[ToolResult]) -> ToolResultTurns {
        ToolResultTurns::Many(vec![])
    }
}

#[derive(Default)]
struct RecordingExecutor {
    calls: Vec<ToolCall>,
}

#[async_trait]
impl ToolExecutor for RecordingExecutor {
    async fn execute(&mut self, call: &ToolCall) -> String {
        self.calls.push(call.clone());
        format!("result for {}", call.id)
    }
}

fn request() -> Request {
    Request::new("test-model").message(Message::user("Fix the typo"))
}

#[tokio::test]
async fn test_answers_without_tools() {
    let provider = ScriptedProvider::new(vec![text_turn("Nothing to do.")]);
    let mut executor = RecordingExecutor::default();

    let text = run_agent_loop(&provider, &request(), &mut executor, None, None).await;

    assert_eq!(assert_ok!(text), "Nothing to do.");
    assert_eq!(provider.calls(), 1);
    assert!(executor.calls.is_empty());
}

#[tokio::test]
async fn test_one_tool_round_then_answer() {
    let provider = ScriptedProvider::new(vec![
        tool_turn(vec![ToolCall::new(
            "call_1",
            "search_document",
            json!({"query": "teh"}),
        )]),
        text_turn("Fixed it."),
    ]);
    let mut executor = RecordingExecutor::default();

    let text = run_agent_loop(&provider, &request(), &mut executor, None, None).await;

    assert_eq!(assert_ok!(text), "Fixed it.");
    assert_eq!(provider.calls(), 2);
    assert_eq!(executor.calls.len(), 1);
    assert_eq!(executor.calls[0].id, "call_1");
    assert_eq!(executor.calls[0].name, "search_document");
}

#[tokio::test]
async fn test_iteration_cap() {
    let provider = ScriptedProvider::new(vec![]);
    let mut executor = RecordingExecutor::default();

    let text = run_agent_loop(&provider, &request(), &mut executor, None, None).await;

    assert_eq!(assert_ok!(text), ITERATION_LIMIT_MESSAGE);
    assert_eq!(provider.calls(), DEFAULT_MAX_ITERATIONS);
    assert_eq!(executor.calls.len(), DEFAULT_MAX_ITERATIONS);
}

#[tokio::test]
async fn test_two_calls_run_before_next_model_call() {
    let provider = ScriptedProvider::new(vec![
        tool_turn(vec![
            ToolCall::new("a", "read_document", json!({})),
            ToolCall::new("b", "get_document_info", json!({})),
        ]),
        text_turn("Done."),
    ]);
    let mut executor = RecordingExecutor::default();

    assert_ok!(run_agent_loop(&provider, &request(), &mut executor, None, None).await);

    let ids: Vec<&str> = executor.calls.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);

    // Second model call sees the assistant turn followed by both results in order.
    let histories = provider.histories.lock().unwrap();
    assert!(histories[0].is_empty());
    assert_eq!(histories[1].len(), 3);
    assert_eq!(histories[1][0]["calls"], json!(["a", "b"]));
    assert_eq!(histories[1][1]["id"], "a");
    assert_eq!(histories[1][2]["content"], "result for b");
}

#[tokio::test]
async fn test_aggregated_results_are_one_turn() {
    let mut provider = ScriptedProvider::new(vec![
        tool_turn(vec![
            ToolCall::new("a", "read_document", json!({})),
            ToolCall::new("b", "read_document", json!({})),
        ]),
        text_turn("Done."),
    ]);
    provider.aggregate_results = true;
    let mut executor = RecordingExecutor::default();

    assert_ok!(run_agent_loop(&provider, &request(), &mut executor, None, None).await);

    let histories = provider.histories.lock().unwrap();
    assert_eq!(histories[1].len(), 2);
    assert_eq!(histories[1][1]["results"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_missing_tool_support_fails_fast() {
    let mut executor = RecordingExecutor::default();

    let result = run_agent_loop(&TextOnlyProvider, &request(), &mut executor, None, None).await;

    let err = assert_err!(result);
    assert!(matches!(err, AgentError::ToolsUnsupported(ref name) if name == "text-only"));
    assert!(executor.calls.is_empty());
}

#[tokio::test]
async fn test_callbacks_fire_in_order() {
    let provider = ScriptedProvider::new(vec![
        tool_turn(vec![
            ToolCall::new("a", "search_document", json!({"query": "x"})),
            ToolCall::new("b", "custom_tool", json!({})),
        ]),
        text_turn("Done."),
    ]);
    let mut executor = RecordingExecutor::default();
    let events = Mutex::new(Vec::<String>::new());

    let on_status = |label: &str| events.lock().unwrap().push(format!("status:{}", label));
    let on_iteration = |n: usize| events.lock().unwrap().push(format!("iteration:{}", n));

    assert_ok!(
        run_agent_loop(
            &provider,
            &request(),
            &mut executor,
            Some(&on_status),
            Some(&on_iteration),
        )
        .await
    );

    assert_eq!(
        *events.lock().unwrap(),
        vec![
            "iteration:1",
            "status:Searching document...",
            "status:custom_tool",
            "iteration:2",
        ]
    );
}

#[tokio::test]
async fn test_agent_loop_outcome() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        tool_turn(vec![ToolCall::new("a", "read_document", json!({}))]),
        tool_turn(vec![ToolCall::new("b", "read_document", json!({}))]),
        text_turn("All good."),
    ]));
    let mut executor = RecordingExecutor::default();

    let outcome = AgentLoop::new(provider.clone(), request())
        .run(&mut executor)
        .await;

    let outcome = assert_ok!(outcome);
    assert_eq!(outcome.text, "All good.");
    assert_eq!(outcome.iterations, 3);
    assert_eq!(outcome.tool_calls, 2);
    assert_eq!(outcome.stop, StopCondition::Answered);
}

#[tokio::test]
async fn test_agent_loop_custom_cap() {
    let provider = Arc::new(ScriptedProvider::new(vec![]));
    let mut executor = RecordingExecutor::default();
    let seen = Arc::new(AtomicUsize::new(0));
    let seen_in_callback = seen.clone();

    let outcome = AgentLoop::new(provider.clone(), request())
        .max_iterations(3)
        .on_iteration(move |n| seen_in_callback.store(n, Ordering::SeqCst))
        .run(&mut executor)
        .await;

    let outcome = assert_ok!(outcome);
    assert!(outcome.hit_iteration_limit());
    assert_eq!(outcome.iterations, 3);
    assert_eq!(provider.calls(), 3);
    assert_eq!(seen.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_empty_final_text_is_empty_string() {
    let provider = ScriptedProvider::new(vec![ToolCompletionResponse {
        text: None,
        tool_calls: vec![],
        raw_assistant_message: json!({}),
    }]);
    let mut executor = RecordingExecutor::default();

    let text = run_agent_loop(&provider, &request(), &mut executor, None, None).await;
    assert_eq!(assert_ok!(text), "");
}

#[tokio::test]
async fn test_cancel_during_model_call() {
    let token = CancellationToken::new();
    let agent = AgentLoop::new(Arc::new(StalledProvider), request()).cancel_token(token.clone());
    let mut executor = RecordingExecutor::default();

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        token.cancel();
    });

    let result = agent.run(&mut executor).await;
    assert!(matches!(result, Err(AgentError::Aborted)));
    assert!(executor.calls.is_empty());
    canceller.await.unwrap();
}

#[tokio::test]
async fn test_already_cancelled_never_calls_model() {
    let token = CancellationToken::new();
    token.cancel();
    let provider = Arc::new(ScriptedProvider::new(vec![text_turn("unused")]));
    let mut executor = RecordingExecutor::default();

    let result = AgentLoop::new(provider.clone(), request())
        .cancel_token(token)
        .run(&mut executor)
        .await;

    assert!(matches!(result, Err(AgentError::Aborted)));
    assert_eq!(provider.calls(), 0);
}
