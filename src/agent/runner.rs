// ABOUTME: Agent loop - executes the think-act cycle against a document.
// ABOUTME: Asks the model, runs requested tools in order, feeds results back.

use std::sync::Arc;

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::status::status_label;
use crate::error::AgentError;
use crate::llm::{LlmClient, Request, ToolCalling, ToolCompletionResponse};
use crate::tool::{ToolExecutor, ToolResult};

/// Iteration cap when none is configured.
pub const DEFAULT_MAX_ITERATIONS: usize = 8;

/// Returned in place of an answer when the iteration cap is hit.
pub const ITERATION_LIMIT_MESSAGE: &str = "I reached the maximum number of steps for one request \
     before finishing. Some edits may already have been applied; review the document and ask me \
     to continue if more work is needed.";

type StatusCallback = Arc<dyn Fn(&str) + Send + Sync>;
type IterationCallback = Arc<dyn Fn(usize) + Send + Sync>;

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopCondition {
    /// The model produced a final answer.
    Answered,

    /// The iteration cap was reached first.
    IterationLimit,
}

/// Result of one agent run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentOutcome {
    /// Final answer, or [`ITERATION_LIMIT_MESSAGE`].
    pub text: String,

    /// Number of model calls made.
    pub iterations: usize,

    /// Number of tool calls executed.
    pub tool_calls: usize,

    pub stop: StopCondition,
}

impl AgentOutcome {
    pub fn hit_iteration_limit(&self) -> bool {
        self.stop == StopCondition::IterationLimit
    }
}

/// A configured agent run over one provider and one request.
pub struct AgentLoop {
    client: Arc<dyn LlmClient>,
    request: Request,
    max_iterations: usize,
    on_status: Option<StatusCallback>,
    on_iteration: Option<IterationCallback>,
    cancel: Option<CancellationToken>,
}

impl AgentLoop {
    /// Create a loop for the given provider and request.
    pub fn new(client: Arc<dyn LlmClient>, request: Request) -> Self {
        Self {
            client,
            request,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            on_status: None,
            on_iteration: None,
            cancel: None,
        }
    }

    /// Set the maximum number of model calls.
    pub fn max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Called with a progress label before each tool call.
    pub fn on_status(mut self, callback: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_status = Some(Arc::new(callback));
        self
    }

    /// Called with the 1-based iteration number before each model call.
    pub fn on_iteration(mut self, callback: impl Fn(usize) + Send + Sync + 'static) -> Self {
        self.on_iteration = Some(Arc::new(callback));
        self
    }

    /// Abort the run when the token is cancelled.
    pub fn cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Run to completion against the given executor.
    pub async fn run(&self, executor: &mut dyn ToolExecutor) -> Result<AgentOutcome, AgentError> {
        drive(
            self.client.as_ref(),
            &self.request,
            executor,
            Hooks {
                max_iterations: self.max_iterations,
                on_status: self.on_status.as_deref(),
                on_iteration: self.on_iteration.as_deref(),
                cancel: self.cancel.as_ref(),
            },
        )
        .await
    }
}

/// Run the agent loop with the default iteration cap.
///
/// Returns the model's final text, or [`ITERATION_LIMIT_MESSAGE`] when the
/// cap is reached. Fails before any tool runs if the provider cannot call
/// tools.
pub async fn run_agent_loop(
    provider: &dyn LlmClient,
    request: &Request,
    executor: &mut dyn ToolExecutor,
    on_status: Option<&(dyn Fn(&str) + Send + Sync)>,
    on_iteration: Option<&(dyn Fn(usize) + Send + Sync)>,
) -> Result<String, AgentError> {
    let hooks = Hooks {
        max_iterations: DEFAULT_MAX_ITERATIONS,
        on_status,
        on_iteration,
        cancel: None,
    };
    drive(provider, request, executor, hooks)
        .await
        .map(|outcome| outcome.text)
}

struct Hooks<'a> {
    max_iterations: usize,
    on_status: Option<&'a (dyn Fn(&str) + Send + Sync)>,
    on_iteration: Option<&'a (dyn Fn(usize) + Send + Sync)>,
    cancel: Option<&'a CancellationToken>,
}

async fn drive(
    provider: &dyn LlmClient,
    request: &Request,
    executor: &mut dyn ToolExecutor,
    hooks: Hooks<'_>,
) -> Result<AgentOutcome, AgentError> {
    let tools = provider
        .as_tool_calling()
        .ok_or_else(|| AgentError::ToolsUnsupported(provider.name().to_string()))?;

    let mut history: Vec<Value> = Vec::new();
    let mut tool_calls = 0;

    for iteration in 1..=hooks.max_iterations {
        if hooks.cancel.is_some_and(|c| c.is_cancelled()) {
            return Err(AgentError::Aborted);
        }
        if let Some(callback) = hooks.on_iteration {
            callback(iteration);
        }

        debug!(
            provider = provider.name(),
            iteration,
            history_len = history.len(),
            "requesting completion"
        );
        let response = generate(tools, request, &history, hooks.cancel).await?;

        let ToolCompletionResponse {
            text,
            tool_calls: calls,
            raw_assistant_message,
        } = response;

        if calls.is_empty() {
            info!(iteration, tool_calls, "agent answered");
            return Ok(AgentOutcome {
                text: text.unwrap_or_default(),
                iterations: iteration,
                tool_calls,
                stop: StopCondition::Answered,
            });
        }

        history.push(raw_assistant_message);

        let mut results = Vec::with_capacity(calls.len());
        for call in &calls {
            if let Some(callback) = hooks.on_status {
                callback(status_label(&call.name));
            }
            debug!(iteration, tool = %call.name, id = %call.id, "running tool");
            let content = executor.execute(call).await;
            results.push(ToolResult::for_call(call, content));
        }
        tool_calls += calls.len();

        tools.format_tool_results(&results).append_to(&mut history);
    }

    warn!(
        max_iterations = hooks.max_iterations,
        tool_calls, "agent stopped at iteration limit"
    );
    Ok(AgentOutcome {
        text: ITERATION_LIMIT_MESSAGE.to_string(),
        iterations: hooks.max_iterations,
        tool_calls,
        stop: StopCondition::IterationLimit,
    })
}

async fn generate(
    tools: &dyn ToolCalling,
    request: &Request,
    history: &[Value],
    cancel: Option<&CancellationToken>,
) -> Result<ToolCompletionResponse, AgentError> {
    let call = tools.generate_with_tools(request, history);
    match cancel {
        Some(token) => tokio::select! {
            biased;
            _ = token.cancelled() => Err(AgentError::Aborted),
            response = call => Ok(response?),
        },
        None => Ok(call.await?),
    }
}
