// ABOUTME: Agent module - the tool-calling loop that alternates model turns
// ABOUTME: with document tool execution until the model answers.

mod runner;
mod status;

pub use runner::{
    AgentLoop, AgentOutcome, DEFAULT_MAX_ITERATIONS, ITERATION_LIMIT_MESSAGE, StopCondition,
    run_agent_loop,
};
pub use status::status_label;

#[cfg(test)]
mod runner_test;
