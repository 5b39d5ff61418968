// ABOUTME: LLM module - provider-agnostic requests, the client and tool-calling
// ABOUTME: capability traits, and the OpenAI, Anthropic, and Gemini adapters.

mod anthropic;
mod client;
mod gemini;
mod openai;
mod provider;
mod stream;
mod types;

pub use anthropic::*;
pub use client::*;
pub use gemini::*;
pub use openai::*;
pub use provider::*;
pub use stream::*;
pub use types::*;


#[cfg(test)]
mod anthropic_test;
