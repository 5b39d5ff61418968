// ABOUTME: Root module for margin - AI-assisted editing of rich-text documents.
// ABOUTME: Re-exports the document model, tools, provider adapters, and agent loop.

pub mod agent;
pub mod document;
pub mod error;
pub mod llm;
pub mod prelude;
pub mod tool;
pub mod tools;

pub use error::MarginError;
