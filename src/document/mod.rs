// ABOUTME: Document module - the live rich-text document the tools operate on.
// ABOUTME: Defines the Document trait, an in-memory model, and offset mapping.

mod context;
mod model;
mod position;
mod traits;

pub use context::*;
pub use model::*;
pub use position::*;
pub use traits::*;
