// ABOUTME: Built-in document tools and the executor that dispatches to them.
// ABOUTME: Includes read, search, edit, and document info.

mod args;
mod edit;
mod executor;
mod info;
mod read;
mod search;

pub use edit::EditDocumentTool;
pub use executor::{DocumentToolExecutor, create_tool_executor};
pub use info::GetDocumentInfoTool;
pub use read::{READ_LIMIT, ReadDocumentTool};
pub use search::{MAX_MATCHES, SearchDocumentTool};
