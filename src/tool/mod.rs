// ABOUTME: Tool module - tool calls, results, the document tool trait, and
// ABOUTME: the fixed registry advertised to the model.

mod call;
mod registry;
mod result;
mod traits;

pub use call::*;
pub use registry::*;
pub use result::*;
pub use traits::*;
