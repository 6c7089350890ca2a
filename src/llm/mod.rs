//! LLM-powered prompt-to-GraphQL compilation.

pub mod chat;
pub mod compiler;
pub mod explain;

pub use chat::{ChatProvider, FunctionSpec, OpenAiChat};
pub use compiler::QueryCompiler;
pub use explain::ExplainCompiler;
