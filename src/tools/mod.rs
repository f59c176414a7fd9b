//! Agent-facing tools: document retrieval, corpus analysis, arithmetic,
//! web search, and research-output persistence.

pub mod docs;
pub mod math;
pub mod save;
pub mod web;

pub use docs::{AnalyzeDocsTool, DocSearchTool, NO_RELEVANT_CONTENT, format_snippets};
pub use math::{MathOp, MathTool, math_tools};
pub use save::SaveTool;
pub use web::WebSearchTool;
