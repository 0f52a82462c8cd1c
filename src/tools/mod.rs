//! Tools module - the assistant's external capabilities
//!
//! A closed set: SolveBio expression generation, calculation, web search.

pub mod calculator;
pub mod codegen;
pub mod registry;
pub mod search;

pub use registry::{ToolInvocation, ToolRegistry};
