pub mod builtin;
mod registry;
mod types;

pub use registry::{Tool, ToolRegistry};
pub use types::{
    PropertySchema, ToolContext, ToolDefinition, ToolGroup, ToolInputSchema, ToolResult,
};
