//! Tool trait and registry.
//!
//! The registry owns the fixed operation set, hands the schema list to the
//! agent runtime at session setup, and dispatches invocations by name. An
//! unknown tool name is a structured error result, never a fault.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use super::builtin;
use super::types::{ToolContext, ToolDefinition, ToolResult};

#[async_trait]
pub trait Tool: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    async fn execute(&self, params: Value, context: &ToolContext) -> ToolResult;
}

pub struct ToolRegistry {
    /// Registration order, preserved for the definitions list.
    tools: Vec<Arc<dyn Tool>>,
    by_name: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        ToolRegistry {
            tools: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// Registry preloaded with the full task and note operation set.
    pub fn with_builtin_tools() -> Self {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(builtin::AddTaskTool::new()));
        registry.register(Arc::new(builtin::ListTasksTool::new()));
        registry.register(Arc::new(builtin::CompleteTaskTool::new()));
        registry.register(Arc::new(builtin::DeleteTaskTool::new()));
        registry.register(Arc::new(builtin::AddNoteTool::new()));
        registry.register(Arc::new(builtin::ListNotesTool::new()));
        registry.register(Arc::new(builtin::SearchNotesTool::new()));
        registry.register(Arc::new(builtin::DeleteNoteTool::new()));
        registry
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.definition().name;
        self.tools.push(tool);
        self.by_name.insert(name, self.tools.len() - 1);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.by_name.get(name).map(|&index| &self.tools[index])
    }

    /// Schema list in registration order, for session setup.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    pub async fn execute(&self, name: &str, params: Value, context: &ToolContext) -> ToolResult {
        match self.get(name) {
            Some(tool) => {
                log::debug!("executing tool '{}'", name);
                tool.execute(params, context).await
            }
            None => ToolResult::error(format!("Unknown tool: '{}'", name)),
        }
    }

    /// Startup validation of the declared schemas: unique non-empty names,
    /// non-empty descriptions, and every required parameter declared in the
    /// property map.
    pub fn validate(&self) -> Result<(), String> {
        let mut seen = HashMap::new();
        for tool in &self.tools {
            let def = tool.definition();
            if def.name.is_empty() {
                return Err("tool with empty name".to_string());
            }
            if def.description.is_empty() {
                return Err(format!("tool '{}' has an empty description", def.name));
            }
            if seen.insert(def.name.clone(), ()).is_some() {
                return Err(format!("duplicate tool name '{}'", def.name));
            }
            for required in &def.input_schema.required {
                if !def.input_schema.properties.contains_key(required) {
                    return Err(format!(
                        "tool '{}' requires undeclared parameter '{}'",
                        def.name, required
                    ));
                }
            }
        }
        Ok(())
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::with_builtin_tools()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;
    use crate::tools::types::{PropertySchema, ToolInputSchema};
    use serde_json::json;
    use tempfile::TempDir;

    struct BrokenTool;

    #[async_trait]
    impl Tool for BrokenTool {
        fn definition(&self) -> ToolDefinition {
            ToolDefinition {
                name: "broken".to_string(),
                description: "declares a required param it never defines".to_string(),
                input_schema: ToolInputSchema::object(HashMap::new(), &["missing"]),
                group: crate::tools::types::ToolGroup::Tasks,
            }
        }

        async fn execute(&self, _params: Value, _context: &ToolContext) -> ToolResult {
            ToolResult::success("")
        }
    }

    #[test]
    fn builtin_registry_has_all_eight_operations_and_validates() {
        let registry = ToolRegistry::with_builtin_tools();
        let names: Vec<String> = registry.definitions().iter().map(|d| d.name.clone()).collect();
        assert_eq!(
            names,
            vec![
                "add_task",
                "list_tasks",
                "complete_task",
                "delete_task",
                "add_note",
                "list_notes",
                "search_notes",
                "delete_note",
            ]
        );
        registry.validate().unwrap();
    }

    #[test]
    fn validate_rejects_undeclared_required_parameter() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(BrokenTool));
        let err = registry.validate().unwrap_err();
        assert!(err.contains("undeclared parameter"));
    }

    #[test]
    fn validate_rejects_duplicate_names() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(builtin::AddTaskTool::new()));
        registry.register(Arc::new(builtin::AddTaskTool::new()));
        let err = registry.validate().unwrap_err();
        assert!(err.contains("duplicate"));
    }

    #[test]
    fn every_required_parameter_is_declared() {
        for def in ToolRegistry::with_builtin_tools().definitions() {
            for required in &def.input_schema.required {
                assert!(
                    def.input_schema.properties.contains_key(required),
                    "tool '{}' requires undeclared '{}'",
                    def.name,
                    required
                );
            }
        }
    }

    #[tokio::test]
    async fn executing_unknown_tool_is_a_structured_error() {
        let dir = TempDir::new().unwrap();
        let context = ToolContext::new(Arc::new(Storage::new(dir.path()).unwrap()));
        let registry = ToolRegistry::with_builtin_tools();

        let result = registry.execute("nope", json!({}), &context).await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("Unknown tool"));
    }

    #[test]
    fn schema_helper_is_exercised() {
        let schema = PropertySchema::string_array("tags");
        assert_eq!(schema.schema_type, "array");
        assert!(schema.items.is_some());
    }
}
