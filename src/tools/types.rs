//! Shared types for the tool system: hand-declared schemas, execution
//! context, and the structured result every tool returns.
//!
//! Schemas are written out explicitly per operation rather than discovered
//! by reflection, and the registry validates them at startup.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::storage::Storage;

/// Which collection a tool operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolGroup {
    Tasks,
    Notes,
}

/// JSON schema for a single tool parameter.
#[derive(Debug, Clone, Serialize)]
pub struct PropertySchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Element schema for array parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<PropertySchema>>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
}

impl PropertySchema {
    pub fn string(description: impl Into<String>) -> Self {
        PropertySchema {
            schema_type: "string".to_string(),
            description: description.into(),
            default: None,
            items: None,
            enum_values: None,
        }
    }

    pub fn string_enum(description: impl Into<String>, values: &[&str]) -> Self {
        PropertySchema {
            enum_values: Some(values.iter().map(|v| v.to_string()).collect()),
            ..Self::string(description)
        }
    }

    pub fn string_array(description: impl Into<String>) -> Self {
        PropertySchema {
            schema_type: "array".to_string(),
            description: description.into(),
            default: None,
            items: Some(Box::new(PropertySchema::string("array element"))),
            enum_values: None,
        }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }
}

/// Object schema describing a tool's parameters.
#[derive(Debug, Clone, Serialize)]
pub struct ToolInputSchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    pub properties: HashMap<String, PropertySchema>,
    pub required: Vec<String>,
}

impl ToolInputSchema {
    pub fn object(
        properties: HashMap<String, PropertySchema>,
        required: &[&str],
    ) -> Self {
        ToolInputSchema {
            schema_type: "object".to_string(),
            properties,
            required: required.iter().map(|r| r.to_string()).collect(),
        }
    }
}

/// Self-describing callable unit registered with the agent runtime.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: ToolInputSchema,
    pub group: ToolGroup,
}

/// Execution context handed to every tool invocation.
///
/// Explicitly constructed and passed by reference; there is no ambient
/// global store.
#[derive(Clone)]
pub struct ToolContext {
    pub storage: Arc<Storage>,
}

impl ToolContext {
    pub fn new(storage: Arc<Storage>) -> Self {
        ToolContext { storage }
    }
}

/// Structured result of a tool invocation.
///
/// Store failures are converted into `success = false` results here rather
/// than propagated as protocol faults, so the runtime always receives a
/// well-formed response it can phrase for the user.
#[derive(Debug, Clone, Serialize)]
pub struct ToolResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl ToolResult {
    pub fn success(output: impl Into<String>) -> Self {
        ToolResult {
            success: true,
            output: Some(output.into()),
            error: None,
            metadata: None,
        }
    }

    /// Serialize a typed result payload as the tool output.
    pub fn success_json<T: Serialize>(payload: &T) -> Self {
        match serde_json::to_string_pretty(payload) {
            Ok(json) => ToolResult::success(json),
            Err(e) => ToolResult::error(format!("Failed to serialize tool result: {}", e)),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ToolResult {
            success: false,
            output: None,
            error: Some(message.into()),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn property_schema_serializes_enum_and_type_keys() {
        let schema = PropertySchema::string_enum("filter", &["all", "today"])
            .with_default(json!("all"));
        let value = serde_json::to_value(&schema).unwrap();
        assert_eq!(value["type"], "string");
        assert_eq!(value["enum"], json!(["all", "today"]));
        assert_eq!(value["default"], "all");
    }

    #[test]
    fn tool_result_error_carries_message() {
        let result = ToolResult::error("no such entry");
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("no such entry"));
        assert!(result.output.is_none());
    }
}
