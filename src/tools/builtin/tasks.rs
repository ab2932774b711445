//! Task tools: add, list, complete, delete.
//!
//! Every mutating tool performs exactly one load-mutate-save cycle; if the
//! save fails the in-memory change is discarded and the prior on-disk state
//! stays authoritative. Complete and delete share the store's resolution
//! algorithm, so ties resolve to the earliest-created matching task.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;

use crate::storage::find_by_id_or_title;
use crate::tools::registry::Tool;
use crate::tools::types::{
    PropertySchema, ToolContext, ToolDefinition, ToolGroup, ToolInputSchema, ToolResult,
};

fn query_property() -> PropertySchema {
    PropertySchema::string("Task id (exact) or a title substring to match")
}

// ── add_task ────────────────────────────────────────

pub struct AddTaskTool {
    definition: ToolDefinition,
}

impl AddTaskTool {
    pub fn new() -> Self {
        let mut properties = HashMap::new();
        properties.insert("title".to_string(), PropertySchema::string("The task title"));
        properties.insert(
            "due_date".to_string(),
            PropertySchema::string("Due date in YYYY-MM-DD format"),
        );
        properties.insert(
            "priority".to_string(),
            PropertySchema::string_enum(
                "Priority level, defaults to medium",
                &["low", "medium", "high"],
            )
            .with_default(json!("medium")),
        );
        properties.insert(
            "tags".to_string(),
            PropertySchema::string_array("Optional tags for categorization"),
        );

        AddTaskTool {
            definition: ToolDefinition {
                name: "add_task".to_string(),
                description: "Create a new task with optional due date, priority, and tags"
                    .to_string(),
                input_schema: ToolInputSchema::object(properties, &["title"]),
                group: ToolGroup::Tasks,
            },
        }
    }
}

impl Default for AddTaskTool {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct AddTaskParams {
    title: String,
    due_date: Option<String>,
    priority: Option<String>,
    tags: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct AddTaskPayload {
    success: bool,
    message: String,
    task_id: String,
}

#[async_trait]
impl Tool for AddTaskTool {
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    async fn execute(&self, params: Value, context: &ToolContext) -> ToolResult {
        let params: AddTaskParams = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => return ToolResult::error(format!("Invalid parameters: {}", e)),
        };

        let task = match context.storage.add_task(
            &params.title,
            params.due_date,
            params.priority.as_deref(),
            params.tags,
        ) {
            Ok(task) => task,
            Err(e) => return ToolResult::error(e.to_string()),
        };

        ToolResult::success_json(&AddTaskPayload {
            success: true,
            message: format!("Task '{}' created with {} priority", task.title, task.priority),
            task_id: task.id.clone(),
        })
        .with_metadata(json!({ "task_id": task.id }))
    }
}

// ── list_tasks ──────────────────────────────────────

pub struct ListTasksTool {
    definition: ToolDefinition,
}

impl ListTasksTool {
    pub fn new() -> Self {
        let mut properties = HashMap::new();
        properties.insert(
            "filter".to_string(),
            PropertySchema::string_enum(
                "Filter: all, today (due or created today), incomplete, or completed",
                &["all", "today", "incomplete", "completed"],
            )
            .with_default(json!("all")),
        );

        ListTasksTool {
            definition: ToolDefinition {
                name: "list_tasks".to_string(),
                description: "List tasks with a filter. Returns a numbered list for easy reference."
                    .to_string(),
                input_schema: ToolInputSchema::object(properties, &["filter"]),
                group: ToolGroup::Tasks,
            },
        }
    }
}

impl Default for ListTasksTool {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct ListTasksParams {
    filter: Option<String>,
}

/// One line of the numbered task list. `number` is the task's 1-based
/// position in the full collection, independent of its id, so it stays
/// stable across filters.
#[derive(Debug, Serialize)]
struct TaskSummary {
    number: usize,
    id: String,
    title: String,
    completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    due_date: Option<String>,
    priority: String,
}

#[derive(Debug, Serialize)]
struct ListTasksPayload {
    tasks: Vec<TaskSummary>,
    count: usize,
    message: String,
}

#[async_trait]
impl Tool for ListTasksTool {
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    async fn execute(&self, params: Value, context: &ToolContext) -> ToolResult {
        let params: ListTasksParams = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => return ToolResult::error(format!("Invalid parameters: {}", e)),
        };
        let filter = params.filter.as_deref().unwrap_or("all");

        let list = match context.storage.load_tasks() {
            Ok(list) => list,
            Err(e) => return ToolResult::error(e.to_string()),
        };

        let mut filtered = Vec::with_capacity(list.tasks.len());
        for (index, task) in list.tasks.iter().enumerate() {
            let include = match filter {
                "today" => {
                    crate::storage::is_today(task.due_date.as_deref())
                        || crate::storage::is_today_instant(&task.created_at)
                }
                "incomplete" => !task.completed,
                "completed" => task.completed,
                // "all" and anything unrecognized
                _ => true,
            };

            if include {
                filtered.push(TaskSummary {
                    number: index + 1,
                    id: task.id.clone(),
                    title: task.title.clone(),
                    completed: task.completed,
                    due_date: task.due_date.clone(),
                    priority: task.priority.to_string(),
                });
            }
        }

        let count = filtered.len();
        ToolResult::success_json(&ListTasksPayload {
            tasks: filtered,
            count,
            message: format!("Found {} tasks", count),
        })
        .with_metadata(json!({ "count": count, "filter": filter }))
    }
}

// ── complete_task ───────────────────────────────────

pub struct CompleteTaskTool {
    definition: ToolDefinition,
}

impl CompleteTaskTool {
    pub fn new() -> Self {
        let mut properties = HashMap::new();
        properties.insert("query".to_string(), query_property());

        CompleteTaskTool {
            definition: ToolDefinition {
                name: "complete_task".to_string(),
                description: "Mark a task as completed by id or title match".to_string(),
                input_schema: ToolInputSchema::object(properties, &["query"]),
                group: ToolGroup::Tasks,
            },
        }
    }
}

impl Default for CompleteTaskTool {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct TaskQueryParams {
    query: String,
}

#[derive(Debug, Serialize)]
struct TaskMutationPayload {
    success: bool,
    message: String,
}

#[async_trait]
impl Tool for CompleteTaskTool {
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    async fn execute(&self, params: Value, context: &ToolContext) -> ToolResult {
        let params: TaskQueryParams = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => return ToolResult::error(format!("Invalid parameters: {}", e)),
        };

        let mut list = match context.storage.load_tasks() {
            Ok(list) => list,
            Err(e) => return ToolResult::error(e.to_string()),
        };

        let Some((index, title)) = find_by_id_or_title(&list.tasks, &params.query) else {
            return ToolResult::error(format!("No task found matching '{}'", params.query));
        };

        // Idempotent: re-completing stays completed and still succeeds.
        list.tasks[index].completed = true;
        list.tasks[index].updated_at = Utc::now();

        if let Err(e) = context.storage.save_tasks(&list) {
            return ToolResult::error(e.to_string());
        }

        ToolResult::success_json(&TaskMutationPayload {
            success: true,
            message: format!("Task '{}' marked as completed", title),
        })
    }
}

// ── delete_task ─────────────────────────────────────

pub struct DeleteTaskTool {
    definition: ToolDefinition,
}

impl DeleteTaskTool {
    pub fn new() -> Self {
        let mut properties = HashMap::new();
        properties.insert("query".to_string(), query_property());

        DeleteTaskTool {
            definition: ToolDefinition {
                name: "delete_task".to_string(),
                description: "Delete a task by id or title match".to_string(),
                input_schema: ToolInputSchema::object(properties, &["query"]),
                group: ToolGroup::Tasks,
            },
        }
    }
}

impl Default for DeleteTaskTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for DeleteTaskTool {
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    async fn execute(&self, params: Value, context: &ToolContext) -> ToolResult {
        let params: TaskQueryParams = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => return ToolResult::error(format!("Invalid parameters: {}", e)),
        };

        let mut list = match context.storage.load_tasks() {
            Ok(list) => list,
            Err(e) => return ToolResult::error(e.to_string()),
        };

        let Some((index, title)) = find_by_id_or_title(&list.tasks, &params.query) else {
            return ToolResult::error(format!("No task found matching '{}'", params.query));
        };

        list.tasks.remove(index);

        if let Err(e) = context.storage.save_tasks(&list) {
            return ToolResult::error(e.to_string());
        }

        ToolResult::success_json(&TaskMutationPayload {
            success: true,
            message: format!("Task '{}' deleted", title),
        })
    }
}
