//! Note tools: add, list, search, delete.
//!
//! List and search render notes as a numbered list with a content preview
//! truncated to a fixed length. Numbering is 1-based and gap-free over the
//! filtered set; unlike tasks, it does not reflect collection position.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;

use crate::models::Note;
use crate::storage::find_by_id_or_title;
use crate::tools::registry::Tool;
use crate::tools::types::{
    PropertySchema, ToolContext, ToolDefinition, ToolGroup, ToolInputSchema, ToolResult,
};

const PREVIEW_MAX_CHARS: usize = 100;

/// One line of a numbered note list.
#[derive(Debug, Serialize)]
struct NoteSummary {
    number: usize,
    id: String,
    title: String,
    preview: String,
    tags: Vec<String>,
}

impl NoteSummary {
    fn from_note(note: &Note, number: usize) -> Self {
        NoteSummary {
            number,
            id: note.id.clone(),
            title: note.title.clone(),
            preview: preview(&note.content),
            tags: note.tags.clone(),
        }
    }
}

/// First `PREVIEW_MAX_CHARS` characters with an ellipsis marker when
/// truncated. Counted in chars so multibyte content never splits.
fn preview(content: &str) -> String {
    if content.chars().count() > PREVIEW_MAX_CHARS {
        let truncated: String = content.chars().take(PREVIEW_MAX_CHARS).collect();
        format!("{}...", truncated)
    } else {
        content.to_string()
    }
}

#[derive(Debug, Serialize)]
struct NoteListPayload {
    notes: Vec<NoteSummary>,
    count: usize,
    message: String,
}

// ── add_note ────────────────────────────────────────

pub struct AddNoteTool {
    definition: ToolDefinition,
}

impl AddNoteTool {
    pub fn new() -> Self {
        let mut properties = HashMap::new();
        properties.insert("title".to_string(), PropertySchema::string("The note title"));
        properties.insert(
            "content".to_string(),
            PropertySchema::string("The note content"),
        );
        properties.insert(
            "tags".to_string(),
            PropertySchema::string_array("Optional tags for categorization"),
        );

        AddNoteTool {
            definition: ToolDefinition {
                name: "add_note".to_string(),
                description: "Create a new note with title, content, and optional tags"
                    .to_string(),
                input_schema: ToolInputSchema::object(properties, &["title", "content"]),
                group: ToolGroup::Notes,
            },
        }
    }
}

impl Default for AddNoteTool {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct AddNoteParams {
    title: String,
    content: String,
    tags: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct AddNotePayload {
    success: bool,
    message: String,
    note_id: String,
}

#[async_trait]
impl Tool for AddNoteTool {
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    async fn execute(&self, params: Value, context: &ToolContext) -> ToolResult {
        let params: AddNoteParams = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => return ToolResult::error(format!("Invalid parameters: {}", e)),
        };

        let note = match context
            .storage
            .add_note(&params.title, &params.content, params.tags)
        {
            Ok(note) => note,
            Err(e) => return ToolResult::error(e.to_string()),
        };

        ToolResult::success_json(&AddNotePayload {
            success: true,
            message: format!("Note '{}' created", note.title),
            note_id: note.id.clone(),
        })
        .with_metadata(json!({ "note_id": note.id }))
    }
}

// ── list_notes ──────────────────────────────────────

pub struct ListNotesTool {
    definition: ToolDefinition,
}

impl ListNotesTool {
    pub fn new() -> Self {
        let mut properties = HashMap::new();
        properties.insert(
            "filter".to_string(),
            PropertySchema::string_enum(
                "Filter: all, or today (created today)",
                &["all", "today"],
            )
            .with_default(json!("all")),
        );
        properties.insert(
            "tag".to_string(),
            PropertySchema::string("Optional tag to filter by (case-insensitive exact match)"),
        );

        ListNotesTool {
            definition: ToolDefinition {
                name: "list_notes".to_string(),
                description:
                    "List notes with an optional filter and tag. Returns a numbered list for easy reference."
                        .to_string(),
                input_schema: ToolInputSchema::object(properties, &["filter"]),
                group: ToolGroup::Notes,
            },
        }
    }
}

impl Default for ListNotesTool {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct ListNotesParams {
    filter: Option<String>,
    tag: Option<String>,
}

#[async_trait]
impl Tool for ListNotesTool {
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    async fn execute(&self, params: Value, context: &ToolContext) -> ToolResult {
        let params: ListNotesParams = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => return ToolResult::error(format!("Invalid parameters: {}", e)),
        };

        let list = match context.storage.load_notes() {
            Ok(list) => list,
            Err(e) => return ToolResult::error(e.to_string()),
        };

        let mut filtered = Vec::with_capacity(list.notes.len());
        for note in &list.notes {
            let mut include = true;

            if params.filter.as_deref() == Some("today") {
                include = crate::storage::is_today_instant(&note.created_at);
            }

            if include {
                if let Some(tag) = &params.tag {
                    // Unicode-aware folding, same as title/content matching.
                    let wanted = tag.to_lowercase();
                    include = note.tags.iter().any(|t| t.to_lowercase() == wanted);
                }
            }

            if include {
                filtered.push(NoteSummary::from_note(note, filtered.len() + 1));
            }
        }

        let count = filtered.len();
        ToolResult::success_json(&NoteListPayload {
            notes: filtered,
            count,
            message: format!("Found {} notes", count),
        })
        .with_metadata(json!({ "count": count }))
    }
}

// ── search_notes ────────────────────────────────────

pub struct SearchNotesTool {
    definition: ToolDefinition,
}

impl SearchNotesTool {
    pub fn new() -> Self {
        let mut properties = HashMap::new();
        properties.insert(
            "query".to_string(),
            PropertySchema::string("Search term to find in title or content"),
        );

        SearchNotesTool {
            definition: ToolDefinition {
                name: "search_notes".to_string(),
                description:
                    "Search notes by keyword in title or content. Returns a numbered list for easy reference."
                        .to_string(),
                input_schema: ToolInputSchema::object(properties, &["query"]),
                group: ToolGroup::Notes,
            },
        }
    }
}

impl Default for SearchNotesTool {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct SearchNotesParams {
    query: String,
}

#[async_trait]
impl Tool for SearchNotesTool {
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    async fn execute(&self, params: Value, context: &ToolContext) -> ToolResult {
        let params: SearchNotesParams = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => return ToolResult::error(format!("Invalid parameters: {}", e)),
        };

        let list = match context.storage.load_notes() {
            Ok(list) => list,
            Err(e) => return ToolResult::error(e.to_string()),
        };

        let query = params.query.to_lowercase();
        let mut filtered = Vec::new();
        for note in &list.notes {
            if note.title.to_lowercase().contains(&query)
                || note.content.to_lowercase().contains(&query)
            {
                filtered.push(NoteSummary::from_note(note, filtered.len() + 1));
            }
        }

        let count = filtered.len();
        ToolResult::success_json(&NoteListPayload {
            notes: filtered,
            count,
            message: format!("Found {} notes matching '{}'", count, params.query),
        })
        .with_metadata(json!({ "count": count, "query": params.query }))
    }
}

// ── delete_note ─────────────────────────────────────

pub struct DeleteNoteTool {
    definition: ToolDefinition,
}

impl DeleteNoteTool {
    pub fn new() -> Self {
        let mut properties = HashMap::new();
        properties.insert(
            "query".to_string(),
            PropertySchema::string("Note id (exact) or a title substring to match"),
        );

        DeleteNoteTool {
            definition: ToolDefinition {
                name: "delete_note".to_string(),
                description: "Delete a note by id or title match".to_string(),
                input_schema: ToolInputSchema::object(properties, &["query"]),
                group: ToolGroup::Notes,
            },
        }
    }
}

impl Default for DeleteNoteTool {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct DeleteNoteParams {
    query: String,
}

#[derive(Debug, Serialize)]
struct DeleteNotePayload {
    success: bool,
    message: String,
}

#[async_trait]
impl Tool for DeleteNoteTool {
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    async fn execute(&self, params: Value, context: &ToolContext) -> ToolResult {
        let params: DeleteNoteParams = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => return ToolResult::error(format!("Invalid parameters: {}", e)),
        };

        let mut list = match context.storage.load_notes() {
            Ok(list) => list,
            Err(e) => return ToolResult::error(e.to_string()),
        };

        let Some((index, title)) = find_by_id_or_title(&list.notes, &params.query) else {
            return ToolResult::error(format!("No note found matching '{}'", params.query));
        };

        list.notes.remove(index);

        if let Err(e) = context.storage.save_notes(&list) {
            return ToolResult::error(e.to_string());
        }

        ToolResult::success_json(&DeleteNotePayload {
            success: true,
            message: format!("Note '{}' deleted", title),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn test_context() -> (TempDir, ToolContext) {
        let dir = TempDir::new().unwrap();
        let storage = Arc::new(Storage::new(dir.path()).unwrap());
        (dir, ToolContext::new(storage))
    }

    fn parse_output(result: &ToolResult) -> Value {
        serde_json::from_str(result.output.as_deref().unwrap()).unwrap()
    }

    #[test]
    fn preview_truncates_long_content_with_ellipsis() {
        let short = "short note";
        assert_eq!(preview(short), short);

        let long = "x".repeat(250);
        let p = preview(&long);
        assert_eq!(p.chars().count(), PREVIEW_MAX_CHARS + 3);
        assert!(p.ends_with("..."));
    }

    #[test]
    fn preview_counts_chars_not_bytes() {
        let long = "é".repeat(150);
        let p = preview(&long);
        assert!(p.ends_with("..."));
        assert_eq!(p.chars().count(), PREVIEW_MAX_CHARS + 3);
    }

    #[tokio::test]
    async fn add_note_returns_id_and_persists() {
        let (_dir, context) = test_context();
        let result = AddNoteTool::new()
            .execute(
                json!({ "title": "API Auth", "content": "uses OAuth 2.0", "tags": ["api"] }),
                &context,
            )
            .await;
        assert!(result.success);

        let payload = parse_output(&result);
        assert!(payload["message"].as_str().unwrap().contains("API Auth"));
        assert!(!payload["note_id"].as_str().unwrap().is_empty());

        let stored = context.storage.load_notes().unwrap();
        assert_eq!(stored.notes.len(), 1);
        assert_eq!(stored.notes[0].tags, vec!["api"]);
    }

    #[tokio::test]
    async fn list_notes_tag_filter_is_case_insensitive_exact() {
        let (_dir, context) = test_context();
        context
            .storage
            .add_note("a", "", Some(vec!["Work".to_string()]))
            .unwrap();
        context
            .storage
            .add_note("b", "", Some(vec!["workshop".to_string()]))
            .unwrap();

        let result = ListNotesTool::new()
            .execute(json!({ "filter": "all", "tag": "work" }), &context)
            .await;
        let payload = parse_output(&result);
        assert_eq!(payload["count"], 1);
        assert_eq!(payload["notes"][0]["title"], "a");
    }

    #[tokio::test]
    async fn list_notes_tag_filter_folds_non_ascii_case() {
        let (_dir, context) = test_context();
        context
            .storage
            .add_note("menu", "", Some(vec!["CAFÉ".to_string()]))
            .unwrap();
        context
            .storage
            .add_note("other", "", Some(vec!["cafe".to_string()]))
            .unwrap();

        let result = ListNotesTool::new()
            .execute(json!({ "filter": "all", "tag": "café" }), &context)
            .await;
        let payload = parse_output(&result);
        assert_eq!(payload["count"], 1);
        assert_eq!(payload["notes"][0]["title"], "menu");
    }

    #[tokio::test]
    async fn list_notes_numbering_is_gap_free_over_filtered_set() {
        let (_dir, context) = test_context();
        context.storage.add_note("plain", "", None).unwrap();
        context
            .storage
            .add_note("tagged one", "", Some(vec!["x".to_string()]))
            .unwrap();
        context
            .storage
            .add_note("tagged two", "", Some(vec!["x".to_string()]))
            .unwrap();

        let result = ListNotesTool::new()
            .execute(json!({ "filter": "all", "tag": "x" }), &context)
            .await;
        let payload = parse_output(&result);
        let numbers: Vec<u64> = payload["notes"]
            .as_array()
            .unwrap()
            .iter()
            .map(|n| n["number"].as_u64().unwrap())
            .collect();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[tokio::test]
    async fn search_notes_matches_title_or_content_case_insensitively() {
        let (_dir, context) = test_context();
        context.storage.add_note("API design", "", None).unwrap();
        context
            .storage
            .add_note("misc", "the api uses OAuth", None)
            .unwrap();
        context.storage.add_note("groceries", "milk", None).unwrap();

        let result = SearchNotesTool::new()
            .execute(json!({ "query": "API" }), &context)
            .await;
        let payload = parse_output(&result);
        assert_eq!(payload["count"], 2);
        assert!(payload["message"].as_str().unwrap().contains("matching 'API'"));
    }

    #[tokio::test]
    async fn delete_note_by_exact_id() {
        let (_dir, context) = test_context();
        context.storage.add_note("keep", "", None).unwrap();
        let target = context.storage.add_note("remove", "", None).unwrap();

        let result = DeleteNoteTool::new()
            .execute(json!({ "query": target.id }), &context)
            .await;
        assert!(result.success);

        let remaining = context.storage.load_notes().unwrap();
        assert_eq!(remaining.notes.len(), 1);
        assert_eq!(remaining.notes[0].title, "keep");
    }

    #[tokio::test]
    async fn delete_note_not_found_is_structured_failure() {
        let (_dir, context) = test_context();
        let result = DeleteNoteTool::new()
            .execute(json!({ "query": "ghost" }), &context)
            .await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("No note found matching 'ghost'"));
    }
}
