//! Data model for the task and note collections.
//!
//! Both collections are persisted as single pretty-printed JSON documents
//! with stable field names, so the files stay inspectable with ordinary
//! tooling. Insertion order is preserved and doubles as the display order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Task priority. Serialized lowercase in the data files and on the wire.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Parse a priority string from tool parameters.
    ///
    /// Unset, empty, or unrecognized values all collapse to `Medium` so the
    /// stored value is always one of the three variants.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("low") => Priority::Low,
            Some(s) if s.eq_ignore_ascii_case("high") => Priority::High,
            Some(s) if s.eq_ignore_ascii_case("medium") => Priority::Medium,
            Some(s) if !s.is_empty() => {
                log::debug!("unrecognized priority '{}', defaulting to medium", s);
                Priority::Medium
            }
            _ => Priority::Medium,
        }
    }
}

/// A todo item with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    /// Calendar date in YYYY-MM-DD form, no time component.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A free-text note with metadata. Notes are never edited in place; they are
/// only created, read, and deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The full on-disk task collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskList {
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// The full on-disk note collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NoteList {
    #[serde(default)]
    pub notes: Vec<Note>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_parse_defaults_to_medium() {
        assert_eq!(Priority::parse(None), Priority::Medium);
        assert_eq!(Priority::parse(Some("")), Priority::Medium);
        assert_eq!(Priority::parse(Some("  ")), Priority::Medium);
        assert_eq!(Priority::parse(Some("urgent")), Priority::Medium);
    }

    #[test]
    fn priority_parse_accepts_known_values() {
        assert_eq!(Priority::parse(Some("low")), Priority::Low);
        assert_eq!(Priority::parse(Some("High")), Priority::High);
        assert_eq!(Priority::parse(Some(" medium ")), Priority::Medium);
    }

    #[test]
    fn priority_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"high\"");
        assert_eq!(Priority::Low.to_string(), "low");
    }

    #[test]
    fn task_list_tolerates_missing_fields() {
        let list: TaskList = serde_json::from_str("{}").unwrap();
        assert!(list.tasks.is_empty());
    }
}
