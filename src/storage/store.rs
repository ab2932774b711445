//! Storage — file-backed task and note collections
//!
//! Each collection lives in a single JSON document that is read fully,
//! mutated in memory, and written fully. There is no partial update and no
//! cross-process locking; concurrent external writers race last-writer-wins.

use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::config::defaults;
use crate::error::StorageError;
use crate::models::{Note, NoteList, Priority, Task, TaskList};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// File-backed store for the task and note collections.
///
/// The base path is injected by the caller; production wiring passes
/// `config::config_dir()` and tests pass a temp directory.
pub struct Storage {
    base_path: PathBuf,
}

impl Storage {
    /// Create a store rooted at `base_path`, creating the directory if needed.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let base_path = base_path.into();
        std::fs::create_dir_all(&base_path).map_err(|source| StorageError::Io {
            path: base_path.clone(),
            source,
        })?;
        Ok(Storage { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn tasks_path(&self) -> PathBuf {
        self.base_path.join(defaults::TASKS_FILE)
    }

    pub fn notes_path(&self) -> PathBuf {
        self.base_path.join(defaults::NOTES_FILE)
    }

    /// Seed empty collection documents for any that do not exist yet.
    /// Idempotent: existing files are left untouched.
    pub fn initialize(&self) -> Result<(), StorageError> {
        if !self.tasks_path().exists() {
            self.save_tasks(&TaskList::default())?;
        }
        if !self.notes_path().exists() {
            self.save_notes(&NoteList::default())?;
        }
        Ok(())
    }

    /// Load the full task collection. A missing file is first-run state and
    /// yields an empty collection; a file that exists but does not parse is a
    /// hard `Corrupt` failure.
    pub fn load_tasks(&self) -> Result<TaskList, StorageError> {
        load_document(&self.tasks_path())
    }

    pub fn save_tasks(&self, tasks: &TaskList) -> Result<(), StorageError> {
        save_document(&self.tasks_path(), tasks)
    }

    pub fn load_notes(&self) -> Result<NoteList, StorageError> {
        load_document(&self.notes_path())
    }

    pub fn save_notes(&self, notes: &NoteList) -> Result<(), StorageError> {
        save_document(&self.notes_path(), notes)
    }

    /// Create a task and persist it. Priority defaults to medium, tags to an
    /// empty set. Titles are stored as given; empty titles are accepted.
    pub fn add_task(
        &self,
        title: &str,
        due_date: Option<String>,
        priority: Option<&str>,
        tags: Option<Vec<String>>,
    ) -> Result<Task, StorageError> {
        let mut list = self.load_tasks()?;

        let now = Utc::now();
        let task = Task {
            id: generate_id(),
            title: title.to_string(),
            completed: false,
            due_date,
            priority: Priority::parse(priority),
            tags: tags.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };

        list.tasks.push(task.clone());
        self.save_tasks(&list)?;
        Ok(task)
    }

    /// Create a note and persist it. Title and content may be empty strings.
    pub fn add_note(
        &self,
        title: &str,
        content: &str,
        tags: Option<Vec<String>>,
    ) -> Result<Note, StorageError> {
        let mut list = self.load_notes()?;

        let now = Utc::now();
        let note = Note {
            id: generate_id(),
            title: title.to_string(),
            content: content.to_string(),
            tags: tags.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };

        list.notes.push(note.clone());
        self.save_notes(&list)?;
        Ok(note)
    }
}

fn load_document<T: DeserializeOwned + Default>(path: &Path) -> Result<T, StorageError> {
    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
        Err(source) => {
            return Err(StorageError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    serde_json::from_slice(&data).map_err(|source| StorageError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

/// Whole-file replace with pretty-printed JSON. A torn write under a crash is
/// an accepted residual risk.
fn save_document<T: Serialize>(path: &Path, document: &T) -> Result<(), StorageError> {
    let data = serde_json::to_vec_pretty(document).map_err(|source| StorageError::Corrupt {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, data).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Generate a globally unique, creation-time-ordered identifier (UUIDv7).
/// Identifiers double as a rough creation-order signal even if collection
/// order is later disturbed.
pub fn generate_id() -> String {
    Uuid::now_v7().to_string()
}

/// An entry addressable by the shared resolution algorithm.
pub trait NamedEntry {
    fn entry_id(&self) -> &str;
    fn entry_title(&self) -> &str;
}

impl NamedEntry for Task {
    fn entry_id(&self) -> &str {
        &self.id
    }
    fn entry_title(&self) -> &str {
        &self.title
    }
}

impl NamedEntry for Note {
    fn entry_id(&self) -> &str {
        &self.id
    }
    fn entry_title(&self) -> &str {
        &self.title
    }
}

/// Resolve a user query against a collection: a single sequential scan in
/// stored order, matching on verbatim id equality OR case-insensitive title
/// substring. The first match in stored order wins, so ties resolve to the
/// earliest-created entry. Deliberately not a two-pass ids-then-titles
/// lookup: an earlier title match beats a later exact-id match.
///
/// Returns the matched entry's index and title.
pub fn find_by_id_or_title<T: NamedEntry>(entries: &[T], query: &str) -> Option<(usize, String)> {
    let query_lower = query.to_lowercase();
    for (index, entry) in entries.iter().enumerate() {
        if entry.entry_id() == query
            || entry.entry_title().to_lowercase().contains(&query_lower)
        {
            return Some((index, entry.entry_title().to_string()));
        }
    }
    None
}

/// Today's calendar date as YYYY-MM-DD.
pub fn today_string() -> String {
    Local::now().format(DATE_FORMAT).to_string()
}

/// Whether a YYYY-MM-DD date string is today's date.
pub fn is_today(date: Option<&str>) -> bool {
    date.is_some_and(|d| d == today_string())
}

/// Whether a timestamp falls on today's local calendar date.
pub fn is_today_instant(instant: &DateTime<Utc>) -> bool {
    instant.with_timezone(&Local).date_naive() == Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_storage() -> (TempDir, Storage) {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path()).unwrap();
        (dir, storage)
    }

    #[test]
    fn load_missing_file_yields_empty_collection() {
        let (_dir, storage) = test_storage();
        assert!(storage.load_tasks().unwrap().tasks.is_empty());
        assert!(storage.load_notes().unwrap().notes.is_empty());
    }

    #[test]
    fn load_corrupt_file_is_a_hard_failure() {
        let (_dir, storage) = test_storage();
        std::fs::write(storage.tasks_path(), "{not json").unwrap();

        match storage.load_tasks() {
            Err(StorageError::Corrupt { path, .. }) => assert_eq!(path, storage.tasks_path()),
            other => panic!("expected Corrupt error, got {:?}", other.map(|l| l.tasks.len())),
        }
    }

    #[test]
    fn save_then_load_round_trips_content_and_order() {
        let (_dir, storage) = test_storage();
        storage.add_task("first", None, None, None).unwrap();
        storage.add_task("second", Some("2030-01-01".into()), Some("high"), None).unwrap();
        storage.add_task("third", None, Some("low"), Some(vec!["a".into()])).unwrap();

        let loaded = storage.load_tasks().unwrap();
        let titles: Vec<&str> = loaded.tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["first", "second", "third"]);
        assert_eq!(loaded.tasks[1].priority, Priority::High);
        assert_eq!(loaded.tasks[1].due_date.as_deref(), Some("2030-01-01"));
        assert_eq!(loaded.tasks[2].tags, vec!["a"]);
    }

    #[test]
    fn add_task_defaults_priority_and_tags() {
        let (_dir, storage) = test_storage();
        let before = Utc::now();
        let task = storage.add_task("title", None, Some(""), None).unwrap();
        let after = Utc::now();

        assert_eq!(task.priority, Priority::Medium);
        assert!(task.tags.is_empty());
        assert!(!task.completed);
        assert!(!task.id.is_empty());
        assert!(task.created_at >= before && task.created_at <= after);
        assert_eq!(task.created_at, task.updated_at);
    }

    #[test]
    fn add_note_defaults_tags_and_accepts_empty_fields() {
        let (_dir, storage) = test_storage();
        let note = storage.add_note("", "", None).unwrap();
        assert!(note.tags.is_empty());
        assert!(note.title.is_empty());
        assert!(note.content.is_empty());
        assert!(!note.id.is_empty());
    }

    #[test]
    fn generated_ids_are_unique_and_creation_ordered() {
        let (_dir, storage) = test_storage();
        let a = storage.add_task("a", None, None, None).unwrap();
        let b = storage.add_task("b", None, None, None).unwrap();
        assert_ne!(a.id, b.id);
        // UUIDv7 sorts by creation time
        assert!(a.id < b.id);
    }

    #[test]
    fn initialize_seeds_files_without_overwriting() {
        let (_dir, storage) = test_storage();
        storage.initialize().unwrap();
        assert!(storage.tasks_path().exists());
        assert!(storage.notes_path().exists());

        storage.add_task("keep me", None, None, None).unwrap();
        storage.initialize().unwrap();
        assert_eq!(storage.load_tasks().unwrap().tasks.len(), 1);
    }

    #[test]
    fn resolution_first_match_in_stored_order_wins() {
        let (_dir, storage) = test_storage();
        let first = storage.add_task("fix login bug", None, None, None).unwrap();
        storage.add_task("fix bug report", None, None, None).unwrap();

        let list = storage.load_tasks().unwrap();
        let (index, title) =
            find_by_id_or_title(&list.tasks, "bug").unwrap();
        assert_eq!(index, 0);
        assert_eq!(title, "fix login bug");
        assert_eq!(list.tasks[index].id, first.id);
    }

    #[test]
    fn earlier_title_match_beats_later_exact_id() {
        let (_dir, storage) = test_storage();
        storage.add_task("find the bug in b", None, None, None).unwrap();
        let second = storage.add_task("unrelated", None, None, None).unwrap();

        // Query equal to the second entry's id, but the first entry's title
        // contains that id's text only if we contrive it; instead query with
        // the exact id and a title that substring-matches it.
        let mut list = storage.load_tasks().unwrap();
        list.tasks[0].title = format!("mentions {}", second.id);
        storage.save_tasks(&list).unwrap();

        let list = storage.load_tasks().unwrap();
        let (index, _) =
            find_by_id_or_title(&list.tasks, &second.id).unwrap();
        assert_eq!(index, 0, "sequential scan must not give exact-id an earlier pass");
    }

    #[test]
    fn resolution_id_match_is_case_sensitive_title_match_is_not() {
        let (_dir, storage) = test_storage();
        let task = storage.add_task("Deploy API", None, None, None).unwrap();
        let list = storage.load_tasks().unwrap();

        assert!(find_by_id_or_title(&list.tasks, "deploy api").is_some());
        assert!(
            find_by_id_or_title(&list.tasks, &task.id.to_uppercase()).is_none()
        );
    }

    #[test]
    fn resolution_not_found_returns_none() {
        let (_dir, storage) = test_storage();
        storage.add_task("something", None, None, None).unwrap();
        let list = storage.load_tasks().unwrap();
        assert!(find_by_id_or_title(&list.tasks, "nope").is_none());
    }

    #[test]
    fn today_helpers() {
        assert!(is_today(Some(&today_string())));
        assert!(!is_today(Some("1999-01-01")));
        assert!(!is_today(None));
        assert!(is_today_instant(&Utc::now()));
        assert!(!is_today_instant(
            &(Utc::now() - chrono::Duration::days(2))
        ));
    }
}
