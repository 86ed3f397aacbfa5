use crate::errors::{AppError, AppResult};
use crate::models::Document;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Whole-document persistence.
///
/// There is no locking or versioning between `load` and `save`: two callers
/// that interleave load/mutate/save cycles get last-write-wins.
pub trait DocumentStore: Send + Sync {
    fn load(&self) -> AppResult<Document>;
    fn save(&self, document: &Document) -> AppResult<()>;
}

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DocumentStore for JsonFileStore {
    fn load(&self) -> AppResult<Document> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(Document::default()),
            Err(error) => {
                return Err(AppError::Persistence(format!(
                    "read {}: {}",
                    self.path.display(),
                    error
                )))
            }
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Document::default());
        }
        serde_json::from_slice(&bytes).map_err(|error| {
            AppError::Persistence(format!("parse {}: {}", self.path.display(), error))
        })
    }

    fn save(&self, document: &Document) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|error| AppError::Persistence(error.to_string()))?;
            }
        }
        let bytes = serde_json::to_vec_pretty(document)?;
        fs::write(&self.path, bytes).map_err(|error| {
            AppError::Persistence(format!("write {}: {}", self.path.display(), error))
        })
    }
}

/// In-process store, mostly for tests. Counts successful saves.
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: Mutex<Document>,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(document: Document) -> Self {
        Self {
            document: Mutex::new(document),
            saves: AtomicUsize::new(0),
        }
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl DocumentStore for MemoryStore {
    fn load(&self) -> AppResult<Document> {
        let document = self
            .document
            .lock()
            .map_err(|_| AppError::Internal("document mutex poisoned".to_string()))?;
        Ok(document.clone())
    }

    fn save(&self, document: &Document) -> AppResult<()> {
        let mut current = self
            .document
            .lock()
            .map_err(|_| AppError::Internal("document mutex poisoned".to_string()))?;
        *current = document.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{DocumentStore, JsonFileStore, MemoryStore};
    use crate::errors::AppError;
    use crate::keys::{ScheduleKey, ScheduleVariant, YearMonth};
    use crate::models::{Document, ScheduleRow};

    #[test]
    fn missing_file_loads_empty_document() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonFileStore::new(&dir.path().join("db.json"));
        let document = store.load().expect("load");
        assert_eq!(document, Document::default());
    }

    #[test]
    fn save_creates_parent_and_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonFileStore::new(&dir.path().join("nested").join("db.json"));

        let mut document = Document::default();
        let key = ScheduleKey::roster(YearMonth::from_code(202503), ScheduleVariant::Draft);
        document.schedules.insert(key.clone(), vec![ScheduleRow(serde_json::json!({"mat": "42"}))]);
        store.save(&document).expect("save");

        let raw = std::fs::read_to_string(store.path()).expect("read raw");
        assert!(raw.contains("\"escala_vigilantes_202503_draft\""));
        assert!(raw.contains("\"users\""));
        assert_eq!(store.load().expect("load"), document);
    }

    #[test]
    fn malformed_file_is_a_persistence_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("db.json");
        std::fs::write(&path, "{ not json").expect("write");
        let store = JsonFileStore::new(&path);
        assert!(matches!(store.load(), Err(AppError::Persistence(_))));
    }

    #[test]
    fn memory_store_counts_saves() {
        let store = MemoryStore::new();
        assert_eq!(store.save_count(), 0);
        store.save(&Document::default()).expect("save");
        store.save(&Document::default()).expect("save");
        assert_eq!(store.save_count(), 2);
    }
}
