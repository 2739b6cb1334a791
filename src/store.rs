// WHY: persistence for user-entered practice texts
// The registry keeps every saved text as one JSON array under a single key of a
// key-value store, so any backend that can hold strings can hold the collection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::StoreError;

/// Key under which the registry keeps its collection
pub const SAVED_TEXTS_KEY: &str = "dictation_saved_texts";

/// String-keyed string storage
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn list(&self) -> Result<Vec<String>, StoreError>;
    /// Returns whether the key existed
    fn delete(&mut self, key: &str) -> Result<bool, StoreError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.entries.keys().cloned().collect())
    }

    fn delete(&mut self, key: &str) -> Result<bool, StoreError> {
        Ok(self.entries.remove(key).is_some())
    }
}

/// All keys in one pretty-printed JSON object file
///
/// A missing file reads as empty; it is created on the first write.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => serde_json::from_str(&content)
                .map_err(|e| StoreError::json("parsing the store file", e)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(StoreError::io("reading the store file", e)),
        }
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(entries)
            .map_err(|e| StoreError::json("serializing the store", e))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::io("creating the store directory", e))?;
        }
        std::fs::write(&self.path, content).map_err(|e| StoreError::io("writing the store file", e))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn list(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.read_all()?.into_keys().collect())
    }

    fn delete(&mut self, key: &str) -> Result<bool, StoreError> {
        let mut entries = self.read_all()?;
        let existed = entries.remove(key).is_some();
        if existed {
            self.write_all(&entries)?;
        }
        Ok(existed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedText {
    pub id: String,
    pub title: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

/// Saved practice texts on top of a [`KeyValueStore`]
#[derive(Debug)]
pub struct SavedTextRegistry<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> SavedTextRegistry<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    fn read_raw(&self) -> Result<Option<Result<Vec<SavedText>, serde_json::Error>>, StoreError> {
        Ok(self.store.get(SAVED_TEXTS_KEY)?.map(|raw| serde_json::from_str(&raw)))
    }

    /// Collection to modify; an unreadable one is an error rather than empty
    fn read_strict(&self) -> Result<Vec<SavedText>, StoreError> {
        match self.read_raw()? {
            Some(parsed) => parsed.map_err(|e| StoreError::json("parsing saved texts", e)),
            None => Ok(Vec::new()),
        }
    }

    fn read(&self) -> Result<Vec<SavedText>, StoreError> {
        match self.read_raw()? {
            Some(Ok(texts)) => Ok(texts),
            Some(Err(e)) => {
                warn!(error = %e, "Saved texts are unreadable, treating the collection as empty");
                Ok(Vec::new())
            }
            None => Ok(Vec::new()),
        }
    }

    fn write(&mut self, texts: &[SavedText]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(texts)
            .map_err(|e| StoreError::json("serializing saved texts", e))?;
        self.store.set(SAVED_TEXTS_KEY, &raw)
    }

    /// Insert or update a text
    ///
    /// Without `id` a fresh one is generated. Updating keeps the original
    /// `created_at`. A missing or blank title becomes `Untitled <date>`.
    /// An unreadable stored collection is an error here; it is never overwritten.
    pub fn save(
        &mut self,
        text: &str,
        title: Option<&str>,
        id: Option<&str>,
    ) -> Result<SavedText, StoreError> {
        let mut texts = self.read_strict()?;
        let now = Utc::now();

        let id = match id {
            Some(id) => id.to_string(),
            None => fresh_id(&texts, now),
        };
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Untitled {}", now.format("%Y-%m-%d")));
        let created_at = texts
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.created_at)
            .unwrap_or(now);

        let saved = SavedText {
            id: id.clone(),
            title,
            text: text.to_string(),
            created_at,
            last_modified: now,
        };

        match texts.iter_mut().find(|t| t.id == id) {
            Some(existing) => *existing = saved.clone(),
            None => texts.push(saved.clone()),
        }
        self.write(&texts)?;
        debug!(id = %saved.id, "Saved text");
        Ok(saved)
    }

    pub fn load(&self, id: &str) -> Result<Option<SavedText>, StoreError> {
        Ok(self.read()?.into_iter().find(|t| t.id == id))
    }

    /// Newest first by `last_modified`
    pub fn list(&self) -> Result<Vec<SavedText>, StoreError> {
        let mut texts = self.read()?;
        texts.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
        Ok(texts)
    }

    pub fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        let mut texts = self.read_strict()?;
        let before = texts.len();
        texts.retain(|t| t.id != id);
        if texts.len() == before {
            return Ok(false);
        }
        self.write(&texts)?;
        Ok(true)
    }
}

fn fresh_id(existing: &[SavedText], now: DateTime<Utc>) -> String {
    let base = format!("text-{:x}", now.timestamp_micros());
    let mut candidate = base.clone();
    let mut suffix = 1;
    while existing.iter().any(|t| t.id == candidate) {
        candidate = format!("{base}-{suffix}");
        suffix += 1;
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store_operations() {
        let mut store = MemoryStore::new();
        store.set("b", "2").unwrap();
        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        assert_eq!(store.list().unwrap(), vec!["a", "b"]);
        assert!(store.delete("a").unwrap());
        assert!(!store.delete("a").unwrap());
    }

    #[test]
    fn test_json_file_store_persists() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("nested").join("texts.json");

        let mut store = JsonFileStore::new(&path);
        assert_eq!(store.get("missing").unwrap(), None);
        store.set("greeting", "hello").unwrap();

        let reopened = JsonFileStore::new(&path);
        assert_eq!(reopened.get("greeting").unwrap().as_deref(), Some("hello"));
    }

    #[test]
    fn test_json_file_store_rejects_corrupt_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("texts.json");
        std::fs::write(&path, "not json").unwrap();
        let store = JsonFileStore::new(&path);
        assert!(matches!(store.get("x"), Err(StoreError::Json { .. })));
    }

    #[test]
    fn test_registry_save_update_keeps_created_at() {
        let mut registry = SavedTextRegistry::new(MemoryStore::new());
        let first = registry.save("One. Two.", Some("Lesson"), None).unwrap();
        assert_eq!(first.created_at, first.last_modified);

        let updated = registry.save("One. Two. Three.", Some("Lesson"), Some(first.id.as_str())).unwrap();
        assert_eq!(updated.id, first.id);
        assert_eq!(updated.created_at, first.created_at);
        assert!(updated.last_modified >= first.last_modified);
        assert_eq!(registry.list().unwrap().len(), 1);
        assert_eq!(registry.load(&first.id).unwrap().unwrap().text, "One. Two. Three.");
    }

    #[test]
    fn test_registry_default_title_and_delete() {
        let mut registry = SavedTextRegistry::new(MemoryStore::new());
        let saved = registry.save("Hello.", Some("  "), None).unwrap();
        assert!(saved.title.starts_with("Untitled "));

        assert!(registry.delete(&saved.id).unwrap());
        assert!(!registry.delete(&saved.id).unwrap());
        assert_eq!(registry.load(&saved.id).unwrap(), None);
    }

    #[test]
    fn test_registry_ids_unique() {
        let mut registry = SavedTextRegistry::new(MemoryStore::new());
        let a = registry.save("A.", None, None).unwrap();
        let b = registry.save("B.", None, None).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_registry_unreadable_collection_is_empty() {
        let mut store = MemoryStore::new();
        store.set(SAVED_TEXTS_KEY, "{broken").unwrap();
        let registry = SavedTextRegistry::new(store);
        assert!(registry.list().unwrap().is_empty());
    }

    #[test]
    fn test_registry_never_overwrites_unreadable_collection() {
        let mut store = MemoryStore::new();
        store.set(SAVED_TEXTS_KEY, "{broken").unwrap();
        let mut registry = SavedTextRegistry::new(store);

        assert!(matches!(
            registry.save("New text.", None, None),
            Err(StoreError::Json { .. })
        ));
        assert!(matches!(registry.delete("any"), Err(StoreError::Json { .. })));
        let store = registry.into_inner();
        assert_eq!(store.get(SAVED_TEXTS_KEY).unwrap().as_deref(), Some("{broken"));
    }
}
