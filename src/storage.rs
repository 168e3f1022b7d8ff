use crate::models::JournalEntry;
use once_cell::sync::Lazy;
use regex::Regex;
use std::{
    collections::BTreeMap,
    fs, io,
    path::PathBuf,
};
use thiserror::Error;
use tracing::{error, info};

static DATE_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

/// Entry keys share the backend with anything else stored there; only keys of
/// this shape belong to the journal.
pub fn is_date_key(key: &str) -> bool {
    DATE_KEY.is_match(key)
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] io::Error),
    #[error("failed to serialize storage: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("stored value for {key} is unreadable: {reason}")]
    Corrupt { key: String, reason: String },
    #[error("storage quota exceeded: {needed} bytes needed, {quota} available")]
    QuotaExceeded { needed: usize, quota: usize },
}

/// String-keyed, string-valued durable storage with single-key atomicity.
pub trait KeyValueStore: Send {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&mut self, key: &str, value: String) -> Result<(), StorageError>;
    /// Returns whether the key was present.
    fn remove_item(&mut self, key: &str) -> Result<bool, StorageError>;
    fn keys(&self) -> Vec<String>;
}

fn usage(items: &BTreeMap<String, String>) -> usize {
    items.iter().map(|(k, v)| k.len() + v.len()).sum()
}

fn check_quota(
    items: &BTreeMap<String, String>,
    key: &str,
    value: &str,
    quota: Option<usize>,
) -> Result<(), StorageError> {
    let Some(quota) = quota else {
        return Ok(());
    };
    let existing = items.get(key).map_or(0, |old| key.len() + old.len());
    let needed = usage(items) - existing + key.len() + value.len();
    if needed > quota {
        return Err(StorageError::QuotaExceeded { needed, quota });
    }
    Ok(())
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    items: BTreeMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            items: BTreeMap::new(),
            quota: Some(quota),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        check_quota(&self.items, key, &value, self.quota)?;
        self.items.insert(key.to_string(), value);
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<bool, StorageError> {
        Ok(self.items.remove(key).is_some())
    }

    fn keys(&self) -> Vec<String> {
        self.items.keys().cloned().collect()
    }
}

/// A JSON object on disk, held in memory and rewritten on every mutation.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    items: BTreeMap<String, String>,
    quota: Option<usize>,
}

impl FileStore {
    /// A missing file is an empty store. An unparseable one is an error so it
    /// never gets overwritten by the next write.
    pub fn open(path: impl Into<PathBuf>, quota: Option<usize>) -> Result<Self, StorageError> {
        let path = path.into();
        let items: BTreeMap<String, String> = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|err| {
                error!("failed to parse data file {}: {err}", path.display());
                StorageError::Corrupt {
                    key: path.display().to_string(),
                    reason: err.to_string(),
                }
            })?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                error!("failed to read data file {}: {err}", path.display());
                return Err(err.into());
            }
        };
        info!("opened {} with {} keys", path.display(), items.len());
        Ok(Self { path, items, quota })
    }

    fn persist(&self, items: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let payload = serde_json::to_vec_pretty(items)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, payload)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        check_quota(&self.items, key, &value, self.quota)?;
        let mut next = self.items.clone();
        next.insert(key.to_string(), value);
        self.persist(&next)?;
        self.items = next;
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<bool, StorageError> {
        if !self.items.contains_key(key) {
            return Ok(false);
        }
        let mut next = self.items.clone();
        next.remove(key);
        self.persist(&next)?;
        self.items = next;
        Ok(true)
    }

    fn keys(&self) -> Vec<String> {
        self.items.keys().cloned().collect()
    }
}

/// Journal entries keyed by `YYYY-MM-DD`, serialized as JSON strings.
pub struct EntryStore {
    backend: Box<dyn KeyValueStore>,
}

impl EntryStore {
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    pub fn contains(&self, date: &str) -> bool {
        self.backend.get_item(date).is_some()
    }

    pub fn get(&self, date: &str) -> Result<Option<JournalEntry>, StorageError> {
        let Some(raw) = self.backend.get_item(date) else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|err| StorageError::Corrupt {
                key: date.to_string(),
                reason: err.to_string(),
            })
    }

    /// Overwrites whatever is stored under `date`.
    pub fn put(&mut self, date: &str, entry: &JournalEntry) -> Result<(), StorageError> {
        let raw = serde_json::to_string(entry)?;
        self.backend.set_item(date, raw)
    }

    pub fn delete(&mut self, date: &str) -> Result<bool, StorageError> {
        self.backend.remove_item(date)
    }

    /// Date keys in backend enumeration order.
    pub fn keys(&self) -> Vec<String> {
        self.backend
            .keys()
            .into_iter()
            .filter(|key| is_date_key(key))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(photo: &str, note: &str) -> JournalEntry {
        JournalEntry {
            photo: photo.to_string(),
            note: note.to_string(),
        }
    }

    #[test]
    fn put_then_get_returns_same_entry() {
        let mut store = EntryStore::in_memory();
        let original = entry("data:image/jpeg;base64,AAAA", "grateful for coffee");
        store.put("2024-01-01", &original).unwrap();
        assert_eq!(store.get("2024-01-01").unwrap(), Some(original));
        assert_eq!(store.get("2024-01-02").unwrap(), None);
    }

    #[test]
    fn put_overwrites_existing_date() {
        let mut store = EntryStore::in_memory();
        store.put("2024-01-01", &entry("a", "first")).unwrap();
        store.put("2024-01-01", &entry("b", "second")).unwrap();
        assert_eq!(store.get("2024-01-01").unwrap().unwrap().note, "second");
        assert_eq!(store.keys(), vec!["2024-01-01".to_string()]);
    }

    #[test]
    fn delete_removes_only_that_key() {
        let mut store = EntryStore::in_memory();
        store.put("2024-01-01", &entry("a", "")).unwrap();
        store.put("2024-01-02", &entry("b", "")).unwrap();

        assert!(store.delete("2024-01-01").unwrap());
        assert!(!store.delete("2024-01-01").unwrap());
        assert_eq!(store.keys(), vec!["2024-01-02".to_string()]);
        assert!(store.contains("2024-01-02"));
    }

    #[test]
    fn keys_skip_foreign_entries() {
        let mut backend = MemoryStore::new();
        backend.set_item("theme", "dark".to_string()).unwrap();
        backend.set_item("2024-1-1", "{}".to_string()).unwrap();
        let mut store = EntryStore::new(backend);
        store.put("2024-01-03", &entry("c", "")).unwrap();
        assert_eq!(store.keys(), vec!["2024-01-03".to_string()]);
    }

    #[test]
    fn corrupt_value_is_an_error() {
        let mut backend = MemoryStore::new();
        backend.set_item("2024-01-01", "not json".to_string()).unwrap();
        let store = EntryStore::new(backend);
        assert!(store.contains("2024-01-01"));
        assert!(matches!(
            store.get("2024-01-01"),
            Err(StorageError::Corrupt { .. })
        ));
    }

    #[test]
    fn missing_note_field_reads_as_empty() {
        let mut backend = MemoryStore::new();
        backend
            .set_item("2024-01-01", r#"{"photo":"p"}"#.to_string())
            .unwrap();
        let store = EntryStore::new(backend);
        assert_eq!(store.get("2024-01-01").unwrap().unwrap().note, "");
    }

    #[test]
    fn quota_rejects_oversized_write_and_keeps_state() {
        let mut store = EntryStore::new(MemoryStore::with_quota(64));
        store.put("2024-01-01", &entry("small", "")).unwrap();
        let big = "x".repeat(128);
        let err = store.put("2024-01-02", &entry(&big, "")).unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { .. }));
        assert_eq!(store.keys(), vec!["2024-01-01".to_string()]);
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("journal.json");

        let mut store = EntryStore::new(FileStore::open(&path, None).unwrap());
        store.put("2024-01-01", &entry("a", "one")).unwrap();
        store.put("2024-01-02", &entry("b", "two")).unwrap();
        store.delete("2024-01-02").unwrap();
        drop(store);

        let reopened = EntryStore::new(FileStore::open(&path, None).unwrap());
        assert_eq!(reopened.keys(), vec!["2024-01-01".to_string()]);
        assert_eq!(reopened.get("2024-01-01").unwrap().unwrap().note, "one");
    }

    #[test]
    fn file_store_refuses_unparseable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.json");
        fs::write(&path, b"{ broken").unwrap();
        assert!(matches!(
            FileStore::open(&path, None),
            Err(StorageError::Corrupt { .. })
        ));
    }

    #[test]
    fn file_store_quota_failure_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.json");
        let mut store = FileStore::open(&path, Some(40)).unwrap();
        store.set_item("2024-01-01", "short".to_string()).unwrap();
        assert!(store.set_item("2024-01-02", "y".repeat(64)).is_err());

        let reopened = FileStore::open(&path, None).unwrap();
        assert_eq!(reopened.keys(), vec!["2024-01-01".to_string()]);
    }

    #[test]
    fn date_key_pattern() {
        assert!(is_date_key("2024-01-01"));
        assert!(!is_date_key("2024-01-01x"));
        assert!(!is_date_key("settings"));
    }
}
