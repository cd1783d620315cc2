//! Document store mirror of the REST data.
//!
//! Collections are slash-separated paths (`matchs_filles`,
//! `phases_garcons/{phase_id}/poules`) holding JSON objects keyed by id.
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

pub type Document = Map<String, Value>;

type Collections = BTreeMap<String, BTreeMap<String, Document>>;

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error, PathBuf),
    Json(serde_json::Error, PathBuf),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e, path) => write!(f, "I/O error on {}: {e}", path.display()),
            StoreError::Json(e, path) => write!(f, "Invalid store file {}: {e}", path.display()),
        }
    }
}

impl std::error::Error for StoreError {}

pub trait DocumentStore: Send + Sync {
    /// Every document of `collection`, each carrying its `id` field.
    fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

    /// Create or overwrite one document.
    fn set(&self, collection: &str, id: &str, doc: Document) -> Result<(), StoreError>;

    /// Swap the whole content of `collection`, dropping documents not in `docs`.
    fn replace_collection(&self, collection: &str, docs: Vec<(String, Document)>) -> Result<(), StoreError>;
}

fn list_from(collections: &Collections, collection: &str) -> Vec<Document> {
    collections
        .get(collection)
        .map(|docs| {
            docs.iter()
                .map(|(id, doc)| {
                    let mut doc = doc.clone();
                    doc.entry("id").or_insert_with(|| Value::String(id.clone()));
                    doc
                })
                .collect()
        })
        .unwrap_or_default()
}

fn lock(m: &Mutex<Collections>) -> MutexGuard<'_, Collections> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Volatile store, used by tests and when no store path is configured.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        Ok(list_from(&lock(&self.collections), collection))
    }

    fn set(&self, collection: &str, id: &str, doc: Document) -> Result<(), StoreError> {
        lock(&self.collections)
            .entry(collection.to_owned())
            .or_default()
            .insert(id.to_owned(), doc);
        Ok(())
    }

    fn replace_collection(&self, collection: &str, docs: Vec<(String, Document)>) -> Result<(), StoreError> {
        lock(&self.collections).insert(collection.to_owned(), docs.into_iter().collect());
        Ok(())
    }
}

/// Store persisted as one JSON file. Every write rewrites the whole file
/// through a temporary sibling and a rename.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    collections: Mutex<Collections>,
}

impl JsonFileStore {
    /// Open `path`, starting empty when the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let collections = match std::fs::read(&path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Collections::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| StoreError::Json(e, path.clone()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Collections::new(),
            Err(e) => return Err(StoreError::Io(e, path)),
        };
        log::debug!("opened store {} ({} collections)", path.display(), collections.len());
        Ok(Self { path, collections: Mutex::new(collections) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, collections: &Collections) -> Result<(), StoreError> {
        let bytes =
            serde_json::to_vec_pretty(collections).map_err(|e| StoreError::Json(e, self.path.clone()))?;
        let tmp = self.path.with_extension("json.tmp");
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| StoreError::Io(e, dir.to_path_buf()))?;
        }
        std::fs::write(&tmp, bytes).map_err(|e| StoreError::Io(e, tmp.clone()))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| StoreError::Io(e, self.path.clone()))
    }

    /// Apply `change` to a copy, write it, and only then make it current.
    /// A failed write leaves memory matching the file.
    fn update(&self, change: impl FnOnce(&mut Collections)) -> Result<(), StoreError> {
        let mut collections = lock(&self.collections);
        let mut next = collections.clone();
        change(&mut next);
        self.persist(&next)?;
        *collections = next;
        Ok(())
    }
}

impl DocumentStore for JsonFileStore {
    fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        Ok(list_from(&lock(&self.collections), collection))
    }

    fn set(&self, collection: &str, id: &str, doc: Document) -> Result<(), StoreError> {
        self.update(|collections| {
            collections
                .entry(collection.to_owned())
                .or_default()
                .insert(id.to_owned(), doc);
        })
    }

    fn replace_collection(&self, collection: &str, docs: Vec<(String, Document)>) -> Result<(), StoreError> {
        self.update(|collections| {
            collections.insert(collection.to_owned(), docs.into_iter().collect());
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn doc(v: Value) -> Document {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn list_injects_the_document_id() {
        let store = MemoryStore::new();
        store.set("matchs_filles", "42", doc(json!({ "equipe1": "A" }))).unwrap();
        let docs = store.list("matchs_filles").unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["id"], json!("42"));
        assert_eq!(docs[0]["equipe1"], json!("A"));
    }

    #[test]
    fn explicit_id_field_wins_over_key() {
        let store = MemoryStore::new();
        store.set("c", "key", doc(json!({ "id": "inner" }))).unwrap();
        assert_eq!(store.list("c").unwrap()[0]["id"], json!("inner"));
    }

    #[test]
    fn replace_drops_stale_documents() {
        let store = MemoryStore::new();
        store.set("c", "old", doc(json!({}))).unwrap();
        store
            .replace_collection("c", vec![("new".into(), doc(json!({ "x": 1 })))])
            .unwrap();
        let docs = store.list("c").unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["id"], json!("new"));
    }

    #[test]
    fn unknown_collection_is_empty() {
        assert!(MemoryStore::new().list("phases_garcons/1/poules").unwrap().is_empty());
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        {
            let store = JsonFileStore::open(&path).unwrap();
            store.set("phases_filles", "p1", doc(json!({ "libelle": "Finales" }))).unwrap();
            store.set("phases_filles/p1/poules", "a", doc(json!({ "ordre": 1 }))).unwrap();
        }
        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.list("phases_filles").unwrap()[0]["libelle"], json!("Finales"));
        assert_eq!(reopened.list("phases_filles/p1/poules").unwrap().len(), 1);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = JsonFileStore::open(&path).unwrap_err();
        assert!(matches!(err, StoreError::Json(..)));
    }

    #[test]
    fn failed_write_leaves_memory_unchanged() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        let store = JsonFileStore::open(&path).unwrap();
        store.set("matchs_filles", "1", doc(json!({ "equipe1": "A" }))).unwrap();

        // A directory where the file should be makes the rename fail.
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        assert!(store.set("matchs_filles", "2", doc(json!({ "equipe1": "B" }))).is_err());
        assert!(store.replace_collection("matchs_filles", Vec::new()).is_err());
        let docs = store.list("matchs_filles").unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["id"], json!("1"));
    }
}
