//! JSON persistence for the content collections.
//!
//! The durable store is one JSON file per dataset. It is a raw serialization
//! boundary: reads tolerate malformed content (logged, treated as absent) and
//! writes never fail visibly. Record validation happens in the form layer.

mod repository;

pub use repository::*;

use std::collections::HashMap;
use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::models::{BlogPost, Guide, Tool};

/// One of the three content collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dataset {
    Tools,
    Guides,
    Blog,
}

impl Dataset {
    pub const ALL: [Dataset; 3] = [Dataset::Tools, Dataset::Guides, Dataset::Blog];

    /// Key under which the collection is persisted (the file stem).
    pub fn storage_key(self) -> &'static str {
        match self {
            Dataset::Tools => "zemora_tools",
            Dataset::Guides => "zemora_guides",
            Dataset::Blog => "zemora_blog",
        }
    }

    /// Bundled read-only seed document for this collection.
    pub fn seed_file(self) -> &'static str {
        match self {
            Dataset::Tools => "tools.json",
            Dataset::Guides => "guides.json",
            Dataset::Blog => "blog.json",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dataset::Tools => "tools",
            Dataset::Guides => "guides",
            Dataset::Blog => "blog",
        }
    }

    /// Maps a store file path back to its dataset, if it is a recognized key.
    pub fn from_storage_path(path: &Path) -> Option<Dataset> {
        let stem = path.file_stem()?.to_str()?;
        Dataset::ALL.into_iter().find(|d| d.storage_key() == stem)
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Durable key-value store with one JSON file per dataset.
pub struct JsonStore {
    dir: PathBuf,
    /// Fingerprints of this instance's own last write per dataset, used to
    /// tell self-writes apart from foreign writes in the storage watcher.
    last_written: Mutex<HashMap<Dataset, u64>>,
}

impl JsonStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        if let Err(err) = std::fs::create_dir_all(&dir) {
            tracing::error!("failed to create store directory {:?}: {}", dir, err);
        }
        Self {
            dir,
            last_written: Mutex::new(HashMap::new()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, dataset: Dataset) -> PathBuf {
        self.dir.join(format!("{}.json", dataset.storage_key()))
    }

    /// Reads the stored records for a dataset.
    ///
    /// A missing file reads as absent; malformed content logs the parse error
    /// and also reads as absent, so a corrupt store behaves like a cache miss.
    pub fn read<T: DeserializeOwned>(&self, dataset: Dataset) -> Option<Vec<T>> {
        let raw = std::fs::read_to_string(self.path_for(dataset)).ok()?;
        match serde_json::from_str(&raw) {
            Ok(records) => Some(records),
            Err(err) => {
                tracing::error!("failed to parse stored {}: {}", dataset, err);
                None
            }
        }
    }

    /// Writes the records for a dataset.
    ///
    /// Never fails visibly: serialization or I/O errors are logged and
    /// swallowed, so a caller cannot distinguish a failed write from a slow
    /// one. Accepted weak consistency point.
    pub fn write<T: Serialize>(&self, dataset: Dataset, records: &[T]) {
        let payload = match serde_json::to_string(records) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::error!("failed to serialize {}: {}", dataset, err);
                return;
            }
        };
        self.remember_write(dataset, &payload);
        if let Err(err) = std::fs::write(self.path_for(dataset), &payload) {
            tracing::error!("failed to persist {}: {}", dataset, err);
        }
    }

    /// Whether `content` is byte-identical to this instance's own last write.
    ///
    /// Native storage events fire only in tabs other than the writer; the
    /// file watcher uses this to drop events caused by our own writes.
    pub fn wrote(&self, dataset: Dataset, content: &str) -> bool {
        let Ok(seen) = self.last_written.lock() else {
            return false;
        };
        seen.get(&dataset) == Some(&fingerprint(content))
    }

    fn remember_write(&self, dataset: Dataset, payload: &str) {
        if let Ok(mut seen) = self.last_written.lock() {
            seen.insert(dataset, fingerprint(payload));
        }
    }
}

fn fingerprint(content: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    hasher.finish()
}

/// Reads a bundled seed document, the read-only fallback source.
pub(crate) fn read_seed<T: DeserializeOwned>(
    seed_dir: &Path,
    dataset: Dataset,
) -> Result<Vec<T>, String> {
    let path = seed_dir.join(dataset.seed_file());
    let raw = std::fs::read_to_string(&path).map_err(|err| {
        tracing::warn!("seed fetch failed for {}: {}", dataset, err);
        format!("Could not load {}.", dataset)
    })?;
    serde_json::from_str(&raw).map_err(|err| {
        tracing::warn!("seed document for {} is malformed: {}", dataset, err);
        format!("Could not load {}.", dataset)
    })
}

/// One-shot snapshot backing the public pages.
///
/// Loaded once at startup from the seed documents and never written back; a
/// failed load is carried as the page's error-banner text.
pub struct PublicCatalog {
    pub tools: Result<Vec<Tool>, String>,
    pub guides: Result<Vec<Guide>, String>,
    pub blog: Result<Vec<BlogPost>, String>,
}

impl PublicCatalog {
    pub fn load(seed_dir: &Path) -> Self {
        Self {
            tools: read_seed(seed_dir, Dataset::Tools),
            guides: read_seed(seed_dir, Dataset::Guides),
            blog: read_seed(seed_dir, Dataset::Blog),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_missing_is_absent() {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::new(dir.path());
        assert!(store.read::<Tool>(Dataset::Tools).is_none());
    }

    #[test]
    fn test_write_then_read_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::new(dir.path());

        let tools = vec![Tool {
            id: 1,
            name: "Alpha".to_string(),
            ..Tool::default()
        }];
        store.write(Dataset::Tools, &tools);

        let read = store.read::<Tool>(Dataset::Tools).unwrap();
        assert_eq!(read, tools);
    }

    #[test]
    fn test_corrupt_content_reads_as_absent() {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::new(dir.path());

        std::fs::write(store.path_for(Dataset::Guides), "not json").unwrap();
        assert!(store.read::<Guide>(Dataset::Guides).is_none());
    }

    #[test]
    fn test_self_write_fingerprint() {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::new(dir.path());

        let tools = vec![Tool {
            id: 7,
            name: "Beta".to_string(),
            ..Tool::default()
        }];
        store.write(Dataset::Tools, &tools);

        let on_disk = std::fs::read_to_string(store.path_for(Dataset::Tools)).unwrap();
        assert!(store.wrote(Dataset::Tools, &on_disk));
        assert!(!store.wrote(Dataset::Tools, "[]"));

        // A second store instance over the same directory sees the write as foreign.
        let other = JsonStore::new(dir.path());
        assert!(!other.wrote(Dataset::Tools, &on_disk));
    }

    #[test]
    fn test_dataset_from_storage_path() {
        assert_eq!(
            Dataset::from_storage_path(Path::new("/tmp/zemora_tools.json")),
            Some(Dataset::Tools)
        );
        assert_eq!(
            Dataset::from_storage_path(Path::new("/tmp/unrelated.json")),
            None
        );
    }
}
