//! Per-collection repositories with synchronous write-through.
//!
//! Each repository exclusively owns the in-memory array for one collection.
//! Mutations hold the write lock through write-through and broadcast, so the
//! mutation -> persist -> notify -> revision-bump sequence never interleaves
//! within one workspace. Across workspaces the last applied write wins.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::{watch, RwLock};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{BlogPost, Guide, Tool};
use crate::store::{read_seed, Dataset, JsonStore};
use crate::sync::{DatasetUpdate, SyncHub};

/// A persistable collection record.
pub trait Record: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    const DATASET: Dataset;

    fn id(&self) -> i64;
    fn set_id(&mut self, id: i64);
}

impl Record for Tool {
    const DATASET: Dataset = Dataset::Tools;

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}

impl Record for Guide {
    const DATASET: Dataset = Dataset::Guides;

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}

impl Record for BlogPost {
    const DATASET: Dataset = Dataset::Blog;

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}

/// Creation-timestamp ids (epoch millis), bumped past the previous value when
/// two creations land in the same clock instant so ids stay unique.
pub struct IdGenerator {
    last: AtomicI64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self {
            last: AtomicI64::new(0),
        }
    }

    pub fn next(&self) -> i64 {
        loop {
            let last = self.last.load(Ordering::SeqCst);
            let candidate = Utc::now().timestamp_millis().max(last + 1);
            if self
                .last
                .compare_exchange(last, candidate, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
            {
                return candidate;
            }
        }
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// State shared by the three repositories of one workspace instance.
struct Shared {
    store: Arc<JsonStore>,
    hub: SyncHub,
    origin: Uuid,
    revision: AtomicI64,
    render_tx: watch::Sender<i64>,
    status: Mutex<String>,
}

impl Shared {
    /// Any accepted mutation triggers a full re-render of affected views:
    /// bump the revision and wake every render subscriber.
    fn mark_dirty(&self) -> i64 {
        let revision = self.revision.fetch_add(1, Ordering::SeqCst) + 1;
        self.render_tx.send_replace(revision);
        revision
    }

    fn publish<T: Serialize>(&self, dataset: Dataset, records: &[T]) {
        match serde_json::to_value(records) {
            Ok(data) => self.hub.publish(DatasetUpdate::new(dataset, data, self.origin)),
            Err(err) => tracing::error!("failed to encode {} broadcast: {}", dataset, err),
        }
    }

    fn note(&self, message: String) {
        if let Ok(mut status) = self.status.lock() {
            *status = message;
        }
    }
}

/// Authoritative in-memory array for one collection.
pub struct Repository<T: Record> {
    shared: Arc<Shared>,
    ids: IdGenerator,
    records: RwLock<Vec<T>>,
}

impl<T: Record> Repository<T> {
    fn new(shared: Arc<Shared>) -> Self {
        Self {
            shared,
            ids: IdGenerator::new(),
            records: RwLock::new(Vec::new()),
        }
    }

    /// Seeds the collection: the persistent store wins, then the bundled seed
    /// document, then an empty collection. Exactly one source, no merge.
    async fn initialize(&self, seed_dir: &Path) {
        let records = match self.shared.store.read::<T>(T::DATASET) {
            Some(stored) => stored,
            None => read_seed(seed_dir, T::DATASET).unwrap_or_default(),
        };
        *self.records.write().await = records;
    }

    pub async fn list(&self) -> Vec<T> {
        self.records.read().await.clone()
    }

    pub async fn get(&self, id: i64) -> Option<T> {
        self.records
            .read()
            .await
            .iter()
            .find(|r| r.id() == id)
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Assigns a fresh id, appends, writes through, and notifies.
    pub async fn create(&self, mut record: T) -> T {
        record.set_id(self.ids.next());
        let mut records = self.records.write().await;
        records.push(record.clone());
        self.commit(&records);
        record
    }

    /// Replaces the record with the matching id.
    ///
    /// A missing id is a silent no-op; callers pre-check existence when they
    /// load the record for editing.
    pub async fn update(&self, id: i64, mut record: T) -> Option<T> {
        record.set_id(id);
        let mut records = self.records.write().await;
        let slot = records.iter_mut().find(|r| r.id() == id)?;
        *slot = record.clone();
        self.commit(&records);
        Some(record)
    }

    /// Removes every record matching `id` (expected: exactly one).
    /// Deleting a non-existent id is a no-op.
    pub async fn delete(&self, id: i64) -> usize {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.id() != id);
        let removed = before - records.len();
        if removed > 0 {
            self.commit(&records);
        }
        removed
    }

    /// Import path: replaces the whole collection atomically, assigning ids
    /// to records that arrived without one.
    pub async fn replace_all(&self, mut incoming: Vec<T>) -> usize {
        for record in &mut incoming {
            if record.id() == 0 {
                record.set_id(self.ids.next());
            }
        }
        let mut records = self.records.write().await;
        *records = incoming;
        self.commit(&records);
        records.len()
    }

    /// Adopts a snapshot produced outside this workspace. Broadcast payloads
    /// write back to the store; storage events do not (the store already
    /// holds the new value).
    async fn apply_remote(&self, incoming: Vec<T>, write_back: bool) {
        let mut records = self.records.write().await;
        *records = incoming;
        if write_back {
            self.shared.store.write(T::DATASET, &records);
        }
        self.shared.mark_dirty();
    }

    /// Unconditional re-read from the persistent store (recovery path).
    async fn refresh_from_store(&self) {
        if let Some(stored) = self.shared.store.read::<T>(T::DATASET) {
            *self.records.write().await = stored;
        }
    }

    /// Write-through, then broadcast, then re-render. Called with the write
    /// lock held so the sequence is not interleaved.
    fn commit(&self, records: &[T]) {
        self.shared.store.write(T::DATASET, records);
        self.shared.publish(T::DATASET, records);
        self.shared.mark_dirty();
        self.shared.note(format!(
            "Synced {} @ {}",
            T::DATASET,
            Utc::now().format("%H:%M:%S")
        ));
    }
}

/// Per-collection counts for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct CollectionCounts {
    pub tools: usize,
    pub guides: usize,
    pub blog: usize,
}

/// One admin instance: three repositories plus the sync identity.
///
/// The analogue of one open admin tab. Constructed once per process in the
/// server, or several times over a shared hub/store in tests to exercise
/// cross-instance synchronization.
pub struct Workspace {
    shared: Arc<Shared>,
    seed_dir: PathBuf,
    pub tools: Repository<Tool>,
    pub guides: Repository<Guide>,
    pub blog: Repository<BlogPost>,
}

impl Workspace {
    pub fn new(store: Arc<JsonStore>, hub: SyncHub, seed_dir: impl Into<PathBuf>) -> Self {
        let (render_tx, _) = watch::channel(0);
        let shared = Arc::new(Shared {
            store,
            hub,
            origin: Uuid::new_v4(),
            revision: AtomicI64::new(0),
            render_tx,
            status: Mutex::new("Starting".to_string()),
        });
        Self {
            tools: Repository::new(Arc::clone(&shared)),
            guides: Repository::new(Arc::clone(&shared)),
            blog: Repository::new(Arc::clone(&shared)),
            seed_dir: seed_dir.into(),
            shared,
        }
    }

    /// Seeds all three collections (store, then seed document, then empty).
    pub async fn initialize(&self) {
        self.tools.initialize(&self.seed_dir).await;
        self.guides.initialize(&self.seed_dir).await;
        self.blog.initialize(&self.seed_dir).await;
        self.shared.note("Ready".to_string());
    }

    /// Identifies this instance for the lifetime of the process; used to
    /// suppress self-echo of broadcast messages.
    pub fn origin(&self) -> Uuid {
        self.shared.origin
    }

    pub fn revision(&self) -> i64 {
        self.shared.revision.load(Ordering::SeqCst)
    }

    pub fn hub(&self) -> &SyncHub {
        &self.shared.hub
    }

    /// Re-render signal: receives the revision after every accepted mutation.
    pub fn subscribe_render(&self) -> watch::Receiver<i64> {
        self.shared.render_tx.subscribe()
    }

    /// Human-readable line describing the last sync activity.
    pub fn sync_status(&self) -> String {
        self.shared
            .status
            .lock()
            .map(|status| status.clone())
            .unwrap_or_default()
    }

    pub async fn counts(&self) -> CollectionCounts {
        CollectionCounts {
            tools: self.tools.len().await,
            guides: self.guides.len().await,
            blog: self.blog.len().await,
        }
    }

    /// Inbound hub channel: ignores self-echo, then applies the payload and
    /// persists it, mirroring a peer tab's broadcast handler.
    pub async fn apply_update(&self, update: &DatasetUpdate) -> bool {
        if update.origin == self.shared.origin {
            return false;
        }
        let applied = self.apply_snapshot(update.dataset, &update.data, true).await;
        if applied {
            self.shared.note(format!(
                "Updated from peer @ {}",
                Utc::now().format("%H:%M:%S")
            ));
        }
        applied
    }

    /// Inbound storage channel: raw content that is not a JSON array is
    /// ignored; a valid array replaces in-memory state without a write-back.
    pub async fn apply_storage_event(&self, dataset: Dataset, raw: &str) -> bool {
        let Ok(value) = serde_json::from_str::<serde_json::Value>(raw) else {
            return false;
        };
        let applied = self.apply_snapshot(dataset, &value, false).await;
        if applied {
            self.shared
                .note(format!("Storage sync @ {}", Utc::now().format("%H:%M:%S")));
        }
        applied
    }

    /// The single external-update operation both inbound channels feed.
    async fn apply_snapshot(
        &self,
        dataset: Dataset,
        data: &serde_json::Value,
        write_back: bool,
    ) -> bool {
        if !data.is_array() {
            return false;
        }
        match dataset {
            Dataset::Tools => adopt(&self.tools, data, write_back).await,
            Dataset::Guides => adopt(&self.guides, data, write_back).await,
            Dataset::Blog => adopt(&self.blog, data, write_back).await,
        }
    }

    /// Manual recovery path: re-reads all three collections from the store
    /// unconditionally and re-renders.
    pub async fn force_refresh(&self) {
        self.tools.refresh_from_store().await;
        self.guides.refresh_from_store().await;
        self.blog.refresh_from_store().await;
        self.shared.mark_dirty();
        self.shared.note("Refreshed from local store".to_string());
    }

    /// Replaces a collection from user-supplied JSON. The payload must be an
    /// array; any failure aborts the whole import with no partial write.
    pub async fn import_json(&self, dataset: Dataset, raw: &str) -> Result<usize, AppError> {
        let value: serde_json::Value = serde_json::from_str(raw)
            .map_err(|err| AppError::Import(format!("Failed to import: {}", err)))?;
        if !value.is_array() {
            return Err(AppError::Import(
                "Failed to import: JSON must be an array".to_string(),
            ));
        }
        match dataset {
            Dataset::Tools => import_records(&self.tools, value).await,
            Dataset::Guides => import_records(&self.guides, value).await,
            Dataset::Blog => import_records(&self.blog, value).await,
        }
    }

    /// Pretty-printed JSON document of the collection's current records.
    pub async fn export_json(&self, dataset: Dataset) -> String {
        match dataset {
            Dataset::Tools => export_records(&self.tools).await,
            Dataset::Guides => export_records(&self.guides).await,
            Dataset::Blog => export_records(&self.blog).await,
        }
    }
}

async fn adopt<T: Record>(
    repo: &Repository<T>,
    data: &serde_json::Value,
    write_back: bool,
) -> bool {
    match serde_json::from_value::<Vec<T>>(data.clone()) {
        Ok(records) => {
            repo.apply_remote(records, write_back).await;
            true
        }
        Err(err) => {
            tracing::warn!("discarding sync payload for {}: {}", T::DATASET, err);
            false
        }
    }
}

async fn import_records<T: Record>(
    repo: &Repository<T>,
    value: serde_json::Value,
) -> Result<usize, AppError> {
    let records: Vec<T> = serde_json::from_value(value)
        .map_err(|err| AppError::Import(format!("Failed to import: {}", err)))?;
    Ok(repo.replace_all(records).await)
}

async fn export_records<T: Record>(repo: &Repository<T>) -> String {
    let records = repo.list().await;
    serde_json::to_string_pretty(&records).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tool(name: &str, featured: bool) -> Tool {
        Tool {
            name: name.to_string(),
            download: format!("https://example.com/{}", name.to_lowercase()),
            featured,
            ..Tool::default()
        }
    }

    fn workspace(dir: &TempDir) -> Workspace {
        let store = Arc::new(JsonStore::new(dir.path().join("store")));
        Workspace::new(store, SyncHub::new(), dir.path().join("seed"))
    }

    #[tokio::test]
    async fn test_create_then_read_back() {
        let dir = TempDir::new().unwrap();
        let ws = workspace(&dir);
        ws.initialize().await;

        let created = ws.tools.create(tool("Alpha", false)).await;
        assert!(created.id > 0);

        let read = ws.tools.get(created.id).await.unwrap();
        assert_eq!(read, created);
    }

    #[tokio::test]
    async fn test_rapid_creations_get_distinct_ids() {
        // Wall-clock ids collide within one millisecond; the generator bumps
        // past the last value instead.
        let dir = TempDir::new().unwrap();
        let ws = workspace(&dir);
        ws.initialize().await;

        let a = ws.tools.create(tool("Alpha", false)).await;
        let b = ws.tools.create(tool("Beta", false)).await;
        let c = ws.tools.create(tool("Gamma", false)).await;
        assert!(a.id < b.id && b.id < c.id);
    }

    #[tokio::test]
    async fn test_update_touches_only_its_record() {
        let dir = TempDir::new().unwrap();
        let ws = workspace(&dir);
        ws.initialize().await;

        let a = ws.tools.create(tool("Alpha", false)).await;
        let b = ws.tools.create(tool("Beta", false)).await;
        let c = ws.tools.create(tool("Gamma", false)).await;

        let mut changed = b.clone();
        changed.name = "Beta II".to_string();
        ws.tools.update(b.id, changed).await.unwrap();

        let all = ws.tools.list().await;
        assert_eq!(all.len(), 3);
        assert_eq!(all[0], a);
        assert_eq!(all[1].name, "Beta II");
        assert_eq!(all[1].id, b.id);
        assert_eq!(all[2], c);
    }

    #[tokio::test]
    async fn test_update_absent_id_is_silent_noop() {
        let dir = TempDir::new().unwrap();
        let ws = workspace(&dir);
        ws.initialize().await;

        let a = ws.tools.create(tool("Alpha", false)).await;
        let revision = ws.revision();

        assert!(ws.tools.update(a.id + 999, tool("Ghost", false)).await.is_none());
        assert_eq!(ws.tools.list().await, vec![a]);
        assert_eq!(ws.revision(), revision);
    }

    #[tokio::test]
    async fn test_delete_removes_exactly_matching_and_noops_on_absent() {
        let dir = TempDir::new().unwrap();
        let ws = workspace(&dir);
        ws.initialize().await;

        let a = ws.tools.create(tool("Alpha", false)).await;
        let b = ws.tools.create(tool("Beta", false)).await;

        assert_eq!(ws.tools.delete(a.id).await, 1);
        assert_eq!(ws.tools.list().await, vec![b.clone()]);

        let revision = ws.revision();
        assert_eq!(ws.tools.delete(a.id).await, 0);
        assert_eq!(ws.tools.list().await, vec![b]);
        assert_eq!(ws.revision(), revision);
    }

    #[tokio::test]
    async fn test_initialize_prefers_store_over_seed() {
        let dir = TempDir::new().unwrap();
        let store_dir = dir.path().join("store");
        let seed_dir = dir.path().join("seed");
        std::fs::create_dir_all(&seed_dir).unwrap();
        std::fs::write(
            seed_dir.join("tools.json"),
            r#"[{"id": 1, "name": "Seeded"}]"#,
        )
        .unwrap();

        let store = Arc::new(JsonStore::new(&store_dir));
        store.write(Dataset::Tools, &[tool("Persisted", false)]);

        let ws = Workspace::new(store, SyncHub::new(), &seed_dir);
        ws.initialize().await;

        let all = ws.tools.list().await;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Persisted");
    }

    #[tokio::test]
    async fn test_initialize_falls_back_to_seed_then_empty() {
        let dir = TempDir::new().unwrap();
        let seed_dir = dir.path().join("seed");
        std::fs::create_dir_all(&seed_dir).unwrap();
        std::fs::write(
            seed_dir.join("tools.json"),
            r#"[{"id": 1, "name": "Seeded"}]"#,
        )
        .unwrap();

        let store = Arc::new(JsonStore::new(dir.path().join("store")));
        let ws = Workspace::new(store, SyncHub::new(), &seed_dir);
        ws.initialize().await;

        assert_eq!(ws.tools.list().await[0].name, "Seeded");
        // No seed document for guides: empty collection, not an error.
        assert!(ws.guides.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_import_rejects_non_array() {
        let dir = TempDir::new().unwrap();
        let ws = workspace(&dir);
        ws.initialize().await;

        let err = ws
            .import_json(Dataset::Tools, r#"{"name": "Alpha"}"#)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Import(_)));
        assert!(ws.tools.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_export_import_round_trip_preserves_ids() {
        let dir = TempDir::new().unwrap();
        let ws = workspace(&dir);
        ws.initialize().await;

        ws.tools.create(tool("Alpha", false)).await;
        ws.tools.create(tool("Beta", true)).await;
        let before = ws.tools.list().await;

        let exported = ws.export_json(Dataset::Tools).await;
        ws.tools.delete(before[0].id).await;

        let imported = ws.import_json(Dataset::Tools, &exported).await.unwrap();
        assert_eq!(imported, 2);
        assert_eq!(ws.tools.list().await, before);
    }

    #[tokio::test]
    async fn test_import_assigns_ids_to_idless_records() {
        let dir = TempDir::new().unwrap();
        let ws = workspace(&dir);
        ws.initialize().await;

        let count = ws
            .import_json(
                Dataset::Guides,
                r#"[{"title": "First", "slug": "first"}, {"id": 42, "title": "Second", "slug": "second"}]"#,
            )
            .await
            .unwrap();
        assert_eq!(count, 2);

        let all = ws.guides.list().await;
        assert!(all[0].id > 0);
        assert_eq!(all[1].id, 42);
    }

    #[tokio::test]
    async fn test_force_refresh_rereads_store() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(JsonStore::new(dir.path().join("store")));
        let ws = Workspace::new(Arc::clone(&store), SyncHub::new(), dir.path().join("seed"));
        ws.initialize().await;

        // Another writer lands a snapshot directly in the store.
        store.write(Dataset::Tools, &[tool("Foreign", false)]);
        assert!(ws.tools.list().await.is_empty());

        ws.force_refresh().await;
        assert_eq!(ws.tools.list().await[0].name, "Foreign");
    }

    #[tokio::test]
    async fn test_mutations_bump_revision_and_render_signal() {
        let dir = TempDir::new().unwrap();
        let ws = workspace(&dir);
        ws.initialize().await;

        let render = ws.subscribe_render();
        let before = ws.revision();
        ws.tools.create(tool("Alpha", false)).await;

        assert_eq!(ws.revision(), before + 1);
        assert_eq!(*render.borrow(), ws.revision());
    }
}
