//! Persistence layer for the document store

use crate::error::StoreError;
use crate::store::subscription::ListenerRegistry;
use crate::store::{
    CollectionPath, DocPath, Document, DocumentStore, Fields, Query, SnapshotEvent, Subscription,
    WriteBatch, WriteFields,
};
use crate::types::{to_iso, DocId};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Sled-based implementation of DocumentStore
///
/// Keys are full document paths; values are the JSON-encoded field map.
pub struct SledDocumentStore {
    db: sled::Db,
    listeners: Arc<ListenerRegistry>,
    // Serializes commit + notify so every listener sees snapshots in commit order.
    write_lock: Mutex<()>,
}

impl SledDocumentStore {
    /// Open (or create) a store at the given directory.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path).map_err(|e| {
            StoreError::Unavailable(format!("Failed to open sled database: {}", e))
        })?;
        Ok(Self::from_db(db))
    }

    /// In-memory store discarded on drop.
    pub fn temporary() -> Result<Self, StoreError> {
        let db = sled::Config::new().temporary(true).open().map_err(|e| {
            StoreError::Unavailable(format!("Failed to open temporary database: {}", e))
        })?;
        Ok(Self::from_db(db))
    }

    pub fn from_db(db: sled::Db) -> Self {
        Self {
            db,
            listeners: ListenerRegistry::shared(),
            write_lock: Mutex::new(()),
        }
    }

    /// Get the underlying sled database (for advanced operations)
    pub fn db(&self) -> &sled::Db {
        &self.db
    }

    /// Number of open subscriptions.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Flush all pending writes to disk
    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }

    fn load(&self, path: &DocPath) -> Result<Option<Fields>, StoreError> {
        match self.db.get(path.as_str().as_bytes())? {
            Some(value) => {
                let fields: Fields = serde_json::from_slice(&value)?;
                Ok(Some(fields))
            }
            None => Ok(None),
        }
    }

    fn save(&self, path: &DocPath, fields: &Fields) -> Result<(), StoreError> {
        let value = serde_json::to_vec(fields)?;
        self.db.insert(path.as_str().as_bytes(), value)?;
        Ok(())
    }

    /// Documents stored directly in `collection`, in key order.
    fn scan_collection(&self, collection: &CollectionPath) -> Result<Vec<Document>, StoreError> {
        let prefix = collection.key_prefix();
        let mut docs = Vec::new();
        for entry in self.db.scan_prefix(prefix.as_bytes()) {
            let (key, value) = entry?;
            let key = std::str::from_utf8(&key)
                .map_err(|e| StoreError::Backend(format!("Non UTF-8 key: {}", e)))?;
            // Nested sub-collection documents share the prefix; skip them.
            if key[prefix.len()..].contains('/') {
                continue;
            }
            let fields: Fields = serde_json::from_slice(&value)?;
            docs.push(Document {
                path: DocPath::parse(key)?,
                fields,
            });
        }
        Ok(docs)
    }

    fn run_query(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        Ok(query.apply(self.scan_collection(&query.collection)?))
    }

    /// Push a fresh snapshot to every listener on `collection`.
    fn notify(&self, collection: &CollectionPath) {
        for (id, query) in self.listeners.listening_on(collection) {
            let event = match self.run_query(&query) {
                Ok(docs) => SnapshotEvent::Snapshot(docs),
                Err(e) => {
                    warn!(subscription = id, error = %e, "Failed to build snapshot");
                    SnapshotEvent::Error(e)
                }
            };
            self.listeners.send(id, event);
        }
    }

    fn server_now() -> String {
        to_iso(&Utc::now())
    }
}

#[async_trait]
impl DocumentStore for SledDocumentStore {
    fn subscribe(&self, query: Query) -> Result<Subscription, StoreError> {
        let _guard = self.write_lock.lock();
        let subscription = self.listeners.register(query.clone());
        let initial = match self.run_query(&query) {
            Ok(docs) => SnapshotEvent::Snapshot(docs),
            Err(e) => SnapshotEvent::Error(e),
        };
        self.listeners.send(subscription.id(), initial);
        Ok(subscription)
    }

    async fn add_document(
        &self,
        collection: &CollectionPath,
        fields: WriteFields,
    ) -> Result<DocId, StoreError> {
        let _guard = self.write_lock.lock();
        let id = DocId::generate();
        let path = collection.doc(&id);
        let mut stored = Fields::new();
        fields.merge_into(&mut stored, &Self::server_now());
        self.save(&path, &stored)?;
        debug!(path = %path, "Document added");
        self.notify(collection);
        Ok(id)
    }

    async fn update_document(&self, doc: &DocPath, fields: WriteFields) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock();
        let mut stored = self
            .load(doc)?
            .ok_or_else(|| StoreError::NotFound(doc.to_string()))?;
        fields.merge_into(&mut stored, &Self::server_now());
        self.save(doc, &stored)?;
        debug!(path = %doc, "Document updated");
        self.notify(&doc.collection());
        Ok(())
    }

    async fn delete_document(&self, doc: &DocPath) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock();
        let removed = self.db.remove(doc.as_str().as_bytes())?;
        debug!(path = %doc, existed = removed.is_some(), "Document deleted");
        self.notify(&doc.collection());
        Ok(())
    }

    async fn commit_batch(&self, batch: WriteBatch) -> Result<(), StoreError> {
        if batch.is_empty() {
            return Ok(());
        }
        let _guard = self.write_lock.lock();
        let mut sled_batch = sled::Batch::default();
        let mut touched = BTreeSet::new();
        for path in batch.deletes() {
            sled_batch.remove(path.as_str().as_bytes());
            touched.insert(path.collection());
        }
        self.db.apply_batch(sled_batch)?;
        debug!(deletes = batch.len(), "Batch committed");
        for collection in &touched {
            self.notify(collection);
        }
        Ok(())
    }

    async fn read_once(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        self.run_query(query)
    }
}
