//! Shared test utilities for integration tests
//!
//! Temporary stores, a store wrapper that fails chosen operations, and a
//! serialized HOME override for config tests.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use examwise::error::StoreError;
use examwise::exam::NewExam;
use examwise::repository::ExamRepository;
use examwise::session::{SessionContext, StaticAuthProvider};
use examwise::store::{
    CollectionPath, DocPath, Document, DocumentStore, Query, SledDocumentStore, Subscription,
    WriteBatch, WriteFields,
};
use examwise::types::{DocId, UserId};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Global mutex to serialize HOME / EXAMWISE_ENV access across all tests
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Run `f` with HOME pointed at `home`, restoring the previous value afterwards.
pub fn with_home<T>(home: &Path, f: impl FnOnce() -> T) -> T {
    with_env(&[("HOME", Some(home.to_string_lossy().as_ref()))], f)
}

/// Run `f` with the given variables set (or removed), restoring them afterwards.
pub fn with_env<T>(vars: &[(&str, Option<&str>)], f: impl FnOnce() -> T) -> T {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let saved: Vec<(String, Option<String>)> = vars
        .iter()
        .map(|(name, _)| (name.to_string(), std::env::var(name).ok()))
        .collect();
    for (name, value) in vars {
        match value {
            Some(value) => std::env::set_var(name, value),
            None => std::env::remove_var(name),
        }
    }
    let result = f();
    for (name, value) in saved {
        match value {
            Some(value) => std::env::set_var(&name, value),
            None => std::env::remove_var(&name),
        }
    }
    result
}

pub fn sled_store() -> Arc<SledDocumentStore> {
    Arc::new(SledDocumentStore::temporary().unwrap())
}

pub fn signed_in(uid: &str) -> SessionContext {
    SessionContext::init(&StaticAuthProvider::signed_in(uid))
}

pub fn signed_out() -> SessionContext {
    SessionContext::init(&StaticAuthProvider::new(None))
}

pub fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

pub fn new_exam(name: &str, date: DateTime<Utc>) -> NewExam {
    NewExam {
        name: name.to_string(),
        subtitle: None,
        date,
        image_url: "https://example.com/cover.png".to_string(),
    }
}

/// Create an exam directly through the repository.
pub async fn seed_exam(repo: &ExamRepository, uid: &str, name: &str, date: DateTime<Utc>) -> DocId {
    repo.create_exam(&UserId::from(uid), &new_exam(name, date))
        .await
        .unwrap()
}

/// Which store operations should fail.
#[derive(Default)]
pub struct Faults {
    pub add: AtomicBool,
    pub update: AtomicBool,
    pub delete: AtomicBool,
    pub batch: AtomicBool,
    pub read: AtomicBool,
}

impl Faults {
    pub fn fail(flag: &AtomicBool) {
        flag.store(true, Ordering::SeqCst);
    }
}

/// Delegates to an inner store unless the matching fault is armed.
pub struct FaultyStore {
    inner: Arc<SledDocumentStore>,
    pub faults: Faults,
}

impl FaultyStore {
    pub fn new(inner: Arc<SledDocumentStore>) -> Self {
        Self {
            inner,
            faults: Faults::default(),
        }
    }

    fn check(flag: &AtomicBool, op: &str) -> Result<(), StoreError> {
        if flag.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable(format!("{} rejected", op)))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DocumentStore for FaultyStore {
    fn subscribe(&self, query: Query) -> Result<Subscription, StoreError> {
        self.inner.subscribe(query)
    }

    async fn add_document(
        &self,
        collection: &CollectionPath,
        fields: WriteFields,
    ) -> Result<DocId, StoreError> {
        Self::check(&self.faults.add, "add")?;
        self.inner.add_document(collection, fields).await
    }

    async fn update_document(&self, doc: &DocPath, fields: WriteFields) -> Result<(), StoreError> {
        Self::check(&self.faults.update, "update")?;
        self.inner.update_document(doc, fields).await
    }

    async fn delete_document(&self, doc: &DocPath) -> Result<(), StoreError> {
        Self::check(&self.faults.delete, "delete")?;
        self.inner.delete_document(doc).await
    }

    async fn commit_batch(&self, batch: WriteBatch) -> Result<(), StoreError> {
        Self::check(&self.faults.batch, "batch")?;
        self.inner.commit_batch(batch).await
    }

    async fn read_once(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        Self::check(&self.faults.read, "read")?;
        self.inner.read_once(query).await
    }
}

/// Repository over a faulty wrapper, plus handles to both layers.
pub fn faulty_repo() -> (ExamRepository, Arc<FaultyStore>, Arc<SledDocumentStore>) {
    let inner = sled_store();
    let faulty = Arc::new(FaultyStore::new(inner.clone()));
    let repo = ExamRepository::new(faulty.clone());
    (repo, faulty, inner)
}
