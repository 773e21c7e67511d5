//! Document Store
//!
//! Hierarchical JSON document storage with live query subscriptions. Views and
//! the repository only ever talk to the [`DocumentStore`] trait; the sled
//! backend in [`persistence`] is the implementation used by the CLI and tests.

pub mod path;
pub mod persistence;
pub mod subscription;

pub use path::{CollectionPath, DocPath};
pub use persistence::SledDocumentStore;
pub use subscription::{SnapshotEvent, Subscription};

use crate::error::StoreError;
use crate::types::DocId;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Field map of a stored document.
pub type Fields = serde_json::Map<String, Value>;

/// Value written to a single field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Value(Value),
    /// Resolved by the store to its own clock at commit time.
    ServerTimestamp,
}

/// Partial set of fields for add/update operations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteFields(BTreeMap<String, FieldValue>);

impl WriteFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), FieldValue::Value(value.into()));
        self
    }

    pub fn server_timestamp(mut self, name: impl Into<String>) -> Self {
        self.0.insert(name.into(), FieldValue::ServerTimestamp);
        self
    }

    /// Build from any value that serializes to a JSON object.
    pub fn from_serializable<T: Serialize>(value: &T) -> Result<Self, StoreError> {
        match serde_json::to_value(value)? {
            Value::Object(map) => Ok(Self(
                map.into_iter()
                    .map(|(k, v)| (k, FieldValue::Value(v)))
                    .collect(),
            )),
            other => Err(StoreError::Serialization(format!(
                "expected an object, got {}",
                other
            ))),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Resolve placeholders against `now` and merge into `target`.
    pub(crate) fn merge_into(self, target: &mut Fields, now: &str) {
        for (name, value) in self.0 {
            let resolved = match value {
                FieldValue::Value(v) => v,
                FieldValue::ServerTimestamp => Value::String(now.to_string()),
            };
            target.insert(name, resolved);
        }
    }
}

/// A stored document as delivered by reads and snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub path: DocPath,
    pub fields: Fields,
}

impl Document {
    pub fn id(&self) -> DocId {
        self.path.id()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Deserialize the field map into a typed record.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        serde_json::from_value(Value::Object(self.fields.clone())).map_err(|e| {
            StoreError::Serialization(format!("{}: {}", self.path, e))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// Query over a single collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub collection: CollectionPath,
    pub order_by: Option<OrderBy>,
}

impl Query {
    pub fn collection(collection: CollectionPath) -> Self {
        Self {
            collection,
            order_by: None,
        }
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }

    /// Apply ordering to the collection's documents.
    ///
    /// Ordered queries skip documents lacking the order field. Ties fall back
    /// to document id so one query always yields the same sequence.
    pub fn apply(&self, mut docs: Vec<Document>) -> Vec<Document> {
        let Some(order) = &self.order_by else {
            docs.sort_by(|a, b| a.path.cmp(&b.path));
            return docs;
        };
        docs.retain(|d| d.fields.contains_key(&order.field));
        docs.sort_by(|a, b| {
            let primary = compare_values(&a.fields[&order.field], &b.fields[&order.field]);
            let primary = match order.direction {
                Direction::Ascending => primary,
                Direction::Descending => primary.reverse(),
            };
            primary.then_with(|| a.path.cmp(&b.path))
        });
        docs
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order over JSON values: type rank first, then value.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// Atomic multi-document write. Only deletes are supported.
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    deletes: Vec<DocPath>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delete(&mut self, path: DocPath) {
        self.deletes.push(path);
    }

    pub fn deletes(&self) -> &[DocPath] {
        &self.deletes
    }

    pub fn len(&self) -> usize {
        self.deletes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deletes.is_empty()
    }
}

/// Operations the application consumes from a document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Open a live subscription. The current result set is delivered
    /// immediately, then again in full after every change to the collection.
    fn subscribe(&self, query: Query) -> Result<Subscription, StoreError>;

    /// Create a document with a store-assigned id.
    async fn add_document(
        &self,
        collection: &CollectionPath,
        fields: WriteFields,
    ) -> Result<DocId, StoreError>;

    /// Merge `fields` into an existing document.
    async fn update_document(&self, doc: &DocPath, fields: WriteFields) -> Result<(), StoreError>;

    /// Delete a document. Deleting a missing document succeeds.
    async fn delete_document(&self, doc: &DocPath) -> Result<(), StoreError>;

    /// Apply every write in the batch or none of them.
    async fn commit_batch(&self, batch: WriteBatch) -> Result<(), StoreError>;

    /// One-shot read of a query's result set.
    async fn read_once(&self, query: &Query) -> Result<Vec<Document>, StoreError>;
}
