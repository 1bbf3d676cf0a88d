use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    DocumentEnvelope, DocumentId, DocumentQuery, Result, StoreError, Version,
    store::{DocumentStore, DocumentStream, WriteOptions, record_conflict, record_write},
};

type Collection = HashMap<DocumentId, DocumentEnvelope>;

/// In-memory document store for tests and single-process deployments.
///
/// Provides the same guarantees as the PostgreSQL implementation: versioned
/// compare-and-swap writes and collection-unique keys.
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    collections: Arc<RwLock<HashMap<String, Collection>>>,
}

impl InMemoryDocumentStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of documents stored across collections.
    pub async fn document_count(&self) -> usize {
        self.collections.read().await.values().map(HashMap::len).sum()
    }

    /// Removes every document.
    pub async fn clear(&self) {
        self.collections.write().await.clear();
    }

    fn sorted(documents: impl Iterator<Item = DocumentEnvelope>) -> Vec<DocumentEnvelope> {
        let mut documents: Vec<_> = documents.collect();
        documents.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then(a.id.as_uuid().cmp(&b.id.as_uuid()))
        });
        documents
    }

    fn check_unique_key(collection: &Collection, document: &DocumentEnvelope) -> Result<()> {
        let Some(key) = document.unique_key.as_deref() else {
            return Ok(());
        };

        let taken = collection
            .values()
            .any(|other| other.id != document.id && other.unique_key.as_deref() == Some(key));
        if taken {
            return Err(StoreError::UniqueViolation {
                collection: document.collection.clone(),
                key: key.to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    #[tracing::instrument(skip(self, document), fields(collection = %document.collection, id = %document.id))]
    async fn insert(&self, mut document: DocumentEnvelope) -> Result<Version> {
        let mut collections = self.collections.write().await;
        let collection = collections.entry(document.collection.clone()).or_default();

        if collection.contains_key(&document.id) {
            return Err(StoreError::AlreadyExists {
                collection: document.collection,
                id: document.id,
            });
        }
        Self::check_unique_key(collection, &document)?;

        let now = Utc::now();
        document.version = Version::first();
        document.created_at = now;
        document.updated_at = now;
        record_write(&document.collection, "insert");
        collection.insert(document.id, document);

        Ok(Version::first())
    }

    #[tracing::instrument(skip(self, document, options), fields(collection = %document.collection, id = %document.id))]
    async fn replace(&self, mut document: DocumentEnvelope, options: WriteOptions) -> Result<Version> {
        let mut collections = self.collections.write().await;
        let not_found = || StoreError::NotFound {
            collection: document.collection.clone(),
            id: document.id,
        };
        let collection = collections
            .get_mut(&document.collection)
            .ok_or_else(not_found)?;
        let current = collection.get(&document.id).ok_or_else(not_found)?;

        if let Some(expected) = options.expected_version
            && current.version != expected
        {
            record_conflict(&document.collection, "replace");
            return Err(StoreError::ConcurrencyConflict {
                collection: document.collection,
                id: document.id,
                expected,
                actual: current.version,
            });
        }
        Self::check_unique_key(collection, &document)?;

        let next = current.version.next();
        document.version = next;
        document.created_at = current.created_at;
        document.updated_at = Utc::now();
        record_write(&document.collection, "replace");
        collection.insert(document.id, document);

        Ok(next)
    }

    async fn get(&self, collection: &str, id: DocumentId) -> Result<Option<DocumentEnvelope>> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection).and_then(|c| c.get(&id)).cloned())
    }

    async fn find_by_unique_key(
        &self,
        collection: &str,
        key: &str,
    ) -> Result<Option<DocumentEnvelope>> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection).and_then(|c| {
            c.values()
                .find(|d| d.unique_key.as_deref() == Some(key))
                .cloned()
        }))
    }

    async fn query(&self, query: DocumentQuery) -> Result<Vec<DocumentEnvelope>> {
        let collections = self.collections.read().await;
        let Some(collection) = collections.get(&query.collection) else {
            return Ok(Vec::new());
        };

        let documents = Self::sorted(
            collection
                .values()
                .filter(|d| query.matches(&d.body))
                .cloned(),
        );

        // Apply offset and limit
        let documents = documents.into_iter().skip(query.offset.unwrap_or(0));
        Ok(match query.limit {
            Some(limit) => documents.take(limit).collect(),
            None => documents.collect(),
        })
    }

    async fn stream_collection(&self, collection: &str) -> Result<DocumentStream> {
        use futures_util::stream;

        let collections = self.collections.read().await;
        let documents = collections
            .get(collection)
            .map(|c| Self::sorted(c.values().cloned()))
            .unwrap_or_default();

        Ok(Box::pin(stream::iter(documents.into_iter().map(Ok))))
    }

    #[tracing::instrument(skip(self, options))]
    async fn delete(
        &self,
        collection: &str,
        id: DocumentId,
        options: WriteOptions,
    ) -> Result<bool> {
        let mut collections = self.collections.write().await;
        let Some(documents) = collections.get_mut(collection) else {
            return Ok(false);
        };
        let Some(current) = documents.get(&id) else {
            return Ok(false);
        };

        if let Some(expected) = options.expected_version
            && current.version != expected
        {
            record_conflict(collection, "delete");
            return Err(StoreError::ConcurrencyConflict {
                collection: collection.to_string(),
                id,
                expected,
                actual: current.version,
            });
        }

        documents.remove(&id);
        record_write(collection, "delete");
        Ok(true)
    }

    async fn count(&self, collection: &str) -> Result<u64> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection).map_or(0, |c| c.len() as u64))
    }
}
