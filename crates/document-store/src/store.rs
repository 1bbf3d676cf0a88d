use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

use crate::{DocumentEnvelope, DocumentId, DocumentQuery, Result, Version};

/// Options for writes that replace or delete an existing document.
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Version the caller read the document at.
    /// If None, no version check is performed (last write wins).
    pub expected_version: Option<Version>,
}

impl WriteOptions {
    /// Creates options with no version check.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options expecting the document to be at a specific version.
    pub fn expect_version(version: Version) -> Self {
        Self {
            expected_version: Some(version),
        }
    }
}

/// A stream of stored documents.
pub type DocumentStream = Pin<Box<dyn Stream<Item = Result<DocumentEnvelope>> + Send>>;

/// Core trait for document store implementations.
///
/// All implementations must be thread-safe (Send + Sync). Results that list
/// several documents are ordered by insertion time (oldest first).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Inserts a new document at [`Version::first`].
    ///
    /// Fails with `AlreadyExists` if the id is taken and with
    /// `UniqueViolation` if another document holds the same unique key.
    async fn insert(&self, document: DocumentEnvelope) -> Result<Version>;

    /// Replaces the body (and unique key) of an existing document.
    ///
    /// Fails with `NotFound` if the document does not exist and with
    /// `ConcurrencyConflict` if `options.expected_version` is set and does
    /// not match. Returns the new version.
    async fn replace(&self, document: DocumentEnvelope, options: WriteOptions) -> Result<Version>;

    /// Retrieves a document by id.
    async fn get(&self, collection: &str, id: DocumentId) -> Result<Option<DocumentEnvelope>>;

    /// Retrieves the document holding `key` as its unique key.
    async fn find_by_unique_key(
        &self,
        collection: &str,
        key: &str,
    ) -> Result<Option<DocumentEnvelope>>;

    /// Retrieves the documents matching a query.
    async fn query(&self, query: DocumentQuery) -> Result<Vec<DocumentEnvelope>>;

    /// Streams every document of a collection.
    async fn stream_collection(&self, collection: &str) -> Result<DocumentStream>;

    /// Deletes a document. Returns false if it did not exist.
    async fn delete(&self, collection: &str, id: DocumentId, options: WriteOptions)
    -> Result<bool>;

    /// Counts the documents of a collection.
    async fn count(&self, collection: &str) -> Result<u64>;
}

/// Extension trait providing convenience methods for document stores.
#[async_trait]
pub trait DocumentStoreExt: DocumentStore {
    /// Retrieves every document of a collection.
    async fn list(&self, collection: &str) -> Result<Vec<DocumentEnvelope>> {
        self.query(DocumentQuery::collection(collection)).await
    }

    /// Checks if a document exists.
    async fn exists(&self, collection: &str, id: DocumentId) -> Result<bool> {
        Ok(self.get(collection, id).await?.is_some())
    }

    /// Checks if a unique key is held by some document.
    async fn unique_key_taken(&self, collection: &str, key: &str) -> Result<bool> {
        Ok(self.find_by_unique_key(collection, key).await?.is_some())
    }
}

// Blanket implementation for all DocumentStore implementations
impl<T: DocumentStore + ?Sized> DocumentStoreExt for T {}

/// Counts a successful write.
pub(crate) fn record_write(collection: &str, op: &'static str) {
    metrics::counter!("documents_written_total", "collection" => collection.to_string(), "op" => op)
        .increment(1);
}

/// Counts a write rejected by the version check.
pub(crate) fn record_conflict(collection: &str, op: &'static str) {
    metrics::counter!("document_conflicts_total", "collection" => collection.to_string(), "op" => op)
        .increment(1);
    tracing::debug!(collection, op, "version conflict");
}
