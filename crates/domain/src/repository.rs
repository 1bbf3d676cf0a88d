//! Typed access to documents of one collection.

use std::marker::PhantomData;

use common::DocumentId;
use document_store::{
    DocumentEnvelope, DocumentQuery, DocumentStore, DocumentStream, Version, WriteOptions,
};

use crate::document::Document;
use crate::error::DomainError;

/// Repository for one document type.
///
/// Loads and stores `D` through a `DocumentStore`, keeping the entity's
/// version in step with the stored one. Every write of an existing document
/// is a compare-and-swap on the version it was read at, so two writers
/// racing on the same document cannot both succeed.
pub struct Repository<S, D>
where
    S: DocumentStore,
    D: Document,
{
    store: S,
    _phantom: PhantomData<D>,
}

impl<S, D> Repository<S, D>
where
    S: DocumentStore,
    D: Document,
{
    /// Creates a new repository over the given store.
    pub fn new(store: S) -> Self {
        Self {
            store,
            _phantom: PhantomData,
        }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns a query over this repository's collection.
    pub fn query(&self) -> DocumentQuery {
        DocumentQuery::collection(D::collection())
    }

    /// Decodes a stored envelope into an entity carrying the stored version.
    pub fn decode(envelope: &DocumentEnvelope) -> Result<D, DomainError> {
        let mut document: D = envelope.decode()?;
        document.set_version(envelope.version);
        Ok(document)
    }

    fn encode(document: &D) -> Result<DocumentEnvelope, DomainError> {
        Ok(
            DocumentEnvelope::from_document(D::collection(), document.id(), document)?
                .with_unique_key(document.unique_key()),
        )
    }

    /// Loads an entity, returning None if it doesn't exist.
    pub async fn get(&self, id: DocumentId) -> Result<Option<D>, DomainError> {
        self.store
            .get(D::collection(), id)
            .await?
            .map(|envelope| Self::decode(&envelope))
            .transpose()
    }

    /// Loads an entity, failing with `NotFound` if it doesn't exist.
    pub async fn load(&self, id: DocumentId) -> Result<D, DomainError> {
        self.get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(D::collection(), id))
    }

    /// Loads the entity holding `key` as its unique key.
    pub async fn find_by_unique_key(&self, key: &str) -> Result<Option<D>, DomainError> {
        self.store
            .find_by_unique_key(D::collection(), key)
            .await?
            .map(|envelope| Self::decode(&envelope))
            .transpose()
    }

    /// Loads the entities matching a query built from [`Repository::query`].
    pub async fn find(&self, query: DocumentQuery) -> Result<Vec<D>, DomainError> {
        self.store
            .query(query)
            .await?
            .iter()
            .map(Self::decode)
            .collect()
    }

    /// Loads every entity of the collection, oldest first.
    pub async fn list(&self) -> Result<Vec<D>, DomainError> {
        self.find(self.query()).await
    }

    /// Streams the raw documents of the collection.
    pub async fn stream(&self) -> Result<DocumentStream, DomainError> {
        Ok(self.store.stream_collection(D::collection()).await?)
    }

    /// Counts the entities of the collection.
    pub async fn count(&self) -> Result<u64, DomainError> {
        Ok(self.store.count(D::collection()).await?)
    }

    /// Stores a new entity and returns it at its first version.
    pub async fn insert(&self, mut document: D) -> Result<D, DomainError> {
        let envelope = Self::encode(&document)?;
        let version = self.store.insert(envelope).await?;
        document.set_version(version);
        Ok(document)
    }

    /// Writes back an entity that was loaded earlier.
    ///
    /// Fails with a concurrency conflict if the stored document moved past
    /// the version the entity was read at.
    pub async fn save(&self, document: &mut D) -> Result<(), DomainError> {
        let envelope = Self::encode(document)?;
        let options = WriteOptions::expect_version(document.version());
        let version = self.store.replace(envelope, options).await?;
        document.set_version(version);
        Ok(())
    }

    /// Loads an entity, applies `update_fn` and writes it back.
    ///
    /// Nothing is written when `update_fn` fails.
    pub async fn update<F, E>(&self, id: DocumentId, update_fn: F) -> Result<D, DomainError>
    where
        F: FnOnce(&mut D) -> Result<(), E>,
        DomainError: From<E>,
    {
        let mut document = self.load(id).await?;
        update_fn(&mut document)?;
        self.save(&mut document).await?;
        Ok(document)
    }

    /// Deletes an entity by id. Returns false if it did not exist.
    pub async fn delete(&self, id: DocumentId) -> Result<bool, DomainError> {
        Ok(self
            .store
            .delete(D::collection(), id, WriteOptions::new())
            .await?)
    }

    /// Deletes an entity and returns it, failing with `NotFound` if it
    /// doesn't exist.
    pub async fn take(&self, id: DocumentId) -> Result<D, DomainError> {
        let document = self.load(id).await?;
        if !self.remove(&document).await? {
            return Err(DomainError::not_found(D::collection(), id));
        }
        Ok(document)
    }

    /// Deletes an entity at the version it was read at.
    pub async fn remove(&self, document: &D) -> Result<bool, DomainError> {
        let options = if document.version() == Version::initial() {
            WriteOptions::new()
        } else {
            WriteOptions::expect_version(document.version())
        };
        Ok(self
            .store
            .delete(D::collection(), document.id(), options)
            .await?)
    }
}
