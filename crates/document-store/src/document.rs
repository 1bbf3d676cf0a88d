use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::DocumentId;

/// Version number of a stored document, used for optimistic concurrency control.
///
/// A document is written at version 1 and every successful replace
/// increments it by one. Version 0 means "never stored".
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Version(i64);

impl Version {
    /// Creates a new version from a raw value.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the version of a document that has not been stored yet (0).
    pub fn initial() -> Self {
        Self(0)
    }

    /// Returns the version assigned on insert (1).
    pub fn first() -> Self {
        Self(1)
    }

    /// Returns the next version.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the raw version value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Version {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Version> for i64 {
    fn from(version: Version) -> Self {
        version.0
    }
}

/// A stored document: JSON body plus the bookkeeping the store needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentEnvelope {
    /// Storage identifier.
    pub id: DocumentId,

    /// Collection the document belongs to (e.g. "orders", "products").
    pub collection: String,

    /// Version of the stored document. Ignored on write; the store assigns it.
    pub version: Version,

    /// Value that must be unique within the collection, if any.
    pub unique_key: Option<String>,

    /// The document body.
    pub body: serde_json::Value,

    /// When the document was first inserted.
    pub created_at: DateTime<Utc>,

    /// When the document was last written.
    pub updated_at: DateTime<Utc>,
}

impl DocumentEnvelope {
    /// Creates an envelope for a document that has not been stored yet.
    pub fn new(collection: impl Into<String>, id: DocumentId, body: serde_json::Value) -> Self {
        let now = Utc::now();
        Self {
            id,
            collection: collection.into(),
            version: Version::initial(),
            unique_key: None,
            body,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates an envelope by serializing `document`.
    pub fn from_document<T: Serialize>(
        collection: impl Into<String>,
        id: DocumentId,
        document: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::new(collection, id, serde_json::to_value(document)?))
    }

    /// Sets the collection-unique key.
    pub fn with_unique_key(mut self, key: Option<String>) -> Self {
        self.unique_key = key;
        self
    }

    /// Sets the version the envelope was read at.
    pub fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    /// Deserializes the body.
    pub fn decode<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.body)
    }
}
