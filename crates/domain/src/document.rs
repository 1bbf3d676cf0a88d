//! Core trait for entities persisted as JSON documents.

use common::DocumentId;
use document_store::Version;
use serde::{Serialize, de::DeserializeOwned};

/// Trait for entities stored as one document each.
///
/// The entity serializes to the document body. Its version is owned by the
/// store: repositories overwrite it from the stored envelope on every load
/// and after every write.
pub trait Document: Serialize + DeserializeOwned + Send + Sync {
    /// Returns the collection the entity is stored in.
    fn collection() -> &'static str;

    /// Returns the entity's identifier.
    fn id(&self) -> DocumentId;

    /// Returns the version the entity was read at.
    ///
    /// Version 0 means the entity has not been stored yet.
    fn version(&self) -> Version;

    /// Sets the entity version.
    fn set_version(&mut self, version: Version);

    /// Returns the collection-unique key of the entity, if it has one.
    fn unique_key(&self) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize)]
    struct Note {
        id: DocumentId,
        #[serde(default)]
        version: Version,
        title: String,
    }

    impl Document for Note {
        fn collection() -> &'static str {
            "notes"
        }

        fn id(&self) -> DocumentId {
            self.id
        }

        fn version(&self) -> Version {
            self.version
        }

        fn set_version(&mut self, version: Version) {
            self.version = version;
        }
    }

    #[test]
    fn unique_key_defaults_to_none() {
        let note = Note {
            id: DocumentId::new(),
            version: Version::initial(),
            title: "hello".to_string(),
        };
        assert_eq!(Note::collection(), "notes");
        assert!(note.unique_key().is_none());
    }

    #[test]
    fn version_is_settable() {
        let mut note = Note {
            id: DocumentId::new(),
            version: Version::initial(),
            title: "hello".to_string(),
        };
        note.set_version(Version::new(3));
        assert_eq!(note.version(), Version::new(3));
    }
}
