//! Versioned JSON document storage.
//!
//! Documents are grouped in named collections and stored as
//! [`DocumentEnvelope`]s: the JSON body plus a monotonically increasing
//! [`Version`] used for compare-and-swap writes and an optional key that
//! must be unique within the collection.

pub mod document;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod store;

pub use common::DocumentId;
pub use document::{DocumentEnvelope, Version};
pub use error::{Result, StoreError};
pub use memory::InMemoryDocumentStore;
pub use postgres::PostgresDocumentStore;
pub use query::DocumentQuery;
pub use store::{DocumentStore, DocumentStoreExt, DocumentStream, WriteOptions};
