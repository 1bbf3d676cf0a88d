//! Domain error types.

use document_store::StoreError;
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::city::CityError;
use crate::customer::CustomerError;
use crate::order::OrderError;
use crate::user::AuthError;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An error occurred in the document store.
    #[error("Document store error: {0}")]
    Store(#[from] StoreError),

    /// An order or cart rule was violated.
    #[error("{0}")]
    Order(#[from] OrderError),

    /// A catalog rule was violated.
    #[error("{0}")]
    Catalog(#[from] CatalogError),

    /// A customer rule was violated.
    #[error("{0}")]
    Customer(#[from] CustomerError),

    /// A city rule was violated.
    #[error("{0}")]
    City(#[from] CityError),

    /// Registration, login or profile rule was violated.
    #[error("{0}")]
    Auth(#[from] AuthError),

    /// Document not found.
    #[error("{collection} not found: {id}")]
    NotFound {
        collection: &'static str,
        id: String,
    },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DomainError {
    /// Builds a `NotFound` error for a collection and any displayable id.
    pub fn not_found(collection: &'static str, id: impl ToString) -> Self {
        DomainError::NotFound {
            collection,
            id: id.to_string(),
        }
    }

    /// Returns true if the error reports a stale-version write.
    pub fn is_concurrency_conflict(&self) -> bool {
        matches!(
            self,
            DomainError::Store(StoreError::ConcurrencyConflict { .. })
        )
    }
}

/// Turns a store-level unique-key violation into a domain conflict.
pub(crate) trait UniqueViolationExt<T> {
    fn on_unique_violation<E>(self, conflict: impl FnOnce() -> E) -> Result<T, DomainError>
    where
        DomainError: From<E>;
}

impl<T> UniqueViolationExt<T> for Result<T, DomainError> {
    fn on_unique_violation<E>(self, conflict: impl FnOnce() -> E) -> Result<T, DomainError>
    where
        DomainError: From<E>,
    {
        match self {
            Err(DomainError::Store(StoreError::UniqueViolation { .. })) => {
                Err(DomainError::from(conflict()))
            }
            other => other,
        }
    }
}
