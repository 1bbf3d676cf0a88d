//! Report error types.

use thiserror::Error;

/// Errors that can occur while computing reports.
#[derive(Debug, Error)]
pub enum ReportError {
    /// An error occurred loading documents.
    #[error("{0}")]
    Domain(#[from] domain::DomainError),

    /// An error occurred in the document store.
    #[error("Document store error: {0}")]
    Store(#[from] document_store::StoreError),

    /// A date range bound was not supplied.
    #[error("Start date and end date are required")]
    MissingBound,

    /// A date range bound was not a unix millisecond timestamp.
    #[error("Invalid date '{value}': expected a unix timestamp in milliseconds")]
    InvalidBound { value: String },

    /// A product's revenue does not fit in a money amount.
    #[error("Revenue of product {item_id} is too large to report")]
    RevenueOverflow { item_id: common::DocumentId },

    /// The range ends before it starts.
    #[error("Start date {start} must not be after end date {end}")]
    InvalidRange { start: i64, end: i64 },
}

/// Result type for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;
