//! Route handlers, one module per resource.

pub mod auth;
pub mod categories;
pub mod cities;
pub mod customers;
pub mod health;
pub mod metrics;
pub mod orders;
pub mod products;
pub mod sub_categories;
pub mod top_selling;

use common::DocumentId;
use serde::Deserialize;

use crate::error::ApiError;

/// Body of the `update-status` endpoints.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: i64,
}

fn parse_id(id: &str) -> Result<DocumentId, ApiError> {
    id.parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid ID format: {e}")))
}
