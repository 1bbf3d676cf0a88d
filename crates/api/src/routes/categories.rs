//! Category endpoints under `/api/category`.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use document_store::DocumentStore;
use domain::Category;
use serde::Deserialize;

use super::parse_id;
use crate::AppState;
use crate::error::ApiError;
use crate::response::ApiResponse;

pub fn router<S: DocumentStore + Clone + 'static>() -> Router<Arc<AppState<S>>> {
    Router::new()
        .route("/create", post(create::<S>))
        .route("/all", get(list::<S>))
        .route("/update/{id}", patch(update::<S>))
        .route("/delete/{id}", delete(remove::<S>))
}

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    #[serde(default)]
    pub name: String,
}

/// POST /api/category/create
#[tracing::instrument(skip(state, payload))]
pub async fn create<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<CategoryRequest>, JsonRejection>,
) -> Result<ApiResponse<Category>, ApiError> {
    let Json(req) = payload?;
    let category = state.catalog.create_category(&req.name).await?;
    Ok(ApiResponse::created("Category created", category))
}

/// GET /api/category/all
#[tracing::instrument(skip(state))]
pub async fn list<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<ApiResponse<Vec<Category>>, ApiError> {
    let categories = state.catalog.list_categories().await?;
    Ok(ApiResponse::ok("Categories fetched", categories))
}

/// PATCH /api/category/update/{id}
#[tracing::instrument(skip(state, payload))]
pub async fn update<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    payload: Result<Json<CategoryRequest>, JsonRejection>,
) -> Result<ApiResponse<Category>, ApiError> {
    let id = parse_id(&id)?;
    let Json(req) = payload?;
    let category = state.catalog.update_category(id, &req.name).await?;
    Ok(ApiResponse::ok("Category updated", category))
}

/// DELETE /api/category/delete/{id}
#[tracing::instrument(skip(state))]
pub async fn remove<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Category>, ApiError> {
    let id = parse_id(&id)?;
    let category = state.catalog.delete_category(id).await?;
    Ok(ApiResponse::ok("Category deleted", category))
}
