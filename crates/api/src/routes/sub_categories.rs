//! Sub-category endpoints under `/api/sub-category`.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use document_store::DocumentStore;
use domain::{NewSubCategory, SubCategory, SubCategoryUpdate, SubCategoryView};

use super::parse_id;
use crate::AppState;
use crate::error::ApiError;
use crate::response::ApiResponse;

pub fn router<S: DocumentStore + Clone + 'static>() -> Router<Arc<AppState<S>>> {
    Router::new()
        .route("/create", post(create::<S>))
        .route("/all", get(list::<S>))
        .route("/{id}", get(get_one::<S>))
        .route("/update/{id}", patch(update::<S>))
        .route("/delete/{id}", delete(remove::<S>))
}

/// POST /api/sub-category/create
#[tracing::instrument(skip(state, payload))]
pub async fn create<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<NewSubCategory>, JsonRejection>,
) -> Result<ApiResponse<SubCategory>, ApiError> {
    let Json(req) = payload?;
    let sub_category = state.catalog.create_sub_category(req).await?;
    Ok(ApiResponse::created("SubCategory created", sub_category))
}

/// GET /api/sub-category/all
#[tracing::instrument(skip(state))]
pub async fn list<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<ApiResponse<Vec<SubCategoryView>>, ApiError> {
    let sub_categories = state.catalog.list_sub_categories().await?;
    Ok(ApiResponse::ok("SubCategories fetched", sub_categories))
}

/// GET /api/sub-category/{id}
#[tracing::instrument(skip(state))]
pub async fn get_one<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<ApiResponse<SubCategoryView>, ApiError> {
    let id = parse_id(&id)?;
    let sub_category = state.catalog.get_sub_category(id).await?;
    Ok(ApiResponse::ok("SubCategory fetched", sub_category))
}

/// PATCH /api/sub-category/update/{id}
#[tracing::instrument(skip(state, payload))]
pub async fn update<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    payload: Result<Json<SubCategoryUpdate>, JsonRejection>,
) -> Result<ApiResponse<SubCategory>, ApiError> {
    let id = parse_id(&id)?;
    let Json(update) = payload?;
    let sub_category = state.catalog.update_sub_category(id, update).await?;
    Ok(ApiResponse::ok("SubCategory updated", sub_category))
}

/// DELETE /api/sub-category/delete/{id}
#[tracing::instrument(skip(state))]
pub async fn remove<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<ApiResponse<SubCategory>, ApiError> {
    let id = parse_id(&id)?;
    let sub_category = state.catalog.delete_sub_category(id).await?;
    Ok(ApiResponse::ok("SubCategory deleted", sub_category))
}
