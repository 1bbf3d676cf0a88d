//! Product endpoints under `/api/product`.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use document_store::DocumentStore;
use domain::{NewProduct, Product, ProductUpdate, ProductView};

use super::{StatusRequest, parse_id};
use crate::AppState;
use crate::error::ApiError;
use crate::response::ApiResponse;

pub fn router<S: DocumentStore + Clone + 'static>() -> Router<Arc<AppState<S>>> {
    Router::new()
        .route("/create", post(create::<S>))
        .route("/all", get(list::<S>))
        .route("/{id}", get(get_one::<S>))
        .route("/update/{id}", patch(update::<S>))
        .route("/update-status/{id}", patch(update_status::<S>))
        .route("/delete/{id}", delete(remove::<S>))
}

/// POST /api/product/create
#[tracing::instrument(skip(state, payload))]
pub async fn create<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<NewProduct>, JsonRejection>,
) -> Result<ApiResponse<Product>, ApiError> {
    let Json(req) = payload?;
    let product = state.catalog.create_product(req).await?;
    Ok(ApiResponse::created("Product created", product))
}

/// GET /api/product/all
#[tracing::instrument(skip(state))]
pub async fn list<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<ApiResponse<Vec<ProductView>>, ApiError> {
    let products = state.catalog.list_products().await?;
    Ok(ApiResponse::ok("Products fetched", products))
}

/// GET /api/product/{id}
#[tracing::instrument(skip(state))]
pub async fn get_one<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<ApiResponse<ProductView>, ApiError> {
    let id = parse_id(&id)?;
    let product = state.catalog.get_product(id).await?;
    Ok(ApiResponse::ok("Product fetched", product))
}

/// PATCH /api/product/update/{id}
#[tracing::instrument(skip(state, payload))]
pub async fn update<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    payload: Result<Json<ProductUpdate>, JsonRejection>,
) -> Result<ApiResponse<Product>, ApiError> {
    let id = parse_id(&id)?;
    let Json(update) = payload?;
    let product = state.catalog.update_product(id, update).await?;
    Ok(ApiResponse::ok("Product updated", product))
}

/// PATCH /api/product/update-status/{id}
#[tracing::instrument(skip(state, payload))]
pub async fn update_status<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    payload: Result<Json<StatusRequest>, JsonRejection>,
) -> Result<ApiResponse<Product>, ApiError> {
    let id = parse_id(&id)?;
    let Json(req) = payload?;
    let product = state.catalog.update_product_status(id, req.status).await?;
    Ok(ApiResponse::ok("Product status updated", product))
}

/// DELETE /api/product/delete/{id}
#[tracing::instrument(skip(state))]
pub async fn remove<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Product>, ApiError> {
    let id = parse_id(&id)?;
    let product = state.catalog.delete_product(id).await?;
    Ok(ApiResponse::ok("Product deleted", product))
}
