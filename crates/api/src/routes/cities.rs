//! City endpoints under `/api/cities`.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use document_store::DocumentStore;
use domain::{City, CityUpdate, NewCity};

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

/// POST /api/cities/create
#[tracing::instrument(skip(state, payload))]
pub async fn create<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<NewCity>, JsonRejection>,
) -> Result<ApiResponse<City>, ApiError> {
    let Json(req) = payload?;
    let city = state.cities.create_city(req).await?;
    Ok(ApiResponse::created("City created", city))
}

/// GET /api/cities/all
#[tracing::instrument(skip(state))]
pub async fn list<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<ApiResponse<Vec<City>>, ApiError> {
    let cities = state.cities.list_cities().await?;
    Ok(ApiResponse::ok("Cities fetched", cities))
}

/// GET /api/cities/{id}
#[tracing::instrument(skip(state))]
pub async fn get_one<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<ApiResponse<City>, ApiError> {
    let id = parse_id(&id)?;
    let city = state.cities.get_city(id).await?;
    Ok(ApiResponse::ok("City fetched", city))
}

/// PATCH /api/cities/update/{id}
#[tracing::instrument(skip(state, payload))]
pub async fn update<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    payload: Result<Json<CityUpdate>, JsonRejection>,
) -> Result<ApiResponse<City>, ApiError> {
    let id = parse_id(&id)?;
    let Json(update) = payload?;
    let city = state.cities.update_city(id, update).await?;
    Ok(ApiResponse::ok("City updated", city))
}

/// DELETE /api/cities/delete/{id}
#[tracing::instrument(skip(state))]
pub async fn remove<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<ApiResponse<City>, ApiError> {
    let id = parse_id(&id)?;
    let city = state.cities.delete_city(id).await?;
    Ok(ApiResponse::ok("City deleted", city))
}
