//! Account endpoints under `/api/auth`.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use document_store::DocumentStore;
use domain::{Login, ProfileUpdate, RegisterUser, UserProfile};

use super::parse_id;
use crate::AppState;
use crate::error::ApiError;
use crate::response::ApiResponse;

pub fn router<S: DocumentStore + Clone + 'static>() -> Router<Arc<AppState<S>>> {
    Router::new()
        .route("/register", post(register::<S>))
        .route("/login", post(login::<S>))
        .route("/get-profile", get(admin_profile::<S>))
        .route("/get-profile/{id}", get(profile::<S>))
        .route("/update-profile/{id}", patch(update_profile::<S>))
}

type Shared<S> = State<Arc<AppState<S>>>;
type ProfileResponse = Result<ApiResponse<UserProfile>, ApiError>;

/// POST /api/auth/register
#[tracing::instrument(skip(state, payload))]
pub async fn register<S: DocumentStore + Clone + 'static>(
    State(state): Shared<S>,
    payload: Result<Json<RegisterUser>, JsonRejection>,
) -> ProfileResponse {
    let Json(req) = payload?;
    let user = state.auth.register(req).await?;
    let message = format!("{} successfully registered!", user.name);
    Ok(ApiResponse::created(message, user.into()))
}

/// POST /api/auth/login
#[tracing::instrument(skip(state, payload))]
pub async fn login<S: DocumentStore + Clone + 'static>(
    State(state): Shared<S>,
    payload: Result<Json<Login>, JsonRejection>,
) -> ProfileResponse {
    let Json(req) = payload?;
    let user = state.auth.login(req).await?;
    Ok(ApiResponse::ok("Successfully Logged In!", user.into()))
}

/// GET /api/auth/get-profile
#[tracing::instrument(skip(state))]
pub async fn admin_profile<S: DocumentStore + Clone + 'static>(
    State(state): Shared<S>,
) -> ProfileResponse {
    let user = state.auth.get_profile(None).await?;
    Ok(ApiResponse::ok("Profile fetched successfully", user.into()))
}

/// GET /api/auth/get-profile/{id}
///
/// Clients without a signed-in user send the literal `undefined`, which
/// resolves to the admin profile.
#[tracing::instrument(skip(state))]
pub async fn profile<S: DocumentStore + Clone + 'static>(
    State(state): Shared<S>,
    Path(id): Path<String>,
) -> ProfileResponse {
    let id = match id.as_str() {
        "undefined" => None,
        raw => Some(parse_id(raw)?),
    };
    let user = state.auth.get_profile(id).await?;
    Ok(ApiResponse::ok("Profile fetched successfully", user.into()))
}

/// PATCH /api/auth/update-profile/{id}
#[tracing::instrument(skip(state, payload))]
pub async fn update_profile<S: DocumentStore + Clone + 'static>(
    State(state): Shared<S>,
    Path(id): Path<String>,
    payload: Result<Json<ProfileUpdate>, JsonRejection>,
) -> ProfileResponse {
    let id = parse_id(&id)?;
    let Json(update) = payload?;
    let user = state.auth.update_profile(id, update).await?;
    Ok(ApiResponse::ok("Profile updated successfully", user.into()))
}
