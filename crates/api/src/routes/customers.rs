//! Customer endpoints under `/api/customer`.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use common::DocumentId;
use document_store::DocumentStore;
use domain::{Customer, CustomerUpdate, NewCustomer, Order, UserProfile};
use serde::Deserialize;

use super::parse_id;
use crate::AppState;
use crate::error::ApiError;
use crate::response::ApiResponse;

pub fn router<S: DocumentStore + Clone + 'static>() -> Router<Arc<AppState<S>>> {
    Router::new()
        .route("/create", post(create::<S>))
        .route("/add-address", post(add_address::<S>))
        .route("/get-address/{id}", get(addresses::<S>))
        .route("/update/{id}", patch(update::<S>))
        .route("/orders/{id}", get(orders::<S>))
        .route("/all", get(list::<S>))
        .route("/get/{id}", get(get_one::<S>))
        .route("/approved/{id}", patch(approve::<S>))
        .route("/decline/{id}", delete(decline::<S>))
        .route("/delete/{id}", delete(remove::<S>))
        .route("/change-password/{id}", patch(change_password::<S>))
}

#[derive(Debug, Deserialize)]
pub struct AddAddressRequest {
    pub customer_id: DocumentId,
    pub address: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub password: String,
}

type Shared<S> = State<Arc<AppState<S>>>;
type CustomerResponse = Result<ApiResponse<Customer>, ApiError>;

/// POST /api/customer/create
#[tracing::instrument(skip(state, payload))]
pub async fn create<S: DocumentStore + Clone + 'static>(
    State(state): Shared<S>,
    payload: Result<Json<NewCustomer>, JsonRejection>,
) -> CustomerResponse {
    let Json(req) = payload?;
    let customer = state.customers.register(req).await?;
    Ok(ApiResponse::created("Customer registered", customer))
}

/// POST /api/customer/add-address
#[tracing::instrument(skip(state, payload))]
pub async fn add_address<S: DocumentStore + Clone + 'static>(
    State(state): Shared<S>,
    payload: Result<Json<AddAddressRequest>, JsonRejection>,
) -> CustomerResponse {
    let Json(req) = payload?;
    let customer = state
        .customers
        .add_address(req.customer_id, &req.address)
        .await?;
    Ok(ApiResponse::ok("Address added", customer))
}

/// GET /api/customer/get-address/{id}
#[tracing::instrument(skip(state))]
pub async fn addresses<S: DocumentStore + Clone + 'static>(
    State(state): Shared<S>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Vec<String>>, ApiError> {
    let id = parse_id(&id)?;
    let addresses = state.customers.get_addresses(id).await?;
    Ok(ApiResponse::ok("Addresses fetched", addresses))
}

/// PATCH /api/customer/update/{id}
#[tracing::instrument(skip(state, payload))]
pub async fn update<S: DocumentStore + Clone + 'static>(
    State(state): Shared<S>,
    Path(id): Path<String>,
    payload: Result<Json<CustomerUpdate>, JsonRejection>,
) -> CustomerResponse {
    let id = parse_id(&id)?;
    let Json(update) = payload?;
    let customer = state.customers.update_customer(id, update).await?;
    Ok(ApiResponse::ok("Customer updated", customer))
}

/// GET /api/customer/orders/{id}
#[tracing::instrument(skip(state))]
pub async fn orders<S: DocumentStore + Clone + 'static>(
    State(state): Shared<S>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Vec<Order>>, ApiError> {
    let id = parse_id(&id)?;
    let orders = state.customers.customer_orders(id).await?;
    Ok(ApiResponse::ok("Customer orders fetched", orders))
}

/// GET /api/customer/all
#[tracing::instrument(skip(state))]
pub async fn list<S: DocumentStore + Clone + 'static>(
    State(state): Shared<S>,
) -> Result<ApiResponse<Vec<Customer>>, ApiError> {
    let customers = state.customers.list_customers().await?;
    Ok(ApiResponse::ok("Customers fetched", customers))
}

/// GET /api/customer/get/{id}
#[tracing::instrument(skip(state))]
pub async fn get_one<S: DocumentStore + Clone + 'static>(
    State(state): Shared<S>,
    Path(id): Path<String>,
) -> CustomerResponse {
    let id = parse_id(&id)?;
    let customer = state.customers.get_customer(id).await?;
    Ok(ApiResponse::ok("Customer fetched", customer))
}

/// PATCH /api/customer/approved/{id}
#[tracing::instrument(skip(state))]
pub async fn approve<S: DocumentStore + Clone + 'static>(
    State(state): Shared<S>,
    Path(id): Path<String>,
) -> CustomerResponse {
    let id = parse_id(&id)?;
    let customer = state.customers.approve(id).await?;
    Ok(ApiResponse::ok("Customer approved", customer))
}

/// DELETE /api/customer/decline/{id}
#[tracing::instrument(skip(state))]
pub async fn decline<S: DocumentStore + Clone + 'static>(
    State(state): Shared<S>,
    Path(id): Path<String>,
) -> CustomerResponse {
    let id = parse_id(&id)?;
    let customer = state.customers.decline(id).await?;
    Ok(ApiResponse::ok("Customer declined", customer))
}

/// DELETE /api/customer/delete/{id}
#[tracing::instrument(skip(state))]
pub async fn remove<S: DocumentStore + Clone + 'static>(
    State(state): Shared<S>,
    Path(id): Path<String>,
) -> CustomerResponse {
    let id = parse_id(&id)?;
    let customer = state.customers.delete_customer(id).await?;
    Ok(ApiResponse::ok("Customer deleted", customer))
}

/// PATCH /api/customer/change-password/{id}
///
/// `id` is the customer id; the password of its linked user changes.
#[tracing::instrument(skip(state, payload))]
pub async fn change_password<S: DocumentStore + Clone + 'static>(
    State(state): Shared<S>,
    Path(id): Path<String>,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<ApiResponse<UserProfile>, ApiError> {
    let id = parse_id(&id)?;
    let Json(req) = payload?;
    let user = state.auth.change_password(id, &req.password).await?;
    Ok(ApiResponse::ok("Password changed", user.into()))
}
