//! Cart and order lifecycle endpoints under `/api/order`.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use common::DocumentId;
use document_store::DocumentStore;
use domain::{
    AddItemToCart, AddressUpdate, DeliveryDetails, Order, ShippingUpdate, UpdateQuantity,
};
use serde::{Deserialize, Serialize};

use super::{StatusRequest, parse_id};
use crate::AppState;
use crate::error::ApiError;
use crate::response::ApiResponse;

pub fn router<S: DocumentStore + Clone + 'static>() -> Router<Arc<AppState<S>>> {
    Router::new()
        .route("/add-to-cart", post(add_to_cart::<S>))
        .route("/add-details", post(add_details::<S>))
        .route("/add-address/{id}", patch(add_address::<S>))
        .route("/add-shipping/{id}", patch(add_shipping::<S>))
        .route("/cart/{order_no}", get(cart::<S>))
        .route("/all", get(list::<S>))
        .route("/checkout/{id}", patch(checkout::<S>))
        .route("/update-qty/{order_no}", patch(update_qty::<S>))
        .route("/delete/{id}", delete(remove::<S>))
        .route("/update-status/{id}", patch(update_status::<S>))
        .route("/remove-item/{id}", post(remove_item::<S>))
        .route("/ensure-order-numbers", post(ensure_order_numbers::<S>))
}

#[derive(Debug, Deserialize)]
pub struct AddDetailsRequest {
    #[serde(alias = "orderNo")]
    pub order_no: String,
    #[serde(flatten)]
    pub details: DeliveryDetails,
}

#[derive(Debug, Deserialize)]
pub struct RemoveItemRequest {
    #[serde(alias = "itemId")]
    pub item_id: DocumentId,
}

#[derive(Debug, Serialize)]
pub struct EnsureOrderNumbersResponse {
    pub updated: u64,
}

type Shared<S> = State<Arc<AppState<S>>>;
type OrderResponse = Result<ApiResponse<Order>, ApiError>;

/// POST /api/order/add-to-cart
#[tracing::instrument(skip(state, payload))]
pub async fn add_to_cart<S: DocumentStore + Clone + 'static>(
    State(state): Shared<S>,
    payload: Result<Json<AddItemToCart>, JsonRejection>,
) -> OrderResponse {
    let Json(cmd) = payload?;
    let order = state.orders.add_item_to_cart(cmd).await?;
    Ok(ApiResponse::ok("Item added to cart", order))
}

/// POST /api/order/add-details
#[tracing::instrument(skip(state, payload))]
pub async fn add_details<S: DocumentStore + Clone + 'static>(
    State(state): Shared<S>,
    payload: Result<Json<AddDetailsRequest>, JsonRejection>,
) -> OrderResponse {
    let Json(req) = payload?;
    let order = state
        .orders
        .add_details_to_order(&req.order_no, req.details)
        .await?;
    Ok(ApiResponse::ok("Order details updated", order))
}

/// PATCH /api/order/add-address/{id}
#[tracing::instrument(skip(state, payload))]
pub async fn add_address<S: DocumentStore + Clone + 'static>(
    State(state): Shared<S>,
    Path(id): Path<String>,
    payload: Result<Json<AddressUpdate>, JsonRejection>,
) -> OrderResponse {
    let id = parse_id(&id)?;
    let Json(update) = payload?;
    let order = state.orders.add_address_to_order(id, update).await?;
    Ok(ApiResponse::ok("Address added to order", order))
}

/// PATCH /api/order/add-shipping/{id}
#[tracing::instrument(skip(state, payload))]
pub async fn add_shipping<S: DocumentStore + Clone + 'static>(
    State(state): Shared<S>,
    Path(id): Path<String>,
    payload: Result<Json<ShippingUpdate>, JsonRejection>,
) -> OrderResponse {
    let id = parse_id(&id)?;
    let Json(update) = payload?;
    let order = state.orders.add_shipping_to_order(id, update).await?;
    Ok(ApiResponse::ok("Shipping added to order", order))
}

/// GET /api/order/cart/{order_no}
#[tracing::instrument(skip(state))]
pub async fn cart<S: DocumentStore + Clone + 'static>(
    State(state): Shared<S>,
    Path(order_no): Path<String>,
) -> OrderResponse {
    let order = state.orders.get_user_cart(&order_no).await?;
    Ok(ApiResponse::ok("Cart fetched", order))
}

/// GET /api/order/all
#[tracing::instrument(skip(state))]
pub async fn list<S: DocumentStore + Clone + 'static>(
    State(state): Shared<S>,
) -> Result<ApiResponse<Vec<Order>>, ApiError> {
    let orders = state.orders.get_all_orders().await?;
    Ok(ApiResponse::ok("Orders fetched", orders))
}

/// PATCH /api/order/checkout/{id}
#[tracing::instrument(skip(state))]
pub async fn checkout<S: DocumentStore + Clone + 'static>(
    State(state): Shared<S>,
    Path(id): Path<String>,
) -> OrderResponse {
    let id = parse_id(&id)?;
    let order = state.orders.update_status_to_placed(id).await?;
    Ok(ApiResponse::ok("Order placed", order))
}

/// PATCH /api/order/update-qty/{order_no}
#[tracing::instrument(skip(state, payload))]
pub async fn update_qty<S: DocumentStore + Clone + 'static>(
    State(state): Shared<S>,
    Path(order_no): Path<String>,
    payload: Result<Json<UpdateQuantity>, JsonRejection>,
) -> OrderResponse {
    let Json(cmd) = payload?;
    let order = state.orders.update_qty_of_items(&order_no, cmd).await?;
    Ok(ApiResponse::ok("Quantity updated", order))
}

/// DELETE /api/order/delete/{id}
#[tracing::instrument(skip(state))]
pub async fn remove<S: DocumentStore + Clone + 'static>(
    State(state): Shared<S>,
    Path(id): Path<String>,
) -> OrderResponse {
    let id = parse_id(&id)?;
    let order = state.orders.delete_order(id).await?;
    Ok(ApiResponse::ok("Order deleted", order))
}

/// PATCH /api/order/update-status/{id}
#[tracing::instrument(skip(state, payload))]
pub async fn update_status<S: DocumentStore + Clone + 'static>(
    State(state): Shared<S>,
    Path(id): Path<String>,
    payload: Result<Json<StatusRequest>, JsonRejection>,
) -> OrderResponse {
    let id = parse_id(&id)?;
    let Json(req) = payload?;
    let order = state.orders.update_order_status(id, req.status).await?;
    Ok(ApiResponse::ok("Order status updated", order))
}

/// POST /api/order/remove-item/{id}
#[tracing::instrument(skip(state, payload))]
pub async fn remove_item<S: DocumentStore + Clone + 'static>(
    State(state): Shared<S>,
    Path(id): Path<String>,
    payload: Result<Json<RemoveItemRequest>, JsonRejection>,
) -> OrderResponse {
    let id = parse_id(&id)?;
    let Json(req) = payload?;
    let order = state.orders.remove_item_from_cart(id, req.item_id).await?;
    Ok(ApiResponse::ok("Item removed from cart", order))
}

/// POST /api/order/ensure-order-numbers
#[tracing::instrument(skip(state))]
pub async fn ensure_order_numbers<S: DocumentStore + Clone + 'static>(
    State(state): Shared<S>,
) -> Result<ApiResponse<EnsureOrderNumbersResponse>, ApiError> {
    let updated = state.orders.ensure_order_numbers().await?;
    Ok(ApiResponse::ok(
        format!("Assigned order numbers to {updated} orders"),
        EnsureOrderNumbersResponse { updated },
    ))
}
