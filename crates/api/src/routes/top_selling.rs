//! Sales report endpoints under `/api/top-selling`.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::Router;
use document_store::DocumentStore;
use reports::{DateRange, ProductSales, TopSellingItem};
use serde::Deserialize;

use super::parse_id;
use crate::AppState;
use crate::error::ApiError;
use crate::response::ApiResponse;

pub fn router<S: DocumentStore + Clone + 'static>() -> Router<Arc<AppState<S>>> {
    Router::new()
        .route("/", get(all_time::<S>))
        .route("/date-range", get(date_range::<S>))
        .route("/category/{category_id}", get(category::<S>))
}

/// Raw bounds, validated by [`DateRange::parse`].
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// GET /api/top-selling
#[tracing::instrument(skip(state))]
pub async fn all_time<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<ApiResponse<Vec<TopSellingItem>>, ApiError> {
    let items = state.reports.top_selling().await?;
    Ok(ApiResponse::ok("Top selling products fetched", items))
}

/// GET /api/top-selling/date-range?startDate=..&endDate=..
#[tracing::instrument(skip(state, params))]
pub async fn date_range<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    params: Result<Query<DateRangeParams>, QueryRejection>,
) -> Result<ApiResponse<Vec<ProductSales>>, ApiError> {
    let Query(params) = params?;
    let range = DateRange::parse(params.start_date.as_deref(), params.end_date.as_deref())?;
    let sales = state.reports.top_selling_between(range).await?;
    Ok(ApiResponse::ok("Top selling products fetched", sales))
}

/// GET /api/top-selling/category/{category_id}
#[tracing::instrument(skip(state))]
pub async fn category<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(category_id): Path<String>,
) -> Result<ApiResponse<Vec<ProductSales>>, ApiError> {
    let category_id = parse_id(&category_id)?;
    let sales = state.reports.top_selling_in_category(category_id).await?;
    Ok(ApiResponse::ok("Top selling products fetched", sales))
}
