//! HTTP API server for the back-office services.
//!
//! Exposes the order lifecycle, catalog, city, customer, account and
//! report endpoints under `/api`, with structured logging (tracing) and
//! Prometheus metrics.

pub mod config;
pub mod error;
pub mod response;
pub mod routes;

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::{MatchedPath, Request};
use axum::http::HeaderValue;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use document_store::DocumentStore;
use domain::{AuthService, CatalogService, CityService, CustomerService, OrderService};
use metrics_exporter_prometheus::PrometheusHandle;
use reports::SalesReport;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;

/// Shared application state accessible from all handlers.
pub struct AppState<S: DocumentStore> {
    pub orders: OrderService<S>,
    pub catalog: CatalogService<S>,
    pub cities: CityService<S>,
    pub customers: CustomerService<S>,
    pub auth: AuthService<S>,
    pub reports: SalesReport<S>,
}

impl<S: DocumentStore + Clone> AppState<S> {
    /// Builds every service over the same store.
    pub fn new(store: S) -> Self {
        Self {
            orders: OrderService::new(store.clone()),
            catalog: CatalogService::new(store.clone()),
            cities: CityService::new(store.clone()),
            customers: CustomerService::new(store.clone()),
            auth: AuthService::new(store.clone()),
            reports: SalesReport::new(store),
        }
    }
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: DocumentStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
    config: &Config,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/", get(routes::health::check))
        .route("/health", get(routes::health::check))
        .nest("/api/order", routes::orders::router::<S>())
        .nest("/api/category", routes::categories::router::<S>())
        .nest("/api/sub-category", routes::sub_categories::router::<S>())
        .nest("/api/product", routes::products::router::<S>())
        .nest("/api/cities", routes::cities::router::<S>())
        .nest("/api/customer", routes::customers::router::<S>())
        .nest("/api/auth", routes::auth::router::<S>())
        .nest("/api/top-selling", routes::top_selling::router::<S>())
        .route_layer(middleware::from_fn(track_requests))
        .with_state(state)
        .merge(metrics_router)
        .layer(cors_layer(&config.cors_allowed_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

/// Records request count and latency per matched route.
async fn track_requests(request: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_default();

    let response = next.run(request).await;

    let status = response.status().as_u16().to_string();
    metrics::counter!(
        "http_requests_total",
        "method" => method.clone(),
        "route" => route.clone(),
        "status" => status.clone(),
    )
    .increment(1);
    metrics::histogram!(
        "http_request_duration_seconds",
        "method" => method,
        "route" => route,
        "status" => status,
    )
    .record(started.elapsed().as_secs_f64());

    response
}
