//! API error types with HTTP response mapping.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use document_store::StoreError;
use domain::{AuthError, CatalogError, CustomerError, DomainError, OrderError};
use reports::ReportError;

use crate::response::ApiResponse;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Malformed request: bad path id, unreadable body or query.
    BadRequest(String),
    /// Domain logic error.
    Domain(DomainError),
    /// Report parameter or aggregation error.
    Report(ReportError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Domain(err) => (domain_status(&err), err.to_string()),
            ApiError::Report(err) => (report_status(&err), err.to_string()),
        };

        if status.is_server_error() {
            tracing::error!(error = %message, "internal server error");
        }

        ApiResponse::failure(status, message).into_response()
    }
}

fn domain_status(err: &DomainError) -> StatusCode {
    match err {
        DomainError::Order(order_err) => match order_err {
            OrderError::ItemNotFound { .. } => StatusCode::NOT_FOUND,
            OrderError::InvalidStateTransition { .. } | OrderError::DeliveryLocked { .. } => {
                StatusCode::CONFLICT
            }
            OrderError::OrderNumberExhausted { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            OrderError::InvalidQuantity { .. }
            | OrderError::NegativeQuantity { .. }
            | OrderError::ProductOutOfStock { .. }
            | OrderError::NotACart { .. }
            | OrderError::EmptyCart
            | OrderError::InvalidStatus { .. }
            | OrderError::NegativeAmount { .. }
            | OrderError::AmountOverflow
            | OrderError::QuantityTooLarge { .. } => StatusCode::BAD_REQUEST,
        },
        DomainError::Catalog(
            CatalogError::DuplicateCategory { .. } | CatalogError::DuplicateSubCategory { .. },
        ) => StatusCode::CONFLICT,
        DomainError::Catalog(_) | DomainError::City(_) => StatusCode::BAD_REQUEST,
        DomainError::Customer(CustomerError::MissingField { .. }) => StatusCode::BAD_REQUEST,
        DomainError::Customer(_) => StatusCode::CONFLICT,
        DomainError::Auth(auth_err) => auth_status(auth_err),
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Store(store_err) => store_status(store_err),
        DomainError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn auth_status(err: &AuthError) -> StatusCode {
    match err {
        AuthError::MissingField { .. }
        | AuthError::WeakPassword { .. }
        | AuthError::InvalidRole { .. }
        | AuthError::NegativeShipping { .. } => StatusCode::BAD_REQUEST,
        AuthError::PasswordMismatch | AuthError::UnknownPhoneNumber => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        AuthError::DuplicatePhoneNumber { .. } => StatusCode::CONFLICT,
        AuthError::InvalidCredentials | AuthError::NotApproved => StatusCode::FORBIDDEN,
        AuthError::Hashing(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn store_status(err: &StoreError) -> StatusCode {
    match err {
        StoreError::ConcurrencyConflict { .. }
        | StoreError::UniqueViolation { .. }
        | StoreError::AlreadyExists { .. } => StatusCode::CONFLICT,
        StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn report_status(err: &ReportError) -> StatusCode {
    match err {
        ReportError::MissingBound
        | ReportError::InvalidBound { .. }
        | ReportError::InvalidRange { .. } => StatusCode::BAD_REQUEST,
        ReportError::RevenueOverflow { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        ReportError::Domain(domain_err) => domain_status(domain_err),
        ReportError::Store(store_err) => store_status(store_err),
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        ApiError::Report(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
