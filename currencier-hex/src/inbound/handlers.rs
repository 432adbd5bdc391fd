//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use currencier_types::{AppError, CurrencyRepository, CurrencySource, LazyQuery, PageQuery};

use super::request_id::RequestId;
use crate::CurrencierService;

/// Body returned when a lookup has no id.
pub const MISSING_ID: &str = "must be id in query";

/// Application state shared across handlers.
pub struct AppState<S: CurrencySource, R: CurrencyRepository> {
    pub service: Arc<CurrencierService<S, R>>,
}

/// Errors surfaced to HTTP clients, all as `400` with a plain-text body.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    App(AppError),
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError::App(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::App(err) => err.to_string(),
        };
        tracing::warn!("Request failed: {}", message);

        (StatusCode::BAD_REQUEST, message).into_response()
    }
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// Offset pagination over all currencies.
#[tracing::instrument(skip_all, fields(request_id = %request_id))]
pub async fn list_currencies<S: CurrencySource, R: CurrencyRepository>(
    State(state): State<Arc<AppState<S, R>>>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = query.parse().map_err(ApiError::BadRequest)?;

    let currencies = state
        .service
        .get_currencies_page(page.limit, page.offset)
        .await?;
    Ok(Json(currencies))
}

/// Cursor pagination: currencies after `lastid`.
#[tracing::instrument(skip_all, fields(request_id = %request_id))]
pub async fn lazy_currencies<S: CurrencySource, R: CurrencyRepository>(
    State(state): State<Arc<AppState<S, R>>>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<LazyQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let cursor = query.parse().map_err(ApiError::BadRequest)?;

    let currencies = state
        .service
        .get_currencies_lazy(cursor.limit, &cursor.last_id)
        .await?;
    Ok(Json(currencies))
}

/// Single currency by id; `null` when it is not stored.
#[tracing::instrument(skip_all, fields(request_id = %request_id, currency_id = %id))]
pub async fn get_currency<S: CurrencySource, R: CurrencyRepository>(
    State(state): State<Arc<AppState<S, R>>>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    // Blank ids are rejected; anything else is looked up verbatim.
    if id.trim().is_empty() {
        return Err(ApiError::BadRequest(MISSING_ID.into()));
    }

    let currency = state.service.get_currency_by_id(&id).await?;
    Ok(Json(currency))
}

/// `/currency` without an id.
pub async fn missing_id() -> ApiError {
    ApiError::BadRequest(MISSING_ID.into())
}
