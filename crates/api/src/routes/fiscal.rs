//! Fiscal year routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::Deserialize;
use tallybook_db::{FiscalYearFilter, FiscalYearRepository};
use tallybook_shared::types::PageRequest;

use crate::{AppState, error::ApiError, middleware::AuthUser};

/// Creates the fiscal year routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/fiscal-years", get(list_fiscal_years).post(create_fiscal_year))
        .route("/fiscal-years/active", get(active_fiscal_year))
        .route("/fiscal-years/{id}", get(get_fiscal_year))
        .route("/fiscal-years/{id}/close", post(close_fiscal_year))
}

/// Request body for creating a fiscal year.
#[derive(Debug, Deserialize)]
pub struct CreateFiscalYearRequest {
    /// First day of the year (YYYY-MM-DD).
    pub start_date: NaiveDate,
    /// Last day of the year, inclusive.
    pub end_date: NaiveDate,
}

/// GET `/fiscal-years` - Paginated, ordered by start date.
async fn list_fiscal_years(
    State(state): State<AppState>,
    Query(filter): Query<FiscalYearFilter>,
    Query(page): Query<PageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let years = FiscalYearRepository::new(state.conn())
        .list(&filter, page)
        .await?;
    Ok(Json(years))
}

/// POST `/fiscal-years`
async fn create_fiscal_year(
    State(state): State<AppState>,
    Json(payload): Json<CreateFiscalYearRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let year = FiscalYearRepository::new(state.conn())
        .create(payload.start_date, payload.end_date)
        .await?;
    Ok((StatusCode::CREATED, Json(year)))
}

/// GET `/fiscal-years/active` - The earliest open year.
async fn active_fiscal_year(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(FiscalYearRepository::new(state.conn()).active().await?))
}

/// GET `/fiscal-years/{id}`
async fn get_fiscal_year(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(FiscalYearRepository::new(state.conn()).get(id).await?))
}

/// POST `/fiscal-years/{id}/close` - Closes the year on behalf of the caller
/// and moves its balance-sheet movement into retained earnings.
async fn close_fiscal_year(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = FiscalYearRepository::new(state.conn())
        .close(id, auth.user_id())
        .await?;
    Ok(Json(outcome))
}
