//! Posting routes: transactions and journals.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::Deserialize;
use tallybook_core::ledger::{PostingRequest, PostingRow};
use tallybook_db::LedgerRepository;
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::AuthUser};

/// Creates the posting routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", post(post_transaction))
        .route("/journals/{id}", get(get_journal))
        .route("/journals/{id}/void", post(void_journal))
}

/// Request body for posting a transaction.
#[derive(Debug, Deserialize)]
pub struct PostTransactionRequest {
    /// Transaction date (YYYY-MM-DD).
    pub trans_date: NaiveDate,
    /// Free-form memo.
    #[serde(default)]
    pub memo: String,
    /// Signed rows; positive amounts are debits and the set must sum to zero.
    pub rows: Vec<PostingRow>,
}

/// POST `/transactions`
///
/// Answers 201 with the journal and its lines, or 204 when every row is zero
/// and nothing was written.
async fn post_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<PostTransactionRequest>,
) -> Result<Response, ApiError> {
    let request = PostingRequest {
        created_by: auth.user_id(),
        trans_date: payload.trans_date,
        memo: payload.memo,
        rows: payload.rows,
    };

    let posted = LedgerRepository::new(state.conn()).post(&request).await?;

    Ok(match posted {
        Some(journal) => (StatusCode::CREATED, Json(journal)).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

/// GET `/journals/{id}` - Voided journals read as not found.
async fn get_journal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(LedgerRepository::new(state.conn()).get_journal(id).await?))
}

/// POST `/journals/{id}/void`
async fn void_journal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(LedgerRepository::new(state.conn()).void_journal(id).await?))
}
